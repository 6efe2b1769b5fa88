//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `event`: Farebox event types and identifier aliases
//! - `linked`: Matcher and enricher output records
//! - `error`: Error types for the linking engine

pub mod error;
pub mod event;
pub mod linked;

pub use error::LinkError;
pub use event::{
    CardId, Event, FareProgram, GeoPoint, LinkId, Sequence, TransferCode, TransportClass,
};
pub use linked::{DiscountRate, DiscountTier, LinkedTransfer, MatchedTransfer, Relationship};
