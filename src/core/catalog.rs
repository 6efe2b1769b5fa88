//! Route → operator catalog
//!
//! Read-only lookup from a route identifier to the operating company's
//! name. The upstream catalog is expected de-duplicated by route id; when
//! it is not, the first occurrence wins deterministically. A missing route
//! resolves to an explicit absent value, never an error.

use std::collections::HashMap;

/// Immutable route → operator lookup for one batch
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    operators: HashMap<String, String>,
}

impl RouteCatalog {
    /// Build the catalog from `(route_id, operator)` entries
    ///
    /// Duplicate route ids keep their first occurrence.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut operators = HashMap::new();

        for (route_id, operator) in entries {
            operators.entry(route_id).or_insert(operator);
        }

        RouteCatalog { operators }
    }

    /// Operator for a route, if the catalog maps it
    pub fn operator(&self, route_id: &str) -> Option<&str> {
        self.operators.get(route_id).map(String::as_str)
    }

    /// Number of mapped routes
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True when no route is mapped at all
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
