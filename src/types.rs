//! NewType wrappers for strong typing throughout the orchestrator.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a tool id where a worker id is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Identifier of a search tool (e.g., "flight_search").
    ///
    /// This is the name the reasoning substrate uses when it asks for a
    /// capability, and the key workers use to declare their tool set.
    ToolId
);

newtype_string!(
    /// Identifier of a worker role (e.g., "flight_researcher").
    WorkerId
);

newtype_string!(
    /// Identifier of a work unit in the task pipeline
    /// (e.g., "research_flights_task").
    UnitId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_id_creation() {
        let id = ToolId::new("flight_search");
        assert_eq!(id.as_str(), "flight_search");
        assert_eq!(id.to_string(), "flight_search");
    }

    #[test]
    fn test_worker_id_from_string() {
        let id: WorkerId = "hotel_researcher".into();
        assert_eq!(id.as_str(), "hotel_researcher");

        let id: WorkerId = String::from("travel_planner").into();
        assert_eq!(id.into_inner(), "travel_planner");
    }

    #[test]
    fn test_unit_id_serde() {
        let id = UnitId::new("create_itinerary_task");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"create_itinerary_task\"");

        let parsed: UnitId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(ToolId::new("hotel_search"), 1);
        assert_eq!(map.get("hotel_search"), Some(&1));
        assert!(!map.contains_key("flight_search"));
    }
}
