//! Type-safe ID wrappers for Pocket Foreman.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to generate string-backed ID newtypes with common functionality.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an existing string.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
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
    };
}

define_id!(PageId);

/// Identifier of a pending structure change awaiting confirmation.
///
/// Minted from a monotonically increasing counter owned by the
/// reconciliation service; never reused within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(u64);

impl ChangeId {
    /// The first id handed out by a fresh counter.
    pub const FIRST: ChangeId = ChangeId(1);

    /// Wraps a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChangeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChangeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_display() {
        let id = PageId::from_string("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_change_id_sequence() {
        let first = ChangeId::FIRST;
        assert_eq!(first.get(), 1);
        assert_eq!(first.next().get(), 2);
        assert!(first < first.next());
    }

    #[test]
    fn test_change_id_parse() {
        assert_eq!("42".parse::<ChangeId>().unwrap(), ChangeId::new(42));
        assert_eq!(" 7 ".parse::<ChangeId>().unwrap(), ChangeId::new(7));
        assert!("x".parse::<ChangeId>().is_err());
    }

    #[test]
    fn test_page_id_serde_transparent() {
        let id = PageId::from("page-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"page-1\"");
    }
}
