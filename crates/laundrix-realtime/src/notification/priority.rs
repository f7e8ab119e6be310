//! Notification priority levels.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity ranking of a notification. `P0` is the most critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    /// Critical: platform-wide incident, security breach.
    P0,
    /// High: needs attention soon (payment failures, suspensions).
    P1,
    /// Medium: notable platform activity.
    P2,
    /// Normal: default for anything unclassified.
    #[default]
    P3,
    /// Low: informational.
    P4,
}

impl Priority {
    /// All levels, most critical first.
    pub const ALL: [Priority; 5] = [Self::P0, Self::P1, Self::P2, Self::P3, Self::P4];

    /// Parse from a string such as `"P1"` or `"p1"`. Unknown input yields `P3`.
    pub fn from_str_value(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" | "0" => Self::P0,
            "P1" | "1" => Self::P1,
            "P2" | "2" => Self::P2,
            "P4" | "4" => Self::P4,
            _ => Self::P3,
        }
    }

    /// Resolve an optional JSON value (string or integer). Missing or
    /// unrecognized input yields `P3`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::from_str_value(s),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => Self::P0,
                Some(1) => Self::P1,
                Some(2) => Self::P2,
                Some(4) => Self::P4,
                _ => Self::P3,
            },
            _ => Self::P3,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_or_unknown_is_p3() {
        assert_eq!(Priority::from_json(None), Priority::P3);
        assert_eq!(Priority::from_json(Some(&json!(null))), Priority::P3);
        assert_eq!(Priority::from_json(Some(&json!("urgent"))), Priority::P3);
        assert_eq!(Priority::from_json(Some(&json!(17))), Priority::P3);
        assert_eq!(Priority::from_json(Some(&json!(-1))), Priority::P3);
    }

    #[test]
    fn test_accepts_strings_and_integers() {
        assert_eq!(Priority::from_json(Some(&json!("p0"))), Priority::P0);
        assert_eq!(Priority::from_json(Some(&json!(" P4 "))), Priority::P4);
        assert_eq!(Priority::from_json(Some(&json!(1))), Priority::P1);
    }

    #[test]
    fn test_ordering_most_critical_first() {
        assert!(Priority::P0 < Priority::P1);
        assert!(Priority::P3 < Priority::P4);
    }
}
