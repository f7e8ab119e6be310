//! Newtype wrappers around backend-issued string identifiers.
//!
//! The platform backend issues opaque string ids (document ids, UUIDs,
//! or composite keys). Using distinct types prevents accidentally passing a
//! `UserId` where a `NotificationId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from an existing value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Create a fresh random identifier (UUID v4).
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(crate::error::AppError::validation(concat!(
                        stringify!($name),
                        " must not be empty"
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a notification.
    NotificationId
);

define_id!(
    /// Unique identifier for a console user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let id1 = NotificationId::generate();
        let id2 = NotificationId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_from_str_trims_and_rejects_empty() {
        let id: UserId = "  u-42 ".parse().expect("should parse");
        assert_eq!(id.as_str(), "u-42");
        assert!("   ".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = NotificationId::new("65f1c0a9e4b0");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"65f1c0a9e4b0\"");
    }
}
