//! Console role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles that can sign in to the admin console.
///
/// The role is sent to the realtime endpoint as a tag so the server can
/// scope which alerts a connection receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleRole {
    /// Platform-wide administrator.
    Superadmin,
    /// Read-only compliance and finance auditor.
    Auditor,
    /// Sales staff managing tenant onboarding.
    Sales,
    /// Support staff handling tenant tickets.
    Support,
}

impl ConsoleRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Auditor => "auditor",
            Self::Sales => "sales",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for ConsoleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConsoleRole {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" | "super_admin" => Ok(Self::Superadmin),
            "auditor" => Ok(Self::Auditor),
            "sales" => Ok(Self::Sales),
            "support" => Ok(Self::Support),
            _ => Err(crate::AppError::validation(format!(
                "Invalid console role: '{s}'. Expected one of: superadmin, auditor, sales, support"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "superadmin".parse::<ConsoleRole>().unwrap(),
            ConsoleRole::Superadmin
        );
        assert_eq!(
            "SUPER_ADMIN".parse::<ConsoleRole>().unwrap(),
            ConsoleRole::Superadmin
        );
        assert_eq!("Support".parse::<ConsoleRole>().unwrap(), ConsoleRole::Support);
        assert!("tenant".parse::<ConsoleRole>().is_err());
    }
}
