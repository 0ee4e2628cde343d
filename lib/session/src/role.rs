//! Role model for the tracking service.
//!
//! Every account carries exactly one role, assigned by an administrator.
//! Roles gate navigation targets on the client and are enforced again by
//! the backend on every request, so a client-side check is a convenience,
//! never the security boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role carried by a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user administration.
    Admin,
    /// Access to assigned employees and their reports.
    Manager,
    /// Access to the employee's own work logs.
    Employee,
}

impl Role {
    /// Returns true for the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for the manager role.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }

    /// Returns true for the employee role.
    #[must_use]
    pub fn is_employee(&self) -> bool {
        matches!(self, Self::Employee)
    }

    /// Returns the wire representation used by the backend.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing a role from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown role '{}', expected admin, manager, or employee",
            self.value
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(ParseRoleError {
                value: other.to_string(),
            }),
        }
    }
}
