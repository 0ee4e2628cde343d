//! User snapshot fetched from the tracking service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timeclock_core::{EmployeeId, UserId};

use crate::role::Role;

/// Immutable snapshot of the authenticated user.
///
/// Deserialized from the backend at login or verification time and replaced
/// wholesale by a fresh login or profile refresh; never mutated locally.
/// Accounts with the employee role link to the employee record whose work
/// logs they may edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id assigned by the backend.
    id: UserId,
    /// Login name, unique across accounts.
    username: String,
    /// The single role carried by this account.
    role: Role,
    /// Linked employee record, if any.
    employee_id: Option<EmployeeId>,
    /// When the account was created.
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user snapshot.
    ///
    /// Production snapshots are deserialized from backend responses; this
    /// constructor exists for fixtures and embedding.
    #[must_use]
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        role: Role,
        employee_id: Option<EmployeeId>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            role,
            employee_id,
            created_at: Utc::now(),
        }
    }

    /// Returns the account id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the account's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the linked employee record id, if any.
    #[must_use]
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    /// Returns when the account was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
