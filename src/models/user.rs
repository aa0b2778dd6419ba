//! Principal accounts and the closed role set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles a principal can hold. The set is closed; anything outside it is
/// treated as granting no capabilities at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System administrator. Tenant and user management only, no product
    /// module access.
    Admin,
    /// Full access to all product modules.
    Developer,
    /// Access to validator, dashboard and reconciliator.
    Tester,
    /// Access to dashboard and validator only.
    Ops,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::Tester => "tester",
            Role::Ops => "ops",
        }
    }

    /// Parse a role name, e.g. one recovered from token claims. Returns
    /// `None` for anything outside the closed set.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "admin" => Some(Role::Admin),
            "developer" => Some(Role::Developer),
            "tester" => Some(Role::Tester),
            "ops" => Some(Role::Ops),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A principal belonging to exactly one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub organization_id: Uuid,
    /// Administrator that created this account, when known.
    pub created_by: Option<Uuid>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_ip: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        password_hash: String,
        full_name: Option<String>,
        role: Role,
        organization_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            role,
            organization_id,
            created_by: None,
            last_login: None,
            last_ip: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in [Role::Admin, Role::Developer, Role::Tester, Role::Ops] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_does_not_parse() {
        assert_eq!(Role::parse("user"), None);
        assert_eq!(Role::parse("viewer"), None);
        assert_eq!(Role::parse(""), None);
    }
}
