//! Audit trail records for security decisions and administrative mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Organization, User};

/// Everything this gateway considers worth an immutable trail entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    LoginFailed,
    UserCreated,
    UserUpdated,
    UserDeleted,
    OrgCreated,
    OrgUpdated,
    OrgDeleted,
    LicenseExtended,
    LicenseExpired,
    PasswordChanged,
    PermissionChanged,
    ApiKeyCreated,
    ApiKeyRevoked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::UserCreated => "user_created",
            AuditAction::UserUpdated => "user_updated",
            AuditAction::UserDeleted => "user_deleted",
            AuditAction::OrgCreated => "org_created",
            AuditAction::OrgUpdated => "org_updated",
            AuditAction::OrgDeleted => "org_deleted",
            AuditAction::LicenseExtended => "license_extended",
            AuditAction::LicenseExpired => "license_expired",
            AuditAction::PasswordChanged => "password_changed",
            AuditAction::PermissionChanged => "permission_changed",
            AuditAction::ApiKeyCreated => "api_key_created",
            AuditAction::ApiKeyRevoked => "api_key_revoked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failed,
}

/// One immutable audit record. Created once per decision point, never
/// mutated or deleted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub organization_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    pub target_type: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<serde_json::Value>,
    pub outcome: AuditOutcome,
    pub error_message: Option<String>,
}

impl AuditLog {
    pub fn new(action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            user_id: None,
            user_email: None,
            organization_id: None,
            target_id: None,
            target_type: None,
            ip_address: None,
            user_agent: None,
            details: None,
            outcome,
            error_message: None,
        }
    }

    pub fn success(action: AuditAction) -> Self {
        Self::new(action, AuditOutcome::Success)
    }

    pub fn failure(action: AuditAction, error_message: impl Into<String>) -> Self {
        let mut record = Self::new(action, AuditOutcome::Failed);
        record.error_message = Some(error_message.into());
        record
    }

    pub fn for_user(mut self, user: &User) -> Self {
        self.user_id = Some(user.id);
        self.user_email = Some(user.email.clone());
        self
    }

    pub fn for_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn for_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn for_organization(mut self, organization: &Organization) -> Self {
        self.organization_id = Some(organization.id);
        self
    }

    pub fn in_organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn from_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_records_carry_the_message() {
        let record = AuditLog::failure(AuditAction::LoginFailed, "Invalid email or password")
            .for_email("nobody@example.com")
            .from_address("10.0.0.5");

        assert_eq!(record.action, AuditAction::LoginFailed);
        assert_eq!(record.outcome, AuditOutcome::Failed);
        assert_eq!(
            record.error_message.as_deref(),
            Some("Invalid email or password")
        );
        assert_eq!(record.user_email.as_deref(), Some("nobody@example.com"));
        assert_eq!(record.user_id, None);
    }

    #[test]
    fn action_names_are_stable() {
        assert_eq!(AuditAction::LoginFailed.as_str(), "login_failed");
        assert_eq!(AuditAction::ApiKeyRevoked.as_str(), "api_key_revoked");
    }
}
