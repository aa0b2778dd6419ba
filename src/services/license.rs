//! The license-validity gate.
//!
//! Deliberately free of token or role context so any collaborator that only
//! needs "is this organization entitled right now, and if not, why" can call
//! it directly. The periodic external license poll does exactly that.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Organization;

/// Why an organization is not currently entitled. The two causes stay
/// distinguishable all the way into the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseReason {
    OrganizationInactive,
    LicenseExpired,
}

impl LicenseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseReason::OrganizationInactive => "organization_inactive",
            LicenseReason::LicenseExpired => "license_expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseStatus {
    pub valid: bool,
    pub reason: Option<LicenseReason>,
}

/// Evaluate entitlement at the current instant.
pub fn evaluate(organization: &Organization) -> LicenseStatus {
    evaluate_at(organization, Utc::now())
}

/// Valid iff the organization is active and `now` is strictly before the
/// expiry instant.
pub fn evaluate_at(organization: &Organization, now: DateTime<Utc>) -> LicenseStatus {
    if !organization.is_active {
        return LicenseStatus {
            valid: false,
            reason: Some(LicenseReason::OrganizationInactive),
        };
    }

    if now >= organization.license_expires_at {
        return LicenseStatus {
            valid: false,
            reason: Some(LicenseReason::LicenseExpired),
        };
    }

    LicenseStatus {
        valid: true,
        reason: None,
    }
}

/// Verdict returned to external license polling.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl LicenseCheck {
    /// Verdict for an organization id that resolved to nothing.
    pub fn not_found() -> Self {
        Self {
            valid: false,
            reason: Some("organization_not_found"),
            license_type: None,
            expires_at: None,
            features: None,
        }
    }
}

pub fn check(organization: &Organization) -> LicenseCheck {
    let status = evaluate(organization);
    match status.reason {
        Some(reason) => LicenseCheck {
            valid: false,
            reason: Some(reason.as_str()),
            license_type: None,
            // The expiry instant is only informative when it is the cause.
            expires_at: (reason == LicenseReason::LicenseExpired)
                .then_some(organization.license_expires_at),
            features: None,
        },
        None => LicenseCheck {
            valid: true,
            reason: None,
            license_type: Some(organization.license_type.as_str()),
            expires_at: Some(organization.license_expires_at),
            features: Some(organization.features_enabled.clone()),
        },
    }
}

/// Fuller entitlement summary for an organization, including seat usage.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseReport {
    pub organization_id: Uuid,
    pub organization_name: String,
    pub license_type: &'static str,
    pub is_valid: bool,
    pub expires_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub features_enabled: Vec<String>,
    pub max_users: u32,
    pub current_users: u32,
    /// More active principals than the license allows. A warning, never an
    /// authentication failure.
    pub over_user_limit: bool,
}

pub fn report(organization: &Organization, current_users: u32, now: DateTime<Utc>) -> LicenseReport {
    let days_remaining = (organization.license_expires_at - now).num_days().max(0);

    LicenseReport {
        organization_id: organization.id,
        organization_name: organization.name.clone(),
        license_type: organization.license_type.as_str(),
        is_valid: evaluate_at(organization, now).valid,
        expires_at: organization.license_expires_at,
        days_remaining,
        features_enabled: organization.features_enabled.clone(),
        max_users: organization.max_users,
        current_users,
        over_user_limit: current_users > organization.max_users,
    }
}
