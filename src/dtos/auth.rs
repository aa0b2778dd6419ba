use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub user_id: Uuid,
    pub organization_id: Uuid,
}

/// Identity portion of a successful authentication response.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub permissions: Vec<String>,
}

/// Entitlement snapshot returned alongside every token pair.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseSnapshot {
    pub license_type: String,
    pub expires_at: DateTime<Utc>,
    pub features: Vec<String>,
    pub is_valid: bool,
}

/// The issued credential pair plus who it was issued to and what their
/// organization is entitled to.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
    pub license: LicenseSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub license_status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub organization_id: Uuid,
    pub is_active: bool,
    pub permissions: Vec<String>,
}
