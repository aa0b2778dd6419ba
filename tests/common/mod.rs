#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};

use auth_gateway::config::{JwtConfig, LicenseConfig};
use auth_gateway::models::{LicenseType, Organization, Role, User};
use auth_gateway::services::{
    AuditRecorder, AuthService, MemoryAuditSink, MemoryDirectory, MemoryTokenStore, TokenService,
};
use auth_gateway::utils::{hash_password, Password};

pub const PASSWORD: &str = "CorrectHorse9";

pub struct Harness {
    pub auth: AuthService,
    pub tokens: TokenService,
    pub directory: Arc<MemoryDirectory>,
    pub store: Arc<MemoryTokenStore>,
    pub sink: Arc<MemoryAuditSink>,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret_key: "integration-test-secret-key-0123456789".to_string(),
        access_token_expiry_minutes: 480,
        refresh_token_expiry_days: 7,
    }
}

pub fn build_harness() -> Harness {
    let directory = Arc::new(MemoryDirectory::new());
    let store = Arc::new(MemoryTokenStore::new());
    let sink = Arc::new(MemoryAuditSink::new());

    let tokens = TokenService::new(&jwt_config(), store.clone());
    let auth = AuthService::new(
        directory.clone(),
        tokens.clone(),
        AuditRecorder::new(sink.clone()),
        store.clone(),
        &LicenseConfig {
            check_interval_minutes: 30,
        },
    );

    Harness {
        auth,
        tokens,
        directory,
        store,
        sink,
    }
}

/// Trial organization with an empty allow-list, expiring in 30 days.
pub fn trial_org() -> Organization {
    Organization::new(
        "acme".to_string(),
        LicenseType::Trial,
        Utc::now() + Duration::days(30),
        5,
    )
}

pub fn active_user(organization: &Organization, role: Role) -> User {
    let hash = hash_password(&Password::new(PASSWORD)).expect("password hashing failed");
    User::new(
        format!("{}@example.com", role.as_str()),
        hash,
        Some("Test User".to_string()),
        role,
        organization.id,
    )
}
