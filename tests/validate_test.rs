mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use auth_gateway::dtos::auth::{LoginRequest, ValidateRequest};
use auth_gateway::models::Role;
use auth_gateway::services::ClientContext;

use common::{active_user, build_harness, trial_org, PASSWORD};

#[tokio::test]
async fn validate_reports_active_license_with_capabilities() {
    let harness = build_harness();
    let organization = trial_org();
    let user = active_user(&organization, Role::Developer);
    harness.directory.insert_organization(organization.clone());
    harness.directory.insert_user(user.clone());

    let response = harness
        .auth
        .validate(ValidateRequest {
            user_id: user.id,
            organization_id: organization.id,
        })
        .await
        .expect("validate should not error");

    assert!(response.valid);
    assert_eq!(response.license_status, "active");
    assert_eq!(response.expires_at, Some(organization.license_expires_at));
    assert_eq!(
        response.permissions,
        vec!["dashboard", "validator", "reconciliator", "config", "migrator"]
    );
}

#[tokio::test]
async fn validate_after_expiry_reports_expired_with_no_capabilities() {
    let harness = build_harness();
    let mut organization = trial_org();
    organization.license_expires_at = Utc::now() - Duration::seconds(1);
    let user = active_user(&organization, Role::Developer);
    harness.directory.insert_organization(organization.clone());
    harness.directory.insert_user(user.clone());

    let response = harness
        .auth
        .validate(ValidateRequest {
            user_id: user.id,
            organization_id: organization.id,
        })
        .await
        .expect("validate should not error");

    assert!(!response.valid);
    assert_eq!(response.license_status, "expired");
    assert_eq!(response.expires_at, Some(organization.license_expires_at));
    assert!(response.permissions.is_empty());
}

#[tokio::test]
async fn validate_distinguishes_inactive_user_and_missing_org() {
    let harness = build_harness();
    let organization = trial_org();
    let mut inactive = active_user(&organization, Role::Tester);
    inactive.is_active = false;
    harness.directory.insert_organization(organization.clone());
    harness.directory.insert_user(inactive.clone());

    let response = harness
        .auth
        .validate(ValidateRequest {
            user_id: inactive.id,
            organization_id: organization.id,
        })
        .await
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.license_status, "user_inactive");
    assert_eq!(response.expires_at, None);

    let active = active_user(&organization, Role::Ops);
    harness.directory.insert_user(active.clone());

    let response = harness
        .auth
        .validate(ValidateRequest {
            user_id: active.id,
            organization_id: Uuid::new_v4(),
        })
        .await
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.license_status, "organization_not_found");
}

#[tokio::test]
async fn current_user_resolves_the_token_principal() {
    let harness = build_harness();
    let organization = trial_org();
    let user = active_user(&organization, Role::Tester);
    harness.directory.insert_organization(organization);
    harness.directory.insert_user(user.clone());

    let pair = harness
        .auth
        .login(
            LoginRequest {
                email: user.email.clone(),
                password: PASSWORD.to_string(),
            },
            &ClientContext::default(),
        )
        .await
        .expect("login should succeed");

    let profile = harness
        .auth
        .current_user(&pair.access_token)
        .await
        .expect("current_user should resolve");

    assert_eq!(profile.id, user.id);
    assert_eq!(profile.email, user.email);
    assert_eq!(profile.role, "tester");
    assert_eq!(
        profile.permissions,
        vec!["dashboard", "validator", "reconciliator"]
    );
}
