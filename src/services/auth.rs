use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::config::LicenseConfig;
use crate::dtos::auth::{
    LicenseSnapshot, LoginRequest, RefreshRequest, SessionUser, TokenPair, UserProfile,
    ValidateRequest, ValidateResponse,
};
use crate::models::{AuditAction, AuditLog, Organization, User};
use crate::utils::{verify_password, Password};

use super::audit::AuditRecorder;
use super::directory::Directory;
use super::error::{ServiceError, TokenError};
use super::ip_filter::{self, ClientContext};
use super::jwt::TokenService;
use super::license::{self, LicenseCheck, LicenseReason, LicenseReport};
use super::rbac;
use super::token_store::TokenStore;

/// Composes the credential, license, origin, capability and audit services
/// into the login, refresh, validate and logout flows. The only component
/// with cross-cutting control flow.
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn Directory>,
    tokens: TokenService,
    audit: AuditRecorder,
    store: Arc<dyn TokenStore>,
    license_cache_ttl_minutes: i64,
}

impl AuthService {
    pub fn new(
        directory: Arc<dyn Directory>,
        tokens: TokenService,
        audit: AuditRecorder,
        store: Arc<dyn TokenStore>,
        license: &LicenseConfig,
    ) -> Self {
        Self {
            directory,
            tokens,
            audit,
            store,
            license_cache_ttl_minutes: license.check_interval_minutes,
        }
    }

    /// Authenticate a principal and mint a credential pair.
    ///
    /// Every check short-circuits with its own audit record. Unknown email
    /// and wrong password are deliberately indistinguishable to the caller.
    pub async fn login(
        &self,
        req: LoginRequest,
        client: &ClientContext,
    ) -> Result<TokenPair, ServiceError> {
        req.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let client_ip = ip_filter::resolve_client_ip(client);

        let user = self
            .directory
            .find_user_by_email(&req.email)
            .await
            .map_err(ServiceError::Storage)?;

        let Some(user) = user else {
            self.audit
                .record(
                    AuditLog::failure(AuditAction::LoginFailed, "Invalid email or password")
                        .for_email(&req.email)
                        .from_address(&client_ip)
                        .with_user_agent(client.user_agent.clone())
                        .with_details(json!({
                            "reason": "invalid_credentials",
                            "email": req.email.clone(),
                        })),
                )
                .await;
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(&Password::new(req.password), &user.password_hash) {
            self.audit
                .record(
                    AuditLog::failure(AuditAction::LoginFailed, "Invalid email or password")
                        .for_user(&user)
                        .in_organization(user.organization_id)
                        .from_address(&client_ip)
                        .with_user_agent(client.user_agent.clone())
                        .with_details(json!({
                            "reason": "invalid_credentials",
                            "email": user.email.clone(),
                        })),
                )
                .await;
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active {
            self.audit
                .record(
                    AuditLog::failure(AuditAction::LoginFailed, "User account is disabled")
                        .for_user(&user)
                        .in_organization(user.organization_id)
                        .from_address(&client_ip)
                        .with_user_agent(client.user_agent.clone())
                        .with_details(json!({
                            "reason": "user_inactive",
                            "email": user.email.clone(),
                        })),
                )
                .await;
            return Err(ServiceError::UserInactive);
        }

        let organization = self
            .directory
            .find_organization(user.organization_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::OrganizationNotFound)?;

        let status = license::evaluate(&organization);
        if let Some(reason) = status.reason {
            let (error, message) = match reason {
                LicenseReason::OrganizationInactive => {
                    (ServiceError::OrganizationInactive, "Organization is disabled")
                }
                LicenseReason::LicenseExpired => (
                    ServiceError::LicenseExpired,
                    "Organization license has expired",
                ),
            };
            self.audit
                .record(
                    AuditLog::failure(AuditAction::LoginFailed, message)
                        .for_user(&user)
                        .for_organization(&organization)
                        .from_address(&client_ip)
                        .with_user_agent(client.user_agent.clone())
                        .with_details(json!({
                            "reason": reason.as_str(),
                            "organization": organization.name.clone(),
                        })),
                )
                .await;
            return Err(error);
        }

        if !ip_filter::is_ip_allowed(&client_ip, &organization.allowed_ips) {
            self.audit
                .record(
                    AuditLog::failure(
                        AuditAction::LoginFailed,
                        format!("IP address {} is not whitelisted", client_ip),
                    )
                    .for_user(&user)
                    .for_organization(&organization)
                    .from_address(&client_ip)
                    .with_user_agent(client.user_agent.clone())
                    .with_details(json!({
                        "reason": "ip_not_whitelisted",
                        "ip": client_ip.clone(),
                        "allowed_ips": organization.allowed_ips.clone(),
                    })),
                )
                .await;
            return Err(ServiceError::IpNotWhitelisted { ip: client_ip });
        }

        let now = Utc::now();
        let permissions = rbac::capability_list(user.role);

        let access_token = self
            .tokens
            .issue_access(&user, permissions.clone())
            .map_err(ServiceError::Internal)?;
        let refresh_token = self.tokens.issue_refresh(user.id).await?;

        self.directory
            .update_login_metadata(user.id, now, &client_ip)
            .await
            .map_err(ServiceError::Storage)?;

        self.cache_license_verdict(&organization).await;

        self.audit.record_async(
            AuditLog::success(AuditAction::Login)
                .for_user(&user)
                .for_organization(&organization)
                .from_address(&client_ip)
                .with_user_agent(client.user_agent.clone())
                .with_details(json!({
                    "organization": organization.name.clone(),
                    "role": user.role.as_str(),
                })),
        );

        tracing::info!(user = %user.email, organization = %organization.name, "Login successful");

        Ok(self.token_pair(access_token, refresh_token, &user, &organization, permissions))
    }

    /// Mint a fresh access token from a still-current refresh token.
    ///
    /// The principal is resolved from the verified claims, never from
    /// request input, and the organization gates are re-run. The presented
    /// refresh token is echoed back rather than rotated.
    pub async fn refresh(&self, req: RefreshRequest) -> Result<TokenPair, ServiceError> {
        let claims = self.tokens.verify_refresh(&req.refresh_token).await?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;

        let user = self
            .directory
            .find_user(user_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::UserNotFound)?;

        if !user.is_active {
            return Err(ServiceError::UserInactive);
        }

        let organization = self
            .directory
            .find_organization(user.organization_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::OrganizationNotFound)?;

        if let Some(reason) = license::evaluate(&organization).reason {
            return Err(match reason {
                LicenseReason::OrganizationInactive => ServiceError::OrganizationInactive,
                LicenseReason::LicenseExpired => ServiceError::LicenseExpired,
            });
        }

        let permissions = rbac::capability_list(user.role);
        let access_token = self
            .tokens
            .issue_access(&user, permissions.clone())
            .map_err(ServiceError::Internal)?;

        tracing::info!(user = %user.email, "Access token refreshed");

        Ok(self.token_pair(
            access_token,
            req.refresh_token,
            &user,
            &organization,
            permissions,
        ))
    }

    /// Corroborate a principal/organization pair without authenticating.
    /// Capabilities are only reported while the license is valid.
    pub async fn validate(&self, req: ValidateRequest) -> Result<ValidateResponse, ServiceError> {
        let user = self
            .directory
            .find_user(req.user_id)
            .await
            .map_err(ServiceError::Storage)?;

        let Some(user) = user.filter(|u| u.is_active) else {
            return Ok(ValidateResponse {
                valid: false,
                license_status: "user_inactive".to_string(),
                expires_at: None,
                permissions: Vec::new(),
            });
        };

        let organization = self
            .directory
            .find_organization(req.organization_id)
            .await
            .map_err(ServiceError::Storage)?;

        let Some(organization) = organization else {
            return Ok(ValidateResponse {
                valid: false,
                license_status: "organization_not_found".to_string(),
                expires_at: None,
                permissions: Vec::new(),
            });
        };

        let status = license::evaluate(&organization);
        let permissions = if status.valid {
            rbac::capability_list(user.role)
        } else {
            Vec::new()
        };

        Ok(ValidateResponse {
            valid: status.valid,
            license_status: if status.valid { "active" } else { "expired" }.to_string(),
            expires_at: Some(organization.license_expires_at),
            permissions,
        })
    }

    /// Revoke the principal's refresh token. Idempotent: revoking a
    /// principal that holds no token succeeds and revokes nothing.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.tokens.revoke(user_id).await?;

        self.audit
            .record_async(AuditLog::success(AuditAction::Logout).for_user_id(user_id));

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Resolve the principal behind an access token, with freshly resolved
    /// capabilities. Purely corroborative; nothing is minted.
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile, ServiceError> {
        let claims = self.tokens.verify_access(access_token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;

        let user = self
            .directory
            .find_user(user_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::UserNotFound)?;

        if !user.is_active {
            return Err(ServiceError::UserInactive);
        }

        Ok(UserProfile {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.to_string(),
            organization_id: user.organization_id,
            is_active: user.is_active,
            permissions: rbac::capability_list(user.role),
        })
    }

    /// Lightweight entitlement verdict for external license polling.
    pub async fn license_check(
        &self,
        organization_id: Uuid,
    ) -> Result<LicenseCheck, ServiceError> {
        let organization = self
            .directory
            .find_organization(organization_id)
            .await
            .map_err(ServiceError::Storage)?;

        Ok(match organization {
            Some(organization) => license::check(&organization),
            None => LicenseCheck::not_found(),
        })
    }

    /// Entitlement summary including seat usage against `max_users`.
    pub async fn license_report(
        &self,
        organization_id: Uuid,
    ) -> Result<LicenseReport, ServiceError> {
        let organization = self
            .directory
            .find_organization(organization_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::OrganizationNotFound)?;

        let current_users = self
            .directory
            .count_active_users(organization_id)
            .await
            .map_err(ServiceError::Storage)?;

        let report = license::report(&organization, current_users, Utc::now());
        if report.over_user_limit {
            tracing::warn!(
                organization = %organization.name,
                current_users,
                max_users = organization.max_users,
                "Organization exceeds its licensed user count"
            );
        }

        Ok(report)
    }

    /// Cache the (valid) license verdict for pollers that only consult the
    /// fast store. Best effort: a cache miss is always re-resolvable.
    async fn cache_license_verdict(&self, organization: &Organization) {
        let key = format!("license:{}", organization.id);
        let ttl = self.license_cache_ttl_minutes * 60;
        if let Err(e) = self.store.set(&key, "true", ttl).await {
            tracing::warn!(error = %e, organization = %organization.name, "Failed to cache license verdict");
        }
    }

    fn token_pair(
        &self,
        access_token: String,
        refresh_token: String,
        user: &User,
        organization: &Organization,
        permissions: Vec<String>,
    ) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_expiry_seconds(),
            user: SessionUser {
                id: user.id,
                email: user.email.clone(),
                full_name: user.full_name.clone(),
                role: user.role.to_string(),
                organization_id: organization.id,
                organization_name: organization.name.clone(),
                permissions,
            },
            license: LicenseSnapshot {
                license_type: organization.license_type.as_str().to_string(),
                expires_at: organization.license_expires_at,
                features: organization.features_enabled.clone(),
                is_valid: license::evaluate(organization).valid,
            },
        }
    }
}
