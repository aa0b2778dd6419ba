use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::User;

use super::error::{ServiceError, TokenError};
use super::token_store::TokenStore;

/// Discriminates the two credential kinds inside the signed payload so one
/// can never be presented where the other is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried by short-lived access tokens. Self-contained: verification
/// needs nothing but the signing secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Principal id.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub org_id: String,
    pub permissions: Vec<String>,
    pub kind: TokenKind,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Absolute expiry (Unix timestamp).
    pub exp: i64,
}

/// Claims carried by long-lived refresh tokens. Deliberately minimal; the
/// refresh flow re-resolves everything else from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the credential pair and owns the revocation-register
/// interaction for refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
    store: Arc<dyn TokenStore>,
}

fn refresh_key(user_id: Uuid) -> String {
    format!("refresh_token:{}", user_id)
}

impl TokenService {
    pub fn new(config: &JwtConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            store,
        }
    }

    /// Mint an access token for a principal with its resolved capability
    /// set. Pure: no store interaction.
    pub fn issue_access(
        &self,
        user: &User,
        permissions: Vec<String>,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            org_id: user.organization_id.to_string(),
            permissions,
            kind: TokenKind::Access,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    /// Mint a refresh token and atomically record it as the principal's one
    /// current token, superseding any prior value.
    pub async fn issue_refresh(&self, user_id: Uuid) -> Result<String, ServiceError> {
        let now = Utc::now();
        let lifetime = Duration::days(self.refresh_token_expiry_days);

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            kind: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode refresh token: {}", e)))?;

        // Single SET, never read-then-write: the store's per-key atomicity
        // makes concurrent issuance last-writer-wins.
        self.store
            .set(&refresh_key(user_id), &token, lifetime.num_seconds())
            .await
            .map_err(ServiceError::Storage)?;

        Ok(token)
    }

    /// Verify an access token. Stateless.
    pub fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        self.decode(token, TokenKind::Access)
    }

    /// Verify a refresh token. Beyond the signature and expiry checks this
    /// requires the presented token to exactly match the store's current
    /// value for the principal, which covers both logout and rotation.
    pub async fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, ServiceError> {
        let claims: RefreshTokenClaims = self.decode(token, TokenKind::Refresh)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        let stored = self
            .store
            .get(&refresh_key(user_id))
            .await
            .map_err(ServiceError::Storage)?;

        match stored {
            Some(current) if bool::from(current.as_bytes().ct_eq(token.as_bytes())) => Ok(claims),
            _ => Err(TokenError::Revoked.into()),
        }
    }

    /// Drop the principal's current refresh token. Idempotent; revoking a
    /// principal with no token is a no-op.
    pub async fn revoke(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.store
            .delete(&refresh_key(user_id))
            .await
            .map_err(ServiceError::Storage)
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    pub fn refresh_token_expiry_days(&self) -> i64 {
        self.refresh_token_expiry_days
    }

    fn decode<T: DeserializeOwned>(&self, token: &str, expected: TokenKind) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is an exact boundary, no leeway.
        validation.leeway = 0;

        let data =
            jsonwebtoken::decode::<serde_json::Value>(token, &self.decoding_key, &validation)
                .map_err(|e| match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                })?;

        match data.claims.get("kind").and_then(|v| v.as_str()) {
            Some(kind) if kind == expected.as_str() => {}
            Some(_) => return Err(TokenError::WrongKind),
            None => return Err(TokenError::Malformed),
        }

        serde_json::from_value(data.claims).map_err(|_| TokenError::Malformed)
    }
}
