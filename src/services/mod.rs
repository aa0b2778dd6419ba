//! Services layer: the credential & entitlement engine.

mod audit;
mod auth;
mod directory;
pub mod error;
pub mod ip_filter;
mod jwt;
pub mod license;
pub mod rbac;
mod token_store;

pub use audit::{AuditRecorder, AuditSink, MemoryAuditSink};
pub use auth::AuthService;
pub use directory::{Directory, MemoryDirectory};
pub use error::{ServiceError, TokenError};
pub use ip_filter::ClientContext;
pub use jwt::{AccessTokenClaims, RefreshTokenClaims, TokenKind, TokenService};
pub use license::{LicenseCheck, LicenseReason, LicenseReport, LicenseStatus};
pub use token_store::{MemoryTokenStore, RedisTokenStore, TokenStore};
