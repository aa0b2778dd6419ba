use thiserror::Error;

/// Outcomes of token verification, kept as a closed set so every caller has
/// to handle all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Wrong token kind")]
    WrongKind,

    #[error("Token has been revoked")]
    Revoked,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unknown email and wrong password produce this same variant so the
    /// caller cannot tell which one it was. The audit trail keeps the
    /// precise reason.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is disabled")]
    UserInactive,

    #[error("User not found")]
    UserNotFound,

    #[error("Organization not found")]
    OrganizationNotFound,

    #[error("Organization is disabled")]
    OrganizationInactive,

    #[error("Organization license has expired")]
    LicenseExpired,

    #[error("IP address {ip} is not whitelisted for this organization")]
    IpNotWhitelisted { ip: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Persistence or fast store unreachable. Distinguishes "the system
    /// could not decide" from "you are not authorized".
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl ServiceError {
    /// Machine-readable reason tag recorded in audit details for
    /// authentication rejections. `None` for infrastructure failures and
    /// token errors, which are not login-failure reasons.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ServiceError::InvalidCredentials => Some("invalid_credentials"),
            ServiceError::UserInactive => Some("user_inactive"),
            ServiceError::OrganizationInactive => Some("organization_inactive"),
            ServiceError::LicenseExpired => Some("license_expired"),
            ServiceError::IpNotWhitelisted { .. } => Some("ip_not_whitelisted"),
            ServiceError::OrganizationNotFound => Some("organization_not_found"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_are_indistinguishable() {
        // Same public message whether the email or the password was wrong.
        assert_eq!(
            ServiceError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn reasons_match_audit_tags() {
        assert_eq!(
            ServiceError::LicenseExpired.reason(),
            Some("license_expired")
        );
        assert_eq!(
            ServiceError::IpNotWhitelisted {
                ip: "10.0.0.1".to_string()
            }
            .reason(),
            Some("ip_not_whitelisted")
        );
        assert_eq!(ServiceError::Token(TokenError::Expired).reason(), None);
    }
}
