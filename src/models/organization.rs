//! Organization (tenant) entity and its license class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Trial,
    Standard,
    Enterprise,
}

impl LicenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::Trial => "trial",
            LicenseType::Standard => "standard",
            LicenseType::Enterprise => "enterprise",
        }
    }
}

/// A tenant. Entitlement is governed by the activation flag and the license
/// expiry instant; origin restrictions by `allowed_ips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    pub license_type: LicenseType,
    pub license_expires_at: DateTime<Utc>,
    /// Cap on concurrently active principals, enforced at account creation.
    pub max_users: u32,
    /// Opaque feature tags, e.g. `validator`, `migrator`.
    pub features_enabled: Vec<String>,
    /// Literal addresses and CIDR ranges. Empty means unrestricted.
    pub allowed_ips: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        name: String,
        license_type: LicenseType,
        license_expires_at: DateTime<Utc>,
        max_users: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            license_type,
            license_expires_at,
            max_users,
            features_enabled: Vec::new(),
            allowed_ips: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features_enabled.iter().any(|f| f == feature)
    }
}
