//! Lookup/update interface over the relational store.
//!
//! The engine never owns principal or organization storage; it reads and
//! requests updates through this trait. Absence is `Ok(None)`, so an `Err`
//! always means the store itself failed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Organization, User};

#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, anyhow::Error>;

    /// Record a successful authentication on the principal row.
    async fn update_login_metadata(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        ip_address: &str,
    ) -> Result<(), anyhow::Error>;

    async fn count_active_users(&self, organization_id: Uuid) -> Result<u32, anyhow::Error>;
}

/// In-memory directory for tests and examples.
#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<HashMap<Uuid, User>>,
    organizations: Mutex<HashMap<Uuid, Organization>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id, user);
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.organizations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(organization.id, organization);
    }

    pub fn get_user(&self, id: Uuid) -> Option<User> {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, anyhow::Error> {
        Ok(lock(&self.organizations)?.get(&id).cloned())
    }

    async fn update_login_metadata(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        ip_address: &str,
    ) -> Result<(), anyhow::Error> {
        let mut users = lock(&self.users)?;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("No such user: {}", id))?;
        user.last_login = Some(at);
        user.last_ip = Some(ip_address.to_string());
        user.updated_at = at;
        Ok(())
    }

    async fn count_active_users(&self, organization_id: Uuid) -> Result<u32, anyhow::Error> {
        let users = lock(&self.users)?;
        Ok(users
            .values()
            .filter(|u| u.organization_id == organization_id && u.is_active)
            .count() as u32)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, anyhow::Error> {
    mutex
        .lock()
        .map_err(|e| anyhow::anyhow!("Memory directory mutex poisoned: {}", e))
}
