//! Fixed role-to-capability resolution.
//!
//! The table is closed-world and default-deny: it is built once at first
//! use, never mutated, and anything it does not know about resolves to the
//! empty set rather than an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::Role;

/// Administrator capabilities cover tenant and user management only. They
/// are disjoint from every product module on purpose: holding the admin
/// role grants no product access at all.
const ADMIN_CAPABILITIES: &[&str] = &[
    "manage_users",
    "manage_organization",
    "view_license",
    "view_audit",
];

const DEVELOPER_CAPABILITIES: &[&str] =
    &["dashboard", "validator", "reconciliator", "config", "migrator"];

const TESTER_CAPABILITIES: &[&str] = &["dashboard", "validator", "reconciliator"];

const OPS_CAPABILITIES: &[&str] = &["dashboard", "validator"];

static ROLE_CAPABILITIES: Lazy<HashMap<Role, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (Role::Admin, ADMIN_CAPABILITIES),
        (Role::Developer, DEVELOPER_CAPABILITIES),
        (Role::Tester, TESTER_CAPABILITIES),
        (Role::Ops, OPS_CAPABILITIES),
    ])
});

/// Capability set for a role.
pub fn capabilities_for(role: Role) -> &'static [&'static str] {
    ROLE_CAPABILITIES.get(&role).copied().unwrap_or(&[])
}

/// Capability set for a role name, e.g. one recovered from token claims.
/// Unknown names resolve to the empty set.
pub fn capabilities_for_name(role: &str) -> &'static [&'static str] {
    Role::parse(role).map(capabilities_for).unwrap_or(&[])
}

pub fn has_capability(role: Role, capability: &str) -> bool {
    capabilities_for(role).contains(&capability)
}

/// Owned capability list in the form tokens and responses carry.
pub fn capability_list(role: Role) -> Vec<String> {
    capabilities_for(role)
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_subset(narrow: &[&str], broad: &[&str]) -> bool {
        narrow.iter().all(|c| broad.contains(c))
    }

    #[test]
    fn product_roles_are_strictly_nested() {
        let ops = capabilities_for(Role::Ops);
        let tester = capabilities_for(Role::Tester);
        let developer = capabilities_for(Role::Developer);

        assert!(is_subset(ops, tester));
        assert!(is_subset(tester, developer));
        assert!(ops.len() < tester.len());
        assert!(tester.len() < developer.len());
    }

    #[test]
    fn admin_is_disjoint_from_product_modules() {
        let admin = capabilities_for(Role::Admin);
        for role in [Role::Developer, Role::Tester, Role::Ops] {
            for capability in capabilities_for(role) {
                assert!(
                    !admin.contains(capability),
                    "admin unexpectedly grants {}",
                    capability
                );
            }
        }
        assert!(!admin.is_empty());
    }

    #[test]
    fn unknown_role_names_resolve_to_nothing() {
        assert!(capabilities_for_name("user").is_empty());
        assert!(capabilities_for_name("viewer").is_empty());
        assert!(capabilities_for_name("").is_empty());
        assert_eq!(
            capabilities_for_name("developer"),
            capabilities_for(Role::Developer)
        );
    }

    #[test]
    fn capability_membership() {
        assert!(has_capability(Role::Ops, "dashboard"));
        assert!(!has_capability(Role::Ops, "migrator"));
        assert!(has_capability(Role::Admin, "manage_users"));
        assert!(!has_capability(Role::Admin, "dashboard"));
    }
}
