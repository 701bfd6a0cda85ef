// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

pub const ADMIN_ROLE: &str = "Administrator";
pub const DEFAULT_ROLE: &str = "Guest";
pub const MAX_ROLE_CHARS: usize = 64;

bitflags! {
    /// Capability flags. Every flag is a distinct power of two so that
    /// combinations are plain bitwise unions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Permission: u32 {
        const WRITE = 1;
        const ADMIN = 2;
    }
}

/// A named, persisted bundle of permissions. At most one role carries the
/// default flag; user creation falls back to that role when none is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub permissions: Permission,
    #[serde(default)]
    pub default: bool,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Permission::empty(),
            default: false,
        }
    }

    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permissions.contains(perm)
    }

    // Bitwise OR rather than arithmetic add: adding a permission the role
    // already holds must leave the mask unchanged.
    pub fn add_permission(&mut self, perm: Permission) {
        self.permissions |= perm;
    }

    pub fn remove_permission(&mut self, perm: Permission) {
        self.permissions &= !perm;
    }

    pub fn reset_permissions(&mut self) {
        self.permissions = Permission::empty();
    }
}

/// The fixed bootstrap table consumed by role seeding. The default role is
/// exactly the Guest role.
pub fn seed_table() -> Vec<(&'static str, Permission, bool)> {
    vec![
        (DEFAULT_ROLE, Permission::WRITE, true),
        (ADMIN_ROLE, Permission::WRITE | Permission::ADMIN, false),
    ]
}

#[derive(Debug)]
pub struct RoleValidationError {
    message: String,
}

impl RoleValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RoleValidationError {}

pub fn normalize_role_name(name: &str) -> Result<String, RoleValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoleValidationError::new("Role name is required"));
    }
    if trimmed.chars().count() > MAX_ROLE_CHARS {
        return Err(RoleValidationError::new(format!(
            "Role name must be at most {} characters",
            MAX_ROLE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_permission_is_reported() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::WRITE);
        assert!(role.has_permission(Permission::WRITE));
        assert!(!role.has_permission(Permission::ADMIN));
    }

    #[test]
    fn removed_permission_is_gone() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::WRITE);
        role.add_permission(Permission::ADMIN);
        role.remove_permission(Permission::WRITE);
        assert!(!role.has_permission(Permission::WRITE));
        assert!(role.has_permission(Permission::ADMIN));
    }

    #[test]
    fn double_add_does_not_corrupt_mask() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::WRITE);
        role.add_permission(Permission::WRITE);
        assert_eq!(role.permissions, Permission::WRITE);
        role.remove_permission(Permission::WRITE);
        assert!(role.permissions.is_empty());
    }

    #[test]
    fn removing_absent_permission_is_noop() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::ADMIN);
        role.remove_permission(Permission::WRITE);
        assert_eq!(role.permissions, Permission::ADMIN);
    }

    #[test]
    fn reset_clears_every_permission() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::WRITE | Permission::ADMIN);
        role.reset_permissions();
        assert!(!role.has_permission(Permission::WRITE));
        assert!(!role.has_permission(Permission::ADMIN));
    }

    #[test]
    fn combined_mask_requires_all_bits() {
        let mut role = Role::new("Tester");
        role.add_permission(Permission::WRITE);
        assert!(!role.has_permission(Permission::WRITE | Permission::ADMIN));
    }

    #[test]
    fn seed_table_marks_guest_default() {
        let table = seed_table();
        let defaults: Vec<_> = table.iter().filter(|(_, _, default)| *default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].0, DEFAULT_ROLE);
    }

    #[test]
    fn normalize_rejects_empty_name() {
        assert!(normalize_role_name("   ").is_err());
        assert_eq!(normalize_role_name(" Guest ").unwrap(), "Guest");
    }
}
