// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use crate::roles::{Permission, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A persisted account. The raw password is write-only: construction and
/// `set_password_hash` store only the Argon2 hash, and no accessor for a
/// plaintext password exists anywhere on this type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub name: String,
    pub username: String,
    password_hash: Option<String>,
    /// Name of the assigned role. None only when no role could be resolved
    /// at creation time (roles not seeded yet).
    pub role: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password_hash: None,
            role: None,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = Some(hash);
    }
}

/// The acting identity of a request. Unauthenticated requests carry
/// `Anonymous`, which holds no permissions and is never an admin.
#[derive(Debug, Clone)]
pub enum Principal {
    Authenticated { user: User, role: Option<Role> },
    Anonymous,
}

impl Principal {
    /// Permission checks never fail: missing roles and anonymous callers
    /// simply report false.
    pub fn can(&self, perm: Permission) -> bool {
        match self {
            Principal::Authenticated {
                role: Some(role), ..
            } => role.has_permission(perm),
            _ => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.can(Permission::ADMIN)
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Principal::Authenticated { user, .. } => Some(&user.username),
            Principal::Anonymous => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Principal::Authenticated { user, .. } => Some(&user.name),
            Principal::Anonymous => None,
        }
    }
}

/// Everything the IAM store persists: roles and users, both keyed by their
/// unique names. The keyed maps are the uniqueness constraint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IamData {
    #[serde(default)]
    pub roles: BTreeMap<String, Role>,
    #[serde(default)]
    pub users: BTreeMap<String, User>,
}

impl IamData {
    pub fn default_role(&self) -> Option<&Role> {
        self.roles.values().find(|role| role.default)
    }
}

#[derive(Debug)]
pub enum IamError {
    UserNotFound(String),
    RoleNotFound(String),
    UsernameTaken(String),
    FileError(String),
    ParseError(String),
    HashError(String),
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IamError::UserNotFound(username) => write!(f, "User not found: {}", username),
            IamError::RoleNotFound(name) => write!(f, "Role not found: {}", name),
            IamError::UsernameTaken(username) => {
                write!(f, "Username already taken: {}", username)
            }
            IamError::FileError(msg) => write!(f, "File error: {}", msg),
            IamError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            IamError::HashError(msg) => write!(f, "Password hash error: {}", msg),
        }
    }
}

impl std::error::Error for IamError {}
