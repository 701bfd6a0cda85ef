// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::password::{hash_password, verify_password_hash};
use super::store::IamStore;
use super::types::{IamData, IamError, Principal, User};
use crate::roles::{normalize_role_name, seed_table, Permission, Role, ADMIN_ROLE};
use std::sync::{Arc, RwLock};

/// Role and account service. State lives behind an `RwLock` and every
/// mutation persists through the store before the write lock is released,
/// so concurrent requests observe each other's committed changes and
/// nothing else.
#[derive(Clone)]
pub struct IamService {
    data: Arc<RwLock<IamData>>,
    store: Arc<dyn IamStore>,
    admin_username: String,
}

impl IamService {
    pub fn new(store: Arc<dyn IamStore>, admin_username: impl Into<String>) -> Result<Self, IamError> {
        let data = store.load()?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            store,
            admin_username: admin_username.into(),
        })
    }

    fn with_read<T>(&self, f: impl FnOnce(&IamData) -> T) -> Result<T, IamError> {
        match self.data.read() {
            Ok(guard) => Ok(f(&guard)),
            Err(_) => {
                log::error!("IAM lock poisoned on read; reloading from store");
                let fresh = self.store.load()?;
                match self.data.write() {
                    Ok(mut guard) => {
                        *guard = fresh;
                        self.data.clear_poison();
                        Ok(f(&guard))
                    }
                    Err(poisoned) => {
                        let mut guard = poisoned.into_inner();
                        *guard = fresh;
                        self.data.clear_poison();
                        Ok(f(&guard))
                    }
                }
            }
        }
    }

    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut IamData) -> Result<T, IamError>,
    ) -> Result<T, IamError> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("IAM lock poisoned on write; reloading from store");
                let mut guard = poisoned.into_inner();
                *guard = self.store.load()?;
                self.data.clear_poison();
                guard
            }
        };
        let result = f(&mut guard)?;
        self.store.save(&guard)?;
        Ok(result)
    }

    /// Idempotent role bootstrap. Each role from the fixed seed table is
    /// fetched or created by name, its permission set reset and re-applied
    /// from the table, and exactly the Guest role ends up flagged default.
    pub fn seed_roles(&self) -> Result<(), IamError> {
        self.with_write(|data| {
            for (name, permissions, default) in seed_table() {
                let role = data
                    .roles
                    .entry(name.to_string())
                    .or_insert_with(|| Role::new(name));
                role.reset_permissions();
                role.add_permission(permissions);
                role.default = default;
            }
            // Roles outside the seed table never hold the default flag.
            for (name, role) in data.roles.iter_mut() {
                if !seed_table().iter().any(|(seed, _, _)| seed == name) {
                    role.default = false;
                }
            }
            log::info!("Seeded {} built-in roles", seed_table().len());
            Ok(())
        })
    }

    /// Create an account. Uniqueness is enforced here at the store layer,
    /// not by caller-side pre-validation; racing creators get
    /// `UsernameTaken`. When no role is supplied, the configured admin
    /// username resolves to the Administrator role and everyone else gets
    /// the role flagged default. If neither exists the role stays unset.
    pub fn create_user(
        &self,
        name: &str,
        username: &str,
        password: Option<&str>,
        role: Option<&str>,
    ) -> Result<User, IamError> {
        let password_hash = password.map(hash_password).transpose()?;
        let admin_username = self.admin_username.clone();
        self.with_write(move |data| {
            if data.users.contains_key(username) {
                return Err(IamError::UsernameTaken(username.to_string()));
            }

            let resolved_role = match role {
                Some(explicit) => {
                    let normalized = normalize_role_name(explicit)
                        .map_err(|err| IamError::RoleNotFound(err.to_string()))?;
                    if !data.roles.contains_key(&normalized) {
                        return Err(IamError::RoleNotFound(normalized));
                    }
                    Some(normalized)
                }
                None => {
                    if username == admin_username && data.roles.contains_key(ADMIN_ROLE) {
                        Some(ADMIN_ROLE.to_string())
                    } else {
                        data.default_role().map(|role| role.name.clone())
                    }
                }
            };

            let mut user = User::new(name, username);
            if let Some(hash) = password_hash {
                user.set_password_hash(hash);
            }
            user.role = resolved_role;

            data.users.insert(username.to_string(), user.clone());
            log::info!("Created user '{}'", username);
            Ok(user)
        })
    }

    pub fn user(&self, username: &str) -> Result<Option<User>, IamError> {
        self.with_read(|data| data.users.get(username).cloned())
    }

    pub fn role(&self, name: &str) -> Result<Option<Role>, IamError> {
        self.with_read(|data| data.roles.get(name).cloned())
    }

    pub fn roles(&self) -> Result<Vec<Role>, IamError> {
        self.with_read(|data| data.roles.values().cloned().collect())
    }

    /// Resolve the acting identity for a username. Unknown usernames map
    /// to `Anonymous` rather than an error.
    pub fn principal_for(&self, username: &str) -> Result<Principal, IamError> {
        self.with_read(|data| match data.users.get(username) {
            Some(user) => {
                let role = user
                    .role
                    .as_ref()
                    .and_then(|name| data.roles.get(name))
                    .cloned();
                Principal::Authenticated {
                    user: user.clone(),
                    role,
                }
            }
            None => Principal::Anonymous,
        })
    }

    pub fn verify_password(&self, username: &str, candidate: &str) -> Result<bool, IamError> {
        let stored = self.with_read(|data| {
            data.users
                .get(username)
                .and_then(|user| user.password_hash().map(str::to_string))
        })?;
        match stored {
            Some(hash) => verify_password_hash(candidate, &hash),
            None => Ok(false),
        }
    }

    /// Check credentials and, on success, return the authenticated
    /// principal. Unknown users and wrong passwords both come back `None`.
    pub fn authenticate(&self, username: &str, candidate: &str) -> Result<Option<Principal>, IamError> {
        if !self.verify_password(username, candidate)? {
            return Ok(None);
        }
        Ok(Some(self.principal_for(username)?))
    }

    pub fn set_password(&self, username: &str, password: &str) -> Result<(), IamError> {
        let hash = hash_password(password)?;
        self.with_write(|data| {
            let user = data
                .users
                .get_mut(username)
                .ok_or_else(|| IamError::UserNotFound(username.to_string()))?;
            user.set_password_hash(hash);
            Ok(())
        })
    }

    pub fn grant_permission(&self, role_name: &str, perm: Permission) -> Result<(), IamError> {
        self.with_write(|data| {
            let role = data
                .roles
                .get_mut(role_name)
                .ok_or_else(|| IamError::RoleNotFound(role_name.to_string()))?;
            role.add_permission(perm);
            Ok(())
        })
    }

    pub fn revoke_permission(&self, role_name: &str, perm: Permission) -> Result<(), IamError> {
        self.with_write(|data| {
            let role = data
                .roles
                .get_mut(role_name)
                .ok_or_else(|| IamError::RoleNotFound(role_name.to_string()))?;
            role.remove_permission(perm);
            Ok(())
        })
    }

    pub fn reset_permissions(&self, role_name: &str) -> Result<(), IamError> {
        self.with_write(|data| {
            let role = data
                .roles
                .get_mut(role_name)
                .ok_or_else(|| IamError::RoleNotFound(role_name.to_string()))?;
            role.reset_permissions();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::store::MemoryIamStore;
    use crate::roles::DEFAULT_ROLE;

    fn service() -> IamService {
        IamService::new(Arc::new(MemoryIamStore::default()), "admin").expect("service")
    }

    #[test]
    fn seeding_twice_is_idempotent() {
        let service = service();
        service.seed_roles().expect("seed");
        service.seed_roles().expect("seed again");

        let roles = service.roles().expect("roles");
        assert_eq!(roles.len(), 2);
        let guest = service.role(DEFAULT_ROLE).expect("lookup").expect("guest");
        assert!(guest.default);
        assert!(guest.has_permission(Permission::WRITE));
        assert!(!guest.has_permission(Permission::ADMIN));
        let admin = service.role(ADMIN_ROLE).expect("lookup").expect("admin");
        assert!(!admin.default);
        assert!(admin.has_permission(Permission::WRITE | Permission::ADMIN));
    }

    #[test]
    fn seeding_restores_tampered_permissions() {
        let service = service();
        service.seed_roles().expect("seed");
        service
            .grant_permission(DEFAULT_ROLE, Permission::ADMIN)
            .expect("grant");
        service.seed_roles().expect("reseed");
        let guest = service.role(DEFAULT_ROLE).expect("lookup").expect("guest");
        assert!(!guest.has_permission(Permission::ADMIN));
    }

    #[test]
    fn unknown_username_gets_default_role() {
        let service = service();
        service.seed_roles().expect("seed");
        let user = service
            .create_user("Test Guest", "someone", Some("password"), None)
            .expect("create");
        assert_eq!(user.role.as_deref(), Some(DEFAULT_ROLE));
    }

    #[test]
    fn admin_username_gets_administrator_role() {
        let service = service();
        service.seed_roles().expect("seed");
        let user = service
            .create_user("The Admin", "admin", Some("password"), None)
            .expect("create");
        assert_eq!(user.role.as_deref(), Some(ADMIN_ROLE));
    }

    #[test]
    fn role_stays_unset_without_seeded_roles() {
        let service = service();
        let user = service
            .create_user("Early Bird", "early", Some("password"), None)
            .expect("create");
        assert!(user.role.is_none());

        let principal = service.principal_for("early").expect("principal");
        assert!(!principal.can(Permission::WRITE));
        assert!(!principal.is_admin());
    }

    #[test]
    fn duplicate_username_is_an_integrity_error() {
        let service = service();
        service.seed_roles().expect("seed");
        service
            .create_user("Test User", "test_user", Some("password"), None)
            .expect("create");
        let err = service
            .create_user("Test User 2", "test_user", Some("password"), None)
            .expect_err("duplicate");
        assert!(matches!(err, IamError::UsernameTaken(_)));
    }

    #[test]
    fn explicit_unknown_role_is_rejected() {
        let service = service();
        service.seed_roles().expect("seed");
        let err = service
            .create_user("Test User", "test_user", None, Some("Nonexistent"))
            .expect_err("unknown role");
        assert!(matches!(err, IamError::RoleNotFound(_)));
    }

    #[test]
    fn guest_can_write_but_is_not_admin() {
        let service = service();
        service.seed_roles().expect("seed");
        service
            .create_user("Test Guest", "guest", Some("password"), None)
            .expect("create");
        let principal = service.principal_for("guest").expect("principal");
        assert!(principal.can(Permission::WRITE));
        assert!(!principal.can(Permission::ADMIN));
        assert!(!principal.is_admin());
    }

    #[test]
    fn anonymous_has_no_permissions() {
        let service = service();
        service.seed_roles().expect("seed");
        let principal = service.principal_for("nobody").expect("principal");
        assert!(matches!(principal, Principal::Anonymous));
        assert!(!principal.can(Permission::WRITE));
        assert!(!principal.is_admin());
    }

    #[test]
    fn authenticate_checks_credentials() {
        let service = service();
        service.seed_roles().expect("seed");
        service
            .create_user("Test User", "test_user", Some("password"), None)
            .expect("create");

        assert!(service
            .authenticate("test_user", "password")
            .expect("auth")
            .is_some());
        assert!(service
            .authenticate("test_user", "wordpass")
            .expect("auth")
            .is_none());
        assert!(service
            .authenticate("missing", "password")
            .expect("auth")
            .is_none());
    }

    #[test]
    fn passwordless_user_never_verifies() {
        let service = service();
        service.seed_roles().expect("seed");
        service
            .create_user("No Password", "nopass", None, None)
            .expect("create");
        assert!(!service.verify_password("nopass", "").expect("verify"));
    }
}
