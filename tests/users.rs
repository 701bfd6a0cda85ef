// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

mod common;

use common::TestHarness;
use quillpress::iam::IamError;
use quillpress::roles::{Permission, ADMIN_ROLE, DEFAULT_ROLE};

#[test]
fn create_user_persists_account() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "test_user", Some("password"), None)
        .expect("create");
    let user = harness
        .iam
        .user("test_user")
        .expect("lookup")
        .expect("user exists");
    assert_eq!(user.name, "Test User");
}

#[test]
fn username_must_be_unique() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "test_user", Some("password"), None)
        .expect("create");
    let err = harness
        .iam
        .create_user("Test User 2", "test_user", Some("password"), None)
        .expect_err("duplicate username");
    assert!(matches!(err, IamError::UsernameTaken(_)));
}

#[test]
fn seeding_again_keeps_exactly_one_guest_and_one_admin() {
    let harness = TestHarness::new();
    // bootstrap already seeded once
    harness.iam.seed_roles().expect("reseed");

    let roles = harness.iam.roles().expect("roles");
    assert_eq!(roles.len(), 2);
    let guest = harness
        .iam
        .role(DEFAULT_ROLE)
        .expect("lookup")
        .expect("guest");
    assert!(guest.default);
    let admin = harness
        .iam
        .role(ADMIN_ROLE)
        .expect("lookup")
        .expect("admin");
    assert!(!admin.default);
    assert!(admin.has_permission(Permission::ADMIN));
}

#[test]
fn default_user_role_is_guest() {
    let harness = TestHarness::new();
    let user = harness
        .iam
        .create_user("Test Guest", "someone", Some("password"), None)
        .expect("create");
    assert_eq!(user.role.as_deref(), Some(DEFAULT_ROLE));
}

#[test]
fn configured_admin_username_gets_administrator() {
    let harness = TestHarness::new();
    let admin_username = harness.config.admin_username.clone();
    let user = harness
        .iam
        .create_user("The Admin", &admin_username, Some("password"), None)
        .expect("create");
    assert_eq!(user.role.as_deref(), Some(ADMIN_ROLE));

    let principal = harness.iam.principal_for(&admin_username).expect("principal");
    assert!(principal.is_admin());
    assert!(principal.can(Permission::WRITE));
}

#[test]
fn guest_can_write_but_is_not_admin() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test Guest", "guest", Some("password"), None)
        .expect("create");
    let principal = harness.iam.principal_for("guest").expect("principal");
    assert!(principal.can(Permission::WRITE));
    assert!(!principal.can(Permission::ADMIN));
    assert!(!principal.is_admin());
}

#[test]
fn anonymous_principal_has_no_permissions() {
    let harness = TestHarness::new();
    let principal = harness.iam.principal_for("nobody").expect("principal");
    assert!(!principal.can(Permission::WRITE));
    assert!(!principal.is_admin());
    assert!(principal.username().is_none());
}

#[test]
fn password_is_stored_hashed() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "test_user", Some("password"), None)
        .expect("create");
    let user = harness
        .iam
        .user("test_user")
        .expect("lookup")
        .expect("user");
    let hash = user.password_hash().expect("hash stored");
    assert_ne!(hash, "password");
}

#[test]
fn password_verification_round_trips() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "test_user", Some("password"), None)
        .expect("create");
    assert!(harness
        .iam
        .verify_password("test_user", "password")
        .expect("verify"));
    assert!(!harness
        .iam
        .verify_password("test_user", "wordpass")
        .expect("verify"));
}

#[test]
fn identical_passwords_produce_different_hashes() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "user1", Some("password"), None)
        .expect("create");
    harness
        .iam
        .create_user("Test User", "user2", Some("password"), None)
        .expect("create");
    let first = harness.iam.user("user1").expect("lookup").expect("user");
    let second = harness.iam.user("user2").expect("lookup").expect("user");
    assert_ne!(first.password_hash(), second.password_hash());
}

#[test]
fn permission_changes_survive_a_reload() {
    let harness = TestHarness::new();
    harness
        .iam
        .grant_permission(DEFAULT_ROLE, Permission::ADMIN)
        .expect("grant");

    // A second bootstrap over the same data dir re-reads the store and
    // re-seeds, restoring the built-in permission sets.
    let (iam, _blog) = quillpress::bootstrap::bootstrap(&harness.config).expect("bootstrap");
    let guest = iam.role(DEFAULT_ROLE).expect("lookup").expect("guest");
    assert!(!guest.has_permission(Permission::ADMIN));
}

#[test]
fn authenticate_returns_principal_on_success() {
    let harness = TestHarness::new();
    harness
        .iam
        .create_user("Test User", "test_user", Some("password"), None)
        .expect("create");

    let principal = harness
        .iam
        .authenticate("test_user", "password")
        .expect("auth")
        .expect("authenticated");
    assert_eq!(principal.username(), Some("test_user"));
    assert!(harness
        .iam
        .authenticate("test_user", "wrong")
        .expect("auth")
        .is_none());
}
