// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::collections::HashMap;
use std::sync::RwLock;

pub const SESSION_COOKIE: &str = "quillpress_session";
const SESSION_TOKEN_BYTES: usize = 32;
const MAX_SESSIONS: usize = 10000;

/// Server-side login sessions: random URL-safe token -> username. Tokens
/// are issued on successful authentication and revoked on logout.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, username: &str) -> Option<String> {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sessions.len() >= MAX_SESSIONS {
            log::warn!("Session store full; refusing new login session");
            return None;
        }
        sessions.insert(token.clone(), username.to_string());
        Some(token)
    }

    pub fn username_for(&self, token: &str) -> Option<String> {
        let sessions = match self.sessions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.get(token).cloned()
    }

    pub fn revoke(&self, token: &str) {
        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.remove(token);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_resolves_to_username() {
        let store = SessionStore::new();
        let token = store.issue("alice").expect("token");
        assert_eq!(store.username_for(&token).as_deref(), Some("alice"));
    }

    #[test]
    fn revoked_token_no_longer_resolves() {
        let store = SessionStore::new();
        let token = store.issue("alice").expect("token");
        store.revoke(&token);
        assert!(store.username_for(&token).is_none());
    }

    #[test]
    fn unknown_token_resolves_to_nothing() {
        let store = SessionStore::new();
        assert!(store.username_for("made-up").is_none());
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let store = SessionStore::new();
        let first = store.issue("alice").expect("token");
        let second = store.issue("alice").expect("token");
        assert_ne!(first, second);
    }
}
