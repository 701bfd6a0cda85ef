// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::types::IamError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

fn argon2() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a plaintext password into a PHC string. The salt is freshly
/// generated, so two users with the same password store different hashes.
pub fn hash_password(password: &str) -> Result<String, IamError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| IamError::HashError(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a candidate password against a stored PHC hash. The salt and
/// parameters come from the stored hash itself; plaintext is never compared.
pub fn verify_password_hash(candidate: &str, stored_hash: &str) -> Result<bool, IamError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| IamError::HashError(err.to_string()))?;
    Ok(argon2()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}
