// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

mod password;
mod service;
mod store;
pub(crate) mod types;

pub use password::{hash_password, verify_password_hash};
pub use service::IamService;
pub use store::{FileIamStore, IamStore};
#[cfg(test)]
pub use store::MemoryIamStore;
pub use types::{IamData, IamError, Principal, User};
