// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::types::{IamData, IamError};
use crate::store_util;
use std::path::PathBuf;

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait IamStore: Send + Sync {
    fn load(&self) -> Result<IamData, IamError>;
    fn save(&self, data: &IamData) -> Result<(), IamError>;
}

/// YAML-file-backed store. Saves go through a temp file plus rename so a
/// crash mid-write never leaves a truncated accounts file behind.
pub struct FileIamStore {
    iam_file: PathBuf,
}

impl FileIamStore {
    pub fn new(iam_file: PathBuf) -> Result<Self, IamError> {
        if iam_file.as_os_str().is_empty() {
            return Err(IamError::FileError("IAM file path is empty".to_string()));
        }
        Ok(Self { iam_file })
    }
}

impl IamStore for FileIamStore {
    fn load(&self) -> Result<IamData, IamError> {
        if !self.iam_file.exists() {
            return Ok(IamData::default());
        }
        let content = std::fs::read_to_string(&self.iam_file)
            .map_err(|err| IamError::FileError(format!("Failed to read IAM file: {}", err)))?;
        if content.trim().is_empty() {
            return Ok(IamData::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|err| IamError::ParseError(format!("Failed to parse IAM file: {}", err)))
    }

    fn save(&self, data: &IamData) -> Result<(), IamError> {
        let content = serde_yaml::to_string(data)
            .map_err(|err| IamError::ParseError(format!("Failed to serialize IAM data: {}", err)))?;
        store_util::write_atomic(&self.iam_file, &content, IamError::FileError)
    }
}

#[cfg(test)]
pub struct MemoryIamStore {
    data: Arc<RwLock<IamData>>,
}

#[cfg(test)]
impl MemoryIamStore {
    pub fn new(initial: IamData) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl Default for MemoryIamStore {
    fn default() -> Self {
        Self::new(IamData::default())
    }
}

#[cfg(test)]
impl IamStore for MemoryIamStore {
    fn load(&self) -> Result<IamData, IamError> {
        match self.data.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => Ok(poisoned.into_inner().clone()),
        }
    }

    fn save(&self, data: &IamData) -> Result<(), IamError> {
        match self.data.write() {
            Ok(mut guard) => {
                *guard = data.clone();
                Ok(())
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = data.clone();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{Permission, Role};

    #[test]
    fn missing_file_loads_empty_data() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileIamStore::new(temp.path().join("iam.yaml")).expect("store");
        let data = store.load().expect("load");
        assert!(data.roles.is_empty());
        assert!(data.users.is_empty());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileIamStore::new(temp.path().join("iam.yaml")).expect("store");

        let mut data = IamData::default();
        let mut role = Role::new("Guest");
        role.add_permission(Permission::WRITE);
        role.default = true;
        data.roles.insert(role.name.clone(), role);
        store.save(&data).expect("save");

        let reloaded = store.load().expect("reload");
        let guest = reloaded.roles.get("Guest").expect("guest role");
        assert!(guest.has_permission(Permission::WRITE));
        assert!(guest.default);
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(FileIamStore::new(PathBuf::new()).is_err());
    }
}
