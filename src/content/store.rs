// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::types::{ContentData, ContentError};
use crate::store_util;
use std::path::PathBuf;

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait ContentStore: Send + Sync {
    fn load(&self) -> Result<ContentData, ContentError>;
    fn save(&self, data: &ContentData) -> Result<(), ContentError>;
}

/// YAML-file-backed content store with temp-file-plus-rename saves.
pub struct FileContentStore {
    content_file: PathBuf,
}

impl FileContentStore {
    pub fn new(content_file: PathBuf) -> Result<Self, ContentError> {
        if content_file.as_os_str().is_empty() {
            return Err(ContentError::FileError(
                "Content file path is empty".to_string(),
            ));
        }
        Ok(Self { content_file })
    }
}

impl ContentStore for FileContentStore {
    fn load(&self) -> Result<ContentData, ContentError> {
        if !self.content_file.exists() {
            return Ok(ContentData::default());
        }
        let content = std::fs::read_to_string(&self.content_file).map_err(|err| {
            ContentError::FileError(format!("Failed to read content file: {}", err))
        })?;
        if content.trim().is_empty() {
            return Ok(ContentData::default());
        }
        serde_yaml::from_str(&content).map_err(|err| {
            ContentError::ParseError(format!("Failed to parse content file: {}", err))
        })
    }

    fn save(&self, data: &ContentData) -> Result<(), ContentError> {
        let content = serde_yaml::to_string(data).map_err(|err| {
            ContentError::ParseError(format!("Failed to serialize content data: {}", err))
        })?;
        store_util::write_atomic(&self.content_file, &content, ContentError::FileError)
    }
}

#[cfg(test)]
pub struct MemoryContentStore {
    data: Arc<RwLock<ContentData>>,
}

#[cfg(test)]
impl MemoryContentStore {
    pub fn new(initial: ContentData) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new(ContentData::default())
    }
}

#[cfg(test)]
impl ContentStore for MemoryContentStore {
    fn load(&self) -> Result<ContentData, ContentError> {
        match self.data.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => Ok(poisoned.into_inner().clone()),
        }
    }

    fn save(&self, data: &ContentData) -> Result<(), ContentError> {
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
