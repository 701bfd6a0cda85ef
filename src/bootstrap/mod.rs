// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use crate::config::BlogConfig;
use crate::content::{BlogService, ContentError, FileContentStore};
use crate::iam::{FileIamStore, IamError, IamService};
use std::path::Path;
use std::sync::Arc;

const IAM_FILE_NAME: &str = "iam.yaml";
const CONTENT_FILE_NAME: &str = "content.yaml";

#[derive(Debug)]
pub enum BootstrapError {
    Io(std::io::Error),
    Iam(IamError),
    Content(ContentError),
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
            BootstrapError::Iam(err) => write!(f, "Bootstrap IAM error: {}", err),
            BootstrapError::Content(err) => write!(f, "Bootstrap content error: {}", err),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

impl From<IamError> for BootstrapError {
    fn from(err: IamError) -> Self {
        BootstrapError::Iam(err)
    }
}

impl From<ContentError> for BootstrapError {
    fn from(err: ContentError) -> Self {
        BootstrapError::Content(err)
    }
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    log::info!("bootstrap: {}", message.as_ref());
}

/// Startup routine: ensure the data directory exists, open the file
/// stores, build the services, and seed the built-in roles. Idempotent,
/// so it runs on every start.
pub fn bootstrap(config: &BlogConfig) -> Result<(IamService, BlogService), BootstrapError> {
    ensure_data_dir(&config.data_dir)?;

    let iam_store = FileIamStore::new(config.data_dir.join(IAM_FILE_NAME))?;
    let iam = IamService::new(Arc::new(iam_store), config.admin_username.clone())?;
    iam.seed_roles()?;
    log_action("seeded roles");

    let content_store = FileContentStore::new(config.data_dir.join(CONTENT_FILE_NAME))?;
    let blog = BlogService::new(Arc::new(content_store), config.posts_per_page)?;
    log_action("content service ready");

    Ok((iam, blog))
}

fn ensure_data_dir(data_dir: &Path) -> Result<(), BootstrapError> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)?;
        log_action(format!("created {}", data_dir.display()));
    }
    Ok(())
}
