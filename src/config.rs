// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlogConfig {
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Number of posts per pagination page for the index, tag, and author
    /// listings alike.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    /// Username that is granted the Administrator role at account creation.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_site_name() -> String {
    "QuillPress".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_posts_per_page() -> usize {
    5
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            bind_addr: default_bind_addr(),
            posts_per_page: default_posts_per_page(),
            admin_username: default_admin_username(),
            data_dir: default_data_dir(),
        }
    }
}

impl BlogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "posts_per_page must be at least 1".to_string(),
            ));
        }
        if self.admin_username.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "admin_username must not be empty".to_string(),
            ));
        }
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "bind_addr '{}' is not a valid socket address",
                self.bind_addr
            )));
        }
        Ok(())
    }
}

/// Load the configuration file, falling back to defaults when it does not
/// exist. A present but malformed file is an error rather than a silent
/// fallback.
pub fn load_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|err| ConfigError::LoadError(format!("{}: {}", path.display(), err)))?;
        serde_yaml::from_str(&content)
            .map_err(|err| ConfigError::LoadError(format!("{}: {}", path.display(), err)))?
    } else {
        log::info!(
            "Configuration file {} not found; using defaults",
            path.display()
        );
        BlogConfig::default()
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = BlogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.posts_per_page, 5);
        assert_eq!(config.admin_username, "admin");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = BlogConfig {
            posts_per_page: 0,
            ..BlogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: BlogConfig = serde_yaml::from_str("site_name: My Blog\n").expect("parse");
        assert_eq!(config.site_name, "My Blog");
        assert_eq!(config.posts_per_page, 5);
        assert_eq!(config.admin_username, "admin");
    }
}
