// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use quillpress::bootstrap::bootstrap;
use quillpress::config::BlogConfig;
use quillpress::content::{BlogService, NewPost, Post};
use quillpress::iam::IamService;
use tempfile::TempDir;

/// Test fixture backed by real file stores in a temp directory, seeded the
/// same way the server seeds itself at startup.
pub struct TestHarness {
    pub config: BlogConfig,
    pub iam: IamService,
    pub blog: BlogService,
    _temp: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let config = BlogConfig {
            data_dir: temp.path().join("state"),
            ..BlogConfig::default()
        };
        let (iam, blog) = bootstrap(&config).expect("bootstrap");
        Self {
            config,
            iam,
            blog,
            _temp: temp,
        }
    }

    pub fn post_with_tags(&self, title: &str, tags: &str) -> Post {
        self.blog
            .create_post(NewPost {
                title: title.to_string(),
                body: format!("Body of {}", title),
                author: None,
                tags: tags.to_string(),
            })
            .expect("create post")
    }
}
