// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use crate::config::BlogConfig;
use crate::content::BlogService;
use crate::iam::IamService;
use crate::login::SessionStore;
use crate::templates::TemplateEngine;

/// Explicit application context, constructed once at startup and injected
/// into request handlers. No module-level mutable globals.
pub struct AppState {
    pub config: BlogConfig,
    pub iam: IamService,
    pub blog: BlogService,
    pub sessions: SessionStore,
    pub templates: TemplateEngine,
}

impl AppState {
    pub fn new(config: BlogConfig, iam: IamService, blog: BlogService) -> Self {
        Self {
            config,
            iam,
            blog,
            sessions: SessionStore::new(),
            templates: TemplateEngine::new(),
        }
    }
}
