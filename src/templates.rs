// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use chrono::{DateTime, Utc};
use minijinja::{Environment, Value};

const PREVIEW_CHARS: usize = 2000;

/// MiniJinja environment over the embedded template set.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("post.html", include_str!("../templates/post.html")),
            ("tagged.html", include_str!("../templates/tagged.html")),
            ("author.html", include_str!("../templates/author.html")),
            ("edit_post.html", include_str!("../templates/edit_post.html")),
            ("login.html", include_str!("../templates/login.html")),
        ] {
            // Embedded templates are compile-time constants; a parse error
            // here is a packaging bug, not a runtime condition.
            if let Err(err) = env.add_template(name, source) {
                log::error!("Failed to register template {}: {}", name, err);
            }
        }
        env.add_filter("preview", preview_filter);
        Self { env }
    }

    pub fn render(&self, name: &str, context: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing pages show at most the first 2000 characters of a body, with an
/// ellipsis marking the cut.
fn preview_filter(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Display formatting for post timestamps, e.g. "March 4, 2026 at 16:05".
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%B %-d, %Y at %H:%M").to_string()
}
