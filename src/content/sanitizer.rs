// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use std::collections::HashSet;

/// The only tags allowed to survive sanitization. Everything outside this
/// list, script tags included, is stripped from the rendered body.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "br", "cite", "code", "div", "em", "h1", "h2",
    "h3", "i", "img", "li", "ol", "p", "pre", "span", "strike", "strong", "table", "td", "tr",
    "ul",
];

pub struct HtmlSanitizer {
    cleaner: ammonia::Builder<'static>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let mut cleaner = ammonia::Builder::default();
        cleaner
            .tags(HashSet::from_iter(ALLOWED_TAGS.iter().copied()))
            .strip_comments(true)
            .link_rel(Some("noopener noreferrer"));
        Self { cleaner }
    }

    pub fn clean(&self, html: &str) -> String {
        self.cleaner.clean(html).to_string()
    }

    /// Derive a post's display body from its raw markdown: render, then
    /// sanitize against the fixed allow-list.
    pub fn render_markdown(&self, body: &str) -> String {
        let parser = pulldown_cmark::Parser::new(body);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        self.clean(&html)
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
