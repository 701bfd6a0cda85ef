// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type PostId = u64;

/// Name a post gets tagged with when the submitted tag string is empty.
pub const UNCATEGORIZED_TAG: &str = "uncategorized";

pub const ANONYMOUS_AUTHOR: &str = "Anonymous Blogger";

/// A blog entry. `body` is the raw markdown; `body_html` is always derived
/// from it by rendering and sanitizing, never stored independently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub body_html: String,
    pub time: DateTime<Utc>,
    pub author: String,
}

/// A label attachable to posts. The name is both identity and primary key;
/// two tags with the same name are the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Everything the content store persists. Posts are keyed by surrogate id,
/// tags by name (the name-keyed map is the uniqueness constraint), and the
/// join rows keep attachment order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentData {
    pub next_post_id: PostId,
    #[serde(default)]
    pub posts: BTreeMap<PostId, Post>,
    #[serde(default)]
    pub tags: BTreeMap<String, Tag>,
    /// Join relation: (post id, tag name) in attachment order.
    #[serde(default)]
    pub post_tags: Vec<(PostId, String)>,
}

impl Default for ContentData {
    fn default() -> Self {
        Self {
            next_post_id: 1,
            posts: BTreeMap::new(),
            tags: BTreeMap::new(),
            post_tags: Vec::new(),
        }
    }
}

/// One slice of a time-descending listing, plus enough numbers for the
/// pagination links.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug)]
pub enum ContentError {
    PostNotFound(PostId),
    TagNotFound(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::PostNotFound(id) => write!(f, "Post not found: {}", id),
            ContentError::TagNotFound(name) => write!(f, "Tag not found: {}", name),
            ContentError::FileError(msg) => write!(f, "File error: {}", msg),
            ContentError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ContentError {}
