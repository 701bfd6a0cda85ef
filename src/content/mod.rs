// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

mod sanitizer;
mod service;
mod store;
pub(crate) mod types;

pub use sanitizer::HtmlSanitizer;
pub use service::{BlogService, NewPost, PostUpdate};
pub use store::{ContentStore, FileContentStore};
#[cfg(test)]
pub use store::MemoryContentStore;
pub use types::{ContentData, ContentError, Page, Post, PostId, Tag, UNCATEGORIZED_TAG};
