// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::sanitizer::HtmlSanitizer;
use super::store::ContentStore;
use super::types::{
    ContentData, ContentError, Page, Post, PostId, Tag, ANONYMOUS_AUTHOR, UNCATEGORIZED_TAG,
};
use chrono::Utc;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    /// Raw comma-separated tag string as submitted by the form.
    pub tags: String,
}

#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub body: String,
    pub tags: String,
}

/// Post and tag service. Mutations take the write lock, apply the change,
/// and persist through the store before releasing it; that critical
/// section is the transaction, so the tag get-or-create race and
/// concurrent orphan cleanups serialize on the lock and the orphan
/// re-query always sees the post's removal.
#[derive(Clone)]
pub struct BlogService {
    data: Arc<RwLock<ContentData>>,
    store: Arc<dyn ContentStore>,
    sanitizer: Arc<HtmlSanitizer>,
    posts_per_page: usize,
}

impl BlogService {
    pub fn new(store: Arc<dyn ContentStore>, posts_per_page: usize) -> Result<Self, ContentError> {
        let data = store.load()?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            store,
            sanitizer: Arc::new(HtmlSanitizer::new()),
            posts_per_page,
        })
    }

    fn with_read<T>(&self, f: impl FnOnce(&ContentData) -> T) -> Result<T, ContentError> {
        match self.data.read() {
            Ok(guard) => Ok(f(&guard)),
            Err(_) => {
                log::error!("Content lock poisoned on read; reloading from store");
                let fresh = self.store.load()?;
                match self.data.write() {
                    Ok(mut guard) => {
                        *guard = fresh;
                        self.data.clear_poison();
                        Ok(f(&guard))
                    }
                    Err(poisoned) => {
                        let mut guard = poisoned.into_inner();
                        *guard = fresh;
                        self.data.clear_poison();
                        Ok(f(&guard))
                    }
                }
            }
        }
    }

    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut ContentData) -> Result<T, ContentError>,
    ) -> Result<T, ContentError> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Content lock poisoned on write; reloading from store");
                let mut guard = poisoned.into_inner();
                *guard = self.store.load()?;
                self.data.clear_poison();
                guard
            }
        };
        let result = f(&mut guard)?;
        self.store.save(&guard)?;
        Ok(result)
    }

    pub fn create_post(&self, new_post: NewPost) -> Result<Post, ContentError> {
        let body_html = self.sanitizer.render_markdown(&new_post.body);
        self.with_write(move |data| {
            let id = data.next_post_id;
            data.next_post_id += 1;

            let post = Post {
                id,
                title: new_post.title,
                body: new_post.body,
                body_html,
                time: Utc::now(),
                author: new_post
                    .author
                    .filter(|author| !author.trim().is_empty())
                    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            };
            data.posts.insert(id, post.clone());

            for name in split_tag_string(&new_post.tags) {
                attach_tag(data, id, &name);
            }

            log::info!("Created post {} ('{}')", id, post.title);
            Ok(data.posts.get(&id).cloned().unwrap_or(post))
        })
    }

    /// Edit a post. `body_html` is re-derived from the new body, and only
    /// tag names not already attached are re-attached, so the same
    /// post/tag pair never gets a second join row.
    pub fn update_post(&self, id: PostId, update: PostUpdate) -> Result<Post, ContentError> {
        let body_html = self.sanitizer.render_markdown(&update.body);
        self.with_write(move |data| {
            let post = data
                .posts
                .get_mut(&id)
                .ok_or(ContentError::PostNotFound(id))?;
            post.title = update.title;
            post.body = update.body;
            post.body_html = body_html;

            let current: Vec<String> = tags_of(data, id)
                .into_iter()
                .map(|tag| tag.name)
                .collect();
            for name in split_tag_string(&update.tags) {
                if !current.iter().any(|existing| existing == &name) {
                    attach_tag(data, id, &name);
                }
            }

            data.posts
                .get(&id)
                .cloned()
                .ok_or(ContentError::PostNotFound(id))
        })
    }

    /// Delete a post and clean up tags it orphaned. The tag set is
    /// captured first, then the post and its join rows are removed, and
    /// only then is each captured tag re-checked against the post-delete
    /// state; tags with no remaining posts are dropped.
    pub fn delete_post(&self, id: PostId) -> Result<(), ContentError> {
        self.with_write(|data| {
            if !data.posts.contains_key(&id) {
                return Err(ContentError::PostNotFound(id));
            }
            let captured: Vec<String> = tags_of(data, id)
                .into_iter()
                .map(|tag| tag.name)
                .collect();

            data.posts.remove(&id);
            data.post_tags.retain(|(post_id, _)| *post_id != id);

            for name in captured {
                let still_referenced = data.post_tags.iter().any(|(_, tag)| tag == &name);
                if !still_referenced {
                    data.tags.remove(&name);
                    log::info!("Removed orphaned tag '{}'", name);
                }
            }

            log::info!("Deleted post {}", id);
            Ok(())
        })
    }

    /// Attach one tag to a post (get-or-create by name). Exposed for
    /// callers that tag outside the create/update flow.
    pub fn tag_post(&self, id: PostId, name: &str) -> Result<Tag, ContentError> {
        self.with_write(|data| {
            if !data.posts.contains_key(&id) {
                return Err(ContentError::PostNotFound(id));
            }
            Ok(attach_tag(data, id, name))
        })
    }

    pub fn get_post(&self, id: PostId) -> Result<Post, ContentError> {
        self.with_read(|data| data.posts.get(&id).cloned())?
            .ok_or(ContentError::PostNotFound(id))
    }

    /// Tags of a post in attachment order.
    pub fn get_tags(&self, id: PostId) -> Result<Vec<Tag>, ContentError> {
        self.with_read(|data| tags_of(data, id))
    }

    /// Comma-joined tag names, used to prefill the edit form.
    pub fn tag_string(&self, id: PostId) -> Result<String, ContentError> {
        let tags = self.get_tags(id)?;
        Ok(tags
            .into_iter()
            .map(|tag| tag.name)
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// All tags, sorted by name, for the sidebar listing.
    pub fn all_tags(&self) -> Result<Vec<Tag>, ContentError> {
        self.with_read(|data| data.tags.values().cloned().collect())
    }

    pub fn posts_page(&self, page: usize) -> Result<Page<Post>, ContentError> {
        self.with_read(|data| {
            let posts = posts_by_time_desc(data, |_| true);
            paginate(posts, page, self.posts_per_page)
        })
    }

    pub fn posts_by_tag(&self, tag_name: &str, page: usize) -> Result<Page<Post>, ContentError> {
        self.with_read(|data| {
            if !data.tags.contains_key(tag_name) {
                return Err(ContentError::TagNotFound(tag_name.to_string()));
            }
            let tagged: Vec<PostId> = data
                .post_tags
                .iter()
                .filter(|(_, name)| name == tag_name)
                .map(|(id, _)| *id)
                .collect();
            let posts = posts_by_time_desc(data, |post| tagged.contains(&post.id));
            Ok(paginate(posts, page, self.posts_per_page))
        })?
    }

    pub fn posts_by_author(&self, author: &str, page: usize) -> Result<Page<Post>, ContentError> {
        self.with_read(|data| {
            let posts = posts_by_time_desc(data, |post| post.author == author);
            paginate(posts, page, self.posts_per_page)
        })
    }

    /// The five most recent posts, i.e. the head of the same
    /// time-descending ordering the listings use.
    pub fn recent_posts(&self) -> Result<Vec<Post>, ContentError> {
        self.with_read(|data| {
            let mut posts = posts_by_time_desc(data, |_| true);
            posts.truncate(5);
            posts
        })
    }
}

/// Split a raw comma-separated tag string into individual names. Trimmed;
/// empty segments stay empty here and normalize to the uncategorized tag
/// at attach time.
fn split_tag_string(raw: &str) -> Vec<String> {
    raw.split(',').map(|name| name.trim().to_string()).collect()
}

/// Get-or-create the tag and attach it to the post. The name-keyed entry
/// is the atomic insert-if-absent; an already-attached pair is a no-op so
/// repeated tagging never duplicates join rows.
fn attach_tag(data: &mut ContentData, post_id: PostId, name: &str) -> Tag {
    let name = if name.trim().is_empty() {
        UNCATEGORIZED_TAG
    } else {
        name.trim()
    };

    let tag = data
        .tags
        .entry(name.to_string())
        .or_insert_with(|| Tag::new(name))
        .clone();

    let already_attached = data
        .post_tags
        .iter()
        .any(|(id, tag_name)| *id == post_id && tag_name == name);
    if !already_attached {
        data.post_tags.push((post_id, name.to_string()));
    }
    tag
}

fn tags_of(data: &ContentData, post_id: PostId) -> Vec<Tag> {
    data.post_tags
        .iter()
        .filter(|(id, _)| *id == post_id)
        .filter_map(|(_, name)| data.tags.get(name).cloned())
        .collect()
}

fn posts_by_time_desc(data: &ContentData, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
    let mut posts: Vec<Post> = data.posts.values().filter(|post| keep(post)).cloned().collect();
    // Newest first; fall back to id so same-timestamp posts order stably.
    posts.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));
    posts
}

fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();
    Page {
        items: page_items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}
