// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use super::error;
use crate::app_state::AppState;
use crate::content::{ContentError, NewPost, Page, Post, PostId, PostUpdate};
use crate::iam::Principal;
use crate::login::SESSION_COOKIE;
use crate::roles::Permission;
use crate::templates::format_time;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Post data shaped for the templates: timestamps preformatted, markdown
/// already rendered and sanitized.
#[derive(Debug, Serialize)]
struct PostView {
    id: PostId,
    title: String,
    author: String,
    time: String,
    body_html: String,
}

impl PostView {
    fn from_post(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            author: post.author.clone(),
            time: format_time(&post.time),
            body_html: post.body_html.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecentView {
    id: PostId,
    title: String,
}

/// Sidebar and header data shared by every rendered page.
struct BaseContext {
    site_name: String,
    username: Option<String>,
    recent: Vec<RecentView>,
    sidebar_tags: Vec<String>,
}

fn base_context(state: &AppState, principal: &Principal) -> BaseContext {
    let recent = state
        .blog
        .recent_posts()
        .unwrap_or_else(|err| {
            log::error!("Failed to load recent posts: {}", err);
            Vec::new()
        })
        .iter()
        .map(|post| RecentView {
            id: post.id,
            title: post.title.clone(),
        })
        .collect();
    let sidebar_tags = state
        .blog
        .all_tags()
        .unwrap_or_else(|err| {
            log::error!("Failed to load tags: {}", err);
            Vec::new()
        })
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    BaseContext {
        site_name: state.config.site_name.clone(),
        username: principal.display_name().map(str::to_string),
        recent,
        sidebar_tags,
    }
}

/// Resolve the acting identity from the session cookie. Missing or stale
/// cookies and IAM failures all fall back to the anonymous principal.
fn principal_of(req: &HttpRequest, state: &AppState) -> Principal {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Principal::Anonymous;
    };
    let Some(username) = state.sessions.username_for(cookie.value()) else {
        return Principal::Anonymous;
    };
    match state.iam.principal_for(&username) {
        Ok(principal) => principal,
        Err(err) => {
            log::error!("Failed to resolve principal for '{}': {}", username, err);
            Principal::Anonymous
        }
    }
}

fn render(state: &AppState, template: &str, ctx: minijinja::Value) -> Result<HttpResponse> {
    match state.templates.render(template, ctx) {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(err) => {
            log::error!("Failed to render template {}: {}", template, err);
            error::serve_500(&state.config.site_name)
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}

/// Write-permission gate used by the post mutation handlers: anonymous
/// callers are sent to the login page, authenticated callers without the
/// WRITE permission get a 403.
enum WriteGate {
    Allowed(Principal),
    Denied(HttpResponse),
}

fn require_write(req: &HttpRequest, state: &AppState) -> Result<WriteGate> {
    let principal = principal_of(req, state);
    if matches!(principal, Principal::Anonymous) {
        return Ok(WriteGate::Denied(redirect("/auth/login")));
    }
    if !principal.can(Permission::WRITE) {
        let response = error::serve_403(&state.config.site_name)?;
        return Ok(WriteGate::Denied(response));
    }
    Ok(WriteGate::Allowed(principal))
}

fn listing_context(base: &BaseContext, page: &Page<Post>) -> minijinja::Value {
    context! {
        site_name => &base.site_name,
        username => &base.username,
        recent => &base.recent,
        sidebar_tags => &base.sidebar_tags,
        posts => page.items.iter().map(PostView::from_post).collect::<Vec<_>>(),
        page => page.page,
        has_prev => page.has_prev(),
        has_next => page.has_next(),
    }
}

pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let principal = principal_of(&req, &state);
    let base = base_context(&state, &principal);
    let page = match state.blog.posts_page(query.page.unwrap_or(1)) {
        Ok(page) => page,
        Err(err) => {
            log::error!("Failed to load index page: {}", err);
            return error::serve_500(&state.config.site_name);
        }
    };
    render(&state, "index.html", listing_context(&base, &page))
}

pub async fn post_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let principal = principal_of(&req, &state);
    let base = base_context(&state, &principal);

    let post = match state.blog.get_post(id) {
        Ok(post) => post,
        Err(ContentError::PostNotFound(_)) => return error::serve_404(&state.config.site_name),
        Err(err) => {
            log::error!("Failed to load post {}: {}", id, err);
            return error::serve_500(&state.config.site_name);
        }
    };
    let post_tags = match state.blog.get_tags(id) {
        Ok(tags) => tags,
        Err(err) => {
            log::error!("Failed to load tags of post {}: {}", id, err);
            return error::serve_500(&state.config.site_name);
        }
    };

    let ctx = context! {
        site_name => base.site_name,
        username => base.username,
        recent => base.recent,
        sidebar_tags => base.sidebar_tags,
        post => PostView::from_post(&post),
        post_tags => post_tags,
        can_write => principal.can(Permission::WRITE),
    };
    render(&state, "post.html", ctx)
}

pub async fn tagged(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let tag = path.into_inner();
    let principal = principal_of(&req, &state);
    let base = base_context(&state, &principal);

    let page = match state.blog.posts_by_tag(&tag, query.page.unwrap_or(1)) {
        Ok(page) => page,
        Err(ContentError::TagNotFound(_)) => return error::serve_404(&state.config.site_name),
        Err(err) => {
            log::error!("Failed to load posts tagged '{}': {}", tag, err);
            return error::serve_500(&state.config.site_name);
        }
    };

    let ctx = context! {
        site_name => &base.site_name,
        username => &base.username,
        recent => &base.recent,
        sidebar_tags => &base.sidebar_tags,
        posts => page.items.iter().map(PostView::from_post).collect::<Vec<_>>(),
        page => page.page,
        has_prev => page.has_prev(),
        has_next => page.has_next(),
        tag => tag,
    };
    render(&state, "tagged.html", ctx)
}

pub async fn author(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let author = path.into_inner();
    let principal = principal_of(&req, &state);
    let base = base_context(&state, &principal);

    let page = match state.blog.posts_by_author(&author, query.page.unwrap_or(1)) {
        Ok(page) => page,
        Err(err) => {
            log::error!("Failed to load posts by '{}': {}", author, err);
            return error::serve_500(&state.config.site_name);
        }
    };

    let ctx = context! {
        site_name => &base.site_name,
        username => &base.username,
        recent => &base.recent,
        sidebar_tags => &base.sidebar_tags,
        posts => page.items.iter().map(PostView::from_post).collect::<Vec<_>>(),
        page => page.page,
        has_prev => page.has_prev(),
        has_next => page.has_next(),
        author => author,
    };
    render(&state, "author.html", ctx)
}

pub async fn new_post_form(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let principal = match require_write(&req, &state)? {
        WriteGate::Allowed(principal) => principal,
        WriteGate::Denied(response) => return Ok(response),
    };
    let base = base_context(&state, &principal);
    let ctx = context! {
        site_name => base.site_name,
        username => base.username,
        recent => base.recent,
        sidebar_tags => base.sidebar_tags,
        heading => "New post",
        action => "/new_post",
        title => "",
        body => "",
        tags => "",
    };
    render(&state, "edit_post.html", ctx)
}

pub async fn new_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let principal = match require_write(&req, &state)? {
        WriteGate::Allowed(principal) => principal,
        WriteGate::Denied(response) => return Ok(response),
    };
    let form = form.into_inner();
    let new_post = NewPost {
        title: form.title,
        body: form.body,
        author: principal.display_name().map(str::to_string),
        tags: form.tags,
    };
    match state.blog.create_post(new_post) {
        Ok(post) => Ok(redirect(&format!("/post/{}", post.id))),
        Err(err) => {
            log::error!("Failed to create post: {}", err);
            error::serve_500(&state.config.site_name)
        }
    }
}

pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let principal = match require_write(&req, &state)? {
        WriteGate::Allowed(principal) => principal,
        WriteGate::Denied(response) => return Ok(response),
    };

    let post = match state.blog.get_post(id) {
        Ok(post) => post,
        Err(ContentError::PostNotFound(_)) => return error::serve_404(&state.config.site_name),
        Err(err) => {
            log::error!("Failed to load post {}: {}", id, err);
            return error::serve_500(&state.config.site_name);
        }
    };
    let tags = state.blog.tag_string(id).unwrap_or_else(|err| {
        log::error!("Failed to load tag string of post {}: {}", id, err);
        String::new()
    });

    let base = base_context(&state, &principal);
    let ctx = context! {
        site_name => base.site_name,
        username => base.username,
        recent => base.recent,
        sidebar_tags => base.sidebar_tags,
        heading => "Edit post",
        action => format!("/edit/{}", id),
        title => post.title,
        body => post.body,
        tags => tags,
    };
    render(&state, "edit_post.html", ctx)
}

pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if let WriteGate::Denied(response) = require_write(&req, &state)? {
        return Ok(response);
    }
    let form = form.into_inner();
    let update = PostUpdate {
        title: form.title,
        body: form.body,
        tags: form.tags,
    };
    match state.blog.update_post(id, update) {
        Ok(post) => Ok(redirect(&format!("/post/{}", post.id))),
        Err(ContentError::PostNotFound(_)) => error::serve_404(&state.config.site_name),
        Err(err) => {
            log::error!("Failed to update post {}: {}", id, err);
            error::serve_500(&state.config.site_name)
        }
    }
}

pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if let WriteGate::Denied(response) = require_write(&req, &state)? {
        return Ok(response);
    }
    match state.blog.delete_post(id) {
        Ok(()) => Ok(redirect("/")),
        Err(ContentError::PostNotFound(_)) => error::serve_404(&state.config.site_name),
        Err(err) => {
            log::error!("Failed to delete post {}: {}", id, err);
            error::serve_500(&state.config.site_name)
        }
    }
}

pub async fn login_form(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let principal = principal_of(&req, &state);
    let base = base_context(&state, &principal);
    let ctx = context! {
        site_name => base.site_name,
        username => base.username,
        recent => base.recent,
        sidebar_tags => base.sidebar_tags,
        error => minijinja::Value::UNDEFINED,
    };
    render(&state, "login.html", ctx)
}

pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let authenticated = match state.iam.authenticate(&form.username, &form.password) {
        Ok(result) => result,
        Err(err) => {
            log::error!("Authentication failure for '{}': {}", form.username, err);
            return error::serve_500(&state.config.site_name);
        }
    };

    if authenticated.is_none() {
        log::info!("Rejected login for '{}'", form.username);
        let principal = principal_of(&req, &state);
        let base = base_context(&state, &principal);
        let ctx = context! {
            site_name => base.site_name,
            username => base.username,
            recent => base.recent,
            sidebar_tags => base.sidebar_tags,
            error => "Invalid username or password.",
        };
        return render(&state, "login.html", ctx);
    }

    let Some(token) = state.sessions.issue(&form.username) else {
        return error::serve_500(&state.config.site_name);
    };
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    let mut response = redirect("/");
    if let Err(err) = response.add_cookie(&cookie) {
        log::error!("Failed to attach session cookie: {}", err);
        return error::serve_500(&state.config.site_name);
    }
    Ok(response)
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        state.sessions.revoke(cookie.value());
    }
    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    let mut response = redirect("/");
    if let Err(err) = response.add_cookie(&removal) {
        log::error!("Failed to clear session cookie: {}", err);
    }
    Ok(response)
}
