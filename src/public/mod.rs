// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

pub mod error;
pub mod handlers;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/post/{id}", web::get().to(handlers::post_page))
        .route("/tagged/{tag}", web::get().to(handlers::tagged))
        .route("/author/{author}", web::get().to(handlers::author))
        .route("/new_post", web::get().to(handlers::new_post_form))
        .route("/new_post", web::post().to(handlers::new_post))
        .route("/edit/{id}", web::get().to(handlers::edit_form))
        .route("/edit/{id}", web::post().to(handlers::edit))
        .route("/delete/{id}", web::post().to(handlers::delete))
        .route("/auth/login", web::get().to(handlers::login_form))
        .route("/auth/login", web::post().to(handlers::login))
        .route("/auth/logout", web::get().to(handlers::logout));
}
