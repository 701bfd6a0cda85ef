// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use quillpress::app_state::AppState;
use quillpress::bootstrap::bootstrap;
use quillpress::config::load_config;
use quillpress::public;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "quillpress.yaml";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            return Err(std::io::Error::other(err.to_string()));
        }
    };

    let (iam, blog) = match bootstrap(&config) {
        Ok(services) => services,
        Err(err) => {
            log::error!("{}", err);
            return Err(std::io::Error::other(err.to_string()));
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = web::Data::new(AppState::new(config, iam, blog));

    info!("Starting QuillPress on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(public::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
