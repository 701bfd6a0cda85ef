// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod content;
pub mod iam;
pub mod login;
pub mod public;
pub mod roles;
mod store_util;
pub mod templates;
