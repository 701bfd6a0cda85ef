// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

/// Write `content` to `path` through a temp file plus rename, so a crash
/// mid-write never leaves a truncated state file behind. Failures are
/// reported through `file_error` so each store keeps its own error type.
pub(crate) fn write_atomic<E>(
    path: &Path,
    content: &str,
    file_error: impl Fn(String) -> E,
) -> Result<(), E> {
    let parent = path
        .parent()
        .ok_or_else(|| file_error(format!("{} has no parent directory", path.display())))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| file_error(format!("{} has no file name", path.display())))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name, &file_error)?;

    if let Err(err) = file.write_all(content.as_bytes()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(file_error(format!("Failed to write temp file: {}", err)));
    }
    if let Err(err) = file.sync_all() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(file_error(format!("Failed to sync temp file: {}", err)));
    }
    if let Err(err) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(file_error(format!(
            "Failed to replace {}: {}",
            path.display(),
            err
        )));
    }
    Ok(())
}

fn create_temp_file<E>(
    dir: &Path,
    file_name: &std::ffi::OsStr,
    file_error: &impl Fn(String) -> E,
) -> Result<(std::fs::File, PathBuf), E> {
    use std::fs::OpenOptions;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(file_error(format!("Failed to create temp file: {}", err)));
            }
        }
    }
    Err(file_error(
        "Failed to create temp file after repeated attempts".to_string(),
    ))
}
