// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};

/// Replace the first `~` in `path` with the home directory of the user
pub fn expand_path(path: &str) -> String {
    let home = dirs::home_dir()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.replacen('~', &home, 1)
}

/// Whether `path` exists and is not a directory
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().metadata().is_ok_and(|m| !m.is_dir())
}

/// Absolute path of an existing file, `~` expanded
pub fn resolve_file(path: &str) -> Option<PathBuf> {
    let expanded = expand_path(path);
    if !file_exists(&expanded) {
        return None;
    }
    std::path::absolute(&expanded).ok()
}
