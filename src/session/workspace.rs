use std::ffi::OsStr;
use std::path::Path;

use super::naming::sanitize;
use crate::config::{Config, WorkspaceConfig};

/// Final path component, or the whole path when there is none (e.g. `/`).
pub fn basename(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// First workspace whose directory has the same basename as `dir`.
///
/// Only basenames are compared, so `/b/proj` matches a workspace configured
/// at `/a/proj` but `/b/proj2` does not.
pub fn match_workspace<'a>(
    dir: &Path,
    workspaces: &'a [WorkspaceConfig],
) -> Option<&'a WorkspaceConfig> {
    let target = basename(dir);
    workspaces
        .iter()
        .find(|ws| basename(&ws.directory) == target)
}

/// Session name for `dir`: the matched workspace's name, else the basename.
pub fn determine_session_name(dir: &Path, config: &Config) -> String {
    match match_workspace(dir, &config.workspaces) {
        Some(ws) => sanitize(&ws.name),
        None => sanitize(&basename(dir).to_string_lossy()),
    }
}
