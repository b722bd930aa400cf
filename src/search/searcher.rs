use std::path::{Component, Path};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// zoxide results kept per query, in zoxide's own frecency order.
pub const RECENT_LIMIT: usize = 30;

const EXCLUDED_DIR: &str = "node_modules";

/// Where candidate directories come from.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Frecent directories below `root`. Never fails; empty when unavailable.
    async fn recent(&self, root: &Path) -> Vec<String>;

    /// Directories below `root`, at most `depth` levels deep (0 = unlimited).
    async fn search(&self, root: &Path, depth: u32) -> Result<Vec<String>>;
}

/// Filesystem walk tool. Both produce the same set of directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// `fd`, or `fdfind` as Debian packages it.
    Fd(&'static str),
    Find,
}

impl Backend {
    /// Prefer fd when it is on `PATH`.
    pub fn detect() -> Self {
        ["fd", "fdfind"]
            .into_iter()
            .find(|bin| which::which(bin).is_ok())
            .map(Backend::Fd)
            .unwrap_or(Backend::Find)
    }

    pub fn program(&self) -> &'static str {
        match self {
            Backend::Fd(bin) => *bin,
            Backend::Find => "find",
        }
    }

    pub fn args(&self, root: &str, depth: u32) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match self {
            Backend::Fd(_) => {
                // fd skips hidden entries unless --hidden is given
                args.extend(
                    ["--type", "d", "--no-ignore", "--exclude", EXCLUDED_DIR].map(String::from),
                );
                if depth > 0 {
                    args.push("--max-depth".to_string());
                    args.push(depth.to_string());
                }
                args.push(".".to_string());
                args.push(root.to_string());
            }
            Backend::Find => {
                args.push(root.to_string());
                args.extend(["-mindepth", "1"].map(String::from));
                if depth > 0 {
                    args.push("-maxdepth".to_string());
                    args.push(depth.to_string());
                }
                args.extend(
                    [
                        "(", "-name", ".*", "-o", "-name", EXCLUDED_DIR, ")", "-prune", "-o",
                        "-type", "d", "-print",
                    ]
                    .map(String::from),
                );
            }
        }
        args
    }
}

/// Directory discovery over zoxide and fd/find.
///
/// The walk backend is picked once, at construction.
#[derive(Debug, Clone)]
pub struct DirectorySearcher {
    backend: Backend,
}

impl DirectorySearcher {
    pub fn new() -> Self {
        let backend = Backend::detect();
        tracing::debug!("Directory search backend: {}", backend.program());
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }

    /// Run the walk backend over `root`.
    pub async fn walk(&self, root: &Path, depth: u32) -> Result<Vec<String>> {
        let root_str = normalize_root(root);
        let program = self.backend.program();

        let output = Command::new(program)
            .args(self.backend.args(&root_str, depth))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::tool(program, e.to_string()))?;

        let dirs = parse_directory_output(&output.stdout, Path::new(&root_str));

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // find exits 1 on unreadable subdirectories but still prints the rest
            if dirs.is_empty() {
                return Err(Error::tool(
                    program,
                    format!("{}: {}", output.status, stderr.trim()),
                ));
            }
            tracing::warn!("{} reported errors: {}", program, stderr.trim());
        }

        Ok(dirs)
    }

    /// `zoxide query --list`, narrowed to proper descendants of `root`.
    pub async fn query_recency_index(&self, root: &Path) -> Vec<String> {
        let output = match Command::new("zoxide")
            .args(["query", "--list"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!("zoxide unavailable: {}", e);
                return Vec::new();
            }
        };

        if !output.status.success() {
            tracing::debug!(
                "zoxide query failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Vec::new();
        }

        filter_recent(&String::from_utf8_lossy(&output.stdout), root)
    }
}

impl Default for DirectorySearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectorySource for DirectorySearcher {
    async fn recent(&self, root: &Path) -> Vec<String> {
        self.query_recency_index(root).await
    }

    async fn search(&self, root: &Path, depth: u32) -> Result<Vec<String>> {
        self.walk(root, depth).await
    }
}

/// Root as a string without a trailing separator (except for `/` itself).
fn normalize_root(root: &Path) -> String {
    let s = root.to_string_lossy();
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The part of `path` strictly below `root`, if any.
fn relative_below<'a>(path: &'a Path, root: &Path) -> Option<&'a Path> {
    path.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
}

/// Hidden and `node_modules` segments below `root` are excluded.
fn is_visible(relative: &Path) -> bool {
    relative.components().all(|c| match c {
        Component::Normal(seg) => {
            let seg = seg.to_string_lossy();
            !seg.starts_with('.') && seg != EXCLUDED_DIR
        }
        _ => true,
    })
}

/// One directory per line: trimmed, blank lines and trailing `/` dropped.
pub fn parse_directory_output(output: &[u8], root: &Path) -> Vec<String> {
    String::from_utf8_lossy(output)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.trim_end_matches('/') {
            "" => "/".to_string(),
            stripped => stripped.to_string(),
        })
        .filter(|line| relative_below(Path::new(line), root).is_some_and(is_visible))
        .collect()
}

/// Keep zoxide entries below `root`, capped at [`RECENT_LIMIT`].
pub fn filter_recent(listing: &str, root: &Path) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| relative_below(Path::new(line), root).is_some())
        .take(RECENT_LIMIT)
        .map(String::from)
        .collect()
}
