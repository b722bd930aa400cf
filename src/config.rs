use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::error::{Error, Result};

/// Search depth used when neither the CLI nor the config sets one.
pub const DEFAULT_SEARCH_DEPTH: u32 = 1;

/// A named directory with a tmux window layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub directory: PathBuf,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub windows: Vec<String>,
}

/// One TOML file as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    workspace: Vec<WorkspaceConfig>,
    search_depth: Option<u32>,
    use_zoxide: Option<bool>,
}

/// Merged configuration. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspaces: Vec<WorkspaceConfig>,
    /// `Some(0)` means unlimited depth.
    pub search_depth: Option<u32>,
    pub use_zoxide: Option<bool>,
}

impl Config {
    /// Load every `*.toml` file in `dir`, in file-name order.
    ///
    /// Never fails: problems are returned as warnings next to whatever could
    /// be loaded. The directory is created if it does not exist.
    pub async fn load(dir: &Path) -> (Self, Vec<Error>) {
        let mut warnings = Vec::new();
        let mut config = Self::default();

        if let Err(e) = fs::create_dir_all(dir).await {
            warnings.push(Error::config(format!(
                "cannot create {}: {}",
                dir.display(),
                e
            )));
            return (config, warnings);
        }

        let paths = match toml_files(dir).await {
            Ok(p) => p,
            Err(e) => {
                warnings.push(e);
                return (config, warnings);
            }
        };

        for path in paths {
            let parsed = match fs::read_to_string(&path).await {
                Ok(content) => toml::from_str::<ConfigFile>(&content).map_err(Error::from),
                Err(e) => Err(Error::from(e)),
            };
            match parsed {
                Ok(file) => config.merge(file),
                Err(e) => warnings.push(Error::config(format!("{}: {}", path.display(), e))),
            }
        }

        warnings.extend(config.validate());
        (config, warnings)
    }

    fn merge(&mut self, file: ConfigFile) {
        self.workspaces.extend(file.workspace);
        if file.search_depth.is_some() {
            self.search_depth = file.search_depth;
        }
        if file.use_zoxide.is_some() {
            self.use_zoxide = file.use_zoxide;
        }
    }

    /// Drop workspaces with an empty name or directory, and later duplicates
    /// of a name.
    fn validate(&mut self) -> Vec<Error> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        self.workspaces.retain(|ws| {
            if ws.name.trim().is_empty() {
                warnings.push(Error::config(format!(
                    "workspace for {} has no name, skipping",
                    ws.directory.display()
                )));
                return false;
            }
            if ws.directory.as_os_str().is_empty() {
                warnings.push(Error::config(format!(
                    "workspace {} has no directory, skipping",
                    ws.name
                )));
                return false;
            }
            if !seen.insert(ws.name.clone()) {
                warnings.push(Error::config(format!(
                    "duplicate workspace name {}, keeping the first one",
                    ws.name
                )));
                return false;
            }
            true
        });

        warnings
    }

    /// Effective search depth. A positive CLI value wins, then the config
    /// value (where 0 is unlimited), then [`DEFAULT_SEARCH_DEPTH`].
    pub fn search_depth(&self, cli_depth: u32) -> u32 {
        if cli_depth > 0 {
            return cli_depth;
        }
        self.search_depth.unwrap_or(DEFAULT_SEARCH_DEPTH)
    }

    pub fn use_zoxide(&self) -> bool {
        self.use_zoxide.unwrap_or(true)
    }
}

async fn toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "toml") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// `~/.config/tmx`
pub fn default_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::NotFound("cannot determine home directory".to_string()))?;
    Ok(home.join(".config").join("tmx"))
}
