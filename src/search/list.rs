use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::searcher::DirectorySource;
use crate::error::Result;
use crate::picker::Picker;

/// Prefix for entries that came from the recency index.
pub const RECENCY_MARKER: &str = "★ ";

/// Remove a leading [`RECENCY_MARKER`], if any.
pub fn strip_recency_marker(entry: &str) -> &str {
    entry.strip_prefix(RECENCY_MARKER).unwrap_or(entry)
}

/// Builds the candidate list shown in the picker.
#[derive(Debug, Clone)]
pub struct DirectoryList<S> {
    source: S,
}

impl<S: DirectorySource> DirectoryList<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Candidate entries: recent directories first (marked), then the walk
    /// results. A path appears once, keyed on its unmarked form.
    pub async fn entries(
        &self,
        root: &Path,
        depth: u32,
        use_recency: bool,
    ) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        if use_recency {
            for dir in self.source.recent(root).await {
                if seen.insert(dir.clone()) {
                    entries.push(format!("{}{}", RECENCY_MARKER, dir));
                }
            }
        }

        for dir in self.source.search(root, depth).await? {
            if seen.insert(dir.clone()) {
                entries.push(dir);
            }
        }

        Ok(entries)
    }

    /// [`entries`](Self::entries) joined with newlines, ready for the picker.
    pub async fn build(&self, root: &Path, depth: u32, use_recency: bool) -> Result<String> {
        Ok(self.entries(root, depth, use_recency).await?.join("\n"))
    }

    /// Build the list, let the user pick, and return the bare path.
    pub async fn select(
        &self,
        picker: &dyn Picker,
        root: &Path,
        depth: u32,
        use_recency: bool,
    ) -> Result<PathBuf> {
        let list = self.build(root, depth, use_recency).await?;
        let selected = picker.pick(list.as_bytes()).await?;
        Ok(PathBuf::from(strip_recency_marker(&selected)))
    }
}
