//! Persisted ingest progress so interrupted runs can resume.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Mutex;
use url::Url;

use crate::types::RagError;

/// Records, per processed URL, how many chunks were written for it.
///
/// State is persisted as a JSON object after every update, so a killed
/// ingest job loses at most the page it was working on.
#[derive(Clone, Debug)]
pub struct ResumeTracker {
    path: PathBuf,
    state: Arc<Mutex<HashMap<String, usize>>>,
}

impl ResumeTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads previously persisted progress, if any.
    pub async fn load(&self) -> Result<(), RagError> {
        if !self.path.exists() {
            return Ok(());
        }
        let data = fs::read_to_string(&self.path).await?;
        let entries: HashMap<String, usize> =
            serde_json::from_str(&data).map_err(|err| RagError::Io(err.to_string()))?;
        let mut guard = self.state.lock().await;
        *guard = entries;
        Ok(())
    }

    /// Returns `true` if this URL was already ingested.
    pub async fn contains(&self, url: &Url) -> bool {
        let guard = self.state.lock().await;
        guard.contains_key(url.as_str())
    }

    /// Total chunks written across all recorded pages.
    pub async fn chunks_recorded(&self) -> usize {
        let guard = self.state.lock().await;
        guard.values().sum()
    }

    /// Marks a URL as ingested and persists the updated state.
    pub async fn record(&self, url: &Url, chunks_written: usize) -> Result<(), RagError> {
        let snapshot = {
            let mut guard = self.state.lock().await;
            guard.insert(url.as_str().to_string(), chunks_written);
            guard.clone()
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let serialized =
            serde_json::to_string(&snapshot).map_err(|err| RagError::Io(err.to_string()))?;
        fs::write(&self.path, serialized).await?;
        Ok(())
    }
}
