//! Disk-backed caching of downloaded pages.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use url::Url;

use crate::types::RagError;

/// Filesystem cache keyed by sanitized URL, so repeated ingest runs can skip
/// the network entirely.
#[derive(Clone, Debug)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache file for a URL: `<host>__<path segments>[__<query>].html`.
    pub fn entry_path(&self, url: &Url) -> PathBuf {
        let mut parts: Vec<String> = Vec::new();
        if let Some(host) = url.host_str() {
            // Dots would read as an extension later; flatten them.
            parts.push(sanitize(host).replace('.', "_"));
        }
        parts.extend(
            url.path()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(sanitize),
        );
        if parts.len() <= 1 {
            parts.push("index".to_string());
        }

        let mut file_name = parts.join("__");
        if let Some(query) = url.query() {
            file_name.push_str("__");
            file_name.push_str(&sanitize(query));
        }
        if Path::new(&file_name).extension().is_none() {
            file_name.push_str(".html");
        }
        self.root.join(file_name)
    }

    /// Default location for the resume tracker's state.
    pub fn state_file(&self) -> PathBuf {
        self.root.join("ingest_state.json")
    }

    async fn read(&self, url: &Url) -> Option<String> {
        let path = self.entry_path(url);
        fs::read_to_string(&path).await.ok()
    }

    async fn write(&self, url: &Url, body: &str) -> Result<(), RagError> {
        let path = self.entry_path(url);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, body).await?;
        Ok(())
    }
}

/// A fetched page plus where it came from.
#[derive(Debug, Clone)]
pub struct PageFetch {
    pub url: Url,
    pub body: String,
    pub bytes: usize,
    pub from_cache: bool,
}

/// Fetches `url`, reading through `cache` when one is provided.
///
/// A cache hit performs no network request; a miss downloads the page and
/// persists it before returning.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    cache: Option<&PageCache>,
) -> Result<PageFetch, RagError> {
    if let Some(cache) = cache
        && let Some(body) = cache.read(url).await
    {
        let bytes = body.len();
        return Ok(PageFetch {
            url: url.clone(),
            body,
            bytes,
            from_cache: true,
        });
    }

    let body = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    if let Some(cache) = cache {
        cache.write(url, &body).await?;
    }

    let bytes = body.len();
    Ok(PageFetch {
        url: url.clone(),
        body,
        bytes,
        from_cache: false,
    })
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
