//! Page-relative asset fetching (stylesheet, script, images, fallback document).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{path}: HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path}: not found")]
    NotFound { path: String },

    #[error("{path}: path escapes the asset root")]
    OutsideRoot { path: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a path relative to the page and returns its bytes.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError>;
}

/// Serves assets from a directory on disk.
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches("./"));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(FetchError::OutsideRoot {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => {
                debug!("Read asset {} ({} bytes)", full.display(), data.len());
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
                path: path.to_string(),
            }),
            Err(source) => Err(FetchError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Fetches assets over HTTP relative to a base URL.
#[derive(Clone)]
pub struct HttpAssetSource {
    client: Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    /// Resolves `path` against the base URL. The result must keep the base
    /// origin and stay under its path; absolute URLs elsewhere and `..`
    /// segments climbing out are refused.
    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        let outside = || FetchError::OutsideRoot {
            path: path.to_string(),
        };
        let base = Url::parse(&self.base_url).map_err(|_| outside())?;
        let url = base
            .join(path.trim_start_matches("./").trim_start_matches('/'))
            .map_err(|_| outside())?;
        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            return Err(outside());
        }
        Ok(url)
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.url_for(path)?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?)
    }
}
