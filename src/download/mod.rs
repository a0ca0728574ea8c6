//! Download capability.
//!
//! [`Fetcher`] is the seam between the install pipeline and the network:
//! the pipeline asks for "this URL into this file" and never sees HTTP
//! details, so tests can substitute [`MockFetcher`].

use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fetches a URL into a local file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into the file at `dest`. Returns the bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// HTTP-backed [`Fetcher`] writing through the [`Runtime`].
pub struct HttpFetcher<R: Runtime> {
    runtime: Arc<R>,
    client: HttpClient,
}

impl<R: Runtime> HttpFetcher<R> {
    pub fn new(runtime: Arc<R>, client: HttpClient) -> Self {
        Self { runtime, client }
    }
}

#[async_trait]
impl<R: Runtime + 'static> Fetcher for HttpFetcher<R> {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Downloading {} to {:?}...", url, dest);

        let dest: PathBuf = dest.to_path_buf();
        let bytes = self
            .client
            .download_file(url, || {
                self.runtime
                    .create_file(&dest)
                    .with_context(|| format!("Failed to create download file at {:?}", dest))
            })
            .await?;

        info!("Download complete.");
        Ok(bytes)
    }
}
