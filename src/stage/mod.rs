//! Build-from-source staging.
//!
//! The packaged build of the CLI compiles against the `alan` toolchain, which
//! ships as its own prebuilt release archive. `stage` fetches that archive
//! into the build working directory and marks the binary executable so the
//! package-manager-native install step finds it on `PATH`. Errors here are
//! plain diagnostics; this path has no exit-code taxonomy of its own.

use anyhow::{Context, Result};
use log::info;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    archive::{ArchiveExtractorImpl, Extractor},
    download::{Fetcher, HttpFetcher},
    http::HttpClient,
    platform::Platform,
    runtime::Runtime,
};

/// Default download base for alan toolchain archives.
pub const DEFAULT_ALAN_BASE_URL: &str = "https://github.com/alantech/alan/releases/download";

/// Default alan release tag the CLI builds against.
pub const DEFAULT_ALAN_TAG: &str = "0.1.30";

/// Settings for one staging run.
#[derive(Debug, Clone)]
pub struct StageOptions {
    pub work_dir: PathBuf,
    pub tag: String,
    pub base_url: String,
    pub platform: Option<Platform>,
}

/// Archive name for the alan toolchain on a platform branch. Follows the
/// same three-way mapping as the main release.
pub fn alan_archive_name(platform: Platform) -> &'static str {
    match platform {
        Platform::MacLike => "alan-macos.tar.gz",
        Platform::WindowsLike => "alan-windows.zip",
        Platform::OtherLike => "alan-ubuntu.tar.gz",
    }
}

/// Name of the staged toolchain binary on a platform branch.
pub fn staged_binary_name(platform: Platform) -> &'static str {
    match platform {
        Platform::WindowsLike => "alan.exe",
        Platform::MacLike | Platform::OtherLike => "alan",
    }
}

/// Fetch and unpack the alan archive into the working directory.
///
/// Unlike the install pipeline, an existing working directory is reused: the
/// build tree already exists when staging runs.
#[tracing::instrument(skip(runtime, fetcher, extractor, options))]
pub async fn run<R, F, E>(
    runtime: &Arc<R>,
    fetcher: &F,
    extractor: &E,
    options: &StageOptions,
) -> Result<()>
where
    R: Runtime + 'static,
    F: Fetcher,
    E: Extractor,
{
    let platform = options.platform.unwrap_or_else(Platform::detect);
    let archive_name = alan_archive_name(platform);
    let url = format!(
        "{}/v{}/{}",
        options.base_url.trim_end_matches('/'),
        options.tag,
        archive_name
    );

    runtime
        .create_dir_all(&options.work_dir)
        .with_context(|| format!("Failed to create working directory {:?}", options.work_dir))?;

    let archive_path = options.work_dir.join(archive_name);
    fetcher.fetch(&url, &archive_path).await?;

    extractor.extract(runtime.as_ref(), &archive_path, &options.work_dir)?;

    let binary = options.work_dir.join(staged_binary_name(platform));
    if platform != Platform::WindowsLike {
        runtime
            .set_permissions(&binary, 0o755)
            .with_context(|| format!("Failed to mark {:?} executable", binary))?;
    }

    info!("Staged {} into {:?}", archive_name, options.work_dir);
    Ok(())
}

/// Stage with the real capability set.
#[tracing::instrument(skip(runtime, options))]
pub async fn stage<R: Runtime + 'static>(runtime: R, options: StageOptions) -> Result<()> {
    let client = Client::builder()
        .user_agent("get-anycloud")
        .build()
        .context("Failed to build HTTP client")?;

    let runtime = Arc::new(runtime);
    let fetcher = HttpFetcher::new(Arc::clone(&runtime), HttpClient::new(client));
    run(
        &runtime,
        &fetcher,
        &ArchiveExtractorImpl::new(),
        &options,
    )
    .await
}
