//! The install pipeline.
//!
//! A strictly sequential run with no branching back:
//!
//! ```text
//! resolve target -> create destination -> download -> extract -> shim
//! ```
//!
//! Every failure is fatal. Each stage maps to its own exit code so a caller
//! can tell which stage failed; nothing is retried and no partially created
//! state is removed.

mod shim;

use anyhow::Result;
use log::info;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    archive::{ArchiveExtractorImpl, Extractor},
    download::{Fetcher, HttpFetcher},
    http::HttpClient,
    platform::Platform,
    release::ReleaseTarget,
    runtime::Runtime,
};

pub use shim::SHIM_NAME;

const USER_AGENT: &str = "get-anycloud";

/// Stage-tagged fatal errors, one variant per failing pipeline stage.
#[derive(Debug)]
pub enum InstallError {
    /// Destination directory already exists or cannot be created.
    Destination(anyhow::Error),
    /// The release archive could not be downloaded.
    Download(anyhow::Error),
    /// The downloaded archive could not be extracted or finalized.
    Extract(anyhow::Error),
}

impl InstallError {
    /// Process exit code for this failure stage.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::Destination(_) => 1,
            InstallError::Download(_) => 2,
            InstallError::Extract(_) => 3,
        }
    }
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // {:#} prints the whole cause chain, so the raw diagnostic of the
        // underlying failure reaches the console untranslated
        match self {
            InstallError::Destination(e) => {
                write!(f, "Failed to create destination directory: {:#}", e)
            }
            InstallError::Download(e) => write!(f, "Download failed: {:#}", e),
            InstallError::Extract(e) => write!(f, "Extraction failed: {:#}", e),
        }
    }
}

impl std::error::Error for InstallError {}

/// Settings for one install run, threaded through explicitly; the pipeline
/// never reads ambient process state.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub dest: PathBuf,
    pub version: String,
    pub base_url: String,
    pub platform: Option<Platform>,
}

/// The install pipeline over injected capabilities.
pub struct Installer<R, F, E>
where
    R: Runtime + 'static,
    F: Fetcher,
    E: Extractor,
{
    runtime: Arc<R>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
}

impl<R, F, E> Installer<R, F, E>
where
    R: Runtime + 'static,
    F: Fetcher,
    E: Extractor,
{
    pub fn new(runtime: Arc<R>, fetcher: Arc<F>, extractor: Arc<E>) -> Self {
        Self {
            runtime,
            fetcher,
            extractor,
        }
    }

    /// Run the pipeline for a resolved target.
    ///
    /// Stage order is load-bearing: an existing destination fails the run
    /// before any network request is made, and a failed download skips
    /// extraction entirely.
    #[tracing::instrument(skip(self, target, dest))]
    pub async fn run(&self, target: &ReleaseTarget, dest: &Path) -> Result<(), InstallError> {
        self.runtime
            .create_dir(dest)
            .map_err(InstallError::Destination)?;

        let archive_path = dest.join(&target.archive_name);
        self.fetcher
            .fetch(&target.url, &archive_path)
            .await
            .map_err(InstallError::Download)?;

        self.extractor
            .extract(self.runtime.as_ref(), &archive_path, dest)
            .map_err(InstallError::Extract)?;

        // Only the Windows branch needs a launcher shim; the shim completes
        // the extracted tree, so its failure reports under the extract stage
        if target.platform == Platform::WindowsLike {
            shim::write_shim(self.runtime.as_ref(), dest).map_err(InstallError::Extract)?;
        }

        info!("Installed {} into {:?}", target.archive_name, dest);
        Ok(())
    }
}

/// Resolve the target and run the pipeline with the real capability set.
#[tracing::instrument(skip(runtime, options))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    options: InstallOptions,
) -> Result<(), InstallError> {
    let platform = options.platform.unwrap_or_else(Platform::detect);
    let target = ReleaseTarget::resolve(platform, &options.version, &options.base_url);
    info!("Resolved release target: {}", target.url);

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| InstallError::Download(e.into()))?;

    let runtime = Arc::new(runtime);
    let fetcher = HttpFetcher::new(Arc::clone(&runtime), HttpClient::new(client));
    let installer = Installer::new(
        runtime,
        Arc::new(fetcher),
        Arc::new(ArchiveExtractorImpl::new()),
    );

    installer.run(&target, &options.dest).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MockExtractor;
    use crate::download::MockFetcher;
    use crate::release::DEFAULT_BASE_URL;
    use crate::runtime::MockRuntime;
    use anyhow::anyhow;

    fn target_for(platform: Platform) -> ReleaseTarget {
        ReleaseTarget::resolve(platform, "1.2.3", DEFAULT_BASE_URL)
    }

    #[tokio::test]
    async fn test_existing_destination_fails_before_any_fetch() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_dir()
            .returning(|path| Err(anyhow!("File exists: {:?}", path)));

        // Strict mocks: any fetch or extract call would panic
        let fetcher = MockFetcher::new();
        let extractor = MockExtractor::new();

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        let err = installer
            .run(&target_for(Platform::MacLike), Path::new("bin"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Destination(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_download_failure_skips_extraction() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir().returning(|_| Ok(()));

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Err(anyhow!("connection refused")));

        // Strict: extraction must not be attempted
        let extractor = MockExtractor::new();

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        let err = installer
            .run(&target_for(Platform::OtherLike), Path::new("bin"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Download(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir().returning(|_| Ok(()));

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|_, _| Ok(1024));

        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract::<MockRuntime>()
            .returning(|_, _, _| Err(anyhow!("archive is corrupt")));

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        let err = installer
            .run(&target_for(Platform::MacLike), Path::new("bin"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Extract(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_windows_branch_writes_shim() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir().returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("bin").join(SHIM_NAME)
                    && contents.starts_with(b"@echo off")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url, dest| {
                url.ends_with("/v1.2.3/anycloud-windows.zip")
                    && dest == Path::new("bin").join("anycloud-windows.zip")
            })
            .returning(|_, _| Ok(1024));

        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract::<MockRuntime>()
            .returning(|_, _, _| Ok(()));

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        installer
            .run(&target_for(Platform::WindowsLike), Path::new("bin"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mac_branch_writes_no_shim() {
        // Strict MockRuntime: an unexpected write (the shim) would panic
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir().returning(|_| Ok(()));

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url, _| url.ends_with("/v1.2.3/anycloud-macos.tar.gz"))
            .returning(|_, _| Ok(1024));

        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract::<MockRuntime>()
            .returning(|_, _, _| Ok(()));

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        installer
            .run(&target_for(Platform::MacLike), Path::new("bin"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_shim_write_failure_reports_extract_stage() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir().returning(|_| Ok(()));
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow!("read-only file system")));

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|_, _| Ok(1024));

        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract::<MockRuntime>()
            .returning(|_, _, _| Ok(()));

        let installer = Installer::new(
            Arc::new(runtime),
            Arc::new(fetcher),
            Arc::new(extractor),
        );
        let err = installer
            .run(&target_for(Platform::WindowsLike), Path::new("bin"))
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_install_error_display_carries_cause() {
        let err = InstallError::Download(anyhow!("connection refused"));
        let text = err.to_string();
        assert!(text.contains("Download failed"));
        assert!(text.contains("connection refused"));

        let err = InstallError::Destination(anyhow!("File exists"));
        assert!(err.to_string().contains("destination directory"));

        let err = InstallError::Extract(anyhow!("bad magic"));
        assert!(err.to_string().contains("Extraction failed"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            InstallError::Destination(anyhow!("x")).exit_code(),
            InstallError::Download(anyhow!("x")).exit_code(),
            InstallError::Extract(anyhow!("x")).exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3]);
    }
}
