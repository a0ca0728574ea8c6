//! Release target resolution.
//!
//! Maps a platform branch and a version tag to the release archive to
//! download. The archive name and its format always come out of the same
//! match arm, so they cannot disagree.

use crate::platform::Platform;

/// Default download base for anycloud release archives.
pub const DEFAULT_BASE_URL: &str = "https://github.com/alantech/anycloud/releases/download";

/// Archive formats the installer can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

/// The archive to fetch for one run: which platform branch was taken, what
/// file to download, where from, and how to unpack it.
///
/// Recomputed on every run from the host platform and version tag; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    pub platform: Platform,
    pub archive_name: String,
    pub url: String,
    pub format: ArchiveFormat,
}

impl ReleaseTarget {
    /// Resolve the release archive for a platform and version tag.
    ///
    /// Infallible: every platform branch has an archive. The URL has the
    /// shape `<base>/v<version>/<archive_name>`.
    pub fn resolve(platform: Platform, version: &str, base_url: &str) -> Self {
        let (archive_name, format) = match platform {
            Platform::MacLike => ("anycloud-macos.tar.gz", ArchiveFormat::TarGz),
            Platform::WindowsLike => ("anycloud-windows.zip", ArchiveFormat::Zip),
            Platform::OtherLike => ("anycloud-ubuntu.tar.gz", ArchiveFormat::TarGz),
        };

        let url = format!("{}/v{}/{}", base_url.trim_end_matches('/'), version, archive_name);

        Self {
            platform,
            archive_name: archive_name.to_string(),
            url,
            format,
        }
    }
}
