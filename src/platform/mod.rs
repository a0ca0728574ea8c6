//! Host platform classification.
//!
//! The installer only distinguishes three classes of platform: macOS-like,
//! Windows-like, and everything else. Everything else takes the Linux branch
//! rather than failing, so an unknown OS still gets a best-effort install.

use clap::ValueEnum;

/// Closed set of platform branches the installer knows about.
///
/// Resolved once at startup and matched exhaustively afterwards, so a new
/// branch cannot be forgotten at any step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    /// macOS and close relatives.
    #[value(name = "macos")]
    MacLike,
    /// Windows.
    #[value(name = "windows")]
    WindowsLike,
    /// Linux and anything unrecognized.
    #[value(name = "linux")]
    OtherLike,
}

impl Platform {
    /// Detect the platform this binary was compiled for.
    pub fn detect() -> Self {
        Self::from_identifier(std::env::consts::OS)
    }

    /// Classify an OS identifier string.
    ///
    /// Accepts both Rust-style (`macos`, `windows`) and Node-style
    /// (`darwin`, `win32`) identifiers. Anything unrecognized falls back to
    /// [`Platform::OtherLike`]; this is a deliberate permissive default.
    pub fn from_identifier(os: &str) -> Self {
        match os {
            "macos" | "darwin" => Platform::MacLike,
            "windows" | "win32" => Platform::WindowsLike,
            other => {
                log::debug!("Unrecognized OS identifier {:?}, using the Linux branch", other);
                Platform::OtherLike
            }
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::MacLike => "macos",
            Platform::WindowsLike => "windows",
            Platform::OtherLike => "linux",
        };
        write!(f, "{}", name)
    }
}
