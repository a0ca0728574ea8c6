//! Windows launcher shim.

use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// File name of the generated launcher shim.
pub const SHIM_NAME: &str = "anycloud.cmd";

/// Batch shim that invokes the real binary next to itself, forwarding all
/// arguments and propagating its exit code.
const SHIM_CONTENTS: &str = "@echo off\r\n\"%~dp0anycloud.exe\" %*\r\nexit /b %ERRORLEVEL%\r\n";

/// Write the launcher shim into the destination directory.
pub fn write_shim<R: Runtime>(runtime: &R, dest: &Path) -> Result<()> {
    let shim_path = dest.join(SHIM_NAME);
    debug!("Writing launcher shim to {:?}", shim_path);
    runtime
        .write(&shim_path, SHIM_CONTENTS.as_bytes())
        .with_context(|| format!("Failed to write launcher shim {:?}", shim_path))?;
    Ok(())
}
