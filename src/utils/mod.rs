use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

/// `$STACKDECK_HOME` when set, else `~/.stackdeck`.
pub fn get_stackdeck_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os("STACKDECK_HOME"))
}

fn resolve_home(override_dir: Option<OsString>) -> Result<PathBuf> {
    if let Some(home) = override_dir.filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".stackdeck"))
}
