use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Get the home directory
pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .context("Failed to get home directory")
        .map(|bd| bd.home_dir().to_path_buf())
}

/// Get the directory holding the running executable
///
/// The installer ships inside the product checkout, so this is the default
/// source root.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to locate the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(PathBuf::from)
        .with_context(|| format!("Executable path {:?} has no parent directory", exe))
}
