use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations inside the installation root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPath {
    /// Installation root: $HOME/.local/share/<Product>
    Root,
    /// Binaries: root/bin
    Bin,
    /// Configuration, key and log files: root/data
    Data,
    /// Repository metadata: root/other
    Other,
    /// Launcher binary and source: root/bin/launcher
    Launcher,
    /// Compiled CLI output: root/bin/bin
    BinBin,
    /// Auxiliary sources: root/bin/other_src
    OtherSrc,
    /// Second native component: root/bin/<component>
    Component,
}

impl InstallPath {
    /// Every directory the stager creates, parents first.
    pub const LAYOUT: [InstallPath; 8] = [
        InstallPath::Root,
        InstallPath::Bin,
        InstallPath::Data,
        InstallPath::Other,
        InstallPath::Launcher,
        InstallPath::BinBin,
        InstallPath::OtherSrc,
        InstallPath::Component,
    ];
}

/// The per-user directory tree holding the staged product files.
#[derive(Debug, Clone)]
pub struct InstallRoot {
    root: PathBuf,
    component: String,
}

impl InstallRoot {
    pub fn new(root: impl Into<PathBuf>, component: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            component: component.into(),
        }
    }

    /// Get path for a specific location in the tree
    pub fn path(&self, path_type: InstallPath) -> PathBuf {
        match path_type {
            InstallPath::Root => self.root.clone(),
            InstallPath::Bin => self.root.join("bin"),
            InstallPath::Data => self.root.join("data"),
            InstallPath::Other => self.root.join("other"),
            InstallPath::Launcher => self.root.join("bin/launcher"),
            InstallPath::BinBin => self.root.join("bin/bin"),
            InstallPath::OtherSrc => self.root.join("bin/other_src"),
            InstallPath::Component => self.root.join("bin").join(&self.component),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Create the fixed directory layout. Existing directories are kept.
    pub fn create_layout(&self) -> Result<Vec<PathBuf>> {
        InstallPath::LAYOUT
            .iter()
            .map(|kind| {
                let dir = self.path(*kind);
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory {:?}", dir))?;
                tracing::debug!(dir = %dir.display(), "created");
                Ok(dir)
            })
            .collect()
    }

    /// Delete the whole tree.
    ///
    /// Returns `false` when there was nothing to delete.
    pub fn remove(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&self.root)
            .with_context(|| format!("Failed to remove installation {:?}", self.root))?;
        tracing::debug!(root = %self.root.display(), "removed installation root");
        Ok(true)
    }
}
