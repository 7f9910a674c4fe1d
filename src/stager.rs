use crate::error::SetupError;
use crate::install_root::InstallRoot;
use crate::outcome::Outcome;
use crate::ui;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One unit of payload: a file or directory tree relative to the source root,
/// and its destination directory relative to the installation root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ManifestEntry {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// The Drive Manager payload, with `component` naming the second native
/// component's directory.
pub fn default_manifest(component: &str) -> Vec<ManifestEntry> {
    let component_dir = format!("bin/{component}");
    vec![
        ManifestEntry::new("DriveMgr_CLI", "bin/other_src"),
        ManifestEntry::new("config.conf", "data"),
        ManifestEntry::new("launcher/launcher", "bin/launcher"),
        ManifestEntry::new("launcher/launcher.c", "bin/launcher"),
        ManifestEntry::new("CODE_OF_CONDUCT.md", "other"),
        ManifestEntry::new("README.md", "other"),
        ManifestEntry::new("LICENSE.md", "other"),
        ManifestEntry::new("SECURITY.md", "other"),
        ManifestEntry::new("CONTRIBUTING.md", "other"),
        ManifestEntry::new(".github", "other"),
        ManifestEntry::new("log and key file/key.bin", "data"),
        ManifestEntry::new("log and key file/log.dat", "data"),
        ManifestEntry::new(format!("{component}/{component}"), component_dir),
        ManifestEntry::new(format!("{component}/main_{component}.cpp"), "bin/other_src"),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub directories: Vec<PathBuf>,
    pub entries: Vec<(ManifestEntry, Outcome)>,
}

impl StageReport {
    pub fn copied(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::Completed)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &(ManifestEntry, Outcome)> {
        self.entries.iter().filter(|(_, outcome)| outcome.is_failed())
    }
}

/// Check that `source_root` looks like a product checkout.
///
/// A missing root, or one with at most one entry, is fatal.
pub fn validate_source_root(source_root: &Path, product: &str) -> Result<()> {
    let entries = match fs::read_dir(source_root) {
        Ok(dir) => dir.filter_map(|entry| entry.ok()).count(),
        Err(error) => {
            tracing::debug!(root = %source_root.display(), %error, "cannot read source root");
            0
        }
    };

    if entries <= 1 {
        return Err(SetupError::SourceTreeMissing {
            product: product.to_string(),
            root: source_root.to_path_buf(),
            entries,
        }
        .into());
    }
    Ok(())
}

/// Create the installation layout and copy every manifest entry into it.
///
/// Each entry is copied independently; a failure is recorded in the
/// [`StageReport`] instead of stopping the pass.
pub fn stage(
    manifest: &[ManifestEntry],
    source_root: &Path,
    install: &InstallRoot,
    product: &str,
) -> Result<StageReport> {
    validate_source_root(source_root, product)?;

    let directories = install.create_layout()?;
    ui::success("Created", "installation directories");

    let mut entries = Vec::with_capacity(manifest.len());
    for entry in manifest {
        let source = source_root.join(&entry.source);
        let destination = install.root().join(&entry.destination);

        let outcome = match copy_entry(&source, &destination) {
            Ok(()) => {
                ui::status(
                    "Copied",
                    format!(
                        "{} -> {}",
                        entry.source.display(),
                        entry.destination.display()
                    ),
                );
                Outcome::Completed
            }
            Err(error) => {
                let reason = format!("{error:#}");
                tracing::debug!(source = %entry.source.display(), %reason, "copy failed");
                ui::error(format!(
                    "Failed to copy {}: {reason}",
                    entry.source.display()
                ));
                Outcome::Failed(reason)
            }
        };
        entries.push((entry.clone(), outcome));
    }

    Ok(StageReport {
        directories,
        entries,
    })
}

fn copy_entry(source: &Path, destination: &Path) -> Result<()> {
    let name = source
        .file_name()
        .with_context(|| format!("Source path {:?} has no file name", source))?;

    if source.is_dir() {
        merge_dir(source, &destination.join(name))
    } else {
        let target = if destination.is_dir() {
            destination.join(name)
        } else {
            destination.to_path_buf()
        };
        fs::copy(source, &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", source, target))?;
        Ok(())
    }
}

/// Recursively copy `source` into `target`, overwriting files that already
/// exist and keeping everything else in `target`.
///
/// Symlinked directories are copied as directories. A path that fails does
/// not stop the walk; all failures are reported together at the end.
fn merge_dir(source: &Path, target: &Path) -> Result<()> {
    let mut errors = Vec::new();

    for entry in WalkDir::new(source).follow_links(true) {
        let result = entry
            .with_context(|| format!("Failed to walk {:?}", source))
            .and_then(|entry| merge_entry(source, target, &entry));
        if let Err(error) = result {
            tracing::debug!(%error, "skipped while staging");
            errors.push(format!("{error:#}"));
        }
    }

    if !errors.is_empty() {
        bail!(
            "{} path(s) under {:?} could not be copied: {}",
            errors.len(),
            source,
            errors.join("; ")
        );
    }
    Ok(())
}

fn merge_entry(source: &Path, target: &Path, entry: &DirEntry) -> Result<()> {
    let relative = entry
        .path()
        .strip_prefix(source)
        .context("Walked path outside of source directory")?;
    let dest = target.join(relative);

    if entry.file_type().is_dir() {
        fs::create_dir_all(&dest)
            .with_context(|| format!("Failed to create directory {:?}", dest))?;
    } else {
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), dest))?;
    }
    tracing::trace!(path = %dest.display(), "staged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install_root::InstallPath;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn sample_source(root: &Path) {
        write(&root.join("DriveMgr_CLI/src/DriveMgr_experi.cpp"), "int main() {}");
        write(&root.join("DriveMgr_CLI/include/debug.h"), "#pragma once");
        write(&root.join("config.conf"), "color=1");
        write(&root.join("launcher/launcher"), "\x7fELF");
        write(&root.join("README.md"), "# Drive Manager");
        write(&root.join(".github/workflows/ci.yml"), "on: push");
        write(&root.join("log and key file/key.bin"), "key");
        write(&root.join("Lume/Lume"), "\x7fELF");
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, Option<String>)> {
        let mut entries: Vec<_> = WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let contents = e
                    .file_type()
                    .is_file()
                    .then(|| fs::read_to_string(e.path()).unwrap());
                (e.path().strip_prefix(root).unwrap().to_path_buf(), contents)
            })
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_default_manifest_uses_component_name() {
        let manifest = default_manifest("Lume");
        assert_eq!(manifest.len(), 14);
        assert!(manifest.contains(&ManifestEntry::new("Lume/Lume", "bin/Lume")));
        assert!(manifest.contains(&ManifestEntry::new("Lume/main_Lume.cpp", "bin/other_src")));
    }

    #[test]
    fn test_stage_copies_files_and_trees() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        sample_source(source.path());
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");

        let report = stage(&default_manifest("Lume"), source.path(), &install, "DriveMgr").unwrap();

        let other_src = install.path(InstallPath::OtherSrc);
        assert!(other_src.join("DriveMgr_CLI/src/DriveMgr_experi.cpp").exists());
        assert!(other_src.join("DriveMgr_CLI/include/debug.h").exists());
        assert!(install.path(InstallPath::Data).join("config.conf").exists());
        assert!(install.path(InstallPath::Data).join("key.bin").exists());
        assert!(install.path(InstallPath::Launcher).join("launcher").exists());
        assert!(install.path(InstallPath::Other).join(".github/workflows/ci.yml").exists());
        assert!(install.path(InstallPath::Component).join("Lume").exists());

        assert_eq!(report.directories.len(), InstallPath::LAYOUT.len());
        assert_eq!(report.copied(), 7);
        // launcher.c, CODE_OF_CONDUCT, LICENSE, SECURITY, CONTRIBUTING, log.dat, main_Lume.cpp
        assert_eq!(report.failed().count(), 7);
    }

    #[test]
    fn test_stage_is_idempotent() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        sample_source(source.path());
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");
        let manifest = default_manifest("Lume");

        stage(&manifest, source.path(), &install, "DriveMgr").unwrap();
        let first = snapshot(install.root());

        let report = stage(&manifest, source.path(), &install, "DriveMgr").unwrap();
        assert_eq!(snapshot(install.root()), first);
        assert_eq!(report.copied(), 7);
    }

    #[test]
    fn test_merge_overwrites_and_keeps_existing_files() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        sample_source(source.path());
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");
        let manifest = vec![ManifestEntry::new("DriveMgr_CLI", "bin/other_src")];

        let staged = install.path(InstallPath::OtherSrc).join("DriveMgr_CLI");
        write(&staged.join("src/DriveMgr_experi.cpp"), "stale");
        write(&staged.join("build/extra.o"), "object");

        stage(&manifest, source.path(), &install, "DriveMgr").unwrap();

        assert_eq!(
            fs::read_to_string(staged.join("src/DriveMgr_experi.cpp")).unwrap(),
            "int main() {}"
        );
        assert!(staged.join("build/extra.o").exists());
    }

    #[test]
    fn test_merge_follows_symlinked_directories() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        sample_source(source.path());
        let cli = source.path().join("DriveMgr_CLI");
        std::os::unix::fs::symlink(cli.join("include"), cli.join("aaa_inc")).unwrap();
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");
        let manifest = vec![ManifestEntry::new("DriveMgr_CLI", "bin/other_src")];

        let report = stage(&manifest, source.path(), &install, "DriveMgr").unwrap();

        assert_eq!(report.copied(), 1);
        let staged = install.path(InstallPath::OtherSrc).join("DriveMgr_CLI");
        assert!(staged.join("aaa_inc").is_dir());
        assert_eq!(
            fs::read_to_string(staged.join("aaa_inc/debug.h")).unwrap(),
            "#pragma once"
        );
        assert!(staged.join("include/debug.h").exists());
    }

    #[test]
    fn test_merge_keeps_copying_past_a_bad_path() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        sample_source(source.path());
        let cli = source.path().join("DriveMgr_CLI");
        std::os::unix::fs::symlink(cli.join("missing.h"), cli.join("aaa_dangling.h")).unwrap();
        write(&cli.join("zzz/last.h"), "last");
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");
        let manifest = vec![ManifestEntry::new("DriveMgr_CLI", "bin/other_src")];

        let report = stage(&manifest, source.path(), &install, "DriveMgr").unwrap();

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        match &failed[0].1 {
            Outcome::Failed(reason) => {
                assert!(reason.contains("1 path(s)"), "{reason}");
                assert!(reason.contains("aaa_dangling.h"), "{reason}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let staged = install.path(InstallPath::OtherSrc).join("DriveMgr_CLI");
        assert!(staged.join("src/DriveMgr_experi.cpp").exists());
        assert!(staged.join("include/debug.h").exists());
        assert!(staged.join("zzz/last.h").exists());
        assert!(!staged.join("aaa_dangling.h").exists());
    }

    #[test]
    fn test_sparse_source_aborts_before_creating_directories() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(&source.path().join("setup"), "binary");
        let install = InstallRoot::new(dest.path().join("DriveMgr"), "Lume");

        let error = stage(&default_manifest("Lume"), source.path(), &install, "DriveMgr")
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<SetupError>(),
            Some(SetupError::SourceTreeMissing { entries: 1, .. })
        ));
        assert!(!install.exists());
    }

    #[test]
    fn test_missing_source_root_is_fatal() {
        let dest = TempDir::new().unwrap();
        let missing = dest.path().join("nowhere");
        let error = validate_source_root(&missing, "DriveMgr").unwrap_err();
        assert!(error.to_string().contains("DriveMgr"));
    }
}
