use std::ffi::OsStr;
use std::fmt;

/// Native package managers the installer knows how to drive, in detection
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

/// How a package manager spells install and remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: &'static str,
    pub install_verb: &'static str,
    pub remove_verb: &'static str,
    pub confirm_flag: &'static str,
}

impl PackageManager {
    /// All managers in the order `detect` tries them.
    pub const PRIORITY: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    pub fn template(self) -> CommandTemplate {
        match self {
            PackageManager::Apt => CommandTemplate {
                program: "apt",
                install_verb: "install",
                remove_verb: "remove",
                confirm_flag: "-y",
            },
            PackageManager::Dnf => CommandTemplate {
                program: "dnf",
                install_verb: "install",
                remove_verb: "remove",
                confirm_flag: "-y",
            },
            PackageManager::Yum => CommandTemplate {
                program: "yum",
                install_verb: "install",
                remove_verb: "remove",
                confirm_flag: "-y",
            },
            PackageManager::Pacman => CommandTemplate {
                program: "pacman",
                install_verb: "-S",
                remove_verb: "-R",
                confirm_flag: "--noconfirm",
            },
            PackageManager::Zypper => CommandTemplate {
                program: "zypper",
                install_verb: "install",
                remove_verb: "remove",
                confirm_flag: "-y",
            },
        }
    }

    pub fn program(self) -> &'static str {
        self.template().program
    }

    /// Arguments (after the program name) that install `package` unattended.
    pub fn install_args(self, package: &str) -> Vec<String> {
        let template = self.template();
        vec![
            template.install_verb.to_string(),
            template.confirm_flag.to_string(),
            package.to_string(),
        ]
    }

    /// Arguments (after the program name) that remove `package` unattended.
    pub fn remove_args(self, package: &str) -> Vec<String> {
        let template = self.template();
        vec![
            template.remove_verb.to_string(),
            template.confirm_flag.to_string(),
            package.to_string(),
        ]
    }

    /// Find the first manager whose executable is on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::detect_with(|program| which::which(program).is_ok())
    }

    /// Like [`PackageManager::detect`], but searching an explicit path list
    /// (same syntax as `PATH`).
    pub fn detect_in(paths: impl AsRef<OsStr>) -> Option<Self> {
        let paths = paths.as_ref();
        let cwd = std::env::current_dir().ok()?;
        Self::detect_with(|program| which::which_in(program, Some(paths), &cwd).is_ok())
    }

    /// Find the first manager for which `is_present` returns true.
    pub fn detect_with(mut is_present: impl FnMut(&str) -> bool) -> Option<Self> {
        let found = Self::PRIORITY
            .into_iter()
            .find(|manager| is_present(manager.program()));
        tracing::debug!(manager = ?found, "package manager detection");
        found
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn fake_executable(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[rstest]
    #[case(PackageManager::Apt, "apt", "install", "remove", "-y")]
    #[case(PackageManager::Dnf, "dnf", "install", "remove", "-y")]
    #[case(PackageManager::Yum, "yum", "install", "remove", "-y")]
    #[case(PackageManager::Pacman, "pacman", "-S", "-R", "--noconfirm")]
    #[case(PackageManager::Zypper, "zypper", "install", "remove", "-y")]
    fn test_templates(
        #[case] manager: PackageManager,
        #[case] program: &str,
        #[case] install: &str,
        #[case] remove: &str,
        #[case] confirm: &str,
    ) {
        assert_eq!(manager.program(), program);
        assert_eq!(manager.install_args("pkg"), [install, confirm, "pkg"]);
        assert_eq!(manager.remove_args("pkg"), [remove, confirm, "pkg"]);
    }

    #[rstest]
    #[case(&["apt", "dnf", "yum", "pacman", "zypper"], Some(PackageManager::Apt))]
    #[case(&["zypper", "dnf"], Some(PackageManager::Dnf))]
    #[case(&["zypper", "yum"], Some(PackageManager::Yum))]
    #[case(&["zypper", "pacman"], Some(PackageManager::Pacman))]
    #[case(&["zypper"], Some(PackageManager::Zypper))]
    #[case(&["brew", "apk"], None)]
    #[case(&[], None)]
    fn test_detect_with_respects_priority(
        #[case] present: &[&str],
        #[case] expected: Option<PackageManager>,
    ) {
        assert_eq!(
            PackageManager::detect_with(|program| present.contains(&program)),
            expected
        );
    }

    #[test]
    fn test_detect_in_finds_executables_on_search_path() {
        let bin = TempDir::new().unwrap();
        fake_executable(bin.path(), "pacman");
        fake_executable(bin.path(), "zypper");

        assert_eq!(
            PackageManager::detect_in(bin.path()),
            Some(PackageManager::Pacman)
        );
    }

    #[test]
    fn test_detect_in_ignores_non_executable_files() {
        let bin = TempDir::new().unwrap();
        fs::write(bin.path().join("apt"), "not executable").unwrap();
        fake_executable(bin.path(), "dnf");

        assert_eq!(
            PackageManager::detect_in(bin.path()),
            Some(PackageManager::Dnf)
        );
    }

    #[test]
    fn test_detect_in_empty_path() {
        let bin = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect_in(bin.path()), None);
    }
}
