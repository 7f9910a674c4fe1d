use crate::cli::Cli;
use crate::error::SetupError;
use crate::prompt::{LinePrompter, Prompter};
use crate::runner::{CommandRunner, SystemRunner};
use crate::util::xdg;
use crate::{ui, InstallConfig, PackageManager};
use anyhow::Result;

mod install;
mod uninstall;

const NOTES: &[&str] = &[
    "NOTE:",
    "Make sure the setup is in the folder with the Drive Manager files!",
    "When reinstalling the program, make sure it is FULLY uninstalled and the dirs etc. \
     are deleted, otherwise the installation will corrupt.",
    "It is also better if you run the setup with sudo, if you want to add a command to \
     quickly call the application.",
];

/// Top-level menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Install,
    Uninstall,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Result<Self, SetupError> {
        match input.trim().to_lowercase().as_str() {
            "inst" => Ok(MenuChoice::Install),
            "uninst" => Ok(MenuChoice::Uninstall),
            other => Err(SetupError::InvalidChoice(other.to_string())),
        }
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let home = xdg::home_dir()?;
    let source_root = match cli.source {
        Some(dir) => dir,
        None => xdg::executable_dir()?,
    };
    let config = match &cli.config {
        Some(path) => InstallConfig::load(path, source_root, &home)?,
        None => InstallConfig::new(source_root, &home),
    };
    tracing::debug!(?config, "configuration");

    let mut prompter = LinePrompter::stdio();
    run(&config, &SystemRunner, &mut prompter, PackageManager::detect)
}

/// Show the menu and route to the chosen flow.
///
/// `detect` is only called for installs.
pub fn run(
    config: &InstallConfig,
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
    detect: impl FnOnce() -> Option<PackageManager>,
) -> Result<()> {
    let product = &config.product_name;
    ui::banner(format!("Welcome to {product} setup"), NOTES);

    let answer = prompter.ask(&format!(
        "Do you want to install or uninstall {product}? (inst/uninst)"
    ))?;
    match MenuChoice::parse(answer.as_str())? {
        MenuChoice::Install => install::execute(config, runner, prompter, detect()),
        MenuChoice::Uninstall => uninstall::execute(config, runner, prompter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::runner::RecordingRunner;
    use rstest::rstest;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    #[rstest]
    #[case("inst", Some(MenuChoice::Install))]
    #[case("INST\n", Some(MenuChoice::Install))]
    #[case("uninst", Some(MenuChoice::Uninstall))]
    #[case("install", None)]
    #[case("", None)]
    fn test_menu_choice(#[case] input: &str, #[case] expected: Option<MenuChoice>) {
        assert_eq!(MenuChoice::parse(input).ok(), expected);
    }

    #[test]
    fn test_invalid_menu_choice_is_fatal() {
        let home = TempDir::new().unwrap();
        let config = InstallConfig::new(home.path(), home.path());
        let mut prompter = ScriptedPrompter::new(["repair"]);

        let error = run(&config, &RecordingRunner::new(), &mut prompter, || {
            panic!("detection must not run")
        })
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<SetupError>(),
            Some(SetupError::InvalidChoice(choice)) if choice == "repair"
        ));
    }

    #[test]
    fn test_uninstall_route_skips_detection() {
        let home = TempDir::new().unwrap();
        let config = InstallConfig::new(home.path(), home.path());
        fs::create_dir_all(config.dest_root.join("bin")).unwrap();
        let mut prompter = ScriptedPrompter::new(["uninst", "y"]);

        run(&config, &RecordingRunner::new(), &mut prompter, || {
            panic!("detection must not run")
        })
        .unwrap();
        assert!(!config.dest_root.exists());
    }

    #[test]
    fn test_install_route_detects_once() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("README.md"), "readme").unwrap();
        fs::write(source.path().join("config.conf"), "conf").unwrap();
        let home = TempDir::new().unwrap();
        let config = InstallConfig::new(source.path(), home.path());
        let mut prompter = ScriptedPrompter::new(["inst", "n", "n"]);
        let detections = Cell::new(0);

        run(&config, &RecordingRunner::new(), &mut prompter, || {
            detections.set(detections.get() + 1);
            None
        })
        .unwrap();

        assert_eq!(detections.get(), 1);
        assert!(config.dest_root.join("data/config.conf").exists());
    }
}
