use crate::config::InstallConfig;
use crate::dependencies::{resolve_packages, DependencyReport, Reconciler};
use crate::error::SetupError;
use crate::install_root::InstallRoot;
use crate::outcome::Outcome;
use crate::package_manager::PackageManager;
use crate::prompt::{Answer, Prompter};
use crate::runner::CommandRunner;
use crate::stager::{self, StageReport};
use crate::ui;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    StartInstall,
    Staged,
    DependenciesChecked,
    CompileDecided,
    DependenciesTornDown,
    Compiled,
    Done,
}

/// How the answers to "compile automatically?" and "compile the CLI?" combine.
///
/// Automatic compilation is the master switch and the CLI is its only target,
/// so both must be `y` for the compiler to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileDecision {
    Compile,
    /// Automatic compilation was not requested.
    Declined,
    /// Automatic compilation was requested but the CLI answer was `n`.
    SkippedCli,
    /// Automatic compilation was requested but the CLI answer was not `y`/`n`.
    InvalidCliAnswer(String),
}

impl CompileDecision {
    pub fn from_answers(auto_compile: &Answer, compile_cli: &Answer) -> Self {
        if !auto_compile.is_yes() {
            return CompileDecision::Declined;
        }
        match compile_cli {
            Answer::Yes => CompileDecision::Compile,
            Answer::No => CompileDecision::SkippedCli,
            Answer::Other(text) => CompileDecision::InvalidCliAnswer(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub staged: StageReport,
    /// `None` when no package manager was available.
    pub dependencies: Option<DependencyReport>,
    pub decision: CompileDecision,
    pub teardown: Option<DependencyReport>,
    /// Package providing the compiler, when it was removed right before compiling.
    pub compiler_removed: Option<String>,
    pub compile: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    NotInstalled,
    Cancelled,
}

/// Drives the install and uninstall flows.
///
/// Removal of dependencies is offered before compiling, so a user can remove
/// the compiler right before it is needed.
pub struct Installer<'a> {
    config: &'a InstallConfig,
    runner: &'a dyn CommandRunner,
    prompter: &'a mut dyn Prompter,
    manager: Option<PackageManager>,
}

impl<'a> Installer<'a> {
    pub fn new(
        config: &'a InstallConfig,
        runner: &'a dyn CommandRunner,
        prompter: &'a mut dyn Prompter,
        manager: Option<PackageManager>,
    ) -> Self {
        Self {
            config,
            runner,
            prompter,
            manager,
        }
    }

    fn install_root(&self) -> InstallRoot {
        self.config.install_root()
    }

    fn reconciler(&mut self) -> Reconciler<'_> {
        Reconciler::new(
            self.manager,
            self.runner,
            &mut *self.prompter,
            &self.config.probe_args,
            &self.config.elevate_with,
        )
    }

    fn enter(stage: InstallStage) {
        tracing::debug!(?stage, "install stage");
    }

    pub fn install(&mut self) -> Result<InstallSummary> {
        let config = self.config;
        let install = self.install_root();

        Self::enter(InstallStage::StartInstall);
        stager::validate_source_root(&config.source_root, &config.product_name)?;

        let staged = stager::stage(
            &config.manifest,
            &config.source_root,
            &install,
            &config.product_name,
        )?;
        ui::success("Staged", format!("files into {}", install.root().display()));
        Self::enter(InstallStage::Staged);

        ui::status("Checking", "dependencies");
        let dependencies = self.reconciler().reconcile(&config.dependencies)?;
        Self::enter(InstallStage::DependenciesChecked);

        let auto_compile = self
            .prompter
            .ask("Do you want to automatically compile the application? (y/n)")?;
        let compile_cli = self.prompter.ask("Do you want the CLI to be compiled? (y/n)")?;
        let decision = CompileDecision::from_answers(&auto_compile, &compile_cli);
        Self::enter(InstallStage::CompileDecided);

        let teardown = match self.manager {
            Some(manager) => {
                let packages = resolve_packages(&config.dependencies, manager);
                let report = self.reconciler().reconcile_uninstall(&packages)?;
                Self::enter(InstallStage::DependenciesTornDown);
                report
            }
            None => None,
        };

        let mut compiler_removed = None;
        let compile = match &decision {
            CompileDecision::Compile => {
                compiler_removed = self.removed_compiler_package(teardown.as_ref());
                if let Some(package) = &compiler_removed {
                    ui::warn(format!(
                        "{package} was just removed; compiling with {} will likely fail",
                        config.compile.compiler
                    ));
                }
                let outcome = config.compile.compile(self.runner, &install);
                Self::enter(InstallStage::Compiled);
                outcome
            }
            CompileDecision::Declined => {
                ui::status("Skipping", "automatic compilation");
                Outcome::Skipped
            }
            CompileDecision::SkippedCli => {
                ui::status("Skipping", "CLI compilation");
                Outcome::Skipped
            }
            CompileDecision::InvalidCliAnswer(answer) => {
                ui::warn(format!(
                    "Invalid input '{answer}' for CLI compilation, skipping..."
                ));
                Outcome::Skipped
            }
        };

        tracing::debug!(outcome = %compile, "compile step");
        Self::enter(InstallStage::Done);
        Ok(InstallSummary {
            staged,
            dependencies,
            decision,
            teardown,
            compiler_removed,
            compile,
        })
    }

    /// The compiler's package, if the teardown just removed it.
    fn removed_compiler_package(&self, teardown: Option<&DependencyReport>) -> Option<String> {
        let report = teardown?;
        let manager = self.manager?;
        let compiler = &self.config.compile.compiler;
        self.config
            .dependencies
            .iter()
            .filter(|dep| &dep.command == compiler)
            .map(|dep| dep.package.resolve(manager))
            .find(|package| report.completed(package))
            .map(str::to_string)
    }

    pub fn uninstall(&mut self) -> Result<UninstallOutcome> {
        let product = &self.config.product_name;
        let question = format!("Do you really want to uninstall {product}? (y/n)");

        match self.prompter.ask(&question)? {
            Answer::Yes => {
                ui::status("Uninstalling", product);
                if self.install_root().remove()? {
                    ui::success("Removed", format!("{product} uninstalled successfully"));
                    Ok(UninstallOutcome::Removed)
                } else {
                    ui::info(format!("{product} is not installed"));
                    Ok(UninstallOutcome::NotInstalled)
                }
            }
            Answer::No => {
                ui::info("Uninstallation cancelled");
                Ok(UninstallOutcome::Cancelled)
            }
            Answer::Other(text) => Err(SetupError::InvalidConfirmation(text).into()),
        }
    }
}
