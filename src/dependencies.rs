use crate::outcome::Outcome;
use crate::package_manager::PackageManager;
use crate::probe::{probe, version_arg, ProbeResult};
use crate::prompt::Prompter;
use crate::runner::{CommandRunner, Invocation};
use crate::ui;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Concrete package name for a dependency, optionally differing per manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageNames {
    pub default: String,
    /// Keyed by package manager program name (`apt`, `pacman`, ...).
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl PackageNames {
    pub fn same(name: impl Into<String>) -> Self {
        Self {
            default: name.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, manager: PackageManager, name: impl Into<String>) -> Self {
        self.overrides
            .insert(manager.program().to_string(), name.into());
        self
    }

    pub fn resolve(&self, manager: PackageManager) -> &str {
        self.overrides
            .get(manager.program())
            .unwrap_or(&self.default)
    }
}

/// A build dependency: the command that proves it is present and the package
/// that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub command: String,
    pub package: PackageNames,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>, package: PackageNames) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            package,
        }
    }
}

/// Compiler toolchain, TLS library and disk-health tool.
pub fn default_dependencies() -> Vec<DependencySpec> {
    vec![
        DependencySpec::new("compiler toolchain", "g++", PackageNames::same("g++")),
        DependencySpec::new(
            "TLS library",
            "openssl",
            PackageNames::same("openssl-devel").with_override(PackageManager::Apt, "libssl-dev"),
        ),
        DependencySpec::new(
            "disk-health tool",
            "smartctl",
            PackageNames::same("smartmontools"),
        ),
    ]
}

/// Resolve every dependency to its package name under `manager`.
pub fn resolve_packages(deps: &[DependencySpec], manager: PackageManager) -> Vec<String> {
    deps.iter()
        .map(|dep| dep.package.resolve(manager).to_string())
        .collect()
}

/// What happened to one package during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageAction {
    pub package: String,
    /// Probe result, for install passes only.
    pub probe: Option<ProbeResult>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    pub manager: PackageManager,
    pub actions: Vec<PackageAction>,
}

impl DependencyReport {
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(&a.outcome)).count()
    }

    /// Whether the action on `package` completed in this pass.
    pub fn completed(&self, package: &str) -> bool {
        self.actions
            .iter()
            .any(|a| a.package == package && a.outcome == Outcome::Completed)
    }
}

/// Offers to install missing build dependencies and to remove them again.
pub struct Reconciler<'a> {
    manager: Option<PackageManager>,
    runner: &'a dyn CommandRunner,
    prompter: &'a mut dyn Prompter,
    probe_args: &'a BTreeMap<String, String>,
    elevate_with: &'a str,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        manager: Option<PackageManager>,
        runner: &'a dyn CommandRunner,
        prompter: &'a mut dyn Prompter,
        probe_args: &'a BTreeMap<String, String>,
        elevate_with: &'a str,
    ) -> Self {
        Self {
            manager,
            runner,
            prompter,
            probe_args,
            elevate_with,
        }
    }

    /// Probe each dependency and offer to install the missing ones.
    ///
    /// Returns `None` without touching anything when no package manager is
    /// available. Prompt I/O errors propagate; package failures do not.
    pub fn reconcile(&mut self, deps: &[DependencySpec]) -> Result<Option<DependencyReport>> {
        let Some(manager) = self.manager else {
            ui::error("No supported package manager found; skipping dependency check.");
            return Ok(None);
        };

        let mut actions = Vec::with_capacity(deps.len());
        for dep in deps {
            let package = dep.package.resolve(manager).to_string();
            let arg = version_arg(self.probe_args, &dep.command);
            ui::status("Checking", format!("{} ({})", dep.name, dep.command));
            let result = probe(self.runner, &dep.command, arg);
            ui::info(&result.message);

            let outcome = if result.installed() {
                Outcome::Skipped
            } else {
                let question =
                    format!("{package} is not installed. Do you want to install it? (y/n)");
                if self.prompter.ask(&question)?.is_yes() {
                    self.run_package_command(manager, &package, PackageOp::Install)
                } else {
                    ui::status("Skipping", format!("installation of {package}"));
                    Outcome::Skipped
                }
            };

            actions.push(PackageAction {
                package,
                probe: Some(result),
                outcome,
            });
        }

        ui::success("Checked", "dependencies");
        Ok(Some(DependencyReport { manager, actions }))
    }

    /// Offer to remove each package.
    pub fn reconcile_uninstall(&mut self, packages: &[String]) -> Result<Option<DependencyReport>> {
        let Some(manager) = self.manager else {
            ui::error("No supported package manager found; skipping dependency removal.");
            return Ok(None);
        };

        let mut actions = Vec::with_capacity(packages.len());
        for package in packages {
            let question = format!("Do you want to uninstall {package}? (y/n)");
            let outcome = if self.prompter.ask(&question)?.is_yes() {
                self.run_package_command(manager, package, PackageOp::Remove)
            } else {
                ui::status("Keeping", format!("{package} installed"));
                Outcome::Skipped
            };

            actions.push(PackageAction {
                package: package.clone(),
                probe: None,
                outcome,
            });
        }

        Ok(Some(DependencyReport { manager, actions }))
    }

    fn run_package_command(&self, manager: PackageManager, package: &str, op: PackageOp) -> Outcome {
        let args = match op {
            PackageOp::Install => manager.install_args(package),
            PackageOp::Remove => manager.remove_args(package),
        };
        let invocation = Invocation::new(manager.program(), args).elevated(self.elevate_with);
        let progress = ui::Progress::new(op.label(), package.to_string());

        let failure = match self.runner.run(&invocation) {
            Ok(output) if output.success() => None,
            Ok(output) => Some(match output.code {
                Some(code) => format!("`{invocation}` exited with code {code}"),
                None => format!("`{invocation}` was terminated by a signal"),
            }),
            Err(error) => Some(format!("failed to run `{invocation}`: {error}")),
        };

        match failure {
            None => {
                progress.success(op.done_label(), None);
                Outcome::Completed
            }
            Some(reason) => {
                tracing::debug!(%package, %reason, "package command failed");
                progress.fail("Error", &reason);
                Outcome::Failed(reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PackageOp {
    Install,
    Remove,
}

impl PackageOp {
    fn label(self) -> &'static str {
        match self {
            PackageOp::Install => "Installing",
            PackageOp::Remove => "Removing",
        }
    }

    fn done_label(self) -> &'static str {
        match self {
            PackageOp::Install => "Installed",
            PackageOp::Remove => "Removed",
        }
    }
}
