// Public API
pub mod cli;
pub mod commands;

// Installer components
mod compile;
mod config;
mod dependencies;
mod error;
mod install_root;
mod installer;
mod outcome;
mod package_manager;
mod probe;
mod prompt;
mod runner;
mod stager;
mod ui;
mod util;

// Re-export main types
pub use compile::CompileSpec;
pub use config::{default_dest_root, InstallConfig};
pub use dependencies::{
    default_dependencies, resolve_packages, DependencyReport, DependencySpec, PackageAction,
    PackageNames, Reconciler,
};
pub use error::SetupError;
pub use install_root::{InstallPath, InstallRoot};
pub use installer::{CompileDecision, InstallStage, InstallSummary, Installer, UninstallOutcome};
pub use outcome::Outcome;
pub use package_manager::{CommandTemplate, PackageManager};
pub use probe::{probe, version_arg, ProbeResult, ProbeStatus, DEFAULT_VERSION_ARG};
pub use prompt::{Answer, LinePrompter, Prompter, ScriptedPrompter};
pub use runner::{CommandOutput, CommandRunner, Invocation, RecordingRunner, SystemRunner};
pub use stager::{default_manifest, stage, validate_source_root, ManifestEntry, StageReport};
