use crate::dependencies::DependencyReport;
use crate::installer::{InstallSummary, Installer};
use crate::outcome::Outcome;
use crate::prompt::Prompter;
use crate::runner::CommandRunner;
use crate::{ui, InstallConfig, PackageManager};
use anyhow::Result;

pub fn execute(
    config: &InstallConfig,
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
    manager: Option<PackageManager>,
) -> Result<()> {
    if let Some(manager) = manager {
        ui::info(format!("Using package manager: {manager}"));
    }

    let summary = Installer::new(config, runner, prompter, manager).install()?;
    report(&summary);
    Ok(())
}

fn report(summary: &InstallSummary) {
    let failed: Vec<_> = summary.staged.failed().collect();
    let copied = summary.staged.copied();
    let directories = summary.staged.directories.len();
    tracing::debug!(directories = ?summary.staged.directories, "installation layout");
    if failed.is_empty() {
        ui::success(
            "Files",
            format!("{copied} item(s) copied into {directories} directories"),
        );
    } else {
        let names: Vec<String> = failed
            .iter()
            .map(|(entry, _)| entry.source.display().to_string())
            .collect();
        ui::warn(format!(
            "{copied} item(s) copied into {directories} directories, {} failed:\n{}",
            failed.len(),
            names.join("\n")
        ));
    }

    if let Some(deps) = &summary.dependencies {
        report_packages("Installed", deps);
    }
    if let Some(teardown) = &summary.teardown {
        report_packages("Removed", teardown);
    }

    match &summary.compile {
        Outcome::Completed => ui::success("Compile", "CLI compiled"),
        Outcome::Skipped => ui::info("CLI was not compiled"),
        Outcome::Failed(reason) => ui::error(format!("CLI compilation failed: {reason}")),
    }
    ui::success("Done", "Installation finished");
}

fn report_packages(verb: &str, report: &DependencyReport) {
    let completed = report.count(|o| *o == Outcome::Completed);
    let failed = report.count(Outcome::is_failed);
    if completed == 0 && failed == 0 {
        return;
    }
    let message = format!(
        "{completed} package(s) with {}, {failed} failed",
        report.manager
    );
    if failed == 0 {
        ui::success(verb, message);
    } else {
        ui::warn(format!("{verb}: {message}"));
    }
}
