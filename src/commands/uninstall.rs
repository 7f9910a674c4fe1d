use crate::installer::Installer;
use crate::prompt::Prompter;
use crate::runner::CommandRunner;
use crate::InstallConfig;
use anyhow::Result;

pub fn execute(
    config: &InstallConfig,
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let outcome = Installer::new(config, runner, prompter, None).uninstall()?;
    tracing::debug!(?outcome, root = %config.dest_root.display(), "uninstall finished");
    Ok(())
}
