use anyhow::Result;
use clap::Parser;
use dmgr_setup::cli::Cli;
use dmgr_setup::commands;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; stderr keeps the interactive prompts on stdout clean
    let default_filter = if cli.verbose {
        "dmgr_setup=debug,warn"
    } else {
        "dmgr_setup=warn,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute the interactive menu
    commands::execute(cli)
}
