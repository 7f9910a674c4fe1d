use clap::Parser;
use std::path::PathBuf;

/// Drive Manager setup - install or uninstall Drive Manager
///
/// Copies the Drive Manager files into ~/.local/share/DriveMgr, checks the
/// build dependencies (g++, OpenSSL headers, smartmontools) with your
/// package manager and can compile the CLI. Everything else is asked
/// interactively.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Drive Manager checkout to install from (defaults to the directory
    /// holding this executable)
    #[arg(short, long, value_name = "DIR", env = "DMGR_SOURCE_DIR")]
    pub source: Option<PathBuf>,

    /// TOML file overriding the built-in installer configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
