//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::collaborator::AppType;

/// Usage line shown on `-h` and on argument errors.
pub const USAGE: &str = "presenter-server [-h] --app {display}";

#[derive(Debug, Parser)]
#[command(name = "presenter-server")]
#[command(about = "Presenter Server: agent socket server plus web UI", long_about = None)]
#[command(override_usage = USAGE)]
pub struct Cli {
    /// Application type corresponding to Presenter Server.
    #[arg(long, value_enum)]
    pub app: AppType,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
