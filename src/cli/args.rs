use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tmx")]
#[command(version, about = "Tmux sessionizer: pick a project directory, get a session", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Configuration directory (default: ~/.config/tmx)
    #[arg(long, global = true, env = "TMX_CONFIG_DIR", value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Directory to search for projects (default: home directory)
    pub dir: Option<PathBuf>,

    /// Search depth; 0 uses the configured depth
    #[arg(short, long, default_value_t = 0)]
    pub depth: u32,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List active tmux sessions
    #[command(visible_aliases = ["l", "ls"])]
    List,

    /// Pick an active session and attach to it
    #[command(visible_aliases = ["c", "conn"])]
    Connect,

    /// Pick an active session and kill it
    #[command(visible_alias = "k")]
    Kill,
}
