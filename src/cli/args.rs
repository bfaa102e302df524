//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Path-addressable hierarchy trees: load nested layouts, address nodes by dotted ids, bulk-apply values
#[derive(Parser, Debug)]
#[command(name = "racktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Tree file (default: `tree_file` from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Path separator (default: from config, else '.')
    #[arg(short, long, global = true)]
    pub sep: Option<char>,

    /// Directory holding a local .racktree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as tree
    Show {
        /// Apply this payload before rendering
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        payload: Option<PathBuf>,
    },

    /// Count nodes (root included)
    Count,

    /// Resolve a path (relative to the root) and print its value
    Get {
        /// Dotted path, e.g. rack1.sg1.cmp1
        path: String,
    },

    /// List every node id with its value
    Ids,

    /// List leaf node ids
    Leaves,

    /// Apply a payload file and print the resulting values
    Update {
        /// JSON object of path to number or null
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
