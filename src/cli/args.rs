//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::Animal;

/// Composite weight aggregation and chain-of-responsibility dispatch demos
#[derive(Parser, Debug)]
#[command(name = "gof")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Weigh the nail-box package
    Composite {
        /// Render the package tree with per-node weights
        #[arg(short, long)]
        tree: bool,
    },

    /// Serve food to the animal chain
    Chain {
        /// Handler receiving the requests (monkey, squirrel, dog)
        #[arg(short, long)]
        entry: Option<Animal>,

        /// Print the chain before serving
        #[arg(short, long)]
        show: bool,

        /// Requests to serve (default: from config)
        requests: Vec<String>,
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
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
}
