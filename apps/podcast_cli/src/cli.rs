use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "podcast-cli",
    version,
    about = "Browse and play episodes from a podcast listing API"
)]
pub struct Cli {
    /// Load configuration from this file instead of the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the latest episodes
    List {
        /// Number of episodes to fetch
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one episode's details
    Show { id: String },
    /// Play episodes in the terminal
    Play {
        /// Episode ids to queue, in order
        ids: Vec<String>,
        /// Queue the N latest episodes when no ids are given
        #[arg(long, conflicts_with = "ids")]
        latest: Option<usize>,
        /// Queue position to start from
        #[arg(long, default_value_t = 0)]
        start: usize,
    },
}
