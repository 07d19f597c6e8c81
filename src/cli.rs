use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "Single-window to-do list")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the current list
    List,
    /// Append a new item
    Add {
        /// Text of the item
        text: String,
    },
    /// Flip the done state of an item
    Toggle {
        /// Position of the item, starting at 0
        index: usize,
    },
    /// Delete an item
    Remove {
        /// Position of the item, starting at 0
        index: usize,
    },
    /// Open the list window
    Tui,
}
