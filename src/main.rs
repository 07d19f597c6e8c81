mod cli;
mod commands;
mod logging;
mod model;
mod registry;
mod storage;
mod sync;
mod tracker;
mod ui;
mod widgets;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    if let Err(err) = logging::init() {
        eprintln!("logging disabled: {:#}", err);
    }
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::List => commands::list(&args.config),
        cli::Command::Add { text } => commands::add(&args.config, text),
        cli::Command::Toggle { index } => commands::toggle(&args.config, index),
        cli::Command::Remove { index } => commands::remove(&args.config, index),
        cli::Command::Tui => commands::tui(&args.config),
    }
}
