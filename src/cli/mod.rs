pub mod dataset;
pub mod interactive;
pub mod search;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use interactive::{process_interactive_command, InteractiveCommand};
use search::{process_search_command, SearchCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{
    dir::{create_application_default_path, ensure_dir},
    logging::{enable_logging, CLI_PREFIX},
};

#[derive(Parser, Debug)]
#[command(name = "watchme", version, long_about = None)]
#[command(about = "Search logged window time by title and chart it per day", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/watchme or $HOME/.local/state/watchme"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Search window titles and chart the time spent per day")]
    Search {
        #[command(flatten)]
        command: SearchCommand,
    },
    #[command(about = "Load records once and search them repeatedly. Each line is a query")]
    Interactive {
        #[command(flatten)]
        command: InteractiveCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Search { command } => process_search_command(command, &app_dir).await,
        Commands::Interactive { command } => process_interactive_command(command, &app_dir).await,
    }
}
