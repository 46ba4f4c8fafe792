//! autocast: terminal controller for the autocast engine.

mod cli;
mod commands;
mod run;

use std::process;

use clap::Parser;
use tracing::error;

use crate::cli::{Cli, Commands};

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "autocast=debug,autocast_core=debug,autocast_platform=debug"
    } else {
        "autocast=info,autocast_core=info,autocast_platform=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match &cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Windows(args) => commands::windows(args).map(|()| false),
        Commands::Profiles(args) => commands::profiles(args).map(|()| false),
        Commands::Save(args) => commands::save(args).map(|()| false),
        Commands::Pattern(args) => commands::pattern(args).map(|()| false),
    };

    match result {
        Ok(false) => {}
        Ok(true) => process::exit(1),
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            process::exit(1);
        }
    }
}
