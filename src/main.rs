// src/main.rs
mod cli;
mod commands;
mod config;
mod error;
mod flow;
mod git;
mod logging;
mod message;
mod status;
mod steps;
mod terminal;
mod validate;


use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error};

use cli::{Cli, Commands};
use commands::*;
use error::Error;
use git::is_git_repo;

// =============================================================================
// MAIN
// =============================================================================
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if !is_git_repo() {
        return Err(Error::NotARepository.into());
    }

    let delay = Duration::from_millis(cli.validation_delay_ms);
    debug!(delay_ms = cli.validation_delay_ms, "validation delay");

    match cli.command {
        Commands::Commit { all, write_to, print } => {
            cmd_commit(MessageSink::from_flags(all, write_to, print), delay).await?
        }
        Commands::Types => cmd_types()?,
        Commands::Config => cmd_config()?,
        Commands::Init { force } => cmd_init(force)?,
        Commands::Hook { command } => cmd_hook(command)?,
    }

    Ok(())
}
