use std::process::ExitCode;

use anyhow::{Error, Result};
use clap::Parser;
use ghcnd::{
    cli::{command, setup_logging, Cli},
    Archive, Config,
};
use tracing::error;

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    let cli = Cli::parse();
    setup_logging(&cli.global)?;

    let config = cli.global.apply(Config::from_env()?);
    config.validate()?;
    let archive = Archive::new(config.clone())?;

    match command::run(&archive, &config, &cli.command).await {
        Ok(0) => Ok(ExitCode::SUCCESS),
        Ok(failures) => {
            error!("{} station(s) failed", failures);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
