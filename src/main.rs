use std::process::ExitCode;

use clap::Parser;
use gpufleet::adapter::inbound::cli::{self, command::Cli, Exit};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Exit::from_clap(&err).into(),
    };

    cli::run(cli).await.into()
}
