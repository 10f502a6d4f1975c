use std::process::ExitCode;

use clap::CommandFactory;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::client::HttpConnector;
use crate::error::Error;

mod cli;
mod client;
mod config;
mod dispatch;
mod error;
mod extra_config;
mod resolve;
mod session;
#[cfg(test)]
mod stub;
mod vcd;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match cli::parse(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::exit_status(&e));
        }
    };
    debug!("Parsed arguments: {:?}", cli);

    let mut stdout = std::io::stdout().lock();
    match dispatch::run(&cli, &HttpConnector, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(
                e,
                Error::MissingAction | Error::UnknownAction(_) | Error::MissingArguments { .. }
            ) {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}
