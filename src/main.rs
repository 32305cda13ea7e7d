//! dotinject - Inject password-manager secrets into dotfile templates.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dotinject::cli::output;
use dotinject::cli::{execute, Cli};
use dotinject::core::constants::ENV_LOG;
use dotinject::error::{DriverError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries rendered content
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("dotinject=debug")
        } else {
            EnvFilter::new("dotinject=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let suggestion = match &e {
                Error::Store(StoreError::Unauthenticated { .. }) => Some("run: op signin"),
                Error::Store(StoreError::Unavailable(_)) => {
                    Some("install the 1Password CLI, or use --store env")
                }
                Error::Driver(DriverError::OutputForDirectory(_)) => {
                    Some("outputs are derived from template names in directory mode")
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(hint);
            }
            std::process::exit(1);
        }
    }
}
