//! Taxa Command-Line Client
//!
//! Loads a JSON snapshot of the content store and runs entity queries
//! against it.

mod commands;
mod config;
mod formatter;

use clap::Parser;
use taxa_core::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{Command, CommandError};
use config::{Args, CliConfig};

fn main() {
    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taxa_cli=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let command = args.command.clone();
    let config = args.into_config();

    match run(&command, &config) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: &Command, config: &CliConfig) -> Result<String, CommandError> {
    let store = Store::open(&config.store_path)?;
    info!(
        path = %config.store_path.display(),
        collections = store.len(),
        format = %config.format,
        "store loaded"
    );

    let formatter = formatter::create_formatter(config.format);
    commands::execute(command, &store, config, &*formatter)
}
