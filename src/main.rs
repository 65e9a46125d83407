use std::process::exit;
use tracing_subscriber::EnvFilter;

mod brokers;
mod catalog;
mod cli;
mod config;
mod error;
mod group;
mod protocol;
mod rename;
mod store;

use config::Config;

fn main() {
    let matches = cli::app().get_matches();
    init_logging();

    let config = match Config::from_matches(&matches) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(e.exit_code());
        }
    };

    let code = match matches.subcommand() {
        ("rename-group", Some(sub)) => rename::run(&config, sub),
        (name, _) => {
            eprintln!("Error: unknown command {}", name);
            2
        }
    };

    exit(code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
