//! Taskbook CLI - a personal to-do tracker with an interactive menu.

use clap::Parser;
use std::io;
use std::process;
use taskbook::cli::Cli;
use taskbook::commands::Session;
use taskbook::config::{self, TaskbookConfig, resolve_config};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so the menu on stdout stays readable.
    // Override with RUST_LOG=taskbook=debug.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskbook=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = load_file_config(&cli);
    let config = resolve_config(&file_config, &cli.overrides());

    if cli.show_config {
        print!("{}", config.describe());
        return;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = Session::open(&config, stdin.lock(), stdout.lock()).and_then(|mut s| s.run());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Load the config file named on the command line, or the default one.
///
/// An unreadable or invalid config file is reported and defaults are used.
fn load_file_config(cli: &Cli) -> TaskbookConfig {
    let Some(path) = cli.config_path.clone().or_else(config::default_config_path) else {
        return TaskbookConfig::new();
    };

    match config::load_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading config: {}", e);
            TaskbookConfig::new()
        }
    }
}
