mod builder;
mod cli;
mod document;
mod error;
mod export;
mod extractor;
mod fmt;
mod identifier;
mod models;
mod normalizer;
mod parse;
mod patterns;
mod pipeline;
mod reconciler;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};
use settings::{default_settings_path, load_settings};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "passbook=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings_path = cli.config.clone().unwrap_or_else(default_settings_path);

    let result = match cli.command {
        Commands::Convert { file, out, format } => {
            cli::convert::run(&file, out.as_deref(), format, load_settings(&settings_path))
        }
        Commands::Preview { file } => cli::preview::run(&file, load_settings(&settings_path)),
        Commands::Inspect { file, rows } => {
            cli::inspect::run(&file, rows, load_settings(&settings_path))
        }
        Commands::Lines { file, out } => cli::lines::run(&file, out.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(&settings_path),
            ConfigCommands::Set { key, value } => cli::config::set(&settings_path, &key, &value),
            ConfigCommands::Path => cli::config::path(&settings_path),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if e
            .downcast_ref::<error::PassbookError>()
            .is_some_and(|e| e.is_pipeline_failure())
        {
            eprintln!("Hint: `passbook inspect <FILE>` shows what was extracted.");
        }
        std::process::exit(1);
    }
}
