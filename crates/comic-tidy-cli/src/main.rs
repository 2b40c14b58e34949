mod commands;
mod logging;
mod progress;
mod prompt;

use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ConvertArgs, FlattenArgs};
use comic_tidy_core::{
    AppConfig, ArchiveConverter, ConvertOptions, Converter, FlattenEngine, Pipeline,
};
use dotenv::dotenv;
use progress::CliReporter;
use std::path::Path;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let log_guard = logging::init_logger();

    let config = match comic_tidy_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Convert(args)) => run_convert(&config, &args),
        Some(Commands::Flatten(args)) => run_flatten(&config, &args),
        Some(Commands::Nuke { directory }) => run_nuke(&config, &directory),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        drop(log_guard);
        process::exit(1);
    }
}

fn run_convert(config: &AppConfig, args: &ConvertArgs) -> anyhow::Result<()> {
    let options = ConvertOptions {
        dry_run: args.dry_run,
        delete: args.delete,
        replace: args.replace,
        force_replace: args.force_replace,
        flatten: args.flatten.map(Into::into),
        prune: args.prune.mode(),
    };
    ArchiveConverter::from_config(config)
        .run(&args.source, &args.dest, &options, &CliReporter::new())
        .with_context(|| format!("converting {}", args.source.display()))?;
    Ok(())
}

fn run_flatten(config: &AppConfig, args: &FlattenArgs) -> anyhow::Result<()> {
    let mut engine = FlattenEngine::from_config(&args.directory, config).with_prune(args.prune.mode());
    if let Some(file_type) = args.file_type {
        engine = engine.with_type(file_type.into());
    }
    if let Some(strategy) = args.strategy {
        engine = engine.with_strategy(strategy.into());
    }
    engine
        .run(&CliReporter::new())
        .with_context(|| format!("flattening {}", args.directory.display()))?;
    Ok(())
}

fn run_nuke(config: &AppConfig, directory: &Path) -> anyhow::Result<()> {
    println!(
        "\n{}\n",
        "=== ☢️  NUKE MODE ENGAGED  ☢️ ===".red().bold()
    );
    let started = chrono::Local::now();

    let report = Pipeline::new(directory, config)
        .run(&ArchiveConverter::from_config(config), &CliReporter::new())
        .with_context(|| format!("nuking {}", directory.display()))?;

    info!(
        "=== ☢️  NUKE MODE COMPLETE  ☢️ === {} in {:.2}s",
        report.flatten.root.display(),
        (chrono::Local::now() - started).num_milliseconds() as f64 / 1000.0
    );
    Ok(())
}
