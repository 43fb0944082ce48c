mod cli;
mod commands;
mod config;
mod definition;
mod engine;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{ApplyArgs, Cli, Command};
use config::RunConfig;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let config = RunConfig::from_cli(&cli);

    let result = match &cli.command {
        None => commands::apply::run(&config.with_apply(&ApplyArgs::default())),
        Some(Command::Apply(args)) => commands::apply::run(&config.with_apply(args)),
        Some(Command::Plan(args)) => commands::plan::run(&config.with_plan(args), args.json),
        Some(Command::Validate) => commands::validate::run(&config),
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "permsync", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = &result {
        hint(err);
    }
    result
}

/// Print advice for Drive errors before the error itself is reported
fn hint(err: &anyhow::Error) {
    if let Some(drive_err) = err.chain().find_map(|e| e.downcast_ref::<drive::Error>()) {
        let category = drive_err.category();
        ui::error(category.description());
        ui::dim(category.advice());
    }
}
