mod cache;
mod cancel;
mod cli;
mod commands;
mod executor;
mod graph;
mod lock;
mod paths;
mod progress;
mod runner;
mod superplan;
mod ui;
mod versioning;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Command};
use commands::Context;
use lock::LockedError;

fn main() -> ExitCode {
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

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(locked) = err.downcast_ref::<LockedError>() {
                ui::error(&locked.to_string());
                return ExitCode::from(locked.exit_code() as u8);
            }
            ui::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        generate(*shell, &mut command, "terraform-wrapper", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context::from_cli(&cli)?;

    match &cli.command {
        Command::Init(args) => commands::stack::init(&ctx, &args.stack),
        Command::Plan(args) => commands::stack::plan(&ctx, &args.stack),
        Command::Apply(args) => commands::stack::apply(&ctx, &args.stack),
        Command::Destroy(args) => commands::stack::destroy(&ctx, &args.stack),
        Command::InitAll => commands::all::init_all(&ctx),
        Command::PlanAll => commands::all::plan_all(&ctx),
        Command::ApplyAll => commands::all::apply_all(&ctx),
        Command::DestroyAll => commands::all::destroy_all(&ctx),
        Command::Superplan => commands::superplan::run(&ctx),
        Command::Clean(args) => commands::clean::clean(&ctx, &args.stack),
        Command::CleanAll => commands::clean::clean_all(&ctx),
        Command::Completions { .. } => unreachable!("handled above"),
    }
}
