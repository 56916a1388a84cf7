mod cli;
mod commands;
mod config;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Settings;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Token from `--token` or SLACK_TOKEN
    pub token: Option<String>,
    /// Team from `--team` or ROLLCALL_TEAM
    pub team: Option<String>,
    pub settings: Settings,
}

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

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "rollcall", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        token: cli.token,
        team: cli.team,
        settings: Settings::load(cli.config.as_deref())?,
    };

    let result = match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Plan(args) => commands::apply::plan(&ctx, args),
        Command::Export(args) => commands::export::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    };

    if let Err(err) = &result {
        if let Some(slack_err) = err.chain().find_map(|e| e.downcast_ref::<slack::Error>()) {
            let category = slack_err.category();
            ui::error(&format!("{category}: {}", category.advice()));
        }
    }
    result
}
