use crate::config::Format;
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Keep Slack usergroups in sync with a declared file", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Slack API token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Workspace (team) id, for org-wide tokens
    #[arg(long, env = "ROLLCALL_TEAM", global = true)]
    pub team: Option<String>,

    /// Settings file [default: ~/.config/rollcall/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make Slack usergroups match the desired-state file
    Apply(ApplyArgs),

    /// Show what apply would change, without changing anything
    Plan(PlanArgs),

    /// Write current Slack usergroups in desired-state format
    Export(ExportArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Desired-state file (.yml, .yaml, .toml or .json)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Dry run - show what would be done
    #[arg(short = 'n', long, env = "ROLLCALL_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel API calls per pass
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Desired-state file (.yml, .yaml, .toml or .json)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output format [default: from --output extension, else yaml]
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include disabled usergroups
    #[arg(long)]
    pub include_disabled: bool,
}
