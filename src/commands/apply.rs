//! `apply` and `plan` commands

use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs};
use crate::commands::connect;
use crate::config;
use crate::ui::{self, ConsoleReport};
use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{DesiredGroup, DiffSummary, ExecuteOptions, ExecuteSummary, Reconciler, RunReport};
use slack::SlackClient;
use std::io::{self, IsTerminal};
use std::path::Path;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let desired = load(ctx, args.file.as_deref())?;
    let client = connect(ctx)?;

    if ctx.settings.dry_run(args.dry_run) {
        let report = preview(ctx, &client, &desired)?;
        print_plan_summary(&report.plan.summary());
        return Ok(());
    }

    if !args.yes {
        let report = preview(ctx, &client, &desired)?;
        let planned = report.plan.summary();
        print_plan_summary(&planned);
        if !planned.has_changes() {
            return Ok(());
        }
        if report.enabled {
            ui::dim("Re-enabled usergroups are compared again after enabling.");
        }
        if !confirm_proceed()? {
            ui::info("Aborted, nothing changed");
            return Ok(());
        }
    }

    let options = ExecuteOptions::default().jobs(ctx.settings.jobs(args.jobs));
    let mut sink = ConsoleReport::new(ctx.quiet, "Applying usergroup changes...");
    let report = Reconciler::new(&client, options).run(&desired, &mut sink);
    sink.finish();
    let report = report?;

    print_summary(&report.summary);
    if report.summary.failed > 0 {
        bail!("{} usergroup changes failed", report.summary.failed);
    }
    Ok(())
}

pub fn plan(ctx: &Context, args: PlanArgs) -> Result<()> {
    let desired = load(ctx, args.file.as_deref())?;
    let client = connect(ctx)?;
    let report = preview(ctx, &client, &desired)?;
    print_plan_summary(&report.plan.summary());
    Ok(())
}

fn load(ctx: &Context, explicit: Option<&Path>) -> Result<Vec<DesiredGroup>> {
    let path = ctx.settings.desired_file(explicit)?;
    let desired = config::load_desired_groups(&path)?;
    if ctx.verbose > 0 {
        ui::kv("Desired state", &path.display().to_string());
        ui::kv("Usergroups", &desired.len().to_string());
    }
    Ok(desired)
}

/// Dry run against Slack, printing the plan lines.
fn preview(ctx: &Context, client: &SlackClient, desired: &[DesiredGroup]) -> Result<RunReport> {
    if !ctx.quiet {
        ui::header("Planned usergroup changes");
    }
    let mut sink = ConsoleReport::new(ctx.quiet, "Fetching Slack usergroups...");
    let report = Reconciler::new(client, ExecuteOptions::dry_run()).run(desired, &mut sink);
    sink.finish();
    report
}

/// Confirm with user. Without a terminal there is nobody to ask.
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    if !io::stdin().is_terminal() {
        bail!("Refusing to apply without confirmation; pass --yes to apply non-interactively");
    }

    let confirmed = Confirm::new()
        .with_prompt("Apply these changes?")
        .default(false)
        .interact()?;

    Ok(confirmed)
}

fn print_plan_summary(summary: &DiffSummary) {
    println!();
    if !summary.has_changes() {
        ui::success("Usergroups are up to date");
        return;
    }
    println!(
        "  {} {} to enable, {} to create, {} to update, {} to disable",
        "Plan:".bold(),
        summary.enables,
        summary.creates,
        summary.updates,
        summary.disables
    );
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.total() == 0 {
        ui::success("Usergroups are up to date");
        return;
    }
    if summary.is_success() {
        println!("  {} Usergroups applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Usergroups applied with errors", "⚠".yellow().bold());
    }

    if summary.enabled > 0 {
        println!("    • {} usergroups enabled", summary.enabled);
    }
    if summary.created > 0 {
        println!("    • {} usergroups created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} usergroup updates", summary.updated);
    }
    if summary.disabled > 0 {
        println!("    • {} usergroups disabled", summary.disabled);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "actions".red());
    }
}
