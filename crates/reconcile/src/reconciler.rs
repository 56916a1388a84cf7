//! Reconciler - drives the enable, report, mutation and disable passes

use crate::client::RemoteClient;
use crate::context::ReportSink;
use crate::directory::UserDirectory;
use crate::executor::Executor;
use crate::planner::{Action, ActionPlan, Planner};
use crate::report::{describe_action, report_pass};
use crate::snapshot::GroupSnapshot;
use crate::types::{DesiredGroup, ExecuteOptions, ExecuteSummary, RunMode};
use anyhow::Result;

/// What one run planned and, in apply mode, what happened
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub mode: RunMode,
    /// Every planned action, in pass order
    pub plan: ActionPlan,
    /// Results of executed actions (empty in dry-run mode)
    pub summary: ExecuteSummary,
    /// Whether the enable pass found anything to re-enable
    pub enabled: bool,
}

impl RunReport {
    pub fn has_changes(&self) -> bool {
        !self.plan.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }
}

/// One reconciliation run against a remote.
///
/// Directory and snapshot are created per run and dropped with it.
pub struct Reconciler<'a, C: RemoteClient + ?Sized> {
    client: &'a C,
    options: ExecuteOptions,
}

impl<'a, C: RemoteClient + ?Sized> Reconciler<'a, C> {
    pub fn new(client: &'a C, options: ExecuteOptions) -> Self {
        Self { client, options }
    }

    /// Reconcile remote groups towards `desired`.
    ///
    /// Fails only when remote state cannot be listed. Individual action
    /// failures are recorded in the summary and the run carries on.
    pub fn run(&self, desired: &[DesiredGroup], sink: &mut dyn ReportSink) -> Result<RunReport> {
        let dry_run = self.options.mode.is_dry_run();
        let directory = UserDirectory::fetch(self.client)?;
        let mut snapshot = GroupSnapshot::new(self.client);
        let planner = Planner::new(desired, &directory);
        let executor = Executor::new(self.client, &directory).jobs(self.options.jobs);

        let mut report = RunReport {
            mode: self.options.mode,
            ..RunReport::default()
        };

        // Disabled groups look absent in the active view until re-enabled.
        let enables = planner.enable_pass(&snapshot.view()?);
        report.enabled = !enables.is_empty();
        if report.enabled {
            log::info!("Re-enabling {} usergroups", enables.len());
            if dry_run {
                for action in &enables {
                    sink.line(&describe_action(action));
                }
                let ids: Vec<String> = enables
                    .iter()
                    .filter_map(|action| match action {
                        Action::Enable(group) => Some(group.id.clone()),
                        _ => None,
                    })
                    .collect();
                snapshot.assume_enabled(&ids)?;
            } else {
                report.summary.merge(&executor.execute_batch(&enables, sink)?);
                snapshot.invalidate();
            }
            report.plan.extend(enables);
        }

        if dry_run {
            for line in report_pass(&planner, &snapshot.view()?) {
                sink.line(&line);
            }
        }

        // A dry run that re-enabled something defers creates/updates to the
        // next run.
        if !(report.enabled && dry_run) {
            let mutations = planner.mutation_pass(&snapshot.view()?);
            if !dry_run {
                report
                    .summary
                    .merge(&executor.execute_batch(&mutations, sink)?);
            }
            report.plan.extend(mutations);
        }

        let disables = planner.disable_pass(&snapshot.view()?);
        if !dry_run {
            report
                .summary
                .merge(&executor.execute_batch(&disables, sink)?);
        }
        report.plan.extend(disables);

        log::debug!(
            "Run finished: {} planned, {} changed, {} failed",
            report.plan.len(),
            report.summary.total_changes(),
            report.summary.failed
        );
        Ok(report)
    }
}

/// Run one reconciliation with the given options.
pub fn reconcile<C: RemoteClient + ?Sized>(
    client: &C,
    desired: &[DesiredGroup],
    options: ExecuteOptions,
    sink: &mut dyn ReportSink,
) -> Result<RunReport> {
    Reconciler::new(client, options).run(desired, sink)
}
