//! Execution engine - issues remote calls for planned actions

use crate::client::RemoteClient;
use crate::context::ReportSink;
use crate::directory::UserDirectory;
use crate::error::{Error, Result};
use crate::planner::Action;
use crate::types::{
    ApplyResult, DesiredGroup, ExecuteSummary, GroupUpdate, MembershipUpdate, NewGroup,
};
use anyhow::Context;
use rayon::prelude::*;

/// Result of one action plus the diagnostics it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub result: ApplyResult,
    pub diagnostics: Vec<String>,
}

/// Applies actions against the remote.
///
/// Each action is self-contained: follow-up calls for the same group (members
/// after a create) are issued inside it, so actions of one batch can run in
/// parallel without reordering per-group calls.
pub struct Executor<'a, C: RemoteClient + ?Sized> {
    client: &'a C,
    directory: &'a UserDirectory,
    jobs: usize,
}

impl<'a, C: RemoteClient + ?Sized> Executor<'a, C> {
    pub fn new(client: &'a C, directory: &'a UserDirectory) -> Self {
        Self {
            client,
            directory,
            jobs: 1,
        }
    }

    /// Number of parallel jobs per batch
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Execute a batch, reporting results and diagnostics in plan order.
    pub fn execute_batch(
        &self,
        actions: &[Action],
        sink: &mut dyn ReportSink,
    ) -> anyhow::Result<ExecuteSummary> {
        let units = group_units(actions);
        let outcomes = if self.jobs == 1 || units.len() <= 1 {
            actions.iter().map(|a| self.apply(a)).collect::<Vec<_>>()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .context("Failed to create apply thread pool")?;
            pool.install(|| {
                units
                    .par_iter()
                    .map(|unit| unit.iter().map(|a| self.apply(a)).collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect()
        };

        let mut summary = ExecuteSummary::default();
        for (action, outcome) in actions.iter().zip(&outcomes) {
            for diagnostic in &outcome.diagnostics {
                sink.diagnostic(diagnostic);
            }
            sink.on_action_complete(action, &outcome.result);
            summary.add_result(&outcome.result);
        }
        Ok(summary)
    }

    /// Apply a single action. Failures are captured in the outcome.
    pub fn apply(&self, action: &Action) -> ActionOutcome {
        let mut diagnostics = Vec::new();
        let result = match self.dispatch(action, &mut diagnostics) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{action} failed: {e}");
                ApplyResult::Failed {
                    error: e.to_string(),
                }
            }
        };
        ActionOutcome {
            result,
            diagnostics,
        }
    }

    fn dispatch(&self, action: &Action, diagnostics: &mut Vec<String>) -> Result<ApplyResult> {
        log::debug!("Applying: {action}");
        match action {
            Action::Enable(group) => {
                self.client
                    .enable_group(&group.id)
                    .map_err(|e| Error::remote_call("enable", &group.name, e))?;
                Ok(ApplyResult::Enabled)
            }
            Action::Create(desired) => self.create(desired, diagnostics),
            Action::Update { group, desired } => {
                self.client
                    .update_group(&GroupUpdate::new(&group.id, desired))
                    .map_err(|e| Error::remote_call("update", &desired.name, e))?;
                Ok(ApplyResult::Updated)
            }
            Action::UpdateUsers { group_id, desired } => {
                self.update_users(group_id, desired, diagnostics)?;
                Ok(ApplyResult::Updated)
            }
            Action::Disable(group) => {
                self.client
                    .disable_group(&group.id)
                    .map_err(|e| Error::remote_call("disable", &group.name, e))?;
                Ok(ApplyResult::Disabled)
            }
        }
    }

    fn create(&self, desired: &DesiredGroup, diagnostics: &mut Vec<String>) -> Result<ApplyResult> {
        let created = self
            .client
            .create_group(&NewGroup::from(desired))
            .map_err(|e| Error::remote_call("create", &desired.name, e))?;

        if created.id.is_empty() {
            log::warn!(
                "Created usergroup {} came back without an id, members not set",
                desired.name
            );
            return Ok(ApplyResult::Created);
        }
        // The group exists from here on, so a member failure is partial.
        match self.update_users(&created.id, desired, diagnostics) {
            Ok(()) => Ok(ApplyResult::Created),
            Err(e) => {
                log::warn!("Usergroup {} created, members not set: {e}", desired.name);
                Ok(ApplyResult::CreatedWithoutMembers {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Full membership replacement. Unknown usernames are dropped and reported.
    fn update_users(
        &self,
        group_id: &str,
        desired: &DesiredGroup,
        diagnostics: &mut Vec<String>,
    ) -> Result<()> {
        let resolution = self.directory.resolve_all(&desired.users);
        for missing in resolution.missing {
            let err = Error::UserNotFound(missing);
            log::warn!("{}: {err}", desired.name);
            diagnostics.push(err.to_string());
        }

        self.client
            .update_group_users(&MembershipUpdate {
                id: group_id.to_string(),
                user_ids: resolution.ids,
            })
            .map_err(|e| Error::remote_call("update users", &desired.name, e))
    }
}

/// Adjacent actions on the same group (Update then UpdateUsers) run in order
/// on one worker.
fn group_units(actions: &[Action]) -> Vec<&[Action]> {
    actions
        .chunk_by(|a, b| a.group_name() == b.group_name())
        .collect()
}
