//! Core types for group reconciliation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group as declared by the operator (desired state)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub handle: String,
    /// Member usernames, in declaration order
    #[serde(default)]
    pub users: Vec<String>,
}

impl DesiredGroup {
    /// Create a group with no members
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handle: handle.into(),
            users: Vec::new(),
        }
    }

    /// Builder-style member list
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }
}

/// A group as held by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub handle: String,
    /// Member identifiers
    pub users: Vec<String>,
    /// Set when the group is disabled but not purged
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RemoteGroup {
    /// Whether the group is active (not disabled)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether the group is disabled
    pub fn is_disabled(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A remote user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub name: String,
}

impl RemoteUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Payload for group creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub handle: String,
}

impl From<&DesiredGroup> for NewGroup {
    fn from(group: &DesiredGroup) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            handle: group.handle.clone(),
        }
    }
}

/// Payload for a metadata update. Membership is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub handle: String,
}

impl GroupUpdate {
    pub fn new(id: impl Into<String>, group: &DesiredGroup) -> Self {
        Self {
            id: id.into(),
            name: group.name.clone(),
            description: group.description.clone(),
            handle: group.handle.clone(),
        }
    }
}

/// Payload for a full membership replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipUpdate {
    pub id: String,
    pub user_ids: Vec<String>,
}

/// Whether a run mutates the remote or only reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Execute the plan against the remote
    #[default]
    Apply,
    /// Compute and report the plan without mutating anything
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }

    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Group was created
    Created,
    /// Disabled group was re-enabled
    Enabled,
    /// Metadata or membership was written
    Updated,
    /// Group was disabled
    Disabled,
    /// Group was created but setting its members failed
    CreatedWithoutMembers { error: String },
    /// Apply failed
    Failed { error: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Self::Failed { .. } | Self::CreatedWithoutMembers { .. }
        )
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created
                | Self::CreatedWithoutMembers { .. }
                | Self::Enabled
                | Self::Updated
                | Self::Disabled
        )
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub enabled: usize,
    pub updated: usize,
    pub disabled: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.enabled + self.updated + self.disabled
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of outcomes recorded. A partially applied create counts
    /// as a change and a failure.
    pub fn total(&self) -> usize {
        self.total_changes() + self.failed
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ExecuteSummary) {
        self.created += other.created;
        self.enabled += other.enabled;
        self.updated += other.updated;
        self.disabled += other.disabled;
        self.failed += other.failed;
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::Created => self.created += 1,
            ApplyResult::Enabled => self.enabled += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Disabled => self.disabled += 1,
            ApplyResult::CreatedWithoutMembers { .. } => {
                self.created += 1;
                self.failed += 1;
            }
            ApplyResult::Failed { .. } => self.failed += 1,
        }
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Report instead of mutating
    pub mode: RunMode,
    /// Number of parallel jobs for remote calls within a pass
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::Apply,
            jobs: 4,
        }
    }
}

impl ExecuteOptions {
    pub fn dry_run() -> Self {
        Self {
            mode: RunMode::DryRun,
            ..Self::default()
        }
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_group_defaults() {
        let group: DesiredGroup = serde_json::from_str(r#"{"name": "eng"}"#).unwrap();
        assert_eq!(group.name, "eng");
        assert!(group.description.is_empty());
        assert!(group.handle.is_empty());
        assert!(group.users.is_empty());
    }

    #[test]
    fn test_group_update_excludes_users() {
        let desired = DesiredGroup::new("eng", "Engineers", "eng").with_users(["alice"]);
        let update = GroupUpdate::new("S1", &desired);
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("users").is_none());
        assert_eq!(json["id"], "S1");
        assert_eq!(json["handle"], "eng");
    }

    #[test]
    fn test_run_mode() {
        assert!(RunMode::DryRun.is_dry_run());
        assert!(!RunMode::Apply.is_dry_run());
        assert_eq!(RunMode::from_dry_run(true), RunMode::DryRun);
        assert_eq!(RunMode::default(), RunMode::Apply);
    }

    #[test]
    fn test_summary_add_and_merge() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::Disabled);
        summary.add_result(&ApplyResult::Failed {
            error: "boom".into(),
        });

        let mut other = ExecuteSummary::default();
        other.add_result(&ApplyResult::Enabled);
        summary.merge(&other);

        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_created_without_members_counts_twice() {
        let result = ApplyResult::CreatedWithoutMembers {
            error: "update users failed".into(),
        };
        assert!(result.is_change());
        assert!(!result.is_success());

        let mut summary = ExecuteSummary::default();
        summary.add_result(&result);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_changes(), 1);
    }

    #[test]
    fn test_execute_options_jobs_floor() {
        assert_eq!(ExecuteOptions::default().jobs(0).jobs, 1);
    }
}
