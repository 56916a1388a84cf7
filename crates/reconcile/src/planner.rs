//! Reconciliation planner - turns desired vs. remote state into actions
//!
//! The passes are separate because their inputs differ: the enable pass must
//! run against the snapshot as fetched, while the mutation and disable passes
//! must see groups that were re-enabled as active.

use crate::diff::{Classification, DiffSummary, NormalizedRecord, classify};
use crate::directory::UserDirectory;
use crate::snapshot::SnapshotView;
use crate::types::{DesiredGroup, RemoteGroup};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Kind of a planned action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    Enable,
    Create,
    Update,
    UpdateUsers,
    Disable,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enable => "enable",
            Self::Create => "create",
            Self::Update => "update",
            Self::UpdateUsers => "update users",
            Self::Disable => "disable",
        };
        f.write_str(name)
    }
}

/// One remote change, carrying what the executor needs to issue it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Re-enable a disabled group
    Enable(RemoteGroup),
    /// Create a group, then set its members
    Create(DesiredGroup),
    /// Write name/description/handle of an existing group
    Update {
        group: RemoteGroup,
        desired: DesiredGroup,
    },
    /// Replace the members of an existing group
    UpdateUsers {
        group_id: String,
        desired: DesiredGroup,
    },
    /// Disable a group no longer declared
    Disable(RemoteGroup),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Enable(_) => ActionKind::Enable,
            Self::Create(_) => ActionKind::Create,
            Self::Update { .. } => ActionKind::Update,
            Self::UpdateUsers { .. } => ActionKind::UpdateUsers,
            Self::Disable(_) => ActionKind::Disable,
        }
    }

    /// Name of the group this action targets
    pub fn group_name(&self) -> &str {
        match self {
            Self::Enable(group) | Self::Disable(group) => &group.name,
            Self::Create(desired)
            | Self::Update { desired, .. }
            | Self::UpdateUsers { desired, .. } => &desired.name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.group_name())
    }
}

/// Ordered list of actions for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionPlan {
    pub actions: Vec<Action>,
}

impl ActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.actions.extend(actions);
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(Action::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Count actions per bucket. An Update followed by UpdateUsers for the
    /// same group counts once.
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        let mut updated: HashSet<&str> = HashSet::new();
        for action in &self.actions {
            match action.kind() {
                ActionKind::Enable => summary.enables += 1,
                ActionKind::Create => summary.creates += 1,
                ActionKind::Update | ActionKind::UpdateUsers => {
                    if updated.insert(action.group_name()) {
                        summary.updates += 1;
                    }
                }
                ActionKind::Disable => summary.disables += 1,
            }
        }
        summary
    }
}

impl IntoIterator for ActionPlan {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

/// Plans actions for a fixed set of desired groups
pub struct Planner<'a> {
    desired: &'a [DesiredGroup],
    directory: &'a UserDirectory,
}

impl<'a> Planner<'a> {
    pub fn new(desired: &'a [DesiredGroup], directory: &'a UserDirectory) -> Self {
        Self { desired, directory }
    }

    pub fn desired(&self) -> &'a [DesiredGroup] {
        self.desired
    }

    pub fn directory(&self) -> &'a UserDirectory {
        self.directory
    }

    /// Desired groups that exist remotely only as disabled groups.
    pub fn enable_pass(&self, view: &SnapshotView<'_>) -> Vec<Action> {
        self.desired
            .iter()
            .filter(|src| view.find_active(&src.name).is_none())
            .filter_map(|src| view.find(&src.name))
            .map(|group| Action::Enable(group.clone()))
            .collect()
    }

    /// Creates and updates for every desired group against the active view.
    pub fn mutation_pass(&self, view: &SnapshotView<'_>) -> Vec<Action> {
        let mut actions = Vec::new();
        for src in self.desired {
            let Some(dst) = view.find_active(&src.name) else {
                // Still disabled means the enable did not go through.
                if view.find(&src.name).is_some() {
                    log::warn!("Usergroup {} is still disabled, skipping", src.name);
                } else {
                    actions.push(Action::Create(src.clone()));
                }
                continue;
            };

            let classification = classify(
                &NormalizedRecord::from_desired(src),
                &NormalizedRecord::from_remote(dst, self.directory),
            );
            match classification {
                Classification::Identical => {}
                Classification::MetadataChanged { users_changed } => {
                    actions.push(Action::Update {
                        group: dst.clone(),
                        desired: src.clone(),
                    });
                    if users_changed {
                        actions.push(Action::UpdateUsers {
                            group_id: dst.id.clone(),
                            desired: src.clone(),
                        });
                    }
                }
                Classification::MembershipChanged => actions.push(Action::UpdateUsers {
                    group_id: dst.id.clone(),
                    desired: src.clone(),
                }),
            }
        }
        actions
    }

    /// Active remote groups with no desired counterpart.
    pub fn disable_pass(&self, view: &SnapshotView<'_>) -> Vec<Action> {
        let declared: HashSet<&str> = self.desired.iter().map(|d| d.name.as_str()).collect();
        view.active_groups()
            .filter(|dst| !declared.contains(dst.name.as_str()))
            .map(|dst| Action::Disable(dst.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteUser;
    use chrono::Utc;

    fn remote(id: &str, name: &str, description: &str, users: &[&str]) -> RemoteGroup {
        RemoteGroup {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            handle: name.into(),
            users: users.iter().map(|u| (*u).to_string()).collect(),
            deleted_at: None,
        }
    }

    fn directory() -> UserDirectory {
        UserDirectory::from_users([RemoteUser::new("1", "alice"), RemoteUser::new("2", "bob")])
    }

    #[test]
    fn test_enable_pass_only_disabled_matches() {
        let mut disabled = remote("S2", "ops", "", &[]);
        disabled.deleted_at = Some(Utc::now());
        let groups = vec![remote("S1", "eng", "", &[]), disabled];
        let view = SnapshotView::new(&groups);
        let desired = vec![
            DesiredGroup::new("eng", "", "eng"),
            DesiredGroup::new("ops", "", "ops"),
            DesiredGroup::new("new", "", "new"),
        ];
        let dir = directory();

        let actions = Planner::new(&desired, &dir).enable_pass(&view);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::Enable(g) if g.id == "S2"));
    }

    #[test]
    fn test_mutation_pass_buckets() {
        let groups = vec![
            remote("S1", "same", "Same", &["1"]),
            remote("S2", "members", "Members", &["1"]),
            remote("S3", "meta", "Old", &["1"]),
            remote("S4", "both", "Old", &["1"]),
        ];
        let view = SnapshotView::new(&groups);
        let desired = vec![
            DesiredGroup::new("same", "Same", "same").with_users(["alice"]),
            DesiredGroup::new("members", "Members", "members").with_users(["alice", "bob"]),
            DesiredGroup::new("meta", "New", "meta").with_users(["alice"]),
            DesiredGroup::new("both", "New", "both").with_users(["bob"]),
            DesiredGroup::new("fresh", "Fresh", "fresh"),
        ];
        let dir = directory();

        let plan = ActionPlan {
            actions: Planner::new(&desired, &dir).mutation_pass(&view),
        };
        assert_eq!(
            plan.kinds(),
            vec![
                ActionKind::UpdateUsers,
                ActionKind::Update,
                ActionKind::Update,
                ActionKind::UpdateUsers,
                ActionKind::Create,
            ]
        );
        assert_eq!(plan.summary().updates, 3);
        assert_eq!(plan.summary().creates, 1);
    }

    #[test]
    fn test_handle_only_difference_plans_nothing() {
        let groups = vec![remote("S1", "eng", "Engineers", &["1"])];
        let view = SnapshotView::new(&groups);
        let desired = vec![DesiredGroup::new("eng", "Engineers", "engineering").with_users(["alice"])];
        let dir = directory();

        assert!(Planner::new(&desired, &dir).mutation_pass(&view).is_empty());
    }

    #[test]
    fn test_mutation_pass_skips_still_disabled() {
        let mut disabled = remote("S1", "eng", "", &[]);
        disabled.deleted_at = Some(Utc::now());
        let groups = vec![disabled];
        let view = SnapshotView::new(&groups);
        let desired = vec![DesiredGroup::new("eng", "", "eng")];
        let dir = directory();

        assert!(Planner::new(&desired, &dir).mutation_pass(&view).is_empty());
    }

    #[test]
    fn test_disable_pass_only_unmatched_active() {
        let mut disabled = remote("S3", "gone", "", &[]);
        disabled.deleted_at = Some(Utc::now());
        let groups = vec![remote("S1", "eng", "", &[]), remote("S2", "old", "", &[]), disabled];
        let view = SnapshotView::new(&groups);
        let desired = vec![DesiredGroup::new("eng", "", "eng")];
        let dir = directory();

        let actions = Planner::new(&desired, &dir).disable_pass(&view);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].to_string(), "disable old");
    }
}
