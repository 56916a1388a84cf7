//! Plan rendering for dry-run mode

use crate::diff::{GroupDiff, MembershipDelta, NormalizedRecord, description_changed};
use crate::planner::{Action, Planner};
use crate::snapshot::SnapshotView;
use crate::types::{DesiredGroup, RemoteGroup};

/// Lines describing one group diff. Creates list users as declared.
pub fn describe_diff(src: &DesiredGroup, diff: &GroupDiff) -> Vec<String> {
    match diff {
        GroupDiff::Absent { .. } => describe_create(src),
        GroupDiff::Changed {
            desired, remote, ..
        } => describe_update(desired, remote),
    }
}

fn describe_create(desired: &DesiredGroup) -> Vec<String> {
    let mut lines = vec![
        format!("create usergroup: {}", desired.name),
        format!("  + description: {}", desired.description),
    ];
    lines.extend(desired.users.iter().map(|u| format!("  + user {u}")));
    lines
}

fn describe_update(desired: &NormalizedRecord, remote: &NormalizedRecord) -> Vec<String> {
    let mut lines = vec![format!("update usergroup: {}", desired.name)];
    if description_changed(desired, remote) {
        lines.push(format!("  - description: {}", remote.description));
        lines.push(format!("  + description: {}", desired.description));
    }
    let delta = MembershipDelta::between(desired, remote);
    lines.extend(delta.added.iter().map(|u| format!("  + user {u}")));
    lines.extend(delta.removed.iter().map(|u| format!("  - user {u}")));
    lines
}

pub fn describe_enable(group: &RemoteGroup) -> String {
    format!("enable usergroup: {}", group.name)
}

pub fn describe_disable(group: &RemoteGroup) -> String {
    format!("disable {}", group.name)
}

/// Header line for an action, used when reporting plan entries directly.
pub fn describe_action(action: &Action) -> String {
    match action {
        Action::Enable(group) => describe_enable(group),
        Action::Disable(group) => describe_disable(group),
        Action::Create(desired) => format!("create usergroup: {}", desired.name),
        Action::Update { desired, .. } | Action::UpdateUsers { desired, .. } => {
            format!("update usergroup: {}", desired.name)
        }
    }
}

/// The dry-run report: every desired group against the active view, then the
/// active groups that would be disabled.
pub fn report_pass(planner: &Planner<'_>, view: &SnapshotView<'_>) -> Vec<String> {
    let mut lines: Vec<String> = planner
        .desired()
        .iter()
        .filter_map(|src| {
            GroupDiff::compute(src, view.find_active(&src.name), planner.directory())
                .map(|diff| describe_diff(src, &diff))
        })
        .flatten()
        .collect();

    lines.extend(planner.disable_pass(view).iter().filter_map(|action| match action {
        Action::Disable(group) => Some(describe_disable(group)),
        _ => None,
    }));
    lines
}
