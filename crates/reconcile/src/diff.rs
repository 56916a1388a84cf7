//! Diff computation for usergroups
//!
//! Comparison happens on [`NormalizedRecord`]s so desired and remote groups
//! are judged on the same terms: membership as a set of usernames.

use crate::directory::UserDirectory;
use crate::types::{DesiredGroup, RemoteGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Comparable projection of a desired or remote group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub description: String,
    pub handle: String,
    pub users: BTreeSet<String>,
}

impl NormalizedRecord {
    pub fn from_desired(group: &DesiredGroup) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            handle: group.handle.clone(),
            users: group.users.iter().cloned().collect(),
        }
    }

    /// Member ids are mapped back to usernames. An id the directory does not
    /// know is kept verbatim, so it still shows up as a membership difference.
    pub fn from_remote(group: &RemoteGroup, directory: &UserDirectory) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            handle: group.handle.clone(),
            users: group
                .users
                .iter()
                .map(|id| directory.name_of(id).unwrap_or(id.as_str()).to_string())
                .collect(),
        }
    }
}

/// Name, description and membership all match. Handle is deliberately not
/// compared: a handle-only difference never produces an action.
pub fn same(src: &NormalizedRecord, dst: &NormalizedRecord) -> bool {
    src.name == dst.name && !description_changed(src, dst) && !membership_changed(src, dst)
}

pub fn membership_changed(src: &NormalizedRecord, dst: &NormalizedRecord) -> bool {
    src.users != dst.users
}

pub fn description_changed(src: &NormalizedRecord, dst: &NormalizedRecord) -> bool {
    src.description != dst.description
}

pub fn handle_changed(src: &NormalizedRecord, dst: &NormalizedRecord) -> bool {
    src.handle != dst.handle
}

pub fn changed(src: &NormalizedRecord, dst: &NormalizedRecord) -> bool {
    !same(src, dst) && (membership_changed(src, dst) || description_changed(src, dst))
}

/// How a desired group relates to its active remote counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Nothing to do
    Identical,
    /// Description differs; membership may differ as well
    MetadataChanged { users_changed: bool },
    /// Only membership differs
    MembershipChanged,
}

impl Classification {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }
}

/// Classify one desired/remote pair.
pub fn classify(src: &NormalizedRecord, dst: &NormalizedRecord) -> Classification {
    if same(src, dst) || !changed(src, dst) {
        Classification::Identical
    } else if description_changed(src, dst) {
        Classification::MetadataChanged {
            users_changed: membership_changed(src, dst),
        }
    } else {
        Classification::MembershipChanged
    }
}

/// Usernames to add and remove, each sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl MembershipDelta {
    pub fn between(src: &NormalizedRecord, dst: &NormalizedRecord) -> Self {
        Self {
            added: src.users.difference(&dst.users).cloned().collect(),
            removed: dst.users.difference(&src.users).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// A computed difference for one desired group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupDiff {
    /// No active remote group has this name
    Absent { desired: NormalizedRecord },
    /// Active remote group exists and differs
    Changed {
        desired: NormalizedRecord,
        remote: NormalizedRecord,
        classification: Classification,
    },
}

impl GroupDiff {
    /// Compare a desired group against the active remote group of the same
    /// name. Returns `None` when nothing would change.
    pub fn compute(
        desired: &DesiredGroup,
        remote: Option<&RemoteGroup>,
        directory: &UserDirectory,
    ) -> Option<Self> {
        let src = NormalizedRecord::from_desired(desired);
        let Some(remote) = remote else {
            return Some(Self::Absent { desired: src });
        };

        let dst = NormalizedRecord::from_remote(remote, directory);
        let classification = classify(&src, &dst);
        if classification.is_identical() {
            return None;
        }
        Some(Self::Changed {
            desired: src,
            remote: dst,
            classification,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Absent { desired } | Self::Changed { desired, .. } => &desired.name,
        }
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub enables: usize,
    pub creates: usize,
    pub updates: usize,
    pub disables: usize,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.enables + self.creates + self.updates + self.disables
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
