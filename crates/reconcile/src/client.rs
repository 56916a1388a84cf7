//! Remote platform client trait and an in-memory implementation.
//!
//! The reconciler only talks to the platform through [`RemoteClient`], so the
//! HTTP transport lives in a separate crate and tests can use [`MockClient`]:
//!
//! ```
//! use reconcile::{MockClient, RemoteClient, RemoteUser};
//!
//! let mock = MockClient::new().with_users([RemoteUser::new("U1", "alice")]);
//! let users = mock.list_users().unwrap();
//! assert_eq!(users.len(), 1);
//! ```

use crate::types::{GroupUpdate, MembershipUpdate, NewGroup, RemoteGroup, RemoteUser};
use anyhow::{Result, bail};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Operations the reconciler needs from the remote platform.
///
/// Implementations must be shareable across the executor's worker threads.
pub trait RemoteClient: Send + Sync {
    /// Fetch every user identity.
    fn list_users(&self) -> Result<Vec<RemoteUser>>;

    /// Fetch groups with their member ids, optionally including disabled ones.
    fn list_groups(&self, include_disabled: bool) -> Result<Vec<RemoteGroup>>;

    /// Create a group. Membership is set separately.
    fn create_group(&self, group: &NewGroup) -> Result<RemoteGroup>;

    /// Re-enable a disabled group.
    fn enable_group(&self, id: &str) -> Result<()>;

    /// Disable (soft-delete) a group.
    fn disable_group(&self, id: &str) -> Result<()>;

    /// Write name, description and handle.
    fn update_group(&self, update: &GroupUpdate) -> Result<()>;

    /// Replace the full member list.
    fn update_group_users(&self, update: &MembershipUpdate) -> Result<()>;
}

/// A call recorded by [`MockClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListUsers,
    ListGroups { include_disabled: bool },
    CreateGroup(NewGroup),
    EnableGroup(String),
    DisableGroup(String),
    UpdateGroup(GroupUpdate),
    UpdateGroupUsers(MembershipUpdate),
}

impl Call {
    /// Whether this call mutates remote state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListUsers | Self::ListGroups { .. })
    }

    /// Method name, as used by [`MockClient::fail_on`]
    pub fn method(&self) -> &'static str {
        match self {
            Self::ListUsers => "list_users",
            Self::ListGroups { .. } => "list_groups",
            Self::CreateGroup(_) => "create_group",
            Self::EnableGroup(_) => "enable_group",
            Self::DisableGroup(_) => "disable_group",
            Self::UpdateGroup(_) => "update_group",
            Self::UpdateGroupUsers(_) => "update_group_users",
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<RemoteUser>,
    groups: Vec<RemoteGroup>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    next_id: usize,
    omit_created_id: bool,
}

/// In-memory remote for tests and offline runs.
///
/// Mutations are applied to the stored groups, so a re-fetch observes them the
/// way the real platform would. Every call is recorded in order.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    /// Create an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed user identities.
    pub fn with_users(self, users: impl IntoIterator<Item = RemoteUser>) -> Self {
        self.state().users.extend(users);
        self
    }

    /// Seed groups (active or disabled).
    pub fn with_groups(self, groups: impl IntoIterator<Item = RemoteGroup>) -> Self {
        self.state().groups.extend(groups);
        self
    }

    /// Make every call of `method` (e.g. `"create_group"`) fail.
    pub fn fail_on(self, method: &str) -> Self {
        self.state().failing.insert(method.to_string());
        self
    }

    /// Return created groups without an identifier.
    pub fn omit_created_id(self) -> Self {
        self.state().omit_created_id = true;
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Only the mutating calls, in order.
    pub fn mutations(&self) -> Vec<Call> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Number of group list fetches issued.
    pub fn group_fetches(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::ListGroups { .. }))
            .count()
    }

    /// Current stored groups.
    pub fn groups(&self) -> Vec<RemoteGroup> {
        self.state().groups.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        let method = call.method();
        state.calls.push(call);
        if state.failing.contains(method) {
            bail!("{method}: simulated failure");
        }
        Ok(state)
    }
}

fn find_mut<'a>(groups: &'a mut [RemoteGroup], id: &str) -> Result<&'a mut RemoteGroup> {
    match groups.iter_mut().find(|g| g.id == id) {
        Some(group) => Ok(group),
        None => bail!("no_such_subteam: {id}"),
    }
}

impl RemoteClient for MockClient {
    fn list_users(&self) -> Result<Vec<RemoteUser>> {
        let state = self.record(Call::ListUsers)?;
        Ok(state.users.clone())
    }

    fn list_groups(&self, include_disabled: bool) -> Result<Vec<RemoteGroup>> {
        let state = self.record(Call::ListGroups { include_disabled })?;
        Ok(state
            .groups
            .iter()
            .filter(|g| include_disabled || g.is_active())
            .cloned()
            .collect())
    }

    fn create_group(&self, group: &NewGroup) -> Result<RemoteGroup> {
        let mut state = self.record(Call::CreateGroup(group.clone()))?;
        if state.groups.iter().any(|g| g.name == group.name) {
            bail!("name_already_exists: {}", group.name);
        }

        state.next_id += 1;
        let created = RemoteGroup {
            id: format!("S{:04}", state.next_id),
            name: group.name.clone(),
            description: group.description.clone(),
            handle: group.handle.clone(),
            users: Vec::new(),
            deleted_at: None,
        };
        state.groups.push(created.clone());

        if state.omit_created_id {
            return Ok(RemoteGroup {
                id: String::new(),
                ..created
            });
        }
        Ok(created)
    }

    fn enable_group(&self, id: &str) -> Result<()> {
        let mut state = self.record(Call::EnableGroup(id.to_string()))?;
        find_mut(&mut state.groups, id)?.deleted_at = None;
        Ok(())
    }

    fn disable_group(&self, id: &str) -> Result<()> {
        let mut state = self.record(Call::DisableGroup(id.to_string()))?;
        find_mut(&mut state.groups, id)?.deleted_at = Some(Utc::now());
        Ok(())
    }

    fn update_group(&self, update: &GroupUpdate) -> Result<()> {
        let mut state = self.record(Call::UpdateGroup(update.clone()))?;
        let group = find_mut(&mut state.groups, &update.id)?;
        group.name = update.name.clone();
        group.description = update.description.clone();
        group.handle = update.handle.clone();
        Ok(())
    }

    fn update_group_users(&self, update: &MembershipUpdate) -> Result<()> {
        let mut state = self.record(Call::UpdateGroupUsers(update.clone()))?;
        find_mut(&mut state.groups, &update.id)?.users = update.user_ids.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str) -> RemoteGroup {
        RemoteGroup {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            handle: name.into(),
            users: vec![],
            deleted_at: None,
        }
    }

    #[test]
    fn test_mock_list_groups_filters_disabled() {
        let mut disabled = group("S2", "old");
        disabled.deleted_at = Some(Utc::now());
        let mock = MockClient::new().with_groups([group("S1", "eng"), disabled]);

        assert_eq!(mock.list_groups(false).unwrap().len(), 1);
        assert_eq!(mock.list_groups(true).unwrap().len(), 2);
        assert_eq!(mock.group_fetches(), 2);
    }

    #[test]
    fn test_mock_create_assigns_id_and_rejects_duplicates() {
        let mock = MockClient::new();
        let new = NewGroup {
            name: "eng".into(),
            description: "Engineers".into(),
            handle: "eng".into(),
        };

        let created = mock.create_group(&new).unwrap();
        assert_eq!(created.id, "S0001");
        assert!(mock.create_group(&new).is_err());
    }

    #[test]
    fn test_mock_enable_disable_roundtrip() {
        let mock = MockClient::new().with_groups([group("S1", "eng")]);
        mock.disable_group("S1").unwrap();
        assert!(mock.groups()[0].is_disabled());
        mock.enable_group("S1").unwrap();
        assert!(mock.groups()[0].is_active());
        assert!(mock.enable_group("S9").is_err());
    }

    #[test]
    fn test_mock_fail_on_records_call() {
        let mock = MockClient::new().fail_on("disable_group");
        assert!(mock.disable_group("S1").is_err());
        assert_eq!(mock.mutations(), vec![Call::DisableGroup("S1".into())]);
    }

    #[test]
    fn test_mock_omit_created_id() {
        let mock = MockClient::new().omit_created_id();
        let created = mock
            .create_group(&NewGroup {
                name: "eng".into(),
                description: String::new(),
                handle: "eng".into(),
            })
            .unwrap();
        assert!(created.id.is_empty());
        assert_eq!(mock.groups().len(), 1);
    }
}
