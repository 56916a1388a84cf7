//! Group snapshot - memoized remote group state with explicit invalidation

use crate::client::RemoteClient;
use crate::types::RemoteGroup;
use anyhow::{Context, Result};

/// Point-in-time cache of remote groups.
///
/// One `list_groups(include_disabled = true)` fetch backs both views: the
/// active view is the subset with no `deleted_at`. The fetch happens on first
/// access and again only after [`GroupSnapshot::invalidate`].
pub struct GroupSnapshot<'c, C: RemoteClient + ?Sized> {
    client: &'c C,
    groups: Option<Vec<RemoteGroup>>,
}

impl<'c, C: RemoteClient + ?Sized> GroupSnapshot<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            groups: None,
        }
    }

    /// Borrow both views, fetching first if needed.
    pub fn view(&mut self) -> Result<SnapshotView<'_>> {
        if self.groups.is_none() {
            let groups = self
                .client
                .list_groups(true)
                .context("Failed to list remote usergroups")?;
            log::debug!("Fetched {} remote usergroups", groups.len());
            self.groups = Some(groups);
        }
        Ok(SnapshotView {
            groups: self.groups.as_deref().unwrap_or_default(),
        })
    }

    /// Active groups only.
    pub fn active_groups(&mut self) -> Result<Vec<RemoteGroup>> {
        Ok(self.view()?.active_groups().cloned().collect())
    }

    /// Active and disabled groups.
    pub fn all_groups(&mut self) -> Result<Vec<RemoteGroup>> {
        Ok(self.view()?.all_groups().to_vec())
    }

    /// Drop the cached state; the next access re-fetches.
    pub fn invalidate(&mut self) {
        log::debug!("Invalidating usergroup snapshot");
        self.groups = None;
    }

    /// Whether a fetch is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.groups.is_some()
    }

    /// Treat the given disabled groups as enabled without asking the remote.
    ///
    /// Used in dry-run mode, where enables are never sent but the later passes
    /// must still see the post-enable view.
    pub fn assume_enabled(&mut self, ids: &[String]) -> Result<()> {
        self.view()?;
        if let Some(groups) = self.groups.as_mut() {
            for group in groups.iter_mut().filter(|g| ids.contains(&g.id)) {
                group.deleted_at = None;
            }
        }
        Ok(())
    }
}

/// Borrowed views over one snapshot fetch
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    groups: &'a [RemoteGroup],
}

impl<'a> SnapshotView<'a> {
    /// Wrap an already-fetched group list.
    pub fn new(groups: &'a [RemoteGroup]) -> Self {
        Self { groups }
    }

    /// Groups with no `deleted_at`.
    pub fn active_groups(&self) -> impl Iterator<Item = &'a RemoteGroup> + 'a {
        self.groups.iter().filter(|g| g.is_active())
    }

    /// Every group, including disabled ones.
    pub fn all_groups(&self) -> &'a [RemoteGroup] {
        self.groups
    }

    /// First active group with exactly this name.
    pub fn find_active(&self, name: &str) -> Option<&'a RemoteGroup> {
        self.active_groups().find(|g| g.name == name)
    }

    /// First group (active or disabled) with exactly this name.
    pub fn find(&self, name: &str) -> Option<&'a RemoteGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClient;
    use chrono::Utc;

    fn group(id: &str, name: &str, disabled: bool) -> RemoteGroup {
        RemoteGroup {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            handle: name.into(),
            users: vec![],
            deleted_at: disabled.then(Utc::now),
        }
    }

    fn mock() -> MockClient {
        MockClient::new().with_groups([
            group("S1", "eng", false),
            group("S2", "old", true),
            group("S3", "eng", false),
        ])
    }

    #[test]
    fn test_views_share_one_fetch() {
        let mock = mock();
        let mut snapshot = GroupSnapshot::new(&mock);

        assert_eq!(snapshot.active_groups().unwrap().len(), 2);
        assert_eq!(snapshot.all_groups().unwrap().len(), 3);
        assert_eq!(mock.group_fetches(), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let mock = mock();
        let mut snapshot = GroupSnapshot::new(&mock);

        snapshot.view().unwrap();
        snapshot.invalidate();
        assert!(!snapshot.is_loaded());
        snapshot.view().unwrap();
        assert_eq!(mock.group_fetches(), 2);
    }

    #[test]
    fn test_find_is_exact_and_first_match() {
        let mock = mock();
        let mut snapshot = GroupSnapshot::new(&mock);
        let view = snapshot.view().unwrap();

        assert_eq!(view.find_active("eng").map(|g| g.id.as_str()), Some("S1"));
        assert!(view.find_active("ENG").is_none());
        assert!(view.find_active("old").is_none());
        assert_eq!(view.find("old").map(|g| g.id.as_str()), Some("S2"));
    }

    #[test]
    fn test_assume_enabled_projects_locally() {
        let mock = mock();
        let mut snapshot = GroupSnapshot::new(&mock);

        snapshot.assume_enabled(&["S2".to_string()]).unwrap();
        assert!(snapshot.view().unwrap().find_active("old").is_some());
        assert!(mock.mutations().is_empty());
        assert_eq!(mock.group_fetches(), 1);
    }
}
