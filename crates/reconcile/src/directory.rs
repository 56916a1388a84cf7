//! User directory - username/identifier lookups for one run

use crate::client::RemoteClient;
use crate::error::{Error, Result};
use crate::types::RemoteUser;
use anyhow::Context;
use std::collections::HashMap;

/// Read-only cache of remote user identities.
///
/// Built from a single `list_users` fetch. Names are matched exactly; if the
/// remote returns the same name twice the first entry wins.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

/// Outcome of resolving a list of usernames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifiers of the resolved names, in input order
    pub ids: Vec<String>,
    /// Names with no remote identity, in input order
    pub missing: Vec<String>,
}

impl UserDirectory {
    /// Fetch all users from the remote.
    pub fn fetch<C: RemoteClient + ?Sized>(client: &C) -> anyhow::Result<Self> {
        let users = client.list_users().context("Failed to list remote users")?;
        log::debug!("Loaded {} remote users", users.len());
        Ok(Self::from_users(users))
    }

    /// Build a directory from already-fetched users.
    pub fn from_users(users: impl IntoIterator<Item = RemoteUser>) -> Self {
        let mut directory = Self::default();
        for user in users {
            directory
                .by_name
                .entry(user.name.clone())
                .or_insert_with(|| user.id.clone());
            directory.by_id.entry(user.id).or_insert(user.name);
        }
        directory
    }

    /// Resolve a username to its identifier.
    pub fn resolve(&self, username: &str) -> Result<&str> {
        self.by_name
            .get(username)
            .map(String::as_str)
            .ok_or_else(|| Error::UserNotFound(username.to_string()))
    }

    /// Resolve every username, collecting misses instead of stopping at them.
    pub fn resolve_all<S: AsRef<str>>(&self, usernames: &[S]) -> Resolution {
        let mut resolution = Resolution::default();
        for username in usernames {
            let username = username.as_ref();
            match self.resolve(username) {
                Ok(id) => resolution.ids.push(id.to_string()),
                Err(_) => resolution.missing.push(username.to_string()),
            }
        }
        resolution
    }

    /// Reverse lookup: identifier to username.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClient;

    fn directory() -> UserDirectory {
        UserDirectory::from_users([
            RemoteUser::new("1", "a"),
            RemoteUser::new("2", "b"),
            RemoteUser::new("3", "b"),
        ])
    }

    #[test]
    fn test_resolve_exact_match() {
        let dir = directory();
        assert_eq!(dir.resolve("a").unwrap(), "1");
        assert!(matches!(dir.resolve("A"), Err(Error::UserNotFound(name)) if name == "A"));
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        assert_eq!(directory().resolve("b").unwrap(), "2");
    }

    #[test]
    fn test_resolve_all_continues_past_missing() {
        let resolution = directory().resolve_all(&["a", "missing", "b"]);
        assert_eq!(resolution.ids, vec!["1", "2"]);
        assert_eq!(resolution.missing, vec!["missing"]);
    }

    #[test]
    fn test_name_of() {
        let dir = directory();
        assert_eq!(dir.name_of("3"), Some("b"));
        assert_eq!(dir.name_of("9"), None);
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn test_fetch_uses_single_list_call() {
        let mock = MockClient::new().with_users([RemoteUser::new("U1", "alice")]);
        let dir = UserDirectory::fetch(&mock).unwrap();
        assert_eq!(dir.resolve("alice").unwrap(), "U1");
        assert_eq!(mock.calls().len(), 1);
    }
}
