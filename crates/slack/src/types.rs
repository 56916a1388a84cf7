//! Slack Web API wire types.
//!
//! Responses share an envelope: `{"ok": true, ...}` on success and
//! `{"ok": false, "error": "<code>"}` on failure, usually with HTTP 200.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use reconcile::{GroupUpdate, MembershipUpdate, NewGroup, RemoteGroup, RemoteUser};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Check the envelope of a response and decode its payload.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    if !value.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let code = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        return Err(Error::api(method, code));
    }
    if let Some(warning) = value.get("warning").and_then(Value::as_str) {
        log::debug!("{method}: warning {warning}");
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidResponse(format!("{method}: {e}")))
}

// =============================================================================
// Responses
// =============================================================================

/// A workspace member as returned by `users.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    /// User id, e.g. `U012AB3CD`.
    pub id: String,
    /// Username (handle without `@`).
    pub name: String,
}

impl From<WireUser> for RemoteUser {
    fn from(u: WireUser) -> Self {
        RemoteUser::new(u.id, u.name)
    }
}

/// Pagination cursor holder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    /// Empty when there are no more pages.
    #[serde(default)]
    pub next_cursor: String,
}

/// `users.list` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersList {
    /// One page of members.
    pub members: Vec<WireUser>,
    /// Cursor for the next page.
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

impl UsersList {
    /// Cursor of the next page, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        Some(self.response_metadata.next_cursor.as_str()).filter(|c| !c.is_empty())
    }
}

/// A usergroup as returned by the `usergroups.*` methods.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUsergroup {
    /// Group id, e.g. `S0614TZR7`.
    #[serde(default)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Mention handle.
    #[serde(default)]
    pub handle: String,
    /// Member user ids, present when requested with `include_users`.
    #[serde(default)]
    pub users: Vec<String>,
    /// Epoch seconds of disablement, 0 while active.
    #[serde(default)]
    pub date_delete: i64,
    /// User who disabled the group.
    #[serde(default)]
    pub deleted_by: Option<String>,
}

impl WireUsergroup {
    /// When the group was disabled, `None` while active.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        if self.date_delete > 0 {
            Utc.timestamp_opt(self.date_delete, 0).single()
        } else if self.deleted_by.is_some() {
            Some(DateTime::<Utc>::UNIX_EPOCH)
        } else {
            None
        }
    }
}

impl From<WireUsergroup> for RemoteGroup {
    fn from(g: WireUsergroup) -> Self {
        let deleted_at = g.deleted_at();
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
            handle: g.handle,
            users: g.users,
            deleted_at,
        }
    }
}

/// `usergroups.list` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UsergroupsList {
    /// All groups visible to the token.
    pub usergroups: Vec<WireUsergroup>,
}

/// Payload of methods returning a single group.
#[derive(Debug, Clone, Deserialize)]
pub struct UsergroupResponse {
    /// The affected group.
    pub usergroup: WireUsergroup,
}

/// Payload of methods whose result we do not inspect.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {}

// =============================================================================
// Requests
// =============================================================================

/// `usergroups.create` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest<'a> {
    /// Display name.
    pub name: &'a str,
    /// Free-text description.
    pub description: &'a str,
    /// Mention handle.
    pub handle: &'a str,
    /// Workspace, for org-wide tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<&'a str>,
}

impl<'a> CreateRequest<'a> {
    /// Build from the reconciler's payload.
    pub fn new(group: &'a NewGroup, team_id: Option<&'a str>) -> Self {
        Self {
            name: &group.name,
            description: &group.description,
            handle: &group.handle,
            team_id,
        }
    }
}

/// `usergroups.enable` / `usergroups.disable` body.
#[derive(Debug, Clone, Serialize)]
pub struct GroupIdRequest<'a> {
    /// Group id.
    pub usergroup: &'a str,
    /// Workspace, for org-wide tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<&'a str>,
}

/// `usergroups.update` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    /// Group id.
    pub usergroup: &'a str,
    /// Display name.
    pub name: &'a str,
    /// Free-text description.
    pub description: &'a str,
    /// Mention handle.
    pub handle: &'a str,
    /// Workspace, for org-wide tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<&'a str>,
}

impl<'a> UpdateRequest<'a> {
    /// Build from the reconciler's payload.
    pub fn new(update: &'a GroupUpdate, team_id: Option<&'a str>) -> Self {
        Self {
            usergroup: &update.id,
            name: &update.name,
            description: &update.description,
            handle: &update.handle,
            team_id,
        }
    }
}

/// `usergroups.users.update` body. Users are a comma-separated id list.
#[derive(Debug, Clone, Serialize)]
pub struct UsersUpdateRequest<'a> {
    /// Group id.
    pub usergroup: &'a str,
    /// Comma-separated user ids.
    pub users: String,
    /// Workspace, for org-wide tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<&'a str>,
}

impl<'a> UsersUpdateRequest<'a> {
    /// Build from the reconciler's payload.
    pub fn new(update: &'a MembershipUpdate, team_id: Option<&'a str>) -> Self {
        Self {
            usergroup: &update.id,
            users: update.user_ids.join(","),
            team_id,
        }
    }
}
