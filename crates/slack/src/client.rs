//! Blocking Slack Web API client.
//!
//! Reads use GET with query parameters, writes POST a JSON body. Every call
//! carries the token as a bearer header.

use crate::error::{Error, Result};
use crate::types::{
    Ack, CreateRequest, GroupIdRequest, UpdateRequest, UsergroupResponse, UsergroupsList,
    UsersList, UsersUpdateRequest, WireUser, decode,
};
use reconcile::{
    GroupUpdate, MembershipUpdate, NewGroup, RemoteClient, RemoteGroup, RemoteUser,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default Web API base URL.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Page size for `users.list`.
const USERS_PAGE_LIMIT: &str = "200";

/// Slack client for the user and usergroup methods.
///
/// # Example
///
/// ```no_run
/// use slack::SlackClient;
///
/// let client = SlackClient::new("xoxb-...").unwrap().team(Some("T0123"));
/// let groups = client.usergroups(true).unwrap();
/// println!("Found {} usergroups", groups.len());
/// ```
pub struct SlackClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Web API base URL.
    api_base: String,
    /// Bearer token.
    token: String,
    /// Workspace id sent with usergroup calls.
    team: Option<String>,
}

impl SlackClient {
    /// Create a client for the public Web API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client with a custom API base (for testing).
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::MissingToken);
        }
        Ok(Self {
            agent: ureq::Agent::new_with_defaults(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            team: None,
        })
    }

    /// Scope usergroup calls to a workspace.
    #[must_use]
    pub fn team(mut self, team: Option<impl Into<String>>) -> Self {
        self.team = team.map(Into::into).filter(|t: &String| !t.is_empty());
        self
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        log::debug!("GET {method} {query:?}");
        let mut request = self
            .agent
            .get(&self.method_url(method))
            .header("Authorization", self.auth_header());
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let value: Value = request.call()?.body_mut().read_json()?;
        decode(method, value)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        log::debug!("POST {method}");
        let value: Value = self
            .agent
            .post(&self.method_url(method))
            .header("Authorization", self.auth_header())
            .send_json(body)?
            .body_mut()
            .read_json()?;
        decode(method, value)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every workspace member, following pagination cursors.
    pub fn users(&self) -> Result<Vec<WireUser>> {
        let mut members = Vec::new();
        let mut cursor = String::new();
        loop {
            let page: UsersList = {
                let mut query = vec![("limit", USERS_PAGE_LIMIT)];
                if !cursor.is_empty() {
                    query.push(("cursor", cursor.as_str()));
                }
                self.get("users.list", &query)?
            };
            let next = page.next_cursor().map(str::to_string);
            members.extend(page.members);
            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }
        log::debug!("users.list returned {} members", members.len());
        Ok(members)
    }

    // =========================================================================
    // Usergroups
    // =========================================================================

    /// Usergroups with their member ids.
    pub fn usergroups(&self, include_disabled: bool) -> Result<Vec<RemoteGroup>> {
        let mut query = vec![
            ("include_users", "true"),
            ("include_disabled", if include_disabled { "true" } else { "false" }),
        ];
        if let Some(team) = &self.team {
            query.push(("team_id", team.as_str()));
        }
        let list: UsergroupsList = self.get("usergroups.list", &query)?;
        Ok(list.usergroups.into_iter().map(Into::into).collect())
    }

    /// `usergroups.create`
    pub fn create_usergroup(&self, group: &NewGroup) -> Result<RemoteGroup> {
        let body = CreateRequest::new(group, self.team.as_deref());
        let response: UsergroupResponse = self.post("usergroups.create", &body)?;
        Ok(response.usergroup.into())
    }

    /// `usergroups.enable`
    pub fn enable_usergroup(&self, id: &str) -> Result<()> {
        let body = GroupIdRequest {
            usergroup: id,
            team_id: self.team.as_deref(),
        };
        let _: Ack = self.post("usergroups.enable", &body)?;
        Ok(())
    }

    /// `usergroups.disable`
    pub fn disable_usergroup(&self, id: &str) -> Result<()> {
        let body = GroupIdRequest {
            usergroup: id,
            team_id: self.team.as_deref(),
        };
        let _: Ack = self.post("usergroups.disable", &body)?;
        Ok(())
    }

    /// `usergroups.update`
    pub fn update_usergroup(&self, update: &GroupUpdate) -> Result<()> {
        let body = UpdateRequest::new(update, self.team.as_deref());
        let _: Ack = self.post("usergroups.update", &body)?;
        Ok(())
    }

    /// `usergroups.users.update`
    pub fn update_usergroup_users(&self, update: &MembershipUpdate) -> Result<()> {
        let body = UsersUpdateRequest::new(update, self.team.as_deref());
        let _: Ack = self.post("usergroups.users.update", &body)?;
        Ok(())
    }
}

impl RemoteClient for SlackClient {
    fn list_users(&self) -> anyhow::Result<Vec<RemoteUser>> {
        Ok(self.users()?.into_iter().map(Into::into).collect())
    }

    fn list_groups(&self, include_disabled: bool) -> anyhow::Result<Vec<RemoteGroup>> {
        Ok(self.usergroups(include_disabled)?)
    }

    fn create_group(&self, group: &NewGroup) -> anyhow::Result<RemoteGroup> {
        Ok(self.create_usergroup(group)?)
    }

    fn enable_group(&self, id: &str) -> anyhow::Result<()> {
        Ok(self.enable_usergroup(id)?)
    }

    fn disable_group(&self, id: &str) -> anyhow::Result<()> {
        Ok(self.disable_usergroup(id)?)
    }

    fn update_group(&self, update: &GroupUpdate) -> anyhow::Result<()> {
        Ok(self.update_usergroup(update)?)
    }

    fn update_group_users(&self, update: &MembershipUpdate) -> anyhow::Result<()> {
        Ok(self.update_usergroup_users(update)?)
    }
}
