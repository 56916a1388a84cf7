pub mod apply;
pub mod export;

use crate::Context;
use anyhow::Result;
use slack::SlackClient;

/// Build a Slack client from flags, environment and settings.
pub fn connect(ctx: &Context) -> Result<SlackClient> {
    let token = ctx
        .token
        .clone()
        .or_else(|| ctx.settings.token.clone())
        .ok_or(slack::Error::MissingToken)?;
    let team = ctx.team.clone().or_else(|| ctx.settings.team.clone());
    let api_base = ctx
        .settings
        .api_base
        .as_deref()
        .unwrap_or(slack::DEFAULT_API_BASE);

    log::debug!("Using Slack API at {api_base}");
    Ok(SlackClient::with_api_base(token, api_base)?.team(team))
}
