//! `export` command - dump Slack usergroups as a desired-state file

use crate::Context;
use crate::cli::ExportArgs;
use crate::commands::connect;
use crate::config::{self, Format};
use crate::progress;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use reconcile::{DesiredGroup, RemoteClient, RemoteGroup, UserDirectory};
use std::fs;

pub fn run(ctx: &Context, args: ExportArgs) -> Result<()> {
    let client = connect(ctx)?;

    let pb = progress::spinner(ctx.quiet, "Fetching Slack usergroups...");
    let fetched = UserDirectory::fetch(&client).and_then(|directory| {
        client
            .list_groups(args.include_disabled)
            .context("Failed to list remote usergroups")
            .map(|groups| (directory, groups))
    });
    progress::finish_clear(&pb);
    let (directory, groups) = fetched?;

    let desired = to_desired(&groups, &directory);
    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(Format::from_path))
        .unwrap_or(Format::Yaml);
    let content = config::render_desired_groups(&desired, format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Could not write {}", path.display()))?;
            if !ctx.quiet {
                ui::success(&format!(
                    "Exported {} usergroups to {}",
                    desired.len(),
                    path.display()
                ));
            }
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// Remote groups as desired groups, sorted by name, members as sorted
/// usernames. Ids without a known user are kept as they are.
fn to_desired(groups: &[RemoteGroup], directory: &UserDirectory) -> Vec<DesiredGroup> {
    let mut desired: Vec<DesiredGroup> = groups
        .iter()
        .map(|group| {
            let mut users: Vec<String> = group
                .users
                .iter()
                .map(|id| directory.name_of(id).unwrap_or(id.as_str()).to_string())
                .collect();
            users.sort();
            users.dedup();
            DesiredGroup::new(&group.name, &group.description, &group.handle).with_users(users)
        })
        .collect();
    desired.sort_by(|a, b| a.name.cmp(&b.name));
    desired
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::RemoteUser;

    fn group(name: &str, users: &[&str]) -> RemoteGroup {
        RemoteGroup {
            id: format!("S-{name}"),
            name: name.into(),
            description: format!("{name} team"),
            handle: name.into(),
            users: users.iter().map(|u| (*u).to_string()).collect(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_to_desired_sorts_and_resolves() {
        let directory =
            UserDirectory::from_users([RemoteUser::new("U1", "bob"), RemoteUser::new("U2", "alice")]);
        let groups = vec![group("ops", &["U1"]), group("eng", &["U1", "U2", "U9", "U2"])];

        let desired = to_desired(&groups, &directory);
        assert_eq!(desired[0].name, "eng");
        assert_eq!(desired[0].users, vec!["U9", "alice", "bob"]);
        assert_eq!(desired[0].description, "eng team");
        assert_eq!(desired[1].name, "ops");
        assert_eq!(desired[1].users, vec!["bob"]);
    }

    #[test]
    fn test_export_renders_loadable_yaml() {
        let directory = UserDirectory::from_users([RemoteUser::new("U1", "alice")]);
        let desired = to_desired(&[group("eng", &["U1"])], &directory);

        let rendered = config::render_desired_groups(&desired, Format::Yaml).unwrap();
        let parsed = config::parse_desired_groups(&rendered, Format::Yaml).unwrap();
        assert_eq!(parsed, desired);
    }
}
