//! Settings file and desired-state loading

use anyhow::{Context, Result};
use clap::ValueEnum;
use reconcile::DesiredGroup;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Parallel jobs when neither the CLI nor settings say otherwise
pub const DEFAULT_JOBS: usize = 4;

/// Desired-state file names tried in the config directory, in order
const DESIRED_FILE_NAMES: &[&str] = &[
    "usergroups.yml",
    "usergroups.yaml",
    "usergroups.toml",
    "usergroups.json",
];

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("rollcall"))
}

/// Expand `~` and environment variables in a configured path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Could not expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[derive(Debug, thiserror::Error)]
pub enum DesiredStateError {
    #[error("unsupported desired-state format: {} (use .yml, .yaml, .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("{} is empty", .0.display())]
    Empty(PathBuf),

    #[error("usergroup #{0} has no name")]
    MissingName(usize),

    #[error("usergroup '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("no desired-state file found in {}", .0.display())]
    NotFound(PathBuf),
}

// ============================================================================
// Settings
// ============================================================================

/// `~/.config/rollcall/config.toml`. Every field is optional.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Slack token (prefer SLACK_TOKEN)
    pub token: Option<String>,
    /// Workspace id for org-wide tokens
    pub team: Option<String>,
    /// Desired-state file
    pub usergroups: Option<String>,
    /// Only report, never write
    pub dry_run: Option<bool>,
    /// Web API base URL
    pub api_base: Option<String>,
    /// Parallel jobs per pass
    pub jobs: Option<usize>,
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_dir()?.join("config.toml");
                if !path.exists() {
                    log::debug!("No settings file at {}", path.display());
                    return Ok(Self::default());
                }
                Self::from_file(&path)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Resolve the desired-state file: explicit path, then `usergroups` from
    /// settings, then the first default file present in the config directory.
    pub fn desired_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(configured) = &self.usergroups {
            return expand_path(configured);
        }
        let dir = config_dir()?;
        discover_desired_file(&dir).ok_or_else(|| DesiredStateError::NotFound(dir).into())
    }

    pub fn jobs(&self, explicit: Option<usize>) -> usize {
        explicit.or(self.jobs).unwrap_or(DEFAULT_JOBS).max(1)
    }

    pub fn dry_run(&self, flag: bool) -> bool {
        flag || self.dry_run.unwrap_or(false)
    }
}

/// First default desired-state file present in `dir`
pub fn discover_desired_file(dir: &Path) -> Option<PathBuf> {
    DESIRED_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

// ============================================================================
// Desired State
// ============================================================================

/// Serialization format of a desired-state file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// YAML and JSON files may be a bare list or a `usergroups` table.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<DesiredGroup>),
    Table(DesiredFile),
}

#[derive(Serialize, Deserialize)]
struct DesiredFile {
    #[serde(default)]
    usergroups: Vec<DesiredGroup>,
}

impl From<Document> for Vec<DesiredGroup> {
    fn from(doc: Document) -> Self {
        match doc {
            Document::List(groups) => groups,
            Document::Table(file) => file.usergroups,
        }
    }
}

/// Parse desired groups from file content
pub fn parse_desired_groups(content: &str, format: Format) -> Result<Vec<DesiredGroup>> {
    let groups: Vec<DesiredGroup> = match format {
        Format::Yaml => serde_yaml::from_str::<Document>(content)
            .context("Invalid YAML format")?
            .into(),
        Format::Json => serde_json::from_str::<Document>(content)
            .context("Invalid JSON format")?
            .into(),
        Format::Toml => {
            toml::from_str::<DesiredFile>(content)
                .context("Invalid TOML format")?
                .usergroups
        }
    };
    validate(&groups)?;
    Ok(groups)
}

/// Load and validate the desired groups from `path`
pub fn load_desired_groups(path: &Path) -> Result<Vec<DesiredGroup>> {
    let format =
        Format::from_path(path).ok_or_else(|| DesiredStateError::UnsupportedFormat(path.into()))?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    if content.trim().is_empty() {
        return Err(DesiredStateError::Empty(path.into()).into());
    }

    let groups = parse_desired_groups(&content, format)
        .with_context(|| format!("Invalid desired state in {}", path.display()))?;
    log::debug!("Loaded {} usergroups from {}", groups.len(), path.display());
    Ok(groups)
}

/// Serialize groups in the desired-state format.
///
/// YAML and JSON are written as a bare list, TOML as `[[usergroups]]`.
pub fn render_desired_groups(groups: &[DesiredGroup], format: Format) -> Result<String> {
    let content = match format {
        Format::Yaml => serde_yaml::to_string(groups).context("Failed to serialize YAML")?,
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(groups).context("Failed to serialize JSON")?;
            json.push('\n');
            json
        }
        Format::Toml => toml::to_string_pretty(&DesiredFile {
            usergroups: groups.to_vec(),
        })
        .context("Failed to serialize TOML")?,
    };
    Ok(content)
}

fn validate(groups: &[DesiredGroup]) -> Result<(), DesiredStateError> {
    let mut seen = HashSet::new();
    for (index, group) in groups.iter().enumerate() {
        if group.name.trim().is_empty() {
            return Err(DesiredStateError::MissingName(index + 1));
        }
        if !seen.insert(group.name.as_str()) {
            return Err(DesiredStateError::DuplicateName(group.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const YAML: &str = "\
- name: eng
  description: Engineers
  handle: eng
  users:
    - alice
    - bob
- name: ops
  handle: ops
";

    #[test]
    fn test_parse_yaml_list() {
        let groups = parse_desired_groups(YAML, Format::Yaml).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].users, vec!["alice", "bob"]);
        assert_eq!(groups[1].description, "");
        assert!(groups[1].users.is_empty());
    }

    #[test]
    fn test_parse_yaml_table() {
        let content = "usergroups:\n  - name: eng\n    handle: eng\n";
        let groups = parse_desired_groups(content, Format::Yaml).unwrap();
        assert_eq!(groups[0].name, "eng");
    }

    #[test]
    fn test_parse_json_both_shapes() {
        let list = r#"[{"name": "eng", "users": ["alice"]}]"#;
        let table = r#"{"usergroups": [{"name": "eng", "users": ["alice"]}]}"#;
        assert_eq!(
            parse_desired_groups(list, Format::Json).unwrap(),
            parse_desired_groups(table, Format::Json).unwrap()
        );
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
[[usergroups]]
name = "eng"
description = "Engineers"
handle = "eng"
users = ["alice", "bob"]
"#;
        let groups = parse_desired_groups(content, Format::Toml).unwrap();
        assert_eq!(groups[0], DesiredGroup::new("eng", "Engineers", "eng").with_users(["alice", "bob"]));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let content = "- name: eng\n- name: eng\n";
        let err = parse_desired_groups(content, Format::Yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DesiredStateError>(),
            Some(DesiredStateError::DuplicateName(name)) if name == "eng"
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        let content = r#"[{"name": "eng"}, {"name": " "}]"#;
        let err = parse_desired_groups(content, Format::Json).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DesiredStateError>(),
            Some(DesiredStateError::MissingName(2))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/usergroups.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("groups.YAML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("groups.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("groups.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("groups.txt")), None);
        assert_eq!(Format::from_path(Path::new("groups")), None);
    }

    #[test]
    fn test_load_desired_groups_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usergroups.yml");
        fs::write(&path, YAML).unwrap();

        let groups = load_desired_groups(&path).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_load_rejects_empty_and_unknown() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("usergroups.yml");
        fs::write(&empty, "  \n").unwrap();
        assert!(load_desired_groups(&empty).is_err());

        let txt = dir.path().join("usergroups.txt");
        fs::write(&txt, YAML).unwrap();
        let err = load_desired_groups(&txt).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_discover_prefers_yml() {
        let dir = TempDir::new().unwrap();
        assert_eq!(discover_desired_file(dir.path()), None);

        fs::write(dir.path().join("usergroups.json"), "[]").unwrap();
        fs::write(dir.path().join("usergroups.yml"), "[]").unwrap();
        assert_eq!(
            discover_desired_file(dir.path()),
            Some(dir.path().join("usergroups.yml"))
        );
    }

    #[test]
    fn test_render_round_trip_toml() {
        let groups = vec![DesiredGroup::new("eng", "Engineers", "eng").with_users(["alice"])];
        let rendered = render_desired_groups(&groups, Format::Toml).unwrap();
        assert!(rendered.contains("[[usergroups]]"));
        assert_eq!(parse_desired_groups(&rendered, Format::Toml).unwrap(), groups);
    }

    #[test]
    fn test_render_yaml_is_bare_list() {
        let groups = vec![DesiredGroup::new("eng", "", "eng")];
        let rendered = render_desired_groups(&groups, Format::Yaml).unwrap();
        assert!(rendered.starts_with("- name: eng"));
    }

    #[test]
    fn test_settings_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "team = \"T1\"\nusergroups = \"/tmp/groups.toml\"\ndry_run = true\njobs = 8\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.team.as_deref(), Some("T1"));
        assert!(settings.dry_run(false));
        assert_eq!(settings.jobs(None), 8);
        assert_eq!(settings.jobs(Some(2)), 2);
        assert_eq!(
            settings.desired_file(None).unwrap(),
            PathBuf::from("/tmp/groups.toml")
        );
        assert_eq!(
            settings.desired_file(Some(Path::new("x.yml"))).unwrap(),
            PathBuf::from("x.yml")
        );
    }

    #[test]
    fn test_settings_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tokn = \"typo\"\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(!settings.dry_run(false));
        assert!(settings.dry_run(true));
        assert_eq!(settings.jobs(None), DEFAULT_JOBS);
        assert_eq!(settings.jobs(Some(0)), 1);
    }

    #[test]
    fn test_expand_path_env() {
        let expanded = expand_path("~/groups.yml").unwrap();
        assert!(expanded.ends_with("groups.yml"));
        assert!(!expanded.starts_with("~"));
    }
}
