use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tasksync_core::{ConflictResolution, SyncPolicy, TaskField};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory holding task records and sync state
    #[serde(default = "default_task_dir")]
    pub task_dir: String,

    /// Conflict policy for fields changed on both sides
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            task_dir: default_task_dir(),
            policy: PolicyConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub default: ConflictResolution,

    /// Per-field overrides, keyed by field name (e.g. `due_date = "unresolved"`)
    #[serde(default)]
    pub fields: BTreeMap<String, ConflictResolution>,
}

impl PolicyConfig {
    pub fn to_policy(&self) -> Result<SyncPolicy> {
        let mut policy = SyncPolicy::default().with_default(self.default);
        for (name, resolution) in &self.fields {
            let field: TaskField = name
                .parse()
                .with_context(|| format!("Invalid [policy.fields] entry '{}'", name))?;
            policy = policy.with_field(field, *resolution);
        }
        Ok(policy)
    }
}

fn default_task_dir() -> String {
    "~/tasks".to_string()
}

/// Get the config directory path (~/.config/tasksync)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("tasksync");
    Ok(config_dir)
}

/// Get the config file path (~/.config/tasksync/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from ~/.config/tasksync/config.toml, defaults if it doesn't exist
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    // Surface bad field names at load time rather than mid-sync
    config.policy.to_policy()?;

    Ok(config)
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.task_dir, "~/tasks");
        assert_eq!(config.policy.to_policy().unwrap(), SyncPolicy::default());
    }

    #[test]
    fn test_policy_section_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
task_dir = "/srv/tasks"

[policy]
default = "unresolved"

[policy.fields]
title = "external_wins"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        let policy = config.policy.to_policy().unwrap();

        assert_eq!(config.task_dir, "/srv/tasks");
        assert_eq!(policy.default, ConflictResolution::Unresolved);
        assert_eq!(
            policy.fields.get(&TaskField::Title),
            Some(&ConflictResolution::ExternalWins)
        );
    }

    #[test]
    fn test_unknown_policy_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[policy.fields]\nestimate = \"local_wins\"\n").unwrap();

        assert!(load_config_from(&path).is_err());
    }
}
