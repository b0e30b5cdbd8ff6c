use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::policy::AllowList;
use crate::resolver::ExclusionSet;

/// Root configuration structure, deserialized from `.golicense/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// License policy rules.
#[derive(Debug, Default, Deserialize)]
pub struct PolicyConfig {
    /// Accepted license types. Empty means every type is accepted.
    #[serde(default)]
    pub allowed: Vec<String>,
    /// Dependencies to skip, as `path@version`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// A non-empty `--allowed` list replaces the configured one.
    pub fn allow_list(&self, cli_allowed: &[String]) -> AllowList {
        let source: &[String] = if cli_allowed.is_empty() {
            &self.policy.allowed
        } else {
            cli_allowed
        };
        source
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// `--exclude` entries are added to the configured ones.
    pub fn exclusions(&self, cli_excluded: &[String]) -> ExclusionSet {
        self.policy
            .exclude
            .iter()
            .chain(cli_excluded)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Load the policy configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<base_dir>/.golicense/config.toml`
/// 3. `~/.config/golicense/config.toml`
/// 4. Built-in [`Config::default`] (allow everything, exclude nothing)
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = base_dir.join(".golicense").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("golicense").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
