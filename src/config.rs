use crate::cli::parser::WalkArgs;
use crate::github::RepoRef;
use crate::storage::DEFAULT_WHITELIST_FILENAME;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Username,
    Repository,
    Whitelist,
    Since,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Username => "username",
            ConfigKey::Repository => "repository",
            ConfigKey::Whitelist => "whitelist",
            ConfigKey::Since => "since",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::Username,
            ConfigKey::Repository,
            ConfigKey::Whitelist,
            ConfigKey::Since,
        ]
    }
}

/// Filename for the project-specific configuration within the .quickblock directory.
pub const PROJECT_CONFIG_FILENAME: &str = "config.json";
/// Directory name for project-specific configuration.
pub const PROJECT_CONFIG_DIR: &str = ".quickblock";
/// Environment variable consulted for the token when no flag gives one.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Parses a JSON configuration file content into a map of configuration values.
///
/// - Returns `Ok(HashMap<ConfigKey, Value>)` with every known key found in the object.
/// - Returns an empty HashMap if the input `content` is empty or contains only whitespace.
/// - Returns an `Err` if the JSON parsing fails or the top level is not an object.
///
/// Unknown keys are ignored. A `token` key is never read: credentials stay
/// out of project files.
pub fn parse_config(content: &[u8]) -> Result<HashMap<ConfigKey, Value>> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(content).context("Failed to parse config JSON")?;

    let mut config_map = HashMap::new();

    if let Value::Object(map) = &value {
        for key in ConfigKey::all() {
            if let Some(val) = map.get(key.as_str()) {
                config_map.insert(*key, val.clone());
            }
        }
        return Ok(config_map);
    }

    Err(anyhow::anyhow!("Config must be a JSON object"))
}

/// Merges `updates` into `base_config` and returns a new configuration map.
///
/// If a key exists in both, the value from `updates` wins.
pub fn update_config(
    base_config: &HashMap<ConfigKey, Value>,
    updates: &HashMap<ConfigKey, Value>,
) -> HashMap<ConfigKey, Value> {
    let mut new_config = base_config.clone();
    for (key, value) in updates {
        new_config.insert(*key, value.clone());
    }
    new_config
}

/// Reads `<dir>/.quickblock/config.json`. A missing file means no settings.
pub fn load_project_config(dir: &Path) -> Result<HashMap<ConfigKey, Value>> {
    let path = dir.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILENAME);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Command-line values as configuration overrides.
pub fn args_to_config(args: &WalkArgs) -> HashMap<ConfigKey, Value> {
    [
        (ConfigKey::Username, &args.username),
        (ConfigKey::Repository, &args.repo),
        (ConfigKey::Whitelist, &args.whitelist),
        (ConfigKey::Since, &args.since),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_ref().map(|v| (key, Value::String(v.clone()))))
    .collect()
}

/// Everything a walk needs, fully resolved.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub username: String,
    pub token: String,
    pub repo: RepoRef,
    pub whitelist_path: PathBuf,
    pub since: Option<DateTime<Utc>>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("whitelist_path", &self.whitelist_path)
            .field("since", &self.since)
            .finish()
    }
}

/// Resolves settings from the project config, command-line flags and the
/// token from the environment, flags taking precedence.
pub fn resolve_settings(
    file_config: &HashMap<ConfigKey, Value>,
    args: &WalkArgs,
    env_token: Option<String>,
) -> Result<Settings> {
    let config = update_config(file_config, &args_to_config(args));

    let username = string_value(&config, ConfigKey::Username)?;
    let token = args
        .token
        .clone()
        .or(env_token)
        .filter(|token| !token.trim().is_empty());
    let (Some(username), Some(token)) = (username, token) else {
        return Err(anyhow::anyhow!("Please provide a username and OAuth token"));
    };

    let Some(repo) = string_value(&config, ConfigKey::Repository)? else {
        return Err(anyhow::anyhow!("Please provide a repository URL"));
    };
    let repo = RepoRef::parse(&repo).map_err(anyhow::Error::msg)?;

    let whitelist_path = string_value(&config, ConfigKey::Whitelist)?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WHITELIST_FILENAME));

    let since = string_value(&config, ConfigKey::Since)?
        .map(|since| parse_since(&since))
        .transpose()?;

    Ok(Settings {
        username,
        token,
        repo,
        whitelist_path,
        since,
    })
}

/// Parses an RFC 3339 timestamp such as `2024-01-31T00:00:00Z`.
pub fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|since| since.with_timezone(&Utc))
        .with_context(|| {
            format!("Invalid since timestamp '{input}', expected RFC 3339 (e.g. 2024-01-31T00:00:00Z)")
        })
}

/// A non-empty string value for `key`, `None` when absent or blank.
fn string_value(config: &HashMap<ConfigKey, Value>, key: ConfigKey) -> Result<Option<String>> {
    match config.get(&key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(anyhow::anyhow!(
            "Config key '{}' must be a string",
            key.as_str()
        )),
    }
}
