//! Effective toolchain configuration with provenance
//!
//! Captures the merged variable tables plus where each layer came from,
//! and freezes the result into a [`Registry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ccbridge_vars::{Registry, RegistryBuilder, StringListDict, VarsError};

use super::defaults::BuiltinDefaults;
use super::merge::{merge_layers, VARIABLE_TABLES};

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "ccbridge/effective_config@1";

/// Repo config file name, relative to the working directory
pub const REPO_CONFIG_FILE: &str = "ccbridge.toml";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    Repo,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers
    pub fn build(
        host_config_path: Option<&Path>,
        repo_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let file_layers = [
            (ConfigOrigin::Host, host_config_path),
            (ConfigOrigin::Repo, repo_config_path),
        ];
        for (origin, path) in file_layers {
            let Some(path) = path else { continue };
            if !path.exists() {
                tracing::debug!(path = %path.display(), ?origin, "config layer not found, skipping");
                continue;
            }
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Default host config path (`~/.config/ccbridge/toolchain.toml`)
    pub fn default_host_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/ccbridge/toolchain.toml"))
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Check that every variable table has the expected shape
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        if !config.get("output").and_then(|o| o.get("header")).is_some_and(Value::is_string) {
            return Err(ConfigError::ValidationError(
                "output.header must be a string".to_string(),
            ));
        }

        for table in VARIABLE_TABLES {
            let Some(value) = config.get(*table) else { continue };
            let entries = value.as_object().ok_or_else(|| {
                ConfigError::ValidationError(format!("{} must be a table", table))
            })?;
            for (name, entry) in entries {
                let path = format!("{}.{}", table, name);
                match *table {
                    "strings" => {
                        if !entry.is_string() {
                            return Err(ConfigError::ValidationError(format!(
                                "{} must be a string",
                                path
                            )));
                        }
                    }
                    "string_lists" => Self::validate_string_list(&path, entry)?,
                    _ => {
                        let dict = entry.as_object().ok_or_else(|| {
                            ConfigError::ValidationError(format!("{} must be a table", path))
                        })?;
                        for (key, items) in dict {
                            Self::validate_string_list(&format!("{}.{}", path, key), items)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_string_list(path: &str, value: &Value) -> Result<(), ConfigError> {
        let is_string_list = value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if is_string_list {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(format!(
                "{} must be a list of strings",
                path
            )))
        }
    }

    /// Header line for generated output
    pub fn header(&self) -> &str {
        self.get_str("output.header").unwrap_or_default()
    }

    /// Register every variable and freeze the registry
    pub fn to_registry(&self) -> Result<Registry, ConfigError> {
        let mut builder = RegistryBuilder::new();
        for (name, value) in self.table("strings") {
            builder.export_string(name.as_str(), value.as_str().unwrap_or_default());
        }
        for (name, items) in self.table("string_lists") {
            builder.export_string_list(name.as_str(), string_items(items));
        }
        for (name, dict) in self.table("string_list_dicts") {
            let dict: StringListDict = dict
                .as_object()
                .into_iter()
                .flatten()
                .map(|(key, items)| (key.clone(), string_items(items)))
                .collect();
            builder.export_string_list_dict(name.as_str(), dict);
        }
        Ok(builder.freeze()?)
    }

    fn table(&self, name: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.config
            .get(name)
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }
}

fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Build the CLI layer from `NAME=VALUE` and `NAME=A,B,C` arguments
pub fn cli_overrides(sets: &[String], set_lists: &[String]) -> Result<Option<Value>, ConfigError> {
    if sets.is_empty() && set_lists.is_empty() {
        return Ok(None);
    }

    let mut strings = Map::new();
    for arg in sets {
        let (name, value) = split_assignment(arg)?;
        strings.insert(name.to_string(), Value::String(value.to_string()));
    }

    let mut lists = Map::new();
    for arg in set_lists {
        let (name, value) = split_assignment(arg)?;
        let items = value
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect();
        lists.insert(name.to_string(), Value::Array(items));
    }

    Ok(Some(serde_json::json!({
        "strings": strings,
        "string_lists": lists,
    })))
}

fn split_assignment(arg: &str) -> Result<(&str, &str), ConfigError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(ConfigError::ParseError(format!(
            "expected NAME=VALUE, got '{}'",
            arg
        ))),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Vars(#[from] VarsError),
}
