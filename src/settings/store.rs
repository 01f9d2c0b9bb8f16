//! Layered settings store backed by a user settings file.
//!
//! Keys are kept fully qualified (`codeframe.container.boxShadow`). Sections
//! named `[<languageId>]` hold per-language overrides whose keys are fully
//! qualified too, matching the layout of an editor `settings.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::value::SettingValue;

/// Errors that can occur when loading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{}': {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to parse settings file '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Settings file '{}' must contain an object at the top level", .path.display())]
    NotAnObject { path: PathBuf },
}

/// Raw settings: group values plus per-language override sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    values: BTreeMap<String, SettingValue>,
    language_overrides: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields an empty store. Files ending in `.json` are read
    /// as `settings.json`, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_file(path, &content),
            Err(e) => Self::missing_or_error(path, e),
        }
    }

    /// [`SettingsStore::load`] without blocking the runtime.
    pub async fn load_async(path: &Path) -> Result<Self, SettingsError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::parse_file(path, &content),
            Err(e) => Self::missing_or_error(path, e),
        }
    }

    fn missing_or_error(path: &Path, e: std::io::Error) -> Result<Self, SettingsError> {
        if e.kind() == std::io::ErrorKind::NotFound {
            log::debug!("Settings file {:?} not found, using empty settings", path);
            return Ok(Self::default());
        }
        Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn parse_file(path: &Path, content: &str) -> Result<Self, SettingsError> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(content).map_err(|e| match e {
                JsonLoadError::Parse(source) => SettingsError::Json {
                    path: path.to_path_buf(),
                    source,
                },
                JsonLoadError::NotAnObject => SettingsError::NotAnObject {
                    path: path.to_path_buf(),
                },
            })
        } else {
            Self::from_toml_str(content).map_err(|source| SettingsError::Toml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Parse TOML settings. Nested tables flatten into dotted keys.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = content.parse()?;
        let mut store = Self::default();
        for (key, value) in table {
            match (language_section_name(&key), value) {
                (Some(language), toml::Value::Table(section)) => {
                    let overrides = store.language_overrides.entry(language.to_string()).or_default();
                    for (inner_key, inner_value) in section {
                        flatten_toml(&inner_key, inner_value, overrides);
                    }
                }
                (_, value) => flatten_toml(&key, value, &mut store.values),
            }
        }
        Ok(store)
    }

    /// Parse `settings.json`-style settings (flat dotted keys).
    pub fn from_json_str(content: &str) -> Result<Self, JsonLoadError> {
        let root: serde_json::Value = serde_json::from_str(content).map_err(JsonLoadError::Parse)?;
        let serde_json::Value::Object(map) = root else {
            return Err(JsonLoadError::NotAnObject);
        };

        let mut store = Self::default();
        for (key, value) in map {
            match (language_section_name(&key), value) {
                (Some(language), serde_json::Value::Object(section)) => {
                    let overrides = store.language_overrides.entry(language.to_string()).or_default();
                    for (inner_key, inner_value) in section {
                        flatten_json(&inner_key, inner_value, overrides);
                    }
                }
                (_, value) => flatten_json(&key, value, &mut store.values),
            }
        }
        Ok(store)
    }

    /// Set a fully-qualified group value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a fully-qualified override for one language.
    pub fn set_language_override(
        &mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<SettingValue>,
    ) -> &mut Self {
        self.language_overrides
            .entry(language.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Value configured for `key` outside any language section.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Override configured for `key` in the `[language]` section.
    pub fn language_override(&self, language: &str, key: &str) -> Option<&SettingValue> {
        self.language_overrides.get(language)?.get(key)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.language_overrides.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.language_overrides.is_empty()
    }
}

/// Failure modes of [`SettingsStore::from_json_str`].
#[derive(Debug, thiserror::Error)]
pub enum JsonLoadError {
    #[error(transparent)]
    Parse(serde_json::Error),
    #[error("expected a JSON object at the top level")]
    NotAnObject,
}

/// `"[rust]"` -> `Some("rust")`.
fn language_section_name(key: &str) -> Option<&str> {
    key.strip_prefix('[')?
        .strip_suffix(']')
        .filter(|language| !language.is_empty())
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_toml(key: &str, value: toml::Value, out: &mut BTreeMap<String, SettingValue>) {
    match value {
        toml::Value::Boolean(b) => {
            out.insert(key.to_string(), SettingValue::Bool(b));
        }
        toml::Value::Integer(n) => {
            out.insert(key.to_string(), SettingValue::Number(n as f64));
        }
        toml::Value::Float(n) => {
            out.insert(key.to_string(), SettingValue::Number(n));
        }
        toml::Value::String(s) => {
            out.insert(key.to_string(), SettingValue::String(s));
        }
        toml::Value::Table(table) => {
            for (inner_key, inner_value) in table {
                flatten_toml(&join_key(key, &inner_key), inner_value, out);
            }
        }
        toml::Value::Array(_) | toml::Value::Datetime(_) => {
            log::warn!("Ignoring setting '{}': unsupported value type", key);
        }
    }
}

fn flatten_json(key: &str, value: serde_json::Value, out: &mut BTreeMap<String, SettingValue>) {
    match value {
        serde_json::Value::Bool(b) => {
            out.insert(key.to_string(), SettingValue::Bool(b));
        }
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(n) => {
                out.insert(key.to_string(), SettingValue::Number(n));
            }
            None => log::warn!("Ignoring setting '{}': number out of range", key),
        },
        serde_json::Value::String(s) => {
            out.insert(key.to_string(), SettingValue::String(s));
        }
        serde_json::Value::Object(map) => {
            for (inner_key, inner_value) in map {
                flatten_json(&join_key(key, &inner_key), inner_value, out);
            }
        }
        serde_json::Value::Null => {}
        serde_json::Value::Array(_) => {
            log::warn!("Ignoring setting '{}': unsupported value type", key);
        }
    }
}
