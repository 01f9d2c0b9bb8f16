//! Configuration file handling for codeframe.
//!
//! Loads configuration from `~/.config/codeframe/config.toml` or a custom path.
//! The config file says where the user settings live and where images go by
//! default; the settings themselves are read by [`crate::settings`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coordinator::default_image_path;

/// Configuration file structure for codeframe.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct SettingsConfig {
    /// Settings file (TOML, or `settings.json`).
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CaptureConfig {
    /// First suggestion of the save dialog.
    pub default_image_path: Option<PathBuf>,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Settings file to read, with `~` expanded.
    pub fn settings_path(&self) -> PathBuf {
        self.settings
            .path
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(default_settings_path)
    }

    /// Initial save location, with `~` expanded.
    pub fn image_path(&self) -> PathBuf {
        self.capture
            .default_image_path
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(default_image_path)
    }
}

/// Directory holding codeframe's config and settings.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("codeframe"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/codeframe")
        })
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the default settings file path.
pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Replace a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Written by `codeframe config init`.
pub const DEFAULT_CONFIG: &str = r#"# codeframe configuration

[settings]
# Settings file: TOML, or an editor-style settings.json
# path = "~/.config/codeframe/settings.toml"

[capture]
# Where the save dialog points first
# default_image_path = "~/Desktop/code.png"
"#;

/// Written next to the config by `codeframe config init`.
pub const DEFAULT_SETTINGS: &str = r##"# codeframe settings
#
# Tables flatten into dotted keys: [codeframe.container] boxShadow = ...
# is the setting "codeframe.container.boxShadow". Sections named after a
# language id in brackets override settings for that language only.

[editor]
tabSize = 4
fontLigatures = false

[codeframe.action]
shutterAction = "save"
target = "container"

[codeframe.background]
backgroundColor = "#abb8c3"
transparentBackground = false
useExternalCss = false
externalCssPath = ""

[codeframe.code]
showLineNumbers = true
realLineNumbers = false

[codeframe.container]
boxShadow = "rgba(0, 0, 0, 0.55) 0px 20px 68px"
containerPadding = "3em"
roundedCorners = true
showWindowControls = true
showWindowTitle = false

# ["[python]"]
# "editor.tabSize" = 4
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingValue, SettingsStore};

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[settings]\npath = \"/etc/codeframe.json\"\n[capture]\ndefault_image_path = \"/tmp/out.png\"\n",
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.settings_path(), PathBuf::from("/etc/codeframe.json"));
        assert_eq!(config.image_path(), PathBuf::from("/tmp/out.png"));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_defaults_point_into_config_dir() {
        let config = Config::default();
        assert!(config.settings_path().ends_with("codeframe/settings.toml"));
        assert!(config.image_path().ends_with("Desktop/code.png"));
    }

    #[test]
    fn test_expand_home_leaves_other_paths() {
        assert_eq!(expand_home(Path::new("/abs/x.png")), PathBuf::from("/abs/x.png"));
        assert_eq!(expand_home(Path::new("rel/x.png")), PathBuf::from("rel/x.png"));
    }

    #[test]
    fn test_default_templates_parse() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());

        let store = SettingsStore::from_toml_str(DEFAULT_SETTINGS).unwrap();
        assert_eq!(
            store.get("codeframe.container.boxShadow"),
            Some(&SettingValue::from("rgba(0, 0, 0, 0.55) 0px 20px 68px"))
        );
        assert_eq!(store.get("editor.tabSize"), Some(&SettingValue::Number(4.0)));
    }
}
