//! Layered settings: the raw store read from the user's settings file and
//! the resolver that merges group values with per-language overrides.

mod resolver;
mod store;
mod value;

pub use resolver::{strip_legacy_prefix, ResolvedSettings, SettingsResolver};
pub use store::{JsonLoadError, SettingsError, SettingsStore};
pub use value::{Resolved, SettingValue};

/// Group holding generic editor settings.
pub const EDITOR_GROUP: &str = "editor";

/// Group holding this extension's settings.
pub const EXTENSION_GROUP: &str = "codeframe";

/// Keys read from the editor group.
pub const EDITOR_KEYS: &[&str] = &["fontLigatures", "tabSize"];

/// Keys read from the extension group, in their section-prefixed form.
pub const EXTENSION_KEYS: &[&str] = &[
    "action.shutterAction",
    "action.target",
    "background.backgroundColor",
    "background.externalCssPath",
    "background.transparentBackground",
    "background.useExternalCss",
    "code.realLineNumbers",
    "code.showLineNumbers",
    "container.boxShadow",
    "container.containerPadding",
    "container.roundedCorners",
    "container.showWindowControls",
    "container.showWindowTitle",
];
