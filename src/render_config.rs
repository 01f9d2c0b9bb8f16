//! The configuration snapshot synchronized to the render surface.
//!
//! A [`RenderConfig`] is built fresh for every update and never mutated after
//! it is sent. Layers of settings are expressed as [`ConfigPatch`]es and
//! applied with [`merge_config`], so precedence is an explicit call order
//! rather than a property of how maps happen to be combined.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::style::ExternalCssResult;

pub const DEFAULT_TAB_SIZE: u32 = 4;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#abb8c3";
pub const DEFAULT_BOX_SHADOW: &str = "rgba(0, 0, 0, 0.55) 0px 20px 68px";
pub const DEFAULT_CONTAINER_PADDING: &str = "3em";

/// Ligature setting: on/off, or an explicit `font-feature-settings` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontLigatures {
    Enabled(bool),
    Features(String),
}

impl Default for FontLigatures {
    fn default() -> Self {
        FontLigatures::Enabled(false)
    }
}

impl FontLigatures {
    pub fn is_enabled(&self) -> bool {
        match self {
            FontLigatures::Enabled(b) => *b,
            FontLigatures::Features(f) => !f.is_empty(),
        }
    }
}

/// What pressing the shutter does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutterAction {
    #[default]
    Save,
    Copy,
}

impl ShutterAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "save" => Some(ShutterAction::Save),
            "copy" => Some(ShutterAction::Copy),
            _ => None,
        }
    }
}

/// Which element is photographed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureTarget {
    #[default]
    Container,
    Window,
}

impl CaptureTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "container" => Some(CaptureTarget::Container),
            "window" => Some(CaptureTarget::Window),
            _ => None,
        }
    }
}

/// Everything the render surface needs to paint one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    // typography / editor
    pub font_ligatures: FontLigatures,
    pub tab_size: u32,

    // frame / appearance
    pub background_color: String,
    pub box_shadow: String,
    pub container_padding: String,
    pub rounded_corners: bool,
    pub show_window_controls: bool,
    pub show_window_title: bool,
    pub show_line_numbers: bool,
    pub real_line_numbers: bool,
    pub transparent_background: bool,

    // behavioral
    pub shutter_action: ShutterAction,
    pub target: CaptureTarget,
    pub start_line: u32,
    pub window_title: String,

    // external stylesheet
    pub use_external_css: bool,
    pub external_css_path: String,
    pub external_css: Option<String>,
    pub external_css_error: Option<String>,
    pub external_css_resolved_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_ligatures: FontLigatures::default(),
            tab_size: DEFAULT_TAB_SIZE,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            box_shadow: DEFAULT_BOX_SHADOW.to_string(),
            container_padding: DEFAULT_CONTAINER_PADDING.to_string(),
            rounded_corners: true,
            show_window_controls: true,
            show_window_title: false,
            show_line_numbers: true,
            real_line_numbers: false,
            transparent_background: false,
            shutter_action: ShutterAction::default(),
            target: CaptureTarget::default(),
            start_line: 0,
            window_title: String::new(),
            use_external_css: false,
            external_css_path: String::new(),
            external_css: None,
            external_css_error: None,
            external_css_resolved_path: None,
        }
    }
}

impl RenderConfig {
    /// Attach the outcome of loading the external stylesheet.
    pub fn with_external_css(mut self, result: ExternalCssResult) -> Self {
        self.external_css = result.css;
        self.external_css_error = result.error;
        self.external_css_resolved_path = result.resolved_path;
        self
    }
}

/// A partial [`RenderConfig`]: one settings layer.
///
/// `None` means the layer has no opinion and the underlying value is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub font_ligatures: Option<FontLigatures>,
    pub tab_size: Option<u32>,
    pub background_color: Option<String>,
    pub box_shadow: Option<String>,
    pub container_padding: Option<String>,
    pub rounded_corners: Option<bool>,
    pub show_window_controls: Option<bool>,
    pub show_window_title: Option<bool>,
    pub show_line_numbers: Option<bool>,
    pub real_line_numbers: Option<bool>,
    pub transparent_background: Option<bool>,
    pub shutter_action: Option<ShutterAction>,
    pub target: Option<CaptureTarget>,
    pub start_line: Option<u32>,
    pub window_title: Option<String>,
    pub use_external_css: Option<bool>,
    pub external_css_path: Option<String>,
}

impl ConfigPatch {
    /// Wire names of the fields this patch sets.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let mut push = |set: bool, name: &'static str| {
            if set {
                keys.push(name);
            }
        };
        push(self.font_ligatures.is_some(), "fontLigatures");
        push(self.tab_size.is_some(), "tabSize");
        push(self.background_color.is_some(), "backgroundColor");
        push(self.box_shadow.is_some(), "boxShadow");
        push(self.container_padding.is_some(), "containerPadding");
        push(self.rounded_corners.is_some(), "roundedCorners");
        push(self.show_window_controls.is_some(), "showWindowControls");
        push(self.show_window_title.is_some(), "showWindowTitle");
        push(self.show_line_numbers.is_some(), "showLineNumbers");
        push(self.real_line_numbers.is_some(), "realLineNumbers");
        push(self.transparent_background.is_some(), "transparentBackground");
        push(self.shutter_action.is_some(), "shutterAction");
        push(self.target.is_some(), "target");
        push(self.start_line.is_some(), "startLine");
        push(self.window_title.is_some(), "windowTitle");
        push(self.use_external_css.is_some(), "useExternalCss");
        push(self.external_css_path.is_some(), "externalCssPath");
        keys
    }

    /// Keys set by both `self` and `other`.
    pub fn overlapping_keys(&self, other: &ConfigPatch) -> Vec<&'static str> {
        let theirs = other.keys();
        self.keys().into_iter().filter(|k| theirs.contains(k)).collect()
    }
}

/// Apply `overrides` on top of `base`; every field set in `overrides` wins.
pub fn merge_config(base: RenderConfig, overrides: &ConfigPatch) -> RenderConfig {
    let ConfigPatch {
        font_ligatures,
        tab_size,
        background_color,
        box_shadow,
        container_padding,
        rounded_corners,
        show_window_controls,
        show_window_title,
        show_line_numbers,
        real_line_numbers,
        transparent_background,
        shutter_action,
        target,
        start_line,
        window_title,
        use_external_css,
        external_css_path,
    } = overrides.clone();

    RenderConfig {
        font_ligatures: font_ligatures.unwrap_or(base.font_ligatures),
        tab_size: tab_size.unwrap_or(base.tab_size).max(1),
        background_color: background_color.unwrap_or(base.background_color),
        box_shadow: box_shadow.unwrap_or(base.box_shadow),
        container_padding: container_padding.unwrap_or(base.container_padding),
        rounded_corners: rounded_corners.unwrap_or(base.rounded_corners),
        show_window_controls: show_window_controls.unwrap_or(base.show_window_controls),
        show_window_title: show_window_title.unwrap_or(base.show_window_title),
        show_line_numbers: show_line_numbers.unwrap_or(base.show_line_numbers),
        real_line_numbers: real_line_numbers.unwrap_or(base.real_line_numbers),
        transparent_background: transparent_background.unwrap_or(base.transparent_background),
        shutter_action: shutter_action.unwrap_or(base.shutter_action),
        target: target.unwrap_or(base.target),
        start_line: start_line.unwrap_or(base.start_line),
        window_title: window_title.unwrap_or(base.window_title),
        use_external_css: use_external_css.unwrap_or(base.use_external_css),
        external_css_path: external_css_path.unwrap_or(base.external_css_path),
        external_css: base.external_css,
        external_css_error: base.external_css_error,
        external_css_resolved_path: base.external_css_resolved_path,
    }
}
