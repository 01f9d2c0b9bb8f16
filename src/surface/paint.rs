//! What the render surface does with the messages it receives.
//!
//! The surface keeps only the latest `update`; an older snapshot arriving
//! late simply gets painted over by the next one.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::channel::{InboundMessage, OutboundMessage};
use crate::render_config::{FontLigatures, RenderConfig, ShutterAction};

/// Border radius of the window when rounded corners are on.
const ROUNDED_RADIUS: &str = "4px";

/// Visibility of the window chrome above the code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    pub navbar_hidden: bool,
    pub window_controls_hidden: bool,
    pub window_title_hidden: bool,
    pub window_title: String,
}

/// What a message asked the surface to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// A new config is in place; paste the clipboard to render it.
    Paste,
    /// Play the shutter animation.
    Flash,
}

/// One line of a painted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    pub number: Option<u32>,
    pub text: String,
}

/// Pasted code laid out with the config it was pasted under.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<FrameLine>,
    pub config: RenderConfig,
}

/// Render-surface state built from outbound messages.
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    config: Option<RenderConfig>,
    vars: BTreeMap<&'static str, String>,
    chrome: Chrome,
    external_style: Option<String>,
    flashes: u32,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&RenderConfig> {
        self.config.as_ref()
    }

    /// CSS custom property `--name`, if set.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    /// Stylesheet scoped to the snippet container, when one is active.
    pub fn external_style(&self) -> Option<&str> {
        self.external_style.as_deref()
    }

    pub fn flashes(&self) -> u32 {
        self.flashes
    }

    pub fn apply(&mut self, message: &OutboundMessage) -> SurfaceAction {
        match message {
            OutboundMessage::Update(cfg) => {
                self.apply_update(cfg.clone());
                SurfaceAction::Paste
            }
            OutboundMessage::Flash => {
                self.flashes += 1;
                SurfaceAction::Flash
            }
        }
    }

    fn apply_update(&mut self, cfg: RenderConfig) {
        let ligatures = if cfg.font_ligatures.is_enabled() { "normal" } else { "none" };
        self.vars.insert("ligatures", ligatures.to_string());
        match &cfg.font_ligatures {
            FontLigatures::Features(features) => {
                self.vars.insert("font-features", features.clone());
            }
            FontLigatures::Enabled(_) => {
                self.vars.remove("font-features");
            }
        }
        self.vars.insert("tab-size", cfg.tab_size.to_string());
        self.vars.insert("container-background-color", cfg.background_color.clone());
        self.vars.insert("box-shadow", cfg.box_shadow.clone());
        self.vars.insert("container-padding", cfg.container_padding.clone());
        let radius = if cfg.rounded_corners { ROUNDED_RADIUS } else { "0" };
        self.vars.insert("window-border-radius", radius.to_string());

        self.chrome = Chrome {
            navbar_hidden: !cfg.show_window_controls && !cfg.show_window_title,
            window_controls_hidden: !cfg.show_window_controls,
            window_title_hidden: !cfg.show_window_title,
            window_title: cfg.window_title.clone(),
        };

        // Without usable external CSS the plain background color applies.
        self.external_style = match (&cfg.external_css, cfg.use_external_css) {
            (Some(css), true) => Some(css.clone()),
            _ => None,
        };

        self.config = Some(cfg);
    }

    /// Lay out pasted code with the current config. `None` before any update.
    pub fn paste(&self, content: &str) -> Option<Frame> {
        let cfg = self.config.as_ref()?;
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, text)| FrameLine {
                number: cfg.show_line_numbers.then(|| {
                    let offset = u32::try_from(i).unwrap_or(u32::MAX);
                    cfg.start_line.saturating_add(offset).saturating_add(1)
                }),
                text: text.to_string(),
            })
            .collect();
        Some(Frame {
            lines,
            config: cfg.clone(),
        })
    }

    /// Message the shutter produces for a rendered `png`.
    ///
    /// `forced` overrides the configured action (the copy shortcut forces
    /// `copy`). Copying stays inside the surface, so it yields no message.
    pub fn shutter(&self, png: &[u8], forced: Option<ShutterAction>) -> Option<InboundMessage> {
        let action = forced.or_else(|| self.config.as_ref().map(|c| c.shutter_action))?;
        match action {
            ShutterAction::Save => Some(InboundMessage::Save {
                data: Some(BASE64.encode(png)),
            }),
            ShutterAction::Copy => None,
        }
    }
}
