//! Builds one [`RenderConfig`] from settings, live editor state and the
//! external stylesheet.

use std::path::PathBuf;

use crate::host::{EditorSnapshot, Host, WorkspaceInfo};
use crate::render_config::{
    merge_config, CaptureTarget, ConfigPatch, FontLigatures, RenderConfig, ShutterAction,
};
use crate::settings::{
    ResolvedSettings, SettingValue, SettingsResolver, SettingsStore, EDITOR_GROUP, EDITOR_KEYS,
    EXTENSION_GROUP, EXTENSION_KEYS,
};
use crate::style::{ExternalStyleLoader, PathContext};

/// Assembles render configurations for a host.
#[derive(Debug, Clone)]
pub struct ConfigAssembler {
    home: Option<PathBuf>,
    cwd: PathBuf,
}

impl Default for ConfigAssembler {
    fn default() -> Self {
        let env = PathContext::from_env(None);
        Self {
            home: env.home,
            cwd: env.cwd,
        }
    }
}

impl ConfigAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit home and working directories for stylesheet lookup.
    pub fn with_paths(home: Option<PathBuf>, cwd: PathBuf) -> Self {
        Self { home, cwd }
    }

    /// Build a fresh snapshot. Never fails: stylesheet problems end up in
    /// `external_css_error`.
    pub async fn assemble<H: Host>(&self, host: &H) -> RenderConfig {
        let settings = host.settings().await;
        let editor = host.active_editor();
        let workspace = host.workspace();
        let base = self.base_config(&settings, editor.as_ref(), &workspace);

        let loader = ExternalStyleLoader::new(PathContext {
            home: self.home.clone(),
            workspace_root: workspace.first_folder().map(PathBuf::from),
            cwd: self.cwd.clone(),
        });
        let css = loader.load(&base).await;
        base.with_external_css(css)
    }

    /// Everything except the external stylesheet.
    pub fn base_config(
        &self,
        settings: &SettingsStore,
        editor: Option<&EditorSnapshot>,
        workspace: &WorkspaceInfo,
    ) -> RenderConfig {
        let language = editor.and_then(|e| e.language_id.as_deref());
        let resolver = SettingsResolver::new(settings, language);

        let editor_patch = editor_patch(
            &resolver.resolve(EDITOR_GROUP, EDITOR_KEYS),
            editor.and_then(|e| e.tab_size),
        );
        let extension_patch = extension_patch(&resolver.resolve(EXTENSION_GROUP, EXTENSION_KEYS).into_bare());
        let computed_patch = computed_patch(
            extension_patch.real_line_numbers.unwrap_or(false),
            extension_patch.show_window_title.unwrap_or(false),
            editor,
            workspace,
        );

        for (lower, upper) in [
            (&computed_patch, &editor_patch),
            (&computed_patch, &extension_patch),
            (&editor_patch, &extension_patch),
        ] {
            let overlap = lower.overlapping_keys(upper);
            if !overlap.is_empty() {
                log::error!("Config layers collide on {:?}", overlap);
                debug_assert!(overlap.is_empty(), "config layers collide on {:?}", overlap);
            }
        }

        // Extension settings beat editor settings, which beat computed fields.
        let cfg = merge_config(RenderConfig::default(), &computed_patch);
        let cfg = merge_config(cfg, &editor_patch);
        merge_config(cfg, &extension_patch)
    }
}

/// `fontLigatures` and `tabSize`. A live editor tab width overrides the setting.
pub fn editor_patch(settings: &ResolvedSettings, live_tab_size: Option<u32>) -> ConfigPatch {
    ConfigPatch {
        font_ligatures: typed(settings, "fontLigatures", "boolean or string", |v| match v {
            SettingValue::Bool(b) => Some(FontLigatures::Enabled(*b)),
            SettingValue::String(s) => Some(FontLigatures::Features(s.clone())),
            SettingValue::Number(_) => None,
        }),
        tab_size: live_tab_size.or_else(|| typed(settings, "tabSize", "number", SettingValue::as_u32)),
        ..Default::default()
    }
}

/// Appearance and behavioral settings, keyed by their bare names.
pub fn extension_patch(settings: &ResolvedSettings) -> ConfigPatch {
    ConfigPatch {
        shutter_action: typed(settings, "shutterAction", "\"save\" or \"copy\"", |v| {
            v.as_str().and_then(ShutterAction::parse)
        }),
        target: typed(settings, "target", "\"container\" or \"window\"", |v| {
            v.as_str().and_then(CaptureTarget::parse)
        }),
        background_color: string(settings, "backgroundColor"),
        external_css_path: string(settings, "externalCssPath"),
        transparent_background: boolean(settings, "transparentBackground"),
        use_external_css: boolean(settings, "useExternalCss"),
        real_line_numbers: boolean(settings, "realLineNumbers"),
        show_line_numbers: boolean(settings, "showLineNumbers"),
        box_shadow: string(settings, "boxShadow"),
        container_padding: string(settings, "containerPadding"),
        rounded_corners: boolean(settings, "roundedCorners"),
        show_window_controls: boolean(settings, "showWindowControls"),
        show_window_title: boolean(settings, "showWindowTitle"),
        ..Default::default()
    }
}

/// `startLine` and `windowTitle`, derived from live editor/workspace state.
pub fn computed_patch(
    real_line_numbers: bool,
    show_window_title: bool,
    editor: Option<&EditorSnapshot>,
    workspace: &WorkspaceInfo,
) -> ConfigPatch {
    let start_line = match editor.and_then(EditorSnapshot::single_selection) {
        Some(selection) if real_line_numbers => selection.start.line,
        _ => 0,
    };

    let window_title = match editor {
        Some(editor) if show_window_title => window_title(editor, workspace),
        _ => String::new(),
    };

    ConfigPatch {
        start_line: Some(start_line),
        window_title: Some(window_title),
        ..Default::default()
    }
}

/// `"<workspace> - <file>"`, or just the file name outside a workspace.
fn window_title(editor: &EditorSnapshot, workspace: &WorkspaceInfo) -> String {
    let file_name = editor.file_name().unwrap_or_default();
    match workspace.name.as_deref() {
        Some(name) => format!("{} - {}", name, file_name),
        None => file_name.to_string(),
    }
}

fn typed<T>(
    settings: &ResolvedSettings,
    key: &str,
    expected: &str,
    convert: impl FnOnce(&SettingValue) -> Option<T>,
) -> Option<T> {
    let value = settings.value(key)?;
    let converted = convert(value);
    if converted.is_none() {
        log::warn!(
            "Ignoring setting '{}': expected {}, got {} {:?}",
            key,
            expected,
            value.type_name(),
            value
        );
    }
    converted
}

fn boolean(settings: &ResolvedSettings, key: &str) -> Option<bool> {
    typed(settings, key, "boolean", SettingValue::as_bool)
}

fn string(settings: &ResolvedSettings, key: &str) -> Option<String> {
    typed(settings, key, "string", |v| v.as_str().map(str::to_string))
}
