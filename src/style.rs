//! Optional user stylesheet for the capture frame.
//!
//! Loading never fails outright: problems are reported through
//! [`ExternalCssResult::error`] and the render surface falls back to the
//! plain background color.

use std::path::{Path, PathBuf};

use crate::render_config::RenderConfig;

/// Outcome of loading the external stylesheet.
///
/// All fields are `None` when loading was not attempted. Otherwise exactly
/// one of `css` and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCssResult {
    pub css: Option<String>,
    pub error: Option<String>,
    pub resolved_path: Option<PathBuf>,
}

impl ExternalCssResult {
    pub fn not_attempted() -> Self {
        Self::default()
    }

    pub fn loaded(css: String, resolved_path: PathBuf) -> Self {
        Self {
            css: Some(css),
            error: None,
            resolved_path: Some(resolved_path),
        }
    }

    pub fn failed(error: String, resolved_path: Option<PathBuf>) -> Self {
        Self {
            css: None,
            error: Some(error),
            resolved_path,
        }
    }

    pub fn was_attempted(&self) -> bool {
        self.css.is_some() || self.error.is_some()
    }
}

/// Directories a relative or home-relative stylesheet path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub home: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl PathContext {
    /// Context for the current process, using `workspace_root` when a
    /// workspace is open.
    pub fn from_env(workspace_root: Option<PathBuf>) -> Self {
        Self {
            home: dirs::home_dir(),
            workspace_root,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StylePathError {
    #[error("cannot expand '{0}': home directory is unknown")]
    NoHomeDir(String),
}

/// Resolve a configured stylesheet path.
///
/// `~` expands to the home directory, absolute paths are used as-is, and
/// anything else is joined onto the first workspace folder (or the current
/// directory when no workspace is open).
pub fn resolve_css_path(path: &str, ctx: &PathContext) -> Result<PathBuf, StylePathError> {
    if let Some(rest) = path.strip_prefix('~') {
        let home = ctx
            .home
            .as_ref()
            .ok_or_else(|| StylePathError::NoHomeDir(path.to_string()))?;
        // `~/a.css` must stay under home, so the separator is not allowed to
        // turn the remainder into an absolute path.
        let rest = rest.trim_start_matches(['/', '\\']);
        return Ok(if rest.is_empty() { home.clone() } else { home.join(rest) });
    }

    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return Ok(candidate.to_path_buf());
    }

    let base = ctx.workspace_root.as_ref().unwrap_or(&ctx.cwd);
    Ok(base.join(candidate))
}

/// Loads the user stylesheet named by a [`RenderConfig`].
#[derive(Debug, Clone)]
pub struct ExternalStyleLoader {
    paths: PathContext,
}

impl ExternalStyleLoader {
    pub fn new(paths: PathContext) -> Self {
        Self { paths }
    }

    /// Read the stylesheet if `useExternalCss` is on and a path is set.
    pub async fn load(&self, cfg: &RenderConfig) -> ExternalCssResult {
        if !cfg.use_external_css || cfg.external_css_path.is_empty() {
            return ExternalCssResult::not_attempted();
        }

        let resolved = match resolve_css_path(&cfg.external_css_path, &self.paths) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::warn!("External CSS path not resolved: {}", e);
                return ExternalCssResult::failed(e.to_string(), None);
            }
        };

        match tokio::fs::read_to_string(&resolved).await {
            Ok(css) => {
                log::debug!("Loaded external CSS from {:?} ({} bytes)", resolved, css.len());
                ExternalCssResult::loaded(css, resolved)
            }
            Err(e) => {
                log::warn!("Failed to read external CSS {:?}: {}", resolved, e);
                let error = format!("failed to read '{}': {}", resolved.display(), e);
                ExternalCssResult::failed(error, Some(resolved))
            }
        }
    }
}
