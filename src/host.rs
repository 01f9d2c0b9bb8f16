//! The host environment a capture session runs inside.
//!
//! The host owns the editor, the clipboard, dialogs and notifications. The
//! rest of the crate only sees it through the [`Host`] trait, which keeps the
//! coordinator testable with a scripted host.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::settings::SettingsStore;

/// A zero-based line/character position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A selected range. `start` is never after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Selection spanning whole lines `start_line..=end_line`.
    ///
    /// The end saturates, so a range ending on `u32::MAX` stops at the start
    /// of that line.
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self::new(
            Position::new(start_line, 0),
            Position::new(end_line.saturating_add(1), 0),
        )
    }

    /// Collapsed selection (a bare cursor).
    pub fn cursor(line: u32, character: u32) -> Self {
        let p = Position::new(line, character);
        Self { start: p, end: p }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// True when `selections` is exactly one non-empty range.
pub fn has_one_selection(selections: &[Selection]) -> bool {
    matches!(selections, [only] if !only.is_empty())
}

/// Live state of the active editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorSnapshot {
    pub file_path: PathBuf,
    pub language_id: Option<String>,
    /// The editor instance's own tab width, which beats the workspace setting.
    pub tab_size: Option<u32>,
    pub selections: Vec<Selection>,
}

impl EditorSnapshot {
    pub fn file_name(&self) -> Option<&str> {
        self.file_path.file_name().and_then(|n| n.to_str())
    }

    /// The single non-empty selection, if that is what the editor holds.
    pub fn single_selection(&self) -> Option<&Selection> {
        if has_one_selection(&self.selections) {
            self.selections.first()
        } else {
            None
        }
    }
}

/// The open workspace, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkspaceInfo {
    pub name: Option<String>,
    pub folders: Vec<PathBuf>,
}

impl WorkspaceInfo {
    pub fn first_folder(&self) -> Option<&Path> {
        self.folders.first().map(PathBuf::as_path)
    }
}

/// Services the host environment provides to a capture session.
pub trait Host: Send + Sync + 'static {
    /// Current settings. Called on every render so edits take effect live.
    fn settings(&self) -> impl Future<Output = Arc<SettingsStore>> + Send;

    fn active_editor(&self) -> Option<EditorSnapshot>;

    fn workspace(&self) -> WorkspaceInfo;

    /// Put the current selection on the clipboard as highlighted rich text.
    fn copy_selection_with_highlighting(&self) -> impl Future<Output = ()> + Send;

    /// Ask for a PNG destination. `None` means the user cancelled.
    fn show_save_dialog(&self, default_path: &Path) -> impl Future<Output = Option<PathBuf>> + Send;

    /// Show a dismissible error. Resolves to the chosen action, if any.
    fn show_error(&self, message: &str, actions: &[&str]) -> impl Future<Output = Option<String>> + Send;

    /// Open `path` as a document in the host.
    fn open_document(&self, path: &Path) -> impl Future<Output = ()> + Send;
}
