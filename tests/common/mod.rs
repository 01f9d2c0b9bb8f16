//! Scripted host shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use codeframe::host::{EditorSnapshot, Host, Selection, WorkspaceInfo};
use codeframe::settings::SettingsStore;

/// Records everything the session asks of it and answers from a script.
#[derive(Default)]
pub struct ScriptedHost {
    pub settings: Mutex<SettingsStore>,
    pub editor: Mutex<Option<EditorSnapshot>>,
    pub workspace: Mutex<WorkspaceInfo>,
    /// Answer of every save dialog. `None` cancels.
    pub save_to: Mutex<Option<PathBuf>>,
    /// Action picked on error notifications.
    pub error_choice: Mutex<Option<String>>,
    /// Sleep before finishing each copy, in call order.
    pub copy_delays: Mutex<VecDeque<Duration>>,
    /// How long an error notification stays open before it is answered.
    pub error_delay: Mutex<Option<Duration>>,
    /// When set, every `active_editor` call reports the next tab size.
    pub count_editor_reads: bool,

    pub editor_reads: AtomicU32,
    pub copies: AtomicU32,
    pub dialog_defaults: Mutex<Vec<PathBuf>>,
    pub errors: Mutex<Vec<(String, Vec<String>)>>,
    pub opened: Mutex<Vec<PathBuf>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with a Rust editor open on `file`.
    pub fn with_editor(file: &str, selections: Vec<Selection>) -> Self {
        let host = Self::new();
        host.set_editor(file, selections);
        host
    }

    pub fn set_editor(&self, file: &str, selections: Vec<Selection>) {
        *self.editor.lock().unwrap() = Some(EditorSnapshot {
            file_path: PathBuf::from(file),
            language_id: Some("rust".to_string()),
            tab_size: None,
            selections,
        });
    }

    pub fn set_setting(&self, key: &str, value: impl Into<codeframe::settings::SettingValue>) {
        self.settings.lock().unwrap().set(key, value);
    }

    pub fn errors(&self) -> Vec<(String, Vec<String>)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }

    pub fn dialog_defaults(&self) -> Vec<PathBuf> {
        self.dialog_defaults.lock().unwrap().clone()
    }
}

impl Host for ScriptedHost {
    async fn settings(&self) -> Arc<SettingsStore> {
        Arc::new(self.settings.lock().unwrap().clone())
    }

    fn active_editor(&self) -> Option<EditorSnapshot> {
        let reads = self.editor_reads.fetch_add(1, Ordering::SeqCst) + 1;
        let mut editor = self.editor.lock().unwrap().clone()?;
        if self.count_editor_reads {
            editor.tab_size = Some(reads);
        }
        Some(editor)
    }

    fn workspace(&self) -> WorkspaceInfo {
        self.workspace.lock().unwrap().clone()
    }

    async fn copy_selection_with_highlighting(&self) {
        self.copies.fetch_add(1, Ordering::SeqCst);
        let delay = self.copy_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn show_save_dialog(&self, default_path: &Path) -> Option<PathBuf> {
        self.dialog_defaults.lock().unwrap().push(default_path.to_path_buf());
        self.save_to.lock().unwrap().clone()
    }

    async fn show_error(&self, message: &str, actions: &[&str]) -> Option<String> {
        self.errors.lock().unwrap().push((
            message.to_string(),
            actions.iter().map(|a| a.to_string()).collect(),
        ));
        let delay = *self.error_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let choice = self.error_choice.lock().unwrap().clone();
        choice.filter(|c| actions.contains(&c.as_str()))
    }

    async fn open_document(&self, path: &Path) {
        self.opened.lock().unwrap().push(path.to_path_buf());
    }
}
