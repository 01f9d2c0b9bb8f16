//! Host environment for the command-line binary.
//!
//! The editor state comes from command-line flags, dialogs are answered
//! without prompting, and notifications go to stderr.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::args::EditorArgs;
use crate::host::{EditorSnapshot, Host, WorkspaceInfo};
use crate::settings::SettingsStore;

/// Language ids for common file extensions.
const LANGUAGE_BY_EXTENSION: &[(&str, &str)] = &[
    ("c", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("css", "css"),
    ("go", "go"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("html", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("jsx", "javascriptreact"),
    ("kt", "kotlin"),
    ("lua", "lua"),
    ("md", "markdown"),
    ("php", "php"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shellscript"),
    ("sql", "sql"),
    ("swift", "swift"),
    ("toml", "toml"),
    ("ts", "typescript"),
    ("tsx", "typescriptreact"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Guess a language id from a file's extension.
pub fn detect_language(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    LANGUAGE_BY_EXTENSION
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| language.to_string())
}

/// A host driven by command-line flags.
pub struct TerminalHost {
    settings_path: PathBuf,
    /// Last settings that loaded cleanly.
    settings: Mutex<Arc<SettingsStore>>,
    editor: EditorSnapshot,
    workspace: WorkspaceInfo,
    output: Option<PathBuf>,
}

impl TerminalHost {
    pub fn new(settings_path: PathBuf, editor: &EditorArgs, output: Option<PathBuf>) -> Self {
        let language = editor
            .language
            .clone()
            .or_else(|| detect_language(&editor.file));

        let workspace = match &editor.workspace {
            Some(folder) => WorkspaceInfo {
                name: folder
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string),
                folders: vec![folder.clone()],
            },
            None => WorkspaceInfo::default(),
        };

        Self {
            settings_path,
            settings: Mutex::new(Arc::new(SettingsStore::default())),
            editor: EditorSnapshot {
                file_path: editor.file.clone(),
                language_id: language,
                tab_size: editor.tab_size,
                selections: editor.selection.into_iter().collect(),
            },
            workspace,
            output,
        }
    }
}

impl Host for TerminalHost {
    async fn settings(&self) -> Arc<SettingsStore> {
        let loaded = SettingsStore::load_async(&self.settings_path).await;
        let mut current = match self.settings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match loaded {
            Ok(store) => *current = Arc::new(store),
            Err(e) => log::warn!("Keeping previous settings: {}", e),
        }
        Arc::clone(&current)
    }

    fn active_editor(&self) -> Option<EditorSnapshot> {
        Some(self.editor.clone())
    }

    fn workspace(&self) -> WorkspaceInfo {
        self.workspace.clone()
    }

    async fn copy_selection_with_highlighting(&self) {
        log::debug!("Copy with highlighting requested for {:?}", self.editor.file_path);
    }

    async fn show_save_dialog(&self, default_path: &Path) -> Option<PathBuf> {
        let destination = self.output.clone().unwrap_or_else(|| default_path.to_path_buf());
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            log::warn!("Could not create {:?}: {}", parent, e);
        }
        Some(destination)
    }

    async fn show_error(&self, message: &str, actions: &[&str]) -> Option<String> {
        eprintln!("Error: {}", message);
        if !actions.is_empty() {
            eprintln!("       (available actions: {})", actions.join(", "));
        }
        None
    }

    async fn open_document(&self, path: &Path) {
        eprintln!("Open: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: &str) -> EditorArgs {
        EditorArgs {
            file: PathBuf::from(file),
            language: None,
            selection: None,
            tab_size: None,
            workspace: None,
        }
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("src/main.rs")).as_deref(), Some("rust"));
        assert_eq!(detect_language(Path::new("App.TSX")).as_deref(), Some("typescriptreact"));
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_explicit_language_wins() {
        let mut a = args("script.py");
        a.language = Some("plaintext".to_string());
        let host = TerminalHost::new(PathBuf::from("/none.toml"), &a, None);
        assert_eq!(
            host.active_editor().unwrap().language_id.as_deref(),
            Some("plaintext")
        );
    }

    #[test]
    fn test_workspace_name_from_folder() {
        let mut a = args("/work/demo/lib.rs");
        a.workspace = Some(PathBuf::from("/work/demo"));
        let host = TerminalHost::new(PathBuf::from("/none.toml"), &a, None);
        let ws = host.workspace();
        assert_eq!(ws.name.as_deref(), Some("demo"));
        assert_eq!(ws.first_folder(), Some(Path::new("/work/demo")));
    }

    #[tokio::test]
    async fn test_settings_reload_keeps_last_good() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[editor]\ntabSize = 2\n").unwrap();
        let host = TerminalHost::new(path.clone(), &args("a.rs"), None);
        assert!(host.settings().await.get("editor.tabSize").is_some());

        std::fs::write(&path, "[editor]\ntabSize = 3\n").unwrap();
        assert_eq!(
            host.settings().await.get("editor.tabSize"),
            Some(&crate::settings::SettingValue::Number(3.0))
        );

        std::fs::write(&path, "[editor\n").unwrap();
        assert!(host.settings().await.get("editor.tabSize").is_some());
    }

    #[tokio::test]
    async fn test_save_dialog_prefers_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shots/out.png");
        let host = TerminalHost::new(PathBuf::from("/none.toml"), &args("a.rs"), Some(out.clone()));
        assert_eq!(host.show_save_dialog(Path::new("/tmp/code.png")).await, Some(out.clone()));
        assert!(out.parent().unwrap().is_dir());
    }
}
