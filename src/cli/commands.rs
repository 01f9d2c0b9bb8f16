//! Subcommand handlers for start, snapshot, html and config actions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;

use super::args::{ConfigAction, EditorArgs};
use super::host::TerminalHost;
use crate::assembler::ConfigAssembler;
use crate::channel::OutboundMessage;
use crate::config::{self, Config, ConfigError, DEFAULT_CONFIG, DEFAULT_SETTINGS};
use crate::coordinator::{CaptureCoordinator, CoordinatorError};
use crate::surface::{spawn_reader, spawn_writer};
use crate::template;

/// Errors surfaced by a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] CoordinatorError),
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
    #[error("Config file already exists: {}", .0.display())]
    AlreadyInitialized(PathBuf),
}

impl CliError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach a capture session whose render surface talks JSON lines over
/// stdin/stdout. Runs until stdin closes or Ctrl+C.
pub async fn run_start(
    config: &Config,
    settings_path: PathBuf,
    editor: &EditorArgs,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let host = Arc::new(TerminalHost::new(settings_path, editor, output));
    let mut coordinator = CaptureCoordinator::new(host, ConfigAssembler::new(), config.image_path());

    let (surface, writer) = spawn_writer(tokio::io::stdout());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let _reader = spawn_reader(BufReader::new(tokio::io::stdin()), events_tx);

    coordinator.start(surface)?;
    log::info!("Session started for {:?}", editor.file);

    tokio::select! {
        _ = coordinator.run(&mut events_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl+C, shutting down...");
        }
    }

    coordinator.dispose();
    coordinator.flush().await;
    drop(coordinator);

    match writer.await {
        Ok(result) => result.map_err(|e| CliError::io("Failed to write to render surface", e)),
        Err(e) => {
            log::error!("Render surface writer failed: {}", e);
            Ok(())
        }
    }
}

/// Assemble one render config and print it as an `update` message.
pub async fn run_snapshot(settings_path: PathBuf, editor: &EditorArgs, pretty: bool) -> Result<(), CliError> {
    let host = TerminalHost::new(settings_path, editor, None);
    let cfg = ConfigAssembler::new().assemble(&host).await;

    if let Some(error) = &cfg.external_css_error {
        eprintln!("Warning: failed to load external CSS: {}", error);
    }

    let message = OutboundMessage::Update(cfg);
    let json = if pretty {
        serde_json::to_string_pretty(&message)?
    } else {
        serde_json::to_string(&message)?
    };
    println!("{}", json);
    Ok(())
}

/// Print the render surface's HTML with `file://` resource URIs.
pub async fn run_html(template_path: &Path, csp_source: &str) -> Result<(), CliError> {
    let html = template::read_html(template_path, csp_source, template::file_uri)
        .await
        .map_err(|e| CliError::io(format!("Failed to read template '{}'", template_path.display()), e))?;
    print!("{}", html);
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
    settings_override: Option<&Path>,
) -> Result<(), CliError> {
    let config_path = config_path.map(PathBuf::from).unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path))?;
            let settings_path = settings_override
                .map(PathBuf::from)
                .unwrap_or_else(|| config.settings_path());

            println!("Current configuration:");
            println!("  Settings: {}", describe_file(&settings_path));
            println!("  Default image path: {}", config.image_path().display());
            println!();
            println!("Config file: {}", describe_file(&config_path));
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CliError::AlreadyInitialized(config_path));
            }

            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::io("Error creating config directory", e))?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)
                .map_err(|e| CliError::io("Error writing config file", e))?;
            println!("Created config file: {}", config_path.display());

            let settings_path = config_path
                .parent()
                .map(|dir| dir.join("settings.toml"))
                .unwrap_or_else(config::default_settings_path);
            if settings_path.exists() {
                println!("Keeping existing settings: {}", settings_path.display());
            } else {
                std::fs::write(&settings_path, DEFAULT_SETTINGS)
                    .map_err(|e| CliError::io("Error writing settings file", e))?;
                println!("Created settings file: {}", settings_path.display());
            }
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

fn describe_file(path: &Path) -> String {
    let state = if path.exists() { "exists" } else { "not found" };
    format!("{} ({})", path.display(), state)
}
