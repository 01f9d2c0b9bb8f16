//! Host-side orchestration of a capture session.
//!
//! A [`CaptureCoordinator`] is either idle or attached to a render surface.
//! While attached it turns selection changes into `update` messages and
//! handles the surface's shutter (`save`) requests. Events are handled one
//! at a time; each update pass runs as its own task so that a slow pass
//! never holds back a later one. A `save` waits until every update pass
//! started before it has posted, so its `flash` never overtakes an earlier
//! `update`.

mod errors;

pub use errors::CoordinatorError;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::assembler::ConfigAssembler;
use crate::channel::{ChannelError, InboundMessage, OutboundMessage, RenderSurface};
use crate::host::{has_one_selection, Host, Selection};
use crate::render_config::RenderConfig;

/// Action offered on the "failed to load external CSS" error.
pub const OPEN_CSS_ACTION: &str = "Open CSS";

/// Prefix for every message shown to the user.
const NOTIFICATION_PREFIX: &str = "CodeFrame";

/// Something that happened to an attached session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The editor's selections changed.
    SelectionChanged(Vec<Selection>),
    /// The render surface sent a message.
    Message(InboundMessage),
    /// The render surface sent something that is not a message.
    ProtocolError(String),
    /// The render surface went away.
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Attached,
}

/// Result of handling a `save` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The save dialog was dismissed.
    Cancelled,
    /// The request carried no image.
    NoData,
}

/// `~/Desktop/code.png`, the first suggestion of the save dialog.
pub fn default_image_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Desktop")
        .join("code.png")
}

/// Drives one render surface from host events.
pub struct CaptureCoordinator<H: Host, S: RenderSurface> {
    host: Arc<H>,
    assembler: Arc<ConfigAssembler>,
    surface: Option<S>,
    /// Where the last image went; seeds the next save dialog.
    last_used_image_path: PathBuf,
    /// In-flight update passes. Each yields the CSS error it ran into.
    updates: JoinSet<Option<CssNotice>>,
    /// Error notifications. They outlive disposal.
    notifications: JoinSet<()>,
}

impl<H: Host, S: RenderSurface> CaptureCoordinator<H, S> {
    pub fn new(host: Arc<H>, assembler: ConfigAssembler, default_image_path: PathBuf) -> Self {
        Self {
            host,
            assembler: Arc::new(assembler),
            surface: None,
            last_used_image_path: default_image_path,
            updates: JoinSet::new(),
            notifications: JoinSet::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.surface.is_some() {
            SessionState::Attached
        } else {
            SessionState::Idle
        }
    }

    pub fn last_used_image_path(&self) -> &Path {
        &self.last_used_image_path
    }

    /// Attach `surface`. If the editor already holds a single non-empty
    /// selection, an update pass starts right away.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, surface: S) -> Result<(), CoordinatorError> {
        if self.surface.is_some() {
            return Err(CoordinatorError::AlreadyAttached);
        }
        self.surface = Some(surface);
        log::info!("Capture session attached");

        let ready = self
            .host
            .active_editor()
            .is_some_and(|editor| has_one_selection(&editor.selections));
        if ready {
            self.spawn_update();
        }
        Ok(())
    }

    /// Detach the surface and drop any in-flight update passes.
    ///
    /// Notifications already on their way to the user are left running.
    pub fn dispose(&mut self) {
        if self.surface.take().is_some() {
            log::info!("Capture session disposed");
        }
        self.updates.abort_all();
    }

    /// Start an update pass if `selections` is one non-empty range.
    ///
    /// Returns whether a pass was started.
    pub fn on_selection_changed(&mut self, selections: &[Selection]) -> bool {
        if self.surface.is_none() {
            log::debug!("Selection change ignored: no surface attached");
            return false;
        }
        if !has_one_selection(selections) {
            log::debug!("Selection change ignored: {} range(s)", selections.len());
            return false;
        }
        self.spawn_update()
    }

    /// Handle one message from the render surface.
    pub async fn handle_message(&mut self, message: InboundMessage) -> Result<SaveOutcome, CoordinatorError> {
        let surface = self.surface.clone().ok_or(CoordinatorError::NotAttached)?;

        match message {
            InboundMessage::Save { data } => {
                self.settle_updates().await;
                if let Err(e) = surface.post(OutboundMessage::Flash) {
                    log::warn!("Flash not delivered: {}", e);
                }
                self.save_image(data).await
            }
            InboundMessage::Unknown { kind } => Err(CoordinatorError::UnknownAction(kind)),
        }
    }

    /// Handle one event. Errors are logged and, where relevant, shown to the
    /// user; they never detach the surface.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        let result = match event {
            SessionEvent::SelectionChanged(selections) => {
                self.on_selection_changed(&selections);
                Ok(())
            }
            SessionEvent::Message(message) => self.handle_message(message).await.map(|_| ()),
            SessionEvent::ProtocolError(detail) => Err(ChannelError::Malformed(detail).into()),
            SessionEvent::Disposed => {
                self.dispose();
                Ok(())
            }
        };

        if let Err(e) = result {
            self.report(e);
        }
    }

    /// Process events until the surface is disposed or the sender goes away.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
        while self.surface.is_some() {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event).await,
                        None => self.dispose(),
                    }
                }
                Some(joined) = self.updates.join_next(), if !self.updates.is_empty() => {
                    self.finish_update(joined);
                }
                Some(joined) = self.notifications.join_next(), if !self.notifications.is_empty() => {
                    log_task_result(joined);
                }
            }
        }
    }

    /// Wait for every in-flight update pass and notification.
    pub async fn flush(&mut self) {
        self.settle_updates().await;
        while let Some(joined) = self.notifications.join_next().await {
            log_task_result(joined);
        }
    }

    /// Wait until every started update pass has posted (or failed to).
    /// Their CSS notifications are spawned, not awaited.
    async fn settle_updates(&mut self) {
        while let Some(joined) = self.updates.join_next().await {
            self.finish_update(joined);
        }
    }

    fn finish_update(&mut self, joined: Result<Option<CssNotice>, JoinError>) {
        let notice = match joined {
            Ok(Some(notice)) => notice,
            Ok(None) => return,
            Err(e) => {
                log_task_result(Err(e));
                return;
            }
        };
        let host = Arc::clone(&self.host);
        self.notifications.spawn(async move {
            notify_css_error(host.as_ref(), &notice).await;
        });
    }

    fn spawn_update(&mut self) -> bool {
        let Some(surface) = self.surface.clone() else {
            return false;
        };
        let host = Arc::clone(&self.host);
        let assembler = Arc::clone(&self.assembler);

        self.updates.spawn(async move {
            match update_pass(host.as_ref(), &assembler, &surface).await {
                Ok(notice) => notice,
                Err(e) => {
                    log::warn!("Update not delivered: {}", e);
                    None
                }
            }
        });
        true
    }

    async fn save_image(&mut self, data: Option<String>) -> Result<SaveOutcome, CoordinatorError> {
        let Some(data) = data.filter(|d| !d.is_empty()) else {
            log::warn!("Save requested without image data");
            return Ok(SaveOutcome::NoData);
        };
        let bytes = decode_image_data(&data)?;

        let destination = self
            .host
            .show_save_dialog(&self.last_used_image_path)
            .await
            .filter(|p| !p.as_os_str().is_empty());
        let Some(destination) = destination else {
            log::debug!("Save dialog cancelled");
            return Ok(SaveOutcome::Cancelled);
        };
        self.last_used_image_path = destination.clone();

        tokio::fs::write(&destination, &bytes)
            .await
            .map_err(|source| CoordinatorError::Write {
                path: destination.clone(),
                source,
            })?;
        log::info!("Saved {} bytes to {:?}", bytes.len(), destination);
        Ok(SaveOutcome::Saved(destination))
    }

    fn report(&mut self, err: CoordinatorError) {
        log::error!("{}", err);
        if !err.is_user_facing() {
            return;
        }
        let host = Arc::clone(&self.host);
        let message = format!("{} 📸: {}", NOTIFICATION_PREFIX, err);
        self.notifications.spawn(async move {
            host.show_error(&message, &[]).await;
        });
    }
}

/// A stylesheet failure to tell the user about once its update is out.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CssNotice {
    message: String,
    resolved_path: Option<PathBuf>,
}

/// Copy the selection, assemble a snapshot and send it.
async fn update_pass<H: Host, S: RenderSurface>(
    host: &H,
    assembler: &ConfigAssembler,
    surface: &S,
) -> Result<Option<CssNotice>, ChannelError> {
    host.copy_selection_with_highlighting().await;
    let cfg = assembler.assemble(host).await;
    let notice = css_error_notice(&cfg);

    surface.post(OutboundMessage::Update(cfg))?;
    Ok(notice)
}

fn css_error_notice(cfg: &RenderConfig) -> Option<CssNotice> {
    let error = cfg.external_css_error.as_ref()?;
    Some(CssNotice {
        message: format!("{}: failed to load external CSS: {}", NOTIFICATION_PREFIX, error),
        resolved_path: cfg.external_css_resolved_path.clone(),
    })
}

async fn notify_css_error<H: Host>(host: &H, notice: &CssNotice) {
    let Some(path) = notice.resolved_path.as_deref() else {
        host.show_error(&notice.message, &[]).await;
        return;
    };

    let choice = host.show_error(&notice.message, &[OPEN_CSS_ACTION]).await;
    if choice.as_deref() == Some(OPEN_CSS_ACTION) {
        host.open_document(path).await;
    }
}

/// Decode a base64 PNG, accepting an optional `data:` URL prefix.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, payload)| payload),
        None => data,
    };
    BASE64.decode(payload.trim())
}

fn log_task_result(joined: Result<(), JoinError>) {
    if let Err(e) = joined
        && e.is_panic()
    {
        log::error!("Capture task panicked: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        assert_eq!(decode_image_data("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(
            decode_image_data("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image_data("not base64!!").is_err());
    }

    #[test]
    fn test_css_error_notice() {
        let cfg = RenderConfig {
            external_css_error: Some("boom".to_string()),
            external_css_resolved_path: Some(PathBuf::from("/x/a.css")),
            ..Default::default()
        };
        let notice = css_error_notice(&cfg).unwrap();
        assert!(notice.message.contains("failed to load external CSS"));
        assert!(notice.message.contains("boom"));
        assert_eq!(notice.resolved_path, Some(PathBuf::from("/x/a.css")));
        assert!(css_error_notice(&RenderConfig::default()).is_none());
    }

    #[test]
    fn test_default_image_path() {
        assert!(default_image_path().ends_with("Desktop/code.png"));
    }
}
