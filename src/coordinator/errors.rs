//! Error types for capture sessions.

use std::path::PathBuf;

use crate::channel::ChannelError;

/// Errors raised while driving a capture session.
///
/// None of these end the session; only disposing the surface does.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("a render surface is already attached")]
    AlreadyAttached,
    #[error("no render surface is attached")]
    NotAttached,
    #[error("Unknown shutterAction \"{0}\"")]
    UnknownAction(String),
    #[error("{0}")]
    Channel(#[from] ChannelError),
    #[error("image data from the render surface is not valid base64: {0}")]
    InvalidImageData(#[from] base64::DecodeError),
    #[error("failed to write image to '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CoordinatorError {
    /// Whether the user should see this error, as opposed to only logging it.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, CoordinatorError::AlreadyAttached | CoordinatorError::NotAttached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_names_the_action() {
        let err = CoordinatorError::UnknownAction("explode".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("\"explode\""));
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_write_error_display() {
        let err = CoordinatorError::Write {
            path: PathBuf::from("/nope/code.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/nope/code.png"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_channel_error_passes_through() {
        let err: CoordinatorError = ChannelError::Closed.into();
        assert_eq!(err.to_string(), "render surface is closed");
    }

    #[test]
    fn test_attach_errors_are_internal() {
        assert!(!CoordinatorError::AlreadyAttached.is_user_facing());
        assert!(!CoordinatorError::NotAttached.is_user_facing());
    }
}
