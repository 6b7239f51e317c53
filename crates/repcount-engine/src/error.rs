//! Error types for assessment sessions.

use std::path::PathBuf;
use thiserror::Error;

use repcount_models::{ErrorDescriptor, ErrorKind, LandmarkId};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while analyzing a source.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Source unreadable: {message}")]
    SourceUnreadable {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("No pose detected")]
    NoPoseDetected,

    #[error("Frame {frame_index} is missing required landmarks: {missing:?}")]
    InsufficientLandmarks {
        frame_index: u64,
        missing: Vec<LandmarkId>,
    },

    #[error("Pose estimation failed: {0}")]
    PoseEstimation(String),

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a source-unreadable error for a file path.
    pub fn source_unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Create a pose estimation failure error.
    pub fn pose_estimation(message: impl Into<String>) -> Self {
        Self::PoseEstimation(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Category reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::SourceUnreadable { .. }
            | EngineError::FfmpegNotFound
            | EngineError::FfprobeNotFound
            | EngineError::Io(_)
            | EngineError::JsonParse(_) => ErrorKind::SourceUnreadable,
            EngineError::NoPoseDetected => ErrorKind::NoPoseDetected,
            EngineError::InsufficientLandmarks { .. } => ErrorKind::InsufficientLandmarks,
            EngineError::PoseEstimation(_) => ErrorKind::PoseEstimationFailed,
            EngineError::Cancelled => ErrorKind::Cancelled,
            EngineError::InvalidConfig(_) => ErrorKind::InvalidInput,
            EngineError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Structured descriptor for the output document.
    pub fn to_descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor::new(self.kind(), self.to_string())
    }
}

impl From<&EngineError> for ErrorDescriptor {
    fn from(err: &EngineError) -> Self {
        err.to_descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(EngineError::NoPoseDetected.kind(), ErrorKind::NoPoseDetected);
        assert_eq!(
            EngineError::source_unreadable("/tmp/x.mp4", "missing").kind(),
            ErrorKind::SourceUnreadable
        );
        assert_eq!(EngineError::FfmpegNotFound.kind(), ErrorKind::SourceUnreadable);
        assert_eq!(EngineError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_descriptor_message() {
        let descriptor = EngineError::NoPoseDetected.to_descriptor();
        assert_eq!(descriptor.kind, ErrorKind::NoPoseDetected);
        assert_eq!(descriptor.message, "No pose detected");
    }
}
