//! Pose estimation boundary.
//!
//! A [`PoseEstimator`] turns one decoded frame into an optional set of named
//! landmarks. `Ok(None)` means no body was found and is not an error.

use repcount_models::PoseLandmarks;

use crate::decode::VideoFrame;
use crate::error::EngineResult;

#[cfg(feature = "onnx")]
pub mod movenet;

#[cfg(feature = "onnx")]
pub use movenet::MoveNetEstimator;

/// Landmark detector for decoded frames.
pub trait PoseEstimator: Send + Sync {
    /// Detect a body in `frame`.
    fn estimate(&self, frame: &VideoFrame) -> EngineResult<Option<PoseLandmarks>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

impl<T: PoseEstimator + ?Sized> PoseEstimator for std::sync::Arc<T> {
    fn estimate(&self, frame: &VideoFrame) -> EngineResult<Option<PoseLandmarks>> {
        (**self).estimate(frame)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: PoseEstimator + ?Sized> PoseEstimator for Box<T> {
    fn estimate(&self, frame: &VideoFrame) -> EngineResult<Option<PoseLandmarks>> {
        (**self).estimate(frame)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
