//! Repetition counting engine for exercise videos.
//!
//! This crate provides:
//! - Per-assessment signal extraction from pose landmarks
//! - Moving-average smoothing and threshold calibration
//! - Repetition state machines (hysteresis, jump, shuttle)
//! - Landmark sources: in-memory, recorded JSON Lines, FFmpeg-decoded video
//! - A pose estimator boundary, with an ONNX MoveNet estimator behind the
//!   `onnx` feature
//!
//! ```no_run
//! use repcount_engine::{analyze, RecordedLandmarkSource};
//! use repcount_models::AssessmentType;
//!
//! let source = RecordedLandmarkSource::new("pushups.jsonl");
//! let result = analyze(&source, AssessmentType::PushUps)?;
//! println!("{} reps", result.rep_count);
//! # Ok::<(), repcount_engine::EngineError>(())
//! ```

pub mod aggregator;
pub mod calibration;
pub mod config;
pub mod counter;
pub mod decode;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod pose;
pub mod session;
pub mod signal;
pub mod smoothing;
pub mod source;

pub use aggregator::{CountSummary, ResultAggregator};
pub use calibration::{Baseline, MinMaxCalibrator, WarmupCalibrator, WarmupPhase};
pub use config::{AssessmentProfile, CalibrationStrategy, CounterKind};
pub use counter::{Direction, HysteresisCounter, JumpCounter, ShuttleCounter};
pub use decode::{probe_video, FfmpegFrameReader, VideoFrame, VideoInfo};
pub use error::{EngineError, EngineResult};
pub use pipeline::CountingPipeline;
pub use pose::PoseEstimator;
pub use session::{analyze, analyze_video, AssessmentSession, CancelFlag};
pub use signal::{SignalExtractor, SignalSample};
pub use smoothing::SmoothingFilter;
pub use source::{
    InMemoryLandmarkSource, LandmarkSource, LandmarkStream, RecordedLandmarkSource,
    VideoLandmarkSource,
};

#[cfg(feature = "onnx")]
pub use pose::MoveNetEstimator;
