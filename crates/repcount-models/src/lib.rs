//! Shared data models for the repcount assessment engine.
//!
//! This crate provides Serde-serializable types for:
//! - Assessment types (push-ups, sit-ups, vertical jump, shuttle run)
//! - Pose landmarks and per-frame landmark carriers
//! - Calibration thresholds and assessment results
//! - Structured error descriptors for failed sessions

pub mod assessment;
pub mod landmark;
pub mod result;

// Re-export common types
pub use assessment::{AssessmentParseError, AssessmentType};
pub use landmark::{BodySide, Landmark, LandmarkFrame, LandmarkId, PoseLandmarks};
pub use result::{
    AssessmentOutcome, AssessmentResult, CalibrationThresholds, ErrorDescriptor, ErrorKind,
};
