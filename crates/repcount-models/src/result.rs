//! Assessment result models.
//!
//! A session produces exactly one [`AssessmentOutcome`]: either a completed
//! [`AssessmentResult`] or a single [`ErrorDescriptor`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assessment::AssessmentType;

/// Thresholds derived during calibration and used by the counting pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CalibrationThresholds {
    /// Min/max calibration for push-ups and sit-ups.
    Hysteresis {
        /// Signal must rise above this to enter the active phase
        down_threshold: f64,
        /// Signal must fall below this to complete a repetition
        up_threshold: f64,
    },

    /// Warm-up calibration for vertical jumps.
    JumpBaseline {
        /// Median resting hip height in pixels
        baseline: f64,
        /// Rise above baseline required to start a jump, in pixels
        jump_threshold: f64,
    },

    /// Warm-up calibration for shuttle runs.
    BendBaseline {
        /// Median resting hand-to-hip offset in pixels
        baseline_hand_rel: f64,
        /// Extra reach required to register a bend, in pixels
        bend_threshold: f64,
    },
}

/// Final output of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentResult {
    /// Assessment that was counted
    pub assessment: AssessmentType,

    /// Number of completed repetitions
    pub rep_count: u32,

    /// Thresholds actually used. `None` only when a warm-up assessment never
    /// produced a baseline (no usable sample inside the warm-up window).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<CalibrationThresholds>,

    /// Per-jump heights in pixels, in jump order (vertical jump only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_heights: Option<Vec<f64>>,

    /// Mean of `jump_heights`, 0 when no jump was recorded (vertical jump only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_height: Option<f64>,

    /// Warm-up window length in frames (warm-up assessments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_frames: Option<u32>,

    /// Frames decoded during the counting pass
    pub frames_total: u64,

    /// Frames of the counting pass that produced a usable sample
    pub frames_with_pose: u64,
}

impl AssessmentResult {
    /// Returns the hysteresis thresholds, if this result used them.
    pub fn hysteresis_thresholds(&self) -> Option<(f64, f64)> {
        match self.thresholds {
            Some(CalibrationThresholds::Hysteresis {
                down_threshold,
                up_threshold,
            }) => Some((down_threshold, up_threshold)),
            _ => None,
        }
    }
}

/// Category of a failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The video could not be opened or decoded
    SourceUnreadable,
    /// No frame of the relevant pass yielded usable landmarks
    NoPoseDetected,
    /// Required landmarks were missing
    InsufficientLandmarks,
    /// The pose estimator failed
    PoseEstimationFailed,
    /// The session was cancelled by its host
    Cancelled,
    /// The host deadline expired
    Timeout,
    /// The request itself was invalid (unknown assessment, bad arguments)
    InvalidInput,
    /// Unexpected internal failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SourceUnreadable => "source_unreadable",
            ErrorKind::NoPoseDetected => "no_pose_detected",
            ErrorKind::InsufficientLandmarks => "insufficient_landmarks",
            ErrorKind::PoseEstimationFailed => "pose_estimation_failed",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured description of a failed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The single document emitted per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AssessmentOutcome {
    /// The session finished and produced a count.
    Completed(AssessmentResult),
    /// The session failed; only the error descriptor is reported.
    Failed { error: ErrorDescriptor },
}

impl AssessmentOutcome {
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            error: ErrorDescriptor::new(kind, message),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AssessmentOutcome::Completed(_))
    }

    /// Returns the error descriptor of a failed outcome.
    pub fn error(&self) -> Option<&ErrorDescriptor> {
        match self {
            AssessmentOutcome::Failed { error } => Some(error),
            AssessmentOutcome::Completed(_) => None,
        }
    }
}

impl From<AssessmentResult> for AssessmentOutcome {
    fn from(result: AssessmentResult) -> Self {
        Self::Completed(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pushup_result() -> AssessmentResult {
        AssessmentResult {
            assessment: AssessmentType::PushUps,
            rep_count: 2,
            thresholds: Some(CalibrationThresholds::Hysteresis {
                down_threshold: 35.0,
                up_threshold: 15.0,
            }),
            jump_heights: None,
            average_height: None,
            warmup_frames: None,
            frames_total: 10,
            frames_with_pose: 10,
        }
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(pushup_result()).unwrap();
        assert_eq!(json["assessment"], "push-ups");
        assert_eq!(json["rep_count"], 2);
        assert_eq!(json["thresholds"]["strategy"], "hysteresis");
        assert_eq!(json["thresholds"]["down_threshold"], 35.0);
        assert!(json.get("jump_heights").is_none());
        assert!(json.get("warmup_frames").is_none());
    }

    #[test]
    fn test_hysteresis_accessor() {
        assert_eq!(pushup_result().hysteresis_thresholds(), Some((35.0, 15.0)));
    }

    #[test]
    fn test_failed_outcome_has_only_error() {
        let outcome = AssessmentOutcome::failed(ErrorKind::NoPoseDetected, "No pose detected");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"]["kind"], "no_pose_detected");
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(!outcome.is_completed());
    }

    #[test]
    fn test_outcome_deserializes_both_shapes() {
        let completed = serde_json::to_string(&AssessmentOutcome::from(pushup_result())).unwrap();
        let parsed: AssessmentOutcome = serde_json::from_str(&completed).unwrap();
        assert!(parsed.is_completed());

        let failed = r#"{"error":{"kind":"timeout","message":"deadline exceeded"}}"#;
        let parsed: AssessmentOutcome = serde_json::from_str(failed).unwrap();
        assert_eq!(parsed.error().unwrap().kind, ErrorKind::Timeout);
    }
}
