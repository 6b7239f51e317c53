//! Assessment profiles.
//!
//! A profile selects the three moving parts of a session: the smoothing window,
//! the calibration strategy and the counter variant. Each assessment type has a
//! preset holding the tuned constants.

use serde::{Deserialize, Serialize};

use repcount_models::AssessmentType;

use crate::error::{EngineError, EngineResult};

/// Calibration strategy used to derive thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalibrationStrategy {
    /// Full calibration pass; thresholds are `max - margin` and `min + margin`.
    MinMax {
        /// Margin in pixels
        margin: f64,
    },

    /// Median over the smoothed samples of the first `warmup_frames` frames.
    Warmup {
        /// Number of decoded frames in the warm-up window
        warmup_frames: u32,
        /// Required deviation as a fraction of frame height
        delta_frac: f64,
    },
}

/// State machine used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterKind {
    /// Two-threshold neutral/active cycle (push-ups, sit-ups).
    Hysteresis,
    /// Grounded/airborne cycle with jump height tracking.
    Jump,
    /// Direction reversals gated by a bend.
    Shuttle {
        /// Minimum lateral speed, in pixels per frame, for a direction to register
        velocity_threshold: f64,
    },
}

/// Full configuration of one assessment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentProfile {
    /// Assessment this profile counts
    pub assessment: AssessmentType,

    /// Moving-average window in samples (default: 3 for push-ups/sit-ups, 5 otherwise)
    pub smoothing_window: usize,

    /// How thresholds are derived
    pub calibration: CalibrationStrategy,

    /// Which state machine counts repetitions
    pub counter: CounterKind,
}

impl AssessmentProfile {
    /// Preset for an assessment type.
    pub fn for_assessment(assessment: AssessmentType) -> Self {
        match assessment {
            AssessmentType::PushUps => Self {
                assessment,
                smoothing_window: 3,
                calibration: CalibrationStrategy::MinMax { margin: 5.0 },
                counter: CounterKind::Hysteresis,
            },
            AssessmentType::SitUps => Self {
                assessment,
                smoothing_window: 3,
                calibration: CalibrationStrategy::MinMax { margin: 10.0 },
                counter: CounterKind::Hysteresis,
            },
            AssessmentType::VerticalJump => Self {
                assessment,
                smoothing_window: 5,
                calibration: CalibrationStrategy::Warmup {
                    warmup_frames: 40,
                    delta_frac: 0.08,
                },
                counter: CounterKind::Jump,
            },
            AssessmentType::ShuttleRun => Self {
                assessment,
                smoothing_window: 5,
                calibration: CalibrationStrategy::Warmup {
                    warmup_frames: 40,
                    delta_frac: 0.04,
                },
                counter: CounterKind::Shuttle {
                    velocity_threshold: 2.0,
                },
            },
        }
    }

    /// Builder-style setter for the smoothing window.
    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.smoothing_window = window;
        self
    }

    /// Builder-style setter for the warm-up length. No effect on min/max profiles.
    pub fn with_warmup_frames(mut self, frames: u32) -> Self {
        if let CalibrationStrategy::Warmup { delta_frac, .. } = self.calibration {
            self.calibration = CalibrationStrategy::Warmup {
                warmup_frames: frames,
                delta_frac,
            };
        }
        self
    }

    /// Builder-style setter for the min/max margin. No effect on warm-up profiles.
    pub fn with_margin(mut self, margin: f64) -> Self {
        if let CalibrationStrategy::MinMax { .. } = self.calibration {
            self.calibration = CalibrationStrategy::MinMax { margin };
        }
        self
    }

    /// Warm-up window length, if this profile uses one.
    pub fn warmup_frames(&self) -> Option<u32> {
        match self.calibration {
            CalibrationStrategy::Warmup { warmup_frames, .. } => Some(warmup_frames),
            CalibrationStrategy::MinMax { .. } => None,
        }
    }

    /// Returns true if a separate calibration pass precedes counting.
    pub fn needs_calibration_pass(&self) -> bool {
        matches!(self.calibration, CalibrationStrategy::MinMax { .. })
    }

    /// Check that the strategy and counter fit together.
    pub fn validate(&self) -> EngineResult<()> {
        if self.smoothing_window == 0 {
            return Err(EngineError::InvalidConfig(
                "smoothing_window must be at least 1".to_string(),
            ));
        }

        match (self.calibration, self.counter) {
            (CalibrationStrategy::MinMax { margin }, CounterKind::Hysteresis) => {
                if !margin.is_finite() || margin < 0.0 {
                    return Err(EngineError::InvalidConfig(format!(
                        "margin must be a non-negative number, got {margin}"
                    )));
                }
            }
            (
                CalibrationStrategy::Warmup { delta_frac, .. },
                CounterKind::Jump | CounterKind::Shuttle { .. },
            ) => {
                if !delta_frac.is_finite() || delta_frac < 0.0 {
                    return Err(EngineError::InvalidConfig(format!(
                        "delta_frac must be a non-negative number, got {delta_frac}"
                    )));
                }
            }
            (calibration, counter) => {
                return Err(EngineError::InvalidConfig(format!(
                    "calibration {calibration:?} cannot drive counter {counter:?}"
                )));
            }
        }

        Ok(())
    }
}

impl From<AssessmentType> for AssessmentProfile {
    fn from(assessment: AssessmentType) -> Self {
        Self::for_assessment(assessment)
    }
}
