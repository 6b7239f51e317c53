//! Threshold calibration.
//!
//! Two strategies:
//! - [`MinMaxCalibrator`] consumes a whole calibration pass of raw samples and
//!   derives hysteresis thresholds from the observed range.
//! - [`WarmupCalibrator`] collects smoothed samples over the first `W` decoded
//!   frames, then freezes the median as the resting baseline.

use tracing::debug;

use repcount_models::CalibrationThresholds;

use crate::error::{EngineError, EngineResult};
use crate::smoothing::median;

/// Min/max calibration over a full pass.
#[derive(Debug, Clone)]
pub struct MinMaxCalibrator {
    margin: f64,
    min: f64,
    max: f64,
    samples: u64,
}

impl MinMaxCalibrator {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            samples: 0,
        }
    }

    /// Record one raw sample.
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.samples += 1;
    }

    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Derive `down = max - margin` and `up = min + margin`.
    ///
    /// Fails with `NoPoseDetected` when no sample was observed.
    pub fn finish(&self) -> EngineResult<CalibrationThresholds> {
        if self.samples == 0 {
            return Err(EngineError::NoPoseDetected);
        }

        let down_threshold = self.max - self.margin;
        let up_threshold = self.min + self.margin;

        debug!(
            samples = self.samples,
            min = self.min,
            max = self.max,
            down_threshold,
            up_threshold,
            "Calibration pass finished"
        );

        Ok(CalibrationThresholds::Hysteresis {
            down_threshold,
            up_threshold,
        })
    }
}

/// Resting position and the deviation required to leave it, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub value: f64,
    pub threshold: f64,
}

/// Result of feeding one sample to a [`WarmupCalibrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarmupPhase {
    /// The frame is inside the warm-up window; the sample was collected.
    Collecting,
    /// Warm-up is over but collected no sample; counting is deferred.
    Deferred,
    /// The baseline is known and counting may proceed.
    Ready(Baseline),
}

/// Warm-up baseline calibration.
#[derive(Debug, Clone)]
pub struct WarmupCalibrator {
    warmup_frames: u32,
    delta_frac: f64,
    samples: Vec<f64>,
    baseline: Option<Baseline>,
}

impl WarmupCalibrator {
    pub fn new(warmup_frames: u32, delta_frac: f64) -> Self {
        Self {
            warmup_frames,
            delta_frac,
            samples: Vec::with_capacity(warmup_frames as usize),
            baseline: None,
        }
    }

    /// Returns true if the zero-based decode position falls in the warm-up window.
    pub fn in_warmup(&self, position: u64) -> bool {
        position < u64::from(self.warmup_frames)
    }

    /// Feed a smoothed sample taken at `position` in decode order.
    ///
    /// The baseline is computed once, on the first sample after the window,
    /// using that frame's height for the threshold. It never changes afterwards.
    pub fn observe(&mut self, position: u64, frame_height: u32, value: f64) -> WarmupPhase {
        if self.in_warmup(position) {
            self.samples.push(value);
            return WarmupPhase::Collecting;
        }

        if let Some(baseline) = self.baseline {
            return WarmupPhase::Ready(baseline);
        }

        if self.samples.is_empty() {
            return WarmupPhase::Deferred;
        }

        let baseline = Baseline {
            value: median(&self.samples),
            threshold: self.delta_frac * f64::from(frame_height),
        };

        debug!(
            warmup_samples = self.samples.len(),
            baseline = baseline.value,
            threshold = baseline.threshold,
            "Warm-up baseline established"
        );

        self.baseline = Some(baseline);
        WarmupPhase::Ready(baseline)
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    pub fn warmup_frames(&self) -> u32 {
        self.warmup_frames
    }

    /// Number of samples collected inside the window.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax_scenario_thresholds() {
        let mut calibrator = MinMaxCalibrator::new(5.0);
        for v in [10.0, 10.0, 40.0, 40.0, 10.0, 10.0, 40.0, 40.0, 10.0, 10.0] {
            calibrator.observe(v);
        }
        assert_eq!(
            calibrator.finish().unwrap(),
            CalibrationThresholds::Hysteresis {
                down_threshold: 35.0,
                up_threshold: 15.0
            }
        );
    }

    #[test]
    fn test_minmax_without_samples_is_no_pose() {
        let calibrator = MinMaxCalibrator::new(10.0);
        assert!(matches!(calibrator.finish(), Err(EngineError::NoPoseDetected)));
    }

    #[test]
    fn test_warmup_freezes_median() {
        let mut calibrator = WarmupCalibrator::new(3, 0.08);
        assert_eq!(calibrator.observe(0, 500, 290.0), WarmupPhase::Collecting);
        assert_eq!(calibrator.observe(1, 500, 310.0), WarmupPhase::Collecting);
        assert_eq!(calibrator.observe(2, 500, 300.0), WarmupPhase::Collecting);

        let expected = Baseline {
            value: 300.0,
            threshold: 40.0,
        };
        assert_eq!(calibrator.observe(3, 500, 100.0), WarmupPhase::Ready(expected));
        // Later samples and heights do not move the baseline
        assert_eq!(calibrator.observe(4, 1000, 900.0), WarmupPhase::Ready(expected));
        assert_eq!(calibrator.sample_count(), 3);
    }

    #[test]
    fn test_warmup_without_samples_defers() {
        let mut calibrator = WarmupCalibrator::new(2, 0.04);
        assert_eq!(calibrator.observe(5, 480, 12.0), WarmupPhase::Deferred);
        assert_eq!(calibrator.baseline(), None);
    }
}
