//! Per-sample processing of the counting pass.
//!
//! A [`CountingPipeline`] owns the smoothing filters, the warm-up calibrator
//! (if any) and the repetition counter selected by an [`AssessmentProfile`].

use repcount_models::CalibrationThresholds;

use crate::aggregator::CountSummary;
use crate::calibration::{Baseline, WarmupCalibrator, WarmupPhase};
use crate::config::{AssessmentProfile, CalibrationStrategy, CounterKind};
use crate::counter::{HysteresisCounter, JumpCounter, ShuttleCounter};
use crate::error::{EngineError, EngineResult};
use crate::signal::SignalSample;
use crate::smoothing::SmoothingFilter;

enum Stage {
    Hysteresis {
        filter: SmoothingFilter,
        counter: HysteresisCounter,
        thresholds: CalibrationThresholds,
    },
    Jump {
        filter: SmoothingFilter,
        warmup: WarmupCalibrator,
        counter: JumpCounter,
    },
    Shuttle {
        x_filter: SmoothingFilter,
        bend_filter: SmoothingFilter,
        warmup: WarmupCalibrator,
        counter: ShuttleCounter,
    },
}

/// Smoothing, warm-up and counting for one pass.
pub struct CountingPipeline {
    stage: Stage,
}

impl CountingPipeline {
    /// Build the pipeline for a profile.
    ///
    /// Hysteresis profiles need the thresholds from the calibration pass;
    /// warm-up profiles calibrate themselves and ignore `thresholds`.
    pub fn new(
        profile: &AssessmentProfile,
        thresholds: Option<CalibrationThresholds>,
    ) -> EngineResult<Self> {
        profile.validate()?;
        let window = profile.smoothing_window;

        let stage = match (profile.calibration, profile.counter) {
            (CalibrationStrategy::MinMax { .. }, CounterKind::Hysteresis) => match thresholds {
                Some(
                    thresholds @ CalibrationThresholds::Hysteresis {
                        down_threshold,
                        up_threshold,
                    },
                ) => Stage::Hysteresis {
                    filter: SmoothingFilter::new(window),
                    counter: HysteresisCounter::new(down_threshold, up_threshold),
                    thresholds,
                },
                other => {
                    return Err(EngineError::internal(format!(
                        "hysteresis counter requires hysteresis thresholds, got {other:?}"
                    )))
                }
            },
            (
                CalibrationStrategy::Warmup {
                    warmup_frames,
                    delta_frac,
                },
                CounterKind::Jump,
            ) => Stage::Jump {
                filter: SmoothingFilter::new(window),
                warmup: WarmupCalibrator::new(warmup_frames, delta_frac),
                counter: JumpCounter::new(),
            },
            (
                CalibrationStrategy::Warmup {
                    warmup_frames,
                    delta_frac,
                },
                CounterKind::Shuttle { velocity_threshold },
            ) => Stage::Shuttle {
                x_filter: SmoothingFilter::new(window),
                bend_filter: SmoothingFilter::new(window),
                warmup: WarmupCalibrator::new(warmup_frames, delta_frac),
                counter: ShuttleCounter::new(velocity_threshold),
            },
            (calibration, counter) => {
                return Err(EngineError::InvalidConfig(format!(
                    "calibration {calibration:?} cannot drive counter {counter:?}"
                )))
            }
        };

        Ok(Self { stage })
    }

    /// Feed a sample taken at zero-based decode `position` of the pass.
    pub fn ingest(&mut self, position: u64, frame_height: u32, sample: &SignalSample) {
        match &mut self.stage {
            Stage::Hysteresis {
                filter, counter, ..
            } => {
                let smoothed = filter.push(sample.primary);
                counter.update(smoothed);
            }
            Stage::Jump {
                filter,
                warmup,
                counter,
            } => {
                let smoothed = filter.push(sample.primary);
                if let WarmupPhase::Ready(baseline) = warmup.observe(position, frame_height, smoothed)
                {
                    counter.update(smoothed, baseline);
                }
            }
            Stage::Shuttle {
                x_filter,
                bend_filter,
                warmup,
                counter,
            } => {
                let Some(hand_rel) = sample.secondary else {
                    return;
                };
                let hip_x = x_filter.push(sample.primary);
                let bend = bend_filter.push(hand_rel);
                if let WarmupPhase::Ready(baseline) = warmup.observe(position, frame_height, bend) {
                    counter.update(hip_x, bend, baseline);
                }
            }
        }
    }

    pub fn rep_count(&self) -> u32 {
        match &self.stage {
            Stage::Hysteresis { counter, .. } => counter.count(),
            Stage::Jump { counter, .. } => counter.count(),
            Stage::Shuttle { counter, .. } => counter.count(),
        }
    }

    /// Thresholds in effect, once known.
    pub fn thresholds(&self) -> Option<CalibrationThresholds> {
        match &self.stage {
            Stage::Hysteresis { thresholds, .. } => Some(*thresholds),
            Stage::Jump { warmup, .. } => warmup.baseline().map(jump_thresholds),
            Stage::Shuttle { warmup, .. } => warmup.baseline().map(bend_thresholds),
        }
    }

    /// Close the pass and hand the counts to the aggregator.
    pub fn finish(self) -> CountSummary {
        let rep_count = self.rep_count();
        let thresholds = self.thresholds();
        let jump_heights = match self.stage {
            Stage::Jump { counter, .. } => Some(counter.into_heights()),
            _ => None,
        };

        CountSummary {
            rep_count,
            thresholds,
            jump_heights,
        }
    }
}

fn jump_thresholds(baseline: Baseline) -> CalibrationThresholds {
    CalibrationThresholds::JumpBaseline {
        baseline: baseline.value,
        jump_threshold: baseline.threshold,
    }
}

fn bend_thresholds(baseline: Baseline) -> CalibrationThresholds {
    CalibrationThresholds::BendBaseline {
        baseline_hand_rel: baseline.value,
        bend_threshold: baseline.threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_models::AssessmentType;

    fn sample(primary: f64, secondary: Option<f64>) -> SignalSample {
        SignalSample {
            frame_index: 0,
            primary,
            secondary,
        }
    }

    #[test]
    fn test_hysteresis_requires_thresholds() {
        let profile = AssessmentProfile::for_assessment(AssessmentType::PushUps);
        assert!(CountingPipeline::new(&profile, None).is_err());
    }

    #[test]
    fn test_pushup_plateaus_smoothed() {
        let profile = AssessmentProfile::for_assessment(AssessmentType::PushUps);
        let thresholds = CalibrationThresholds::Hysteresis {
            down_threshold: 35.0,
            up_threshold: 15.0,
        };
        let mut pipeline = CountingPipeline::new(&profile, Some(thresholds)).unwrap();
        let values = [10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 10.0, 10.0, 10.0];
        for (i, v) in values.iter().enumerate() {
            pipeline.ingest(i as u64, 480, &sample(*v, None));
        }
        let summary = pipeline.finish();
        assert_eq!(summary.rep_count, 2);
        assert_eq!(summary.thresholds, Some(thresholds));
        assert_eq!(summary.jump_heights, None);
    }

    #[test]
    fn test_jump_scenario() {
        let profile = AssessmentProfile::for_assessment(AssessmentType::VerticalJump);
        let mut pipeline = CountingPipeline::new(&profile, None).unwrap();

        let mut position = 0;
        let mut feed = |pipeline: &mut CountingPipeline, value: f64, frames: usize| {
            for _ in 0..frames {
                pipeline.ingest(position, 500, &sample(value, None));
                position += 1;
            }
        };
        feed(&mut pipeline, 300.0, 40);
        feed(&mut pipeline, 250.0, 5);
        feed(&mut pipeline, 300.0, 5);

        let summary = pipeline.finish();
        assert_eq!(summary.rep_count, 1);
        assert_eq!(summary.jump_heights, Some(vec![50.0]));
        assert_eq!(
            summary.thresholds,
            Some(CalibrationThresholds::JumpBaseline {
                baseline: 300.0,
                jump_threshold: 40.0
            })
        );
    }

    #[test]
    fn test_warmup_never_filled_reports_no_thresholds() {
        let profile = AssessmentProfile::for_assessment(AssessmentType::ShuttleRun);
        let mut pipeline = CountingPipeline::new(&profile, None).unwrap();
        for position in 40..60 {
            pipeline.ingest(position, 480, &sample(position as f64 * 10.0, Some(50.0)));
        }
        let summary = pipeline.finish();
        assert_eq!(summary.rep_count, 0);
        assert_eq!(summary.thresholds, None);
    }
}
