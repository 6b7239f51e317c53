//! Result assembly.

use repcount_models::{AssessmentResult, AssessmentType, CalibrationThresholds};

use crate::smoothing::mean;

/// What the counting stage hands over at the end of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CountSummary {
    pub rep_count: u32,
    pub thresholds: Option<CalibrationThresholds>,
    /// Present for vertical jump only
    pub jump_heights: Option<Vec<f64>>,
}

/// Tracks frame totals of the counting pass and packages the final result.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    assessment: AssessmentType,
    warmup_frames: Option<u32>,
    frames_total: u64,
    frames_with_pose: u64,
}

impl ResultAggregator {
    pub fn new(assessment: AssessmentType, warmup_frames: Option<u32>) -> Self {
        Self {
            assessment,
            warmup_frames,
            frames_total: 0,
            frames_with_pose: 0,
        }
    }

    /// Count one decoded frame; `usable` if it produced a sample.
    pub fn record_frame(&mut self, usable: bool) {
        self.frames_total += 1;
        if usable {
            self.frames_with_pose += 1;
        }
    }

    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    pub fn frames_with_pose(&self) -> u64 {
        self.frames_with_pose
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_total - self.frames_with_pose
    }

    /// Build the immutable result. `average_height` is the mean of the jump
    /// heights, 0 when there are none.
    pub fn finish(self, summary: CountSummary) -> AssessmentResult {
        let average_height = summary.jump_heights.as_deref().map(mean);

        AssessmentResult {
            assessment: self.assessment,
            rep_count: summary.rep_count,
            thresholds: summary.thresholds,
            jump_heights: summary.jump_heights,
            average_height,
            warmup_frames: self.warmup_frames,
            frames_total: self.frames_total,
            frames_with_pose: self.frames_with_pose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_average() {
        let mut aggregator = ResultAggregator::new(AssessmentType::VerticalJump, Some(40));
        aggregator.record_frame(true);
        aggregator.record_frame(false);
        let result = aggregator.finish(CountSummary {
            rep_count: 2,
            thresholds: None,
            jump_heights: Some(vec![40.0, 60.0]),
        });
        assert_eq!(result.average_height, Some(50.0));
        assert_eq!(result.warmup_frames, Some(40));
        assert_eq!(result.frames_total, 2);
        assert_eq!(result.frames_with_pose, 1);
    }

    #[test]
    fn test_no_jumps_average_zero() {
        let aggregator = ResultAggregator::new(AssessmentType::VerticalJump, Some(40));
        let result = aggregator.finish(CountSummary {
            rep_count: 0,
            thresholds: None,
            jump_heights: Some(Vec::new()),
        });
        assert_eq!(result.average_height, Some(0.0));
    }

    #[test]
    fn test_hysteresis_result_has_no_jump_fields() {
        let aggregator = ResultAggregator::new(AssessmentType::SitUps, None);
        let result = aggregator.finish(CountSummary {
            rep_count: 3,
            thresholds: Some(CalibrationThresholds::Hysteresis {
                down_threshold: 90.0,
                up_threshold: 30.0,
            }),
            jump_heights: None,
        });
        assert_eq!(result.average_height, None);
        assert_eq!(result.hysteresis_thresholds(), Some((90.0, 30.0)));
    }
}
