//! Assessment sessions.
//!
//! A session owns every piece of mutable state for one analysis: the
//! calibration result, the counting pipeline and the frame totals. Nothing
//! persists between sessions.
//!
//! Push-ups and sit-ups run two full passes over the source (calibration, then
//! counting). Vertical jump and shuttle run count in a single pass after a
//! warm-up prefix.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, trace, warn};

use repcount_models::{
    AssessmentOutcome, AssessmentResult, AssessmentType, CalibrationThresholds, LandmarkFrame,
};

use crate::aggregator::ResultAggregator;
use crate::calibration::MinMaxCalibrator;
use crate::config::{AssessmentProfile, CalibrationStrategy};
use crate::error::{EngineError, EngineResult};
use crate::metrics;
use crate::pipeline::CountingPipeline;
use crate::pose::PoseEstimator;
use crate::signal::{SignalExtractor, SignalSample};
use crate::source::{LandmarkSource, LandmarkStream, VideoLandmarkSource};

/// Shared flag a host sets to stop a running session.
///
/// The session checks it before reading each frame.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs one assessment over a landmark source.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    profile: AssessmentProfile,
    cancel: CancelFlag,
}

impl AssessmentSession {
    /// Create a session from a validated profile.
    pub fn new(profile: AssessmentProfile) -> EngineResult<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            cancel: CancelFlag::new(),
        })
    }

    /// Session with the preset profile of an assessment type.
    pub fn for_assessment(assessment: AssessmentType) -> Self {
        Self {
            profile: AssessmentProfile::for_assessment(assessment),
            cancel: CancelFlag::new(),
        }
    }

    /// Share a cancel flag with the host.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn profile(&self) -> &AssessmentProfile {
        &self.profile
    }

    pub fn assessment(&self) -> AssessmentType {
        self.profile.assessment
    }

    /// Analyze `source` and return the result.
    pub fn run(&self, source: &dyn LandmarkSource) -> EngineResult<AssessmentResult> {
        let assessment = self.assessment();
        let span = info_span!(
            "assessment_session",
            assessment = %assessment,
            source = %source.describe()
        );
        let _enter = span.enter();

        let started = Instant::now();
        let result = self.run_passes(source);
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(r) => {
                info!(
                    rep_count = r.rep_count,
                    frames_total = r.frames_total,
                    frames_with_pose = r.frames_with_pose,
                    duration_secs = elapsed,
                    "Assessment completed"
                );
                metrics::record_session(assessment.as_str(), "completed", r.rep_count, elapsed);
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "Assessment failed");
                metrics::record_session(assessment.as_str(), e.kind().as_str(), 0, elapsed);
            }
        }

        result
    }

    /// Like [`run`](Self::run), but folds failures into the outcome document.
    pub fn run_outcome(&self, source: &dyn LandmarkSource) -> AssessmentOutcome {
        match self.run(source) {
            Ok(result) => AssessmentOutcome::Completed(result),
            Err(e) => AssessmentOutcome::Failed {
                error: e.to_descriptor(),
            },
        }
    }

    fn run_passes(&self, source: &dyn LandmarkSource) -> EngineResult<AssessmentResult> {
        let thresholds = if self.profile.needs_calibration_pass() {
            Some(self.calibration_pass(source)?)
        } else {
            None
        };
        self.counting_pass(source, thresholds)
    }

    /// First pass for min/max profiles: raw samples over the whole source.
    fn calibration_pass(&self, source: &dyn LandmarkSource) -> EngineResult<CalibrationThresholds> {
        let CalibrationStrategy::MinMax { margin } = self.profile.calibration else {
            return Err(EngineError::internal(
                "calibration pass requested for a warm-up profile",
            ));
        };

        let extractor = SignalExtractor::for_assessment(self.assessment());
        let mut calibrator = MinMaxCalibrator::new(margin);
        let mut frames: u64 = 0;

        let mut stream = source.open()?;
        while let Some(frame) = self.next_frame(stream.as_mut())? {
            frames += 1;
            if let Some(sample) = usable_sample(&extractor, &frame)? {
                calibrator.observe(sample.primary);
            }
        }
        drop(stream);

        let skipped = frames - calibrator.sample_count();
        debug!(frames, skipped, "Calibration pass drained source");
        metrics::record_pass(self.assessment().as_str(), "calibration", frames, skipped);

        calibrator.finish()
    }

    /// Counting pass: smoothing, warm-up and the repetition state machine.
    fn counting_pass(
        &self,
        source: &dyn LandmarkSource,
        thresholds: Option<CalibrationThresholds>,
    ) -> EngineResult<AssessmentResult> {
        let extractor = SignalExtractor::for_assessment(self.assessment());
        let mut pipeline = CountingPipeline::new(&self.profile, thresholds)?;
        let mut aggregator =
            ResultAggregator::new(self.assessment(), self.profile.warmup_frames());

        let mut stream = source.open()?;
        let mut position: u64 = 0;
        while let Some(frame) = self.next_frame(stream.as_mut())? {
            match usable_sample(&extractor, &frame)? {
                Some(sample) => {
                    aggregator.record_frame(true);
                    pipeline.ingest(position, frame.height, &sample);
                }
                None => aggregator.record_frame(false),
            }
            position += 1;
        }
        drop(stream);

        debug!(
            frames = aggregator.frames_total(),
            skipped = aggregator.frames_skipped(),
            rep_count = pipeline.rep_count(),
            "Counting pass drained source"
        );
        metrics::record_pass(
            self.assessment().as_str(),
            "counting",
            aggregator.frames_total(),
            aggregator.frames_skipped(),
        );

        if aggregator.frames_with_pose() == 0 {
            return Err(EngineError::NoPoseDetected);
        }

        Ok(aggregator.finish(pipeline.finish()))
    }

    fn next_frame(
        &self,
        stream: &mut (dyn LandmarkStream + '_),
    ) -> EngineResult<Option<LandmarkFrame>> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        stream.next_frame()
    }
}

/// Extract a sample, mapping missing landmarks to a skipped frame.
fn usable_sample(
    extractor: &SignalExtractor,
    frame: &LandmarkFrame,
) -> EngineResult<Option<SignalSample>> {
    match extractor.extract(frame) {
        Ok(sample) => Ok(Some(sample)),
        Err(EngineError::InsufficientLandmarks {
            frame_index,
            missing,
        }) => {
            trace!(frame_index, ?missing, "Skipping frame");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Analyze a landmark source with the preset profile.
pub fn analyze(
    source: &dyn LandmarkSource,
    assessment: AssessmentType,
) -> EngineResult<AssessmentResult> {
    AssessmentSession::for_assessment(assessment).run(source)
}

/// Decode a video with FFmpeg, estimate poses and count repetitions.
pub fn analyze_video(
    path: impl AsRef<Path>,
    assessment: AssessmentType,
    estimator: Arc<dyn PoseEstimator>,
) -> EngineResult<AssessmentResult> {
    let source = VideoLandmarkSource::new(path.as_ref(), estimator);
    analyze(&source, assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryLandmarkSource;

    #[test]
    fn test_cancelled_session_stops() {
        let source: InMemoryLandmarkSource = (0..10)
            .map(|i| LandmarkFrame::without_pose(i, 64, 48))
            .collect();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let session =
            AssessmentSession::for_assessment(AssessmentType::VerticalJump).with_cancel_flag(cancel);
        assert!(matches!(session.run(&source), Err(EngineError::Cancelled)));
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let profile =
            AssessmentProfile::for_assessment(AssessmentType::PushUps).with_smoothing_window(0);
        assert!(AssessmentSession::new(profile).is_err());
    }

    #[test]
    fn test_failure_outcome_carries_kind() {
        let source: InMemoryLandmarkSource = (0..5)
            .map(|i| LandmarkFrame::without_pose(i, 64, 48))
            .collect();
        let outcome =
            AssessmentSession::for_assessment(AssessmentType::SitUps).run_outcome(&source);
        assert_eq!(
            outcome.error().map(|e| e.kind),
            Some(repcount_models::ErrorKind::NoPoseDetected)
        );
    }
}
