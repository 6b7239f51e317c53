//! Runs one analysis under a deadline.
//!
//! The engine is synchronous, so the analysis runs on the blocking pool. When
//! the deadline expires the shared cancel flag is set; the session stops at the
//! next frame boundary and the invocation reports `timeout`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, Instrument};

use repcount_engine::{
    AssessmentSession, CancelFlag, EngineResult, PoseEstimator,
    RecordedLandmarkSource, VideoLandmarkSource,
};
use repcount_models::{AssessmentOutcome, AssessmentResult, AssessmentType, ErrorKind};

use crate::config::CliConfig;
use crate::logging::RunLogger;

/// Where landmarks come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Video decoded with FFmpeg and a pose estimator
    Video(PathBuf),
    /// Landmarks recorded as JSON Lines
    Landmarks(PathBuf),
}

impl InputSource {
    pub fn path(&self) -> &PathBuf {
        match self {
            InputSource::Video(path) | InputSource::Landmarks(path) => path,
        }
    }
}

/// One analysis request as given on the command line.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: InputSource,
    /// Unparsed assessment selector
    pub assessment: String,
}

impl AnalysisRequest {
    pub fn video(path: impl Into<PathBuf>, assessment: impl Into<String>) -> Self {
        Self {
            input: InputSource::Video(path.into()),
            assessment: assessment.into(),
        }
    }

    pub fn landmarks(path: impl Into<PathBuf>, assessment: impl Into<String>) -> Self {
        Self {
            input: InputSource::Landmarks(path.into()),
            assessment: assessment.into(),
        }
    }
}

/// Run a request to completion and return the outcome document.
pub async fn execute(request: AnalysisRequest, config: &CliConfig) -> AssessmentOutcome {
    let logger = RunLogger::new(
        &request.assessment,
        &request.input.path().display().to_string(),
    );
    let span = logger.create_span();

    async {
        logger.log_start(config.timeout.as_secs());

        let outcome = match request.assessment.parse::<AssessmentType>() {
            Ok(assessment) => {
                let cancel = CancelFlag::new();
                let job = analysis_job(request.input, assessment, config.clone(), cancel.clone());
                run_with_deadline(job, config.timeout, cancel).await
            }
            Err(e) => AssessmentOutcome::failed(ErrorKind::InvalidInput, e.to_string()),
        };

        logger.log_outcome(&outcome);
        outcome
    }
    .instrument(span)
    .await
}

/// Build the blocking analysis closure for an input.
fn analysis_job(
    input: InputSource,
    assessment: AssessmentType,
    config: CliConfig,
    cancel: CancelFlag,
) -> impl FnOnce() -> EngineResult<AssessmentResult> + Send + 'static {
    move || {
        let session = AssessmentSession::for_assessment(assessment).with_cancel_flag(cancel);
        match input {
            InputSource::Landmarks(path) => session.run(&RecordedLandmarkSource::new(path)),
            InputSource::Video(path) => {
                let estimator = load_estimator(&config)?;
                debug!(estimator = estimator.name(), "Pose estimator ready");
                session.run(&VideoLandmarkSource::new(path, estimator))
            }
        }
    }
}

/// Run `job` on the blocking pool, cancelling it when `timeout` expires.
pub async fn run_with_deadline<F>(job: F, timeout: Duration, cancel: CancelFlag) -> AssessmentOutcome
where
    F: FnOnce() -> EngineResult<AssessmentResult> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(result))) => AssessmentOutcome::Completed(result),
        Ok(Ok(Err(e))) => AssessmentOutcome::Failed {
            error: e.to_descriptor(),
        },
        Ok(Err(join_error)) => AssessmentOutcome::failed(
            ErrorKind::Internal,
            format!("analysis task failed: {join_error}"),
        ),
        Err(_) => {
            cancel.cancel();
            AssessmentOutcome::failed(
                ErrorKind::Timeout,
                format!("analysis exceeded the {}s deadline", timeout.as_secs_f64()),
            )
        }
    }
}

#[cfg(feature = "onnx")]
fn load_estimator(config: &CliConfig) -> EngineResult<Arc<dyn PoseEstimator>> {
    use repcount_engine::MoveNetEstimator;

    let estimator = match &config.pose_model {
        Some(path) => MoveNetEstimator::load(path, config.min_pose_score)?,
        None => MoveNetEstimator::new_default(config.min_pose_score)?,
    };
    Ok(Arc::new(estimator))
}

#[cfg(not(feature = "onnx"))]
fn load_estimator(_config: &CliConfig) -> EngineResult<Arc<dyn PoseEstimator>> {
    Err(repcount_engine::EngineError::pose_estimation(
        "no pose estimator available; rebuild with the `onnx` feature or use `replay`",
    ))
}
