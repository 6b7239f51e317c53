//! Logging setup and structured run logging.
//!
//! All log output goes to stderr; stdout carries only the result document.

use tracing::{info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repcount_models::AssessmentOutcome;

use crate::config::LogFormat;

/// Install the global tracing subscriber.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("repcount_engine=info".parse()?)
        .add_directive("repcount_cli=info".parse()?)
        .add_directive("ort=warn".parse()?);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()?,
    }

    Ok(())
}

/// Run logger for structured logging with consistent fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    assessment: String,
    input: String,
}

impl RunLogger {
    /// Create a logger for one invocation.
    ///
    /// # Arguments
    /// * `assessment` - Assessment selector as given on the command line
    /// * `input` - Video or recording path
    pub fn new(assessment: &str, input: &str) -> Self {
        Self {
            assessment: assessment.to_string(),
            input: input.to_string(),
        }
    }

    /// Log the start of an analysis.
    pub fn log_start(&self, timeout_secs: u64) {
        info!(
            assessment = %self.assessment,
            input = %self.input,
            timeout_secs,
            "Analysis started"
        );
    }

    /// Log the final outcome.
    pub fn log_outcome(&self, outcome: &AssessmentOutcome) {
        match outcome {
            AssessmentOutcome::Completed(result) => info!(
                assessment = %self.assessment,
                input = %self.input,
                rep_count = result.rep_count,
                "Analysis finished"
            ),
            AssessmentOutcome::Failed { error } => warn!(
                assessment = %self.assessment,
                input = %self.input,
                kind = %error.kind,
                "Analysis failed: {}", error.message
            ),
        }
    }

    pub fn assessment(&self) -> &str {
        &self.assessment
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            assessment = %self.assessment,
            input = %self.input
        )
    }
}
