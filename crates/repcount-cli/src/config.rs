//! Runtime configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        })
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Deadline for one analysis
    pub timeout: Duration,
    /// ONNX pose model path; default locations are searched when unset
    pub pose_model: Option<PathBuf>,
    /// Minimum keypoint score kept by the pose estimator
    pub min_pose_score: f64,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            pose_model: None,
            min_pose_score: 0.5,
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            timeout: lookup("REPCOUNT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            pose_model: lookup("REPCOUNT_POSE_MODEL")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            min_pose_score: lookup("REPCOUNT_MIN_POSE_SCORE")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| (0.0..=1.0).contains(v))
                .unwrap_or(defaults.min_pose_score),
            log_format: lookup("LOG_FORMAT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Override the deadline.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}
