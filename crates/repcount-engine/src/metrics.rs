//! Session metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the host
//! installs a recorder.

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Frames read from a landmark stream, by assessment and pass.
    pub const FRAMES_PROCESSED_TOTAL: &str = "repcount_frames_processed_total";

    /// Frames skipped for missing landmarks, by assessment and pass.
    pub const FRAMES_SKIPPED_TOTAL: &str = "repcount_frames_skipped_total";

    /// Repetitions counted, by assessment.
    pub const REPETITIONS_TOTAL: &str = "repcount_repetitions_total";

    /// Finished sessions, by assessment and status.
    pub const SESSIONS_TOTAL: &str = "repcount_sessions_total";

    /// Session wall time in seconds, by assessment.
    pub const SESSION_DURATION_SECONDS: &str = "repcount_session_duration_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record the frame totals of one completed pass.
pub fn record_pass(assessment: &str, pass: &str, processed: u64, skipped: u64) {
    counter!(
        names::FRAMES_PROCESSED_TOTAL,
        "assessment" => assessment.to_string(),
        "pass" => pass.to_string()
    )
    .increment(processed);

    counter!(
        names::FRAMES_SKIPPED_TOTAL,
        "assessment" => assessment.to_string(),
        "pass" => pass.to_string()
    )
    .increment(skipped);
}

/// Record the end of a session.
pub fn record_session(assessment: &str, status: &str, rep_count: u32, duration_secs: f64) {
    counter!(
        names::SESSIONS_TOTAL,
        "assessment" => assessment.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    counter!(
        names::REPETITIONS_TOTAL,
        "assessment" => assessment.to_string()
    )
    .increment(u64::from(rep_count));

    histogram!(
        names::SESSION_DURATION_SECONDS,
        "assessment" => assessment.to_string()
    )
    .record(duration_secs);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_pass("push-ups", "counting", 10, 2);
        record_session("push-ups", "completed", 3, 0.5);
    }
}
