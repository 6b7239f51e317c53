//! Assessment type definitions.
//!
//! The closed set of exercises the engine knows how to count:
//!
//! - `PushUps`: two-pass min/max calibration, shoulder-to-wrist signal
//! - `SitUps`: two-pass min/max calibration, shoulder-to-hip signal
//! - `VerticalJump`: single pass with warm-up baseline, hip height signal
//! - `ShuttleRun`: single pass with warm-up baseline, lateral hip position

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exercise being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentType {
    /// Push-ups counted from the shoulder-to-wrist vertical distance.
    PushUps,

    /// Sit-ups counted from the shoulder-to-hip vertical distance.
    SitUps,

    /// Vertical jumps counted from the hip midpoint height.
    /// Also reports the height of each jump.
    VerticalJump,

    /// Shuttle runs counted from direction reversals combined with a bend.
    ShuttleRun,
}

impl AssessmentType {
    /// All supported assessment types.
    pub const ALL: &'static [AssessmentType] = &[
        AssessmentType::PushUps,
        AssessmentType::SitUps,
        AssessmentType::VerticalJump,
        AssessmentType::ShuttleRun,
    ];

    /// Returns the canonical selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::PushUps => "push-ups",
            AssessmentType::SitUps => "sit-ups",
            AssessmentType::VerticalJump => "vertical-jump",
            AssessmentType::ShuttleRun => "shuttle-run",
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssessmentType {
    type Err = AssessmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "push-ups" | "pushups" | "push-up" | "pushup" => Ok(AssessmentType::PushUps),
            "sit-ups" | "situps" | "sit-up" | "situp" => Ok(AssessmentType::SitUps),
            "vertical-jump" | "verticaljump" | "jump" => Ok(AssessmentType::VerticalJump),
            "shuttle-run" | "shuttlerun" | "shuttle" => Ok(AssessmentType::ShuttleRun),
            _ => Err(AssessmentParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported assessment type: {0}")]
pub struct AssessmentParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_parse() {
        assert_eq!("push-ups".parse::<AssessmentType>().unwrap(), AssessmentType::PushUps);
        assert_eq!("pushups".parse::<AssessmentType>().unwrap(), AssessmentType::PushUps);
        assert_eq!("sit-ups".parse::<AssessmentType>().unwrap(), AssessmentType::SitUps);
        assert_eq!("vertical_jump".parse::<AssessmentType>().unwrap(), AssessmentType::VerticalJump);
        assert_eq!("Shuttle-Run".parse::<AssessmentType>().unwrap(), AssessmentType::ShuttleRun);
        assert!("plank".parse::<AssessmentType>().is_err());
    }

    #[test]
    fn test_assessment_display_roundtrips() {
        for assessment in AssessmentType::ALL {
            assert_eq!(assessment.to_string().parse::<AssessmentType>().unwrap(), *assessment);
        }
    }

    #[test]
    fn test_serde_uses_selector_names() {
        let json = serde_json::to_string(&AssessmentType::VerticalJump).unwrap();
        assert_eq!(json, "\"vertical-jump\"");
        let parsed: AssessmentType = serde_json::from_str("\"shuttle-run\"").unwrap();
        assert_eq!(parsed, AssessmentType::ShuttleRun);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "yoga".parse::<AssessmentType>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported assessment type: yoga");
    }
}
