//! Per-assessment signal extraction.
//!
//! Each assessment reduces one frame's landmarks to a scalar motion signal in
//! pixel units. Shuttle runs also produce a secondary "bend" signal.
//!
//! | Assessment | Primary | Secondary |
//! |---|---|---|
//! | Push-ups | `(wrist.y - shoulder.y) * h` on the more visible side | - |
//! | Sit-ups | `(hip.y - shoulder.y) * h` on the more visible side | - |
//! | Vertical jump | hip midpoint y | - |
//! | Shuttle run | hip midpoint x | lowest wrist y minus hip midpoint y |

use repcount_models::{AssessmentType, BodySide, LandmarkFrame, LandmarkId};

use crate::error::{EngineError, EngineResult};

/// Signal values derived from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSample {
    /// Frame index the sample came from
    pub frame_index: u64,
    /// Primary motion signal in pixels
    pub primary: f64,
    /// Secondary signal in pixels (shuttle run only)
    pub secondary: Option<f64>,
}

/// Maps a landmark frame to a motion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalExtractor {
    ShoulderWrist,
    ShoulderHip,
    HipHeight,
    HipLateralWithBend,
}

impl SignalExtractor {
    /// Extractor used by an assessment type.
    pub fn for_assessment(assessment: AssessmentType) -> Self {
        match assessment {
            AssessmentType::PushUps => SignalExtractor::ShoulderWrist,
            AssessmentType::SitUps => SignalExtractor::ShoulderHip,
            AssessmentType::VerticalJump => SignalExtractor::HipHeight,
            AssessmentType::ShuttleRun => SignalExtractor::HipLateralWithBend,
        }
    }

    /// Extract the signal, or `InsufficientLandmarks` if the frame cannot
    /// produce one. Frames without a detected body report every required
    /// landmark as missing.
    pub fn extract(&self, frame: &LandmarkFrame) -> EngineResult<SignalSample> {
        let h = frame.height;
        let w = frame.width;

        match self {
            SignalExtractor::ShoulderWrist => {
                let side = select_side(frame, BodySide::shoulder, BodySide::wrist)?;
                let shoulder = require(frame, side.shoulder())?;
                let wrist = require(frame, side.wrist())?;
                Ok(sample(frame, wrist.y_px(h) - shoulder.y_px(h), None))
            }
            SignalExtractor::ShoulderHip => {
                let side = select_side(frame, BodySide::shoulder, BodySide::hip)?;
                let shoulder = require(frame, side.shoulder())?;
                let hip = require(frame, side.hip())?;
                Ok(sample(frame, hip.y_px(h) - shoulder.y_px(h), None))
            }
            SignalExtractor::HipHeight => {
                let (left, right) = both(frame, LandmarkId::LeftHip, LandmarkId::RightHip)?;
                let hip_cy = (left.y + right.y) / 2.0 * h as f64;
                Ok(sample(frame, hip_cy, None))
            }
            SignalExtractor::HipLateralWithBend => {
                let missing: Vec<LandmarkId> = [
                    LandmarkId::LeftHip,
                    LandmarkId::RightHip,
                    LandmarkId::LeftWrist,
                    LandmarkId::RightWrist,
                ]
                .into_iter()
                .filter(|id| frame.landmark(*id).is_none())
                .collect();
                if !missing.is_empty() {
                    return Err(insufficient(frame, missing));
                }

                let (left_hip, right_hip) =
                    both(frame, LandmarkId::LeftHip, LandmarkId::RightHip)?;
                let (left_wrist, right_wrist) =
                    both(frame, LandmarkId::LeftWrist, LandmarkId::RightWrist)?;

                let hip_cx = (left_hip.x + right_hip.x) / 2.0 * w as f64;
                let hip_cy = (left_hip.y + right_hip.y) / 2.0 * h as f64;
                let hand_y = left_wrist.y_px(h).max(right_wrist.y_px(h));
                Ok(sample(frame, hip_cx, Some(hand_y - hip_cy)))
            }
        }
    }
}

/// Pick the side whose two landmarks have the greater summed visibility.
/// Ties go to the right side; a side with a missing landmark is never chosen.
fn select_side(
    frame: &LandmarkFrame,
    first: fn(&BodySide) -> LandmarkId,
    second: fn(&BodySide) -> LandmarkId,
) -> EngineResult<BodySide> {
    let side_visibility = |side: BodySide| -> Option<f64> {
        let a = frame.landmark(first(&side))?;
        let b = frame.landmark(second(&side))?;
        Some(a.visibility + b.visibility)
    };

    match (side_visibility(BodySide::Left), side_visibility(BodySide::Right)) {
        (Some(lv), Some(rv)) => Ok(if rv >= lv {
            BodySide::Right
        } else {
            BodySide::Left
        }),
        (None, Some(_)) => Ok(BodySide::Right),
        (Some(_), None) => Ok(BodySide::Left),
        (None, None) => {
            let missing = [BodySide::Left, BodySide::Right]
                .iter()
                .flat_map(|side| [first(side), second(side)])
                .filter(|id| frame.landmark(*id).is_none())
                .collect();
            Err(insufficient(frame, missing))
        }
    }
}

fn require(
    frame: &LandmarkFrame,
    id: LandmarkId,
) -> EngineResult<&repcount_models::Landmark> {
    frame
        .landmark(id)
        .ok_or_else(|| insufficient(frame, vec![id]))
}

fn both(
    frame: &LandmarkFrame,
    a: LandmarkId,
    b: LandmarkId,
) -> EngineResult<(&repcount_models::Landmark, &repcount_models::Landmark)> {
    match (frame.landmark(a), frame.landmark(b)) {
        (Some(la), Some(lb)) => Ok((la, lb)),
        (la, lb) => {
            let mut missing = Vec::new();
            if la.is_none() {
                missing.push(a);
            }
            if lb.is_none() {
                missing.push(b);
            }
            Err(insufficient(frame, missing))
        }
    }
}

fn insufficient(frame: &LandmarkFrame, missing: Vec<LandmarkId>) -> EngineError {
    EngineError::InsufficientLandmarks {
        frame_index: frame.index,
        missing,
    }
}

fn sample(frame: &LandmarkFrame, primary: f64, secondary: Option<f64>) -> SignalSample {
    SignalSample {
        frame_index: frame.index,
        primary,
        secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_models::{Landmark, PoseLandmarks};

    fn frame(landmarks: Vec<Landmark>) -> LandmarkFrame {
        LandmarkFrame::new(7, 640, 480, PoseLandmarks::new(landmarks))
    }

    fn lm(id: LandmarkId, x: f64, y: f64, visibility: f64) -> Landmark {
        Landmark::new(id, x, y, visibility)
    }

    #[test]
    fn test_pushup_prefers_more_visible_side() {
        let f = frame(vec![
            lm(LandmarkId::LeftShoulder, 0.4, 0.2, 0.9),
            lm(LandmarkId::LeftWrist, 0.4, 0.5, 0.9),
            lm(LandmarkId::RightShoulder, 0.6, 0.2, 0.3),
            lm(LandmarkId::RightWrist, 0.6, 0.7, 0.3),
        ]);
        let s = SignalExtractor::ShoulderWrist.extract(&f).unwrap();
        // Left side: (0.5 - 0.2) * 480
        assert!((s.primary - 144.0).abs() < 1e-9);
        assert_eq!(s.frame_index, 7);
        assert_eq!(s.secondary, None);
    }

    #[test]
    fn test_side_tie_goes_right() {
        let f = frame(vec![
            lm(LandmarkId::LeftShoulder, 0.4, 0.2, 0.5),
            lm(LandmarkId::LeftWrist, 0.4, 0.5, 0.5),
            lm(LandmarkId::RightShoulder, 0.6, 0.2, 0.5),
            lm(LandmarkId::RightWrist, 0.6, 0.7, 0.5),
        ]);
        let s = SignalExtractor::ShoulderWrist.extract(&f).unwrap();
        assert!((s.primary - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_side_never_selected() {
        let f = frame(vec![
            lm(LandmarkId::LeftShoulder, 0.4, 0.2, 0.2),
            lm(LandmarkId::LeftWrist, 0.4, 0.3, 0.2),
            lm(LandmarkId::RightShoulder, 0.6, 0.2, 1.0),
        ]);
        let s = SignalExtractor::ShoulderWrist.extract(&f).unwrap();
        assert!((s.primary - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_situp_sign_convention() {
        let f = frame(vec![
            lm(LandmarkId::RightShoulder, 0.5, 0.3, 0.9),
            lm(LandmarkId::RightHip, 0.5, 0.6, 0.9),
        ]);
        let s = SignalExtractor::ShoulderHip.extract(&f).unwrap();
        assert!((s.primary - 144.0).abs() < 1e-9);
    }

    #[test]
    fn test_jump_uses_hip_midpoint() {
        let f = frame(vec![
            lm(LandmarkId::LeftHip, 0.45, 0.5, 0.9),
            lm(LandmarkId::RightHip, 0.55, 0.6, 0.9),
        ]);
        let s = SignalExtractor::HipHeight.extract(&f).unwrap();
        assert!((s.primary - 264.0).abs() < 1e-9);
    }

    #[test]
    fn test_jump_requires_both_hips() {
        let f = frame(vec![lm(LandmarkId::LeftHip, 0.45, 0.5, 0.9)]);
        match SignalExtractor::HipHeight.extract(&f) {
            Err(EngineError::InsufficientLandmarks { missing, .. }) => {
                assert_eq!(missing, vec![LandmarkId::RightHip]);
            }
            other => panic!("expected insufficient landmarks, got {other:?}"),
        }
    }

    #[test]
    fn test_shuttle_signals() {
        let f = frame(vec![
            lm(LandmarkId::LeftHip, 0.4, 0.5, 0.9),
            lm(LandmarkId::RightHip, 0.6, 0.5, 0.9),
            lm(LandmarkId::LeftWrist, 0.3, 0.55, 0.9),
            lm(LandmarkId::RightWrist, 0.7, 0.75, 0.9),
        ]);
        let s = SignalExtractor::HipLateralWithBend.extract(&f).unwrap();
        assert!((s.primary - 320.0).abs() < 1e-9);
        // Lower wrist (0.75 * 480 = 360) relative to hip center (240)
        assert!((s.secondary.unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_without_pose_is_insufficient() {
        let f = LandmarkFrame::without_pose(0, 640, 480);
        for assessment in AssessmentType::ALL {
            let result = SignalExtractor::for_assessment(*assessment).extract(&f);
            assert!(matches!(result, Err(EngineError::InsufficientLandmarks { .. })));
        }
    }
}
