//! Synthetic landmark frames for scenario tests.

#![allow(dead_code)]

use repcount_engine::InMemoryLandmarkSource;
use repcount_models::{Landmark, LandmarkFrame, LandmarkId, PoseLandmarks};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

fn lm(id: LandmarkId, x: f64, y: f64) -> Landmark {
    Landmark::new(id, x, y, 0.9)
}

/// Right side fully visible, left side faint.
fn side_pair(
    index: u64,
    upper: (LandmarkId, LandmarkId),
    lower: (LandmarkId, LandmarkId),
    distance_px: f64,
) -> LandmarkFrame {
    let top = 0.2;
    let bottom = top + distance_px / f64::from(HEIGHT);
    LandmarkFrame::new(
        index,
        WIDTH,
        HEIGHT,
        PoseLandmarks::new(vec![
            Landmark::new(upper.0, 0.4, top, 0.3),
            Landmark::new(lower.0, 0.4, bottom, 0.3),
            lm(upper.1, 0.6, top),
            lm(lower.1, 0.6, bottom),
        ]),
    )
}

/// Push-up frame whose shoulder-to-wrist distance is `distance_px`.
pub fn pushup_frame(index: u64, distance_px: f64) -> LandmarkFrame {
    side_pair(
        index,
        (LandmarkId::LeftShoulder, LandmarkId::RightShoulder),
        (LandmarkId::LeftWrist, LandmarkId::RightWrist),
        distance_px,
    )
}

/// Sit-up frame whose shoulder-to-hip distance is `distance_px`.
pub fn situp_frame(index: u64, distance_px: f64) -> LandmarkFrame {
    side_pair(
        index,
        (LandmarkId::LeftShoulder, LandmarkId::RightShoulder),
        (LandmarkId::LeftHip, LandmarkId::RightHip),
        distance_px,
    )
}

/// Jump frame with both hips at normalized height `hip_y`.
pub fn jump_frame(index: u64, height: u32, hip_y: f64) -> LandmarkFrame {
    LandmarkFrame::new(
        index,
        WIDTH,
        height,
        PoseLandmarks::new(vec![
            lm(LandmarkId::LeftHip, 0.45, hip_y),
            lm(LandmarkId::RightHip, 0.55, hip_y),
        ]),
    )
}

/// Shuttle frame with the hip center at `hip_x_px` and both wrists `hand_rel_px`
/// below the hip center.
pub fn shuttle_frame(index: u64, hip_x_px: f64, hand_rel_px: f64) -> LandmarkFrame {
    let hip_x = hip_x_px / f64::from(WIDTH);
    let hip_y = 0.5;
    let wrist_y = hip_y + hand_rel_px / f64::from(HEIGHT);
    LandmarkFrame::new(
        index,
        WIDTH,
        HEIGHT,
        PoseLandmarks::new(vec![
            lm(LandmarkId::LeftHip, hip_x - 0.05, hip_y),
            lm(LandmarkId::RightHip, hip_x + 0.05, hip_y),
            lm(LandmarkId::LeftWrist, hip_x - 0.1, wrist_y),
            lm(LandmarkId::RightWrist, hip_x + 0.1, wrist_y),
        ]),
    )
}

/// Build a source from per-frame values, numbering frames in order.
pub fn source_from<F>(values: &[f64], make: F) -> InMemoryLandmarkSource
where
    F: Fn(u64, f64) -> LandmarkFrame,
{
    values
        .iter()
        .enumerate()
        .map(|(i, v)| make(i as u64, *v))
        .collect()
}

/// `count` copies of `value`.
pub fn plateau(value: f64, count: usize) -> Vec<f64> {
    vec![value; count]
}

/// Frames without any detected body.
pub fn empty_source(frames: u64) -> InMemoryLandmarkSource {
    (0..frames)
        .map(|i| LandmarkFrame::without_pose(i, WIDTH, HEIGHT))
        .collect()
}
