//! MoveNet single-pose estimator on ONNX Runtime.
//!
//! Expects a MoveNet SinglePose export with an NHWC int32 input of
//! `[1, S, S, 3]` (S = 192 for Lightning, 256 for Thunder) and a
//! `[1, 1, 17, 3]` output of `(y, x, score)` per COCO keypoint.
//!
//! Frames are resized to the square input without padding, so the normalized
//! output coordinates map directly onto the original frame.

use image::imageops::{self, FilterType};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, trace};

use repcount_models::{Landmark, LandmarkId, PoseLandmarks};

use super::PoseEstimator;
use crate::decode::VideoFrame;
use crate::error::{EngineError, EngineResult};

/// Number of COCO keypoints MoveNet predicts.
const KEYPOINTS: usize = 17;

/// Default minimum keypoint score.
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Default input resolution (MoveNet Lightning).
pub const DEFAULT_INPUT_SIZE: u32 = 192;

/// Output tensor name produced by tf2onnx exports.
pub const DEFAULT_OUTPUT_NAME: &str = "output_0";

pub struct MoveNetEstimator {
    session: Mutex<Session>,
    input_size: u32,
    output_name: String,
    min_score: f64,
}

impl MoveNetEstimator {
    /// Load a model from disk with the Lightning input size.
    pub fn load(model_path: &Path, min_score: f64) -> EngineResult<Self> {
        if !model_path.exists() {
            return Err(EngineError::pose_estimation(format!(
                "Pose model not found at {}",
                model_path.display()
            )));
        }

        let model_bytes = std::fs::read(model_path)
            .map_err(|e| EngineError::pose_estimation(format!("ORT read model file: {e}")))?;

        let session = Session::builder()
            .map_err(|e| EngineError::pose_estimation(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EngineError::pose_estimation(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| EngineError::pose_estimation(format!("ORT load model: {e}")))?;

        debug!(
            model = %model_path.display(),
            min_score,
            "Loaded MoveNet pose model"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_size: DEFAULT_INPUT_SIZE,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            min_score,
        })
    }

    /// Use a different square input resolution (256 for Thunder).
    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    /// Read keypoints from a differently named output tensor.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Load from the first existing default location.
    pub fn new_default(min_score: f64) -> EngineResult<Self> {
        let path = find_default_model_path().ok_or_else(|| {
            EngineError::pose_estimation(
                "movenet.onnx not found; set REPCOUNT_POSE_MODEL or place it under models/",
            )
        })?;
        Self::load(&path, min_score)
    }

    fn to_input_tensor(&self, frame: &VideoFrame) -> EngineResult<Value> {
        let size = self.input_size;
        let resized = imageops::resize(&frame.image, size, size, FilterType::Triangle);

        let data: Vec<i32> = resized.into_raw().into_iter().map(i32::from).collect();
        let shape = vec![1usize, size as usize, size as usize, 3];
        Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| EngineError::pose_estimation(format!("ORT tensor: {e}")))
    }
}

impl PoseEstimator for MoveNetEstimator {
    fn estimate(&self, frame: &VideoFrame) -> EngineResult<Option<PoseLandmarks>> {
        let tensor = self.to_input_tensor(frame)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EngineError::pose_estimation("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| EngineError::pose_estimation(format!("ORT run failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            EngineError::pose_estimation(format!("ORT returned no '{}' output", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::pose_estimation(format!("ORT extract: {e}")))?;

        if data.len() < KEYPOINTS * 3 {
            return Err(EngineError::pose_estimation(format!(
                "Unexpected MoveNet output shape: {:?}",
                shape
            )));
        }

        let landmarks = decode_keypoints(&data[..KEYPOINTS * 3], self.min_score);
        trace!(
            frame = frame.index,
            landmarks = landmarks.as_ref().map_or(0, |lm| lm.len()),
            "Pose estimated"
        );
        Ok(landmarks)
    }

    fn name(&self) -> &str {
        "movenet"
    }
}

/// Torso points; at least one must clear `min_score` for the frame to hold a body.
const TORSO_ANCHORS: &[LandmarkId] = &[
    LandmarkId::LeftShoulder,
    LandmarkId::RightShoulder,
    LandmarkId::LeftHip,
    LandmarkId::RightHip,
];

/// Map `(y, x, score)` triples onto landmark ids, dropping low-score points.
/// Returns `None` when no torso keypoint clears `min_score`.
fn decode_keypoints(data: &[f32], min_score: f64) -> Option<PoseLandmarks> {
    let landmarks: Vec<Landmark> = data
        .chunks_exact(3)
        .enumerate()
        .filter_map(|(index, kp)| {
            let id = LandmarkId::from_coco_index(index)?;
            let score = f64::from(kp[2]);
            if score < min_score {
                return None;
            }
            Some(Landmark::new(id, f64::from(kp[1]), f64::from(kp[0]), score))
        })
        .collect();

    let has_torso = landmarks.iter().any(|lm| TORSO_ANCHORS.contains(&lm.id));
    if !has_torso {
        return None;
    }
    Some(PoseLandmarks::new(landmarks))
}

/// Search common locations for the pose model.
fn find_default_model_path() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "./models/movenet.onnx",
        "./models/movenet_singlepose_lightning.onnx",
        "/app/models/movenet.onnx",
    ];

    CANDIDATES
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypoints(score: f32) -> Vec<f32> {
        (0..KEYPOINTS)
            .flat_map(|i| [0.1 * (i % 10) as f32, 0.5, score])
            .collect()
    }

    #[test]
    fn test_low_scores_mean_no_body() {
        assert!(decode_keypoints(&keypoints(0.2), 0.5).is_none());
    }

    #[test]
    fn test_limbs_without_torso_mean_no_body() {
        let mut data = keypoints(0.1);
        // Confident elbows and wrists only
        for index in 7..=10 {
            data[index * 3 + 2] = 0.9;
        }
        assert!(decode_keypoints(&data, 0.5).is_none());

        // One confident hip is enough
        data[11 * 3 + 2] = 0.9;
        let landmarks = decode_keypoints(&data, 0.5).unwrap();
        assert_eq!(landmarks.len(), 5);
        assert!(landmarks.get(LandmarkId::LeftHip).is_some());
    }

    #[test]
    fn test_keypoints_map_to_landmarks() {
        let landmarks = decode_keypoints(&keypoints(0.9), 0.5).unwrap();
        // Eyes and ears are not tracked
        assert_eq!(landmarks.len(), 13);
        let shoulder = landmarks.get(LandmarkId::LeftShoulder).unwrap();
        assert!((shoulder.y - 0.5).abs() < 1e-6);
        assert!((shoulder.x - 0.5).abs() < 1e-6);
        assert!((shoulder.visibility - 0.9).abs() < 1e-6);
    }
}
