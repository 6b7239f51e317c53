//! Pose landmark models.
//!
//! Landmarks are produced by an external pose estimator once per decoded frame.
//! Positions are normalized to the frame (x and y in `[0, 1]`), so consumers
//! convert them to pixels with the frame dimensions carried by [`LandmarkFrame`].

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Named anatomical point.
///
/// Only the body points the assessments read are modelled; estimators drop
/// everything else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkId {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl LandmarkId {
    /// All modelled landmarks.
    pub const ALL: &'static [LandmarkId] = &[
        LandmarkId::Nose,
        LandmarkId::LeftShoulder,
        LandmarkId::RightShoulder,
        LandmarkId::LeftElbow,
        LandmarkId::RightElbow,
        LandmarkId::LeftWrist,
        LandmarkId::RightWrist,
        LandmarkId::LeftHip,
        LandmarkId::RightHip,
        LandmarkId::LeftKnee,
        LandmarkId::RightKnee,
        LandmarkId::LeftAnkle,
        LandmarkId::RightAnkle,
    ];

    /// Returns the landmark name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkId::Nose => "nose",
            LandmarkId::LeftShoulder => "left_shoulder",
            LandmarkId::RightShoulder => "right_shoulder",
            LandmarkId::LeftElbow => "left_elbow",
            LandmarkId::RightElbow => "right_elbow",
            LandmarkId::LeftWrist => "left_wrist",
            LandmarkId::RightWrist => "right_wrist",
            LandmarkId::LeftHip => "left_hip",
            LandmarkId::RightHip => "right_hip",
            LandmarkId::LeftKnee => "left_knee",
            LandmarkId::RightKnee => "right_knee",
            LandmarkId::LeftAnkle => "left_ankle",
            LandmarkId::RightAnkle => "right_ankle",
        }
    }

    /// Index in the 17-point COCO keypoint topology (MoveNet, YOLO-pose).
    pub fn coco_index(&self) -> usize {
        match self {
            LandmarkId::Nose => 0,
            LandmarkId::LeftShoulder => 5,
            LandmarkId::RightShoulder => 6,
            LandmarkId::LeftElbow => 7,
            LandmarkId::RightElbow => 8,
            LandmarkId::LeftWrist => 9,
            LandmarkId::RightWrist => 10,
            LandmarkId::LeftHip => 11,
            LandmarkId::RightHip => 12,
            LandmarkId::LeftKnee => 13,
            LandmarkId::RightKnee => 14,
            LandmarkId::LeftAnkle => 15,
            LandmarkId::RightAnkle => 16,
        }
    }

    /// Map a COCO keypoint index back to a modelled landmark.
    pub fn from_coco_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.coco_index() == index)
    }
}

/// Left or right side of the body, from the subject's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    pub fn shoulder(&self) -> LandmarkId {
        match self {
            BodySide::Left => LandmarkId::LeftShoulder,
            BodySide::Right => LandmarkId::RightShoulder,
        }
    }

    pub fn wrist(&self) -> LandmarkId {
        match self {
            BodySide::Left => LandmarkId::LeftWrist,
            BodySide::Right => LandmarkId::RightWrist,
        }
    }

    pub fn hip(&self) -> LandmarkId {
        match self {
            BodySide::Left => LandmarkId::LeftHip,
            BodySide::Right => LandmarkId::RightHip,
        }
    }
}

/// A single detected landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Landmark {
    /// Anatomical point
    pub id: LandmarkId,
    /// Horizontal position normalized to frame width
    pub x: f64,
    /// Vertical position normalized to frame height (0 = top)
    pub y: f64,
    /// Visibility / confidence score (0.0-1.0)
    #[serde(
        default = "default_visibility",
        deserialize_with = "deserialize_visibility"
    )]
    #[schemars(with = "f64")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

/// Recorded scores outside `[0, 1]` are clamped like [`Landmark::new`] does.
fn deserialize_visibility<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(|v| v.clamp(0.0, 1.0))
}

impl Landmark {
    /// Create a landmark, clamping visibility into `[0, 1]`.
    pub fn new(id: LandmarkId, x: f64, y: f64, visibility: f64) -> Self {
        Self {
            id,
            x,
            y,
            visibility: visibility.clamp(0.0, 1.0),
        }
    }

    /// Horizontal position in pixels.
    pub fn x_px(&self, frame_width: u32) -> f64 {
        self.x * frame_width as f64
    }

    /// Vertical position in pixels.
    pub fn y_px(&self, frame_height: u32) -> f64 {
        self.y * frame_height as f64
    }
}

/// Landmarks detected for the single tracked body in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PoseLandmarks {
    landmarks: Vec<Landmark>,
}

impl PoseLandmarks {
    /// Create from a list of landmarks. Later duplicates of an id are ignored.
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        let mut deduped: Vec<Landmark> = Vec::with_capacity(landmarks.len());
        for lm in landmarks {
            if !deduped.iter().any(|existing| existing.id == lm.id) {
                deduped.push(lm);
            }
        }
        Self { landmarks: deduped }
    }

    /// Look up a landmark by id.
    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.iter().find(|lm| lm.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl FromIterator<Landmark> for PoseLandmarks {
    fn from_iter<T: IntoIterator<Item = Landmark>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Landmark detection output for one decoded frame.
///
/// `landmarks` is `None` when the estimator found no body in the frame, which
/// is a normal outcome and makes the frame a skipped frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LandmarkFrame {
    /// Zero-based frame index in decode order
    pub index: u64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Detected landmarks, if a body was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<PoseLandmarks>,
}

impl LandmarkFrame {
    /// Create a frame with detected landmarks.
    pub fn new(index: u64, width: u32, height: u32, landmarks: PoseLandmarks) -> Self {
        Self {
            index,
            width,
            height,
            landmarks: Some(landmarks),
        }
    }

    /// Create a frame in which no body was detected.
    pub fn without_pose(index: u64, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            landmarks: None,
        }
    }

    /// Returns true if the estimator found a body in this frame.
    pub fn has_pose(&self) -> bool {
        self.landmarks.as_ref().is_some_and(|lm| !lm.is_empty())
    }

    /// Look up a landmark by id.
    pub fn landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.as_ref().and_then(|lm| lm.get(id))
    }
}
