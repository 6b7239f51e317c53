use std::path::{Path, PathBuf};
use std::sync::Arc;

use repcount_models::LandmarkFrame;

use super::{LandmarkSource, LandmarkStream};
use crate::decode::FfmpegFrameReader;
use crate::error::EngineResult;
use crate::pose::PoseEstimator;

/// A video file decoded with FFmpeg, with landmarks from a [`PoseEstimator`].
pub struct VideoLandmarkSource {
    path: PathBuf,
    estimator: Arc<dyn PoseEstimator>,
}

impl VideoLandmarkSource {
    pub fn new(path: impl Into<PathBuf>, estimator: Arc<dyn PoseEstimator>) -> Self {
        Self {
            path: path.into(),
            estimator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct VideoStream<'a> {
    reader: FfmpegFrameReader,
    estimator: &'a dyn PoseEstimator,
}

impl LandmarkStream for VideoStream<'_> {
    fn next_frame(&mut self) -> EngineResult<Option<LandmarkFrame>> {
        let Some(frame) = self.reader.next_frame()? else {
            return Ok(None);
        };

        let landmarks = self.estimator.estimate(&frame)?;
        Ok(Some(LandmarkFrame {
            index: frame.index,
            width: frame.width(),
            height: frame.height(),
            landmarks,
        }))
    }
}

impl LandmarkSource for VideoLandmarkSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> EngineResult<Box<dyn LandmarkStream + '_>> {
        let reader = FfmpegFrameReader::open(&self.path)?;
        Ok(Box::new(VideoStream {
            reader,
            estimator: self.estimator.as_ref(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::VideoFrame;
    use crate::error::EngineError;
    use repcount_models::PoseLandmarks;

    struct NoBody;

    impl PoseEstimator for NoBody {
        fn estimate(&self, _frame: &VideoFrame) -> EngineResult<Option<PoseLandmarks>> {
            Ok(None)
        }

        fn name(&self) -> &str {
            "no-body"
        }
    }

    #[test]
    fn test_missing_video_is_unreadable() {
        let source = VideoLandmarkSource::new("/nonexistent/clip.mp4", Arc::new(NoBody));
        assert!(matches!(
            source.open().err(),
            Some(EngineError::SourceUnreadable { .. })
        ));
    }
}
