use repcount_models::LandmarkFrame;

use super::{LandmarkSource, LandmarkStream};
use crate::error::EngineResult;

/// Frames held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLandmarkSource {
    frames: Vec<LandmarkFrame>,
}

impl InMemoryLandmarkSource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[LandmarkFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<LandmarkFrame> for InMemoryLandmarkSource {
    fn from_iter<I: IntoIterator<Item = LandmarkFrame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

struct MemoryStream<'a> {
    frames: std::slice::Iter<'a, LandmarkFrame>,
}

impl LandmarkStream for MemoryStream<'_> {
    fn next_frame(&mut self) -> EngineResult<Option<LandmarkFrame>> {
        Ok(self.frames.next().cloned())
    }
}

impl LandmarkSource for InMemoryLandmarkSource {
    fn describe(&self) -> String {
        format!("memory:{} frames", self.frames.len())
    }

    fn open(&self) -> EngineResult<Box<dyn LandmarkStream + '_>> {
        Ok(Box::new(MemoryStream {
            frames: self.frames.iter(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_open_replays_from_start() {
        let source: InMemoryLandmarkSource = (0..3)
            .map(|i| LandmarkFrame::without_pose(i, 64, 48))
            .collect();

        for _ in 0..2 {
            let mut stream = source.open().unwrap();
            let mut indices = Vec::new();
            while let Some(frame) = stream.next_frame().unwrap() {
                indices.push(frame.index);
            }
            assert_eq!(indices, vec![0, 1, 2]);
        }
    }
}
