//! Landmark sources.
//!
//! A [`LandmarkSource`] can be opened any number of times; each call to
//! [`LandmarkSource::open`] yields an independent [`LandmarkStream`] that
//! replays the source from the first frame. Two-pass assessments open the
//! source twice.

mod memory;
mod recorded;
mod video;

pub use memory::InMemoryLandmarkSource;
pub use recorded::RecordedLandmarkSource;
pub use video::VideoLandmarkSource;

use repcount_models::LandmarkFrame;

use crate::error::EngineResult;

/// Frames in decode order for one pass. Dropping the stream releases the
/// underlying handle.
pub trait LandmarkStream {
    /// The next frame, or `None` once the source is drained.
    fn next_frame(&mut self) -> EngineResult<Option<LandmarkFrame>>;
}

/// A replayable producer of landmark frames.
pub trait LandmarkSource {
    /// Human-readable description for logs (usually a path).
    fn describe(&self) -> String;

    /// Open a fresh stream positioned at the first frame.
    fn open(&self) -> EngineResult<Box<dyn LandmarkStream + '_>>;
}
