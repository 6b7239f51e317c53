use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use repcount_models::LandmarkFrame;

use super::{LandmarkSource, LandmarkStream};
use crate::error::{EngineError, EngineResult};

/// Landmark frames recorded as JSON Lines, one [`LandmarkFrame`] per line.
///
/// Blank lines are ignored. A line that does not parse makes the whole source
/// unreadable.
#[derive(Debug, Clone)]
pub struct RecordedLandmarkSource {
    path: PathBuf,
}

impl RecordedLandmarkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write frames in the format this source reads.
    pub fn write_frames<'a>(
        path: impl AsRef<Path>,
        frames: impl IntoIterator<Item = &'a LandmarkFrame>,
    ) -> EngineResult<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| EngineError::source_unreadable(path, format!("cannot create: {e}")))?;
        let mut writer = BufWriter::new(file);
        for frame in frames {
            serde_json::to_writer(&mut writer, frame)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

struct RecordedStream<'a> {
    path: &'a Path,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl LandmarkStream for RecordedStream<'_> {
    fn next_frame(&mut self) -> EngineResult<Option<LandmarkFrame>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.map_err(|e| {
                EngineError::source_unreadable(
                    self.path,
                    format!("read error at line {}: {e}", self.line_number),
                )
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let frame = serde_json::from_str::<LandmarkFrame>(&line).map_err(|e| {
                EngineError::source_unreadable(
                    self.path,
                    format!("malformed frame at line {}: {e}", self.line_number),
                )
            })?;
            return Ok(Some(frame));
        }
        Ok(None)
    }
}

impl LandmarkSource for RecordedLandmarkSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> EngineResult<Box<dyn LandmarkStream + '_>> {
        let file = File::open(&self.path)
            .map_err(|e| EngineError::source_unreadable(&self.path, e.to_string()))?;

        Ok(Box::new(RecordedStream {
            path: &self.path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
        }))
    }
}
