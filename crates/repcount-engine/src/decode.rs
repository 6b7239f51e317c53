//! FFmpeg-backed frame decoding.
//!
//! Frames are decoded to packed RGB24 and streamed through a pipe one at a
//! time, so memory use stays at a single frame regardless of video length.

use image::RgbImage;
use serde::Deserialize;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// Video stream information needed for decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Lines of FFmpeg stderr kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Probe a video file for its dimensions and frame rate.
pub fn probe_video(path: impl AsRef<Path>) -> EngineResult<VideoInfo> {
    probe_with(OsStr::new("ffprobe"), path.as_ref())
}

fn probe_with(ffprobe: &OsStr, path: &Path) -> EngineResult<VideoInfo> {
    if !path.exists() {
        return Err(EngineError::source_unreadable(path, "file not found"));
    }

    which::which(ffprobe).map_err(|_| EngineError::FfprobeNotFound)?;

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        return Err(EngineError::source_unreadable(
            path,
            format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    parse_video_stream(path, &probe)
}

fn parse_video_stream(path: &Path, probe: &FfprobeOutput) -> EngineResult<VideoInfo> {
    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| EngineError::source_unreadable(path, "no video stream found"))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(EngineError::source_unreadable(
                path,
                "video stream has no dimensions",
            ))
        }
    };

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(30.0);

    Ok(VideoInfo { width, height, fps })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

/// One decoded frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Zero-based index in decode order
    pub index: u64,
    /// Packed RGB pixels
    pub image: RgbImage,
}

impl VideoFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Streams RGB24 frames out of an FFmpeg child process.
///
/// Stderr is drained on a helper thread that keeps the last few lines, so a
/// noisy decoder can never stall on a full pipe. The child is killed and
/// reaped when the reader is dropped, so an early return never leaves a
/// decoder running.
pub struct FfmpegFrameReader {
    path: PathBuf,
    info: VideoInfo,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_tail: Option<JoinHandle<String>>,
    frame_bytes: usize,
    next_index: u64,
    finished: bool,
}

impl FfmpegFrameReader {
    /// Probe `path` and start decoding it.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        Self::open_with(path.as_ref(), OsStr::new("ffprobe"), OsStr::new("ffmpeg"))
    }

    fn open_with(path: &Path, ffprobe: &OsStr, ffmpeg: &OsStr) -> EngineResult<Self> {
        let path = path.to_path_buf();
        let info = probe_with(ffprobe, &path)?;

        which::which(ffmpeg).map_err(|_| EngineError::FfmpegNotFound)?;

        let mut child = Command::new(ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-i"])
            .arg(&path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EngineError::source_unreadable(&path, format!("failed to spawn ffmpeg: {e}"))
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                reap(&mut child);
                return Err(EngineError::source_unreadable(
                    &path,
                    "failed to capture ffmpeg output",
                ));
            }
        };

        let stderr_tail = match drain_stderr(stderr) {
            Ok(handle) => handle,
            Err(e) => {
                reap(&mut child);
                return Err(e.into());
            }
        };

        let frame_bytes = info.width as usize * info.height as usize * 3;

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Started frame decoder"
        );

        Ok(Self {
            path,
            info,
            child,
            stdout: BufReader::with_capacity(frame_bytes, stdout),
            stderr_tail: Some(stderr_tail),
            frame_bytes,
            next_index: 0,
            finished: false,
        })
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    /// Read the next frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> EngineResult<Option<VideoFrame>> {
        if self.finished {
            return Ok(None);
        }

        let mut buffer = vec![0u8; self.frame_bytes];
        let filled = read_full(&mut self.stdout, &mut buffer)?;

        if filled < self.frame_bytes {
            self.finished = true;
            if filled > 0 {
                warn!(
                    path = %self.path.display(),
                    bytes = filled,
                    "Discarding truncated trailing frame"
                );
            }
            self.finish_child()?;
            return Ok(None);
        }

        let image = RgbImage::from_raw(self.info.width, self.info.height, buffer)
            .ok_or_else(|| EngineError::internal("frame buffer size mismatch"))?;

        let frame = VideoFrame {
            index: self.next_index,
            image,
        };
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn finish_child(&mut self) -> EngineResult<()> {
        let status = self.child.wait()?;
        let stderr = self
            .stderr_tail
            .take()
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default();

        if status.success() {
            if !stderr.is_empty() {
                debug!(path = %self.path.display(), stderr = %stderr, "FFmpeg reported errors");
            }
            return Ok(());
        }

        if self.next_index == 0 {
            return Err(EngineError::source_unreadable(
                &self.path,
                format!("ffmpeg could not decode the video: {}", stderr.trim()),
            ));
        }

        warn!(
            path = %self.path.display(),
            code = ?status.code(),
            frames = self.next_index,
            stderr = %stderr,
            "FFmpeg exited with an error after decoding frames"
        );
        Ok(())
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        if !self.finished {
            reap(&mut self.child);
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Read `stderr` to EOF on a helper thread, returning its last lines.
fn drain_stderr(stderr: ChildStderr) -> std::io::Result<JoinHandle<String>> {
    thread::Builder::new()
        .name("ffmpeg-stderr".to_string())
        .spawn(move || {
            let mut reader = BufReader::new(stderr);
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut line = Vec::new();

            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&line).trim_end().to_string();
                        if text.is_empty() {
                            continue;
                        }
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(text);
                    }
                }
            }

            Vec::from(tail).join("\n")
        })
}

/// Fill `buf` from `reader`, returning the number of bytes read before EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> EngineResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
