//! Decoder adapter: runs an external decoder and serves its PCM output.
//!
//! The whole file is decoded up front into memory as signed 16-bit
//! little-endian stereo. Seeking is then plain index arithmetic.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::DecodeError;

use super::frames::{Frame, FrameSource};

/// Bytes per stereo frame: 2 channels x 2 bytes.
const FRAME_BYTES: usize = 4;

/// Invokes an external decoder (ffmpeg-compatible CLI) to produce raw PCM.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: String,
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Decode `path` to stereo s16le at `sample_rate`.
    ///
    /// The executable is located before anything is spawned so a missing
    /// decoder is reported as [`DecodeError::DependencyMissing`] rather than
    /// as a decode failure.
    pub fn decode(&self, path: &Path, sample_rate: u32) -> Result<PcmStream, DecodeError> {
        let Some(exe) = find_executable(&self.program) else {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_else(|| "these".to_string());
            warn!(program = %self.program, %ext, "decoder not found on PATH");
            return Err(DecodeError::DependencyMissing {
                program: self.program.clone(),
                ext,
            });
        };

        let started = Instant::now();
        let output = Command::new(&exe)
            .arg("-i")
            .arg(path)
            .args(["-f", "s16le", "-acodec", "pcm_s16le"])
            .arg("-ar")
            .arg(sample_rate.to_string())
            .args(["-ac", "2", "-loglevel", "error", "pipe:1"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DecodeError::DecodeFailed(format!("{}: {e}", exe.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(DecodeError::DecodeFailed(if detail.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                detail.to_string()
            }));
        }

        let stream = PcmStream::from_bytes(output.stdout);
        if stream.is_empty() {
            return Err(DecodeError::DecodeFailed(format!(
                "{} produced no audio for {}",
                self.program,
                path.display()
            )));
        }

        debug!(
            path = %path.display(),
            frames = stream.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decoded track"
        );
        Ok(stream)
    }
}

/// Locate `program` the way a shell would: as a path when it contains a
/// separator, otherwise by scanning `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = full.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

/// In-memory s16le stereo PCM with a frame cursor.
#[derive(Debug, Default)]
pub struct PcmStream {
    data: Vec<u8>,
    pos: usize,
}

impl PcmStream {
    /// Wrap raw s16le stereo bytes. A trailing partial frame is dropped.
    pub fn from_bytes(mut data: Vec<u8>) -> Self {
        let whole = data.len() - data.len() % FRAME_BYTES;
        data.truncate(whole);
        Self { data, pos: 0 }
    }

    /// Length in frames.
    pub fn len(&self) -> usize {
        self.data.len() / FRAME_BYTES
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current frame index.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to `frame`; `len()` itself is a valid (end) position.
    pub fn seek(&mut self, frame: usize) -> Result<(), DecodeError> {
        let len = self.len();
        if frame > len {
            return Err(DecodeError::OutOfRange { pos: frame, len });
        }
        self.pos = frame;
        Ok(())
    }

    /// Release the decoded buffer. Later reads return no data.
    pub fn close(&mut self) {
        self.data = Vec::new();
        self.pos = 0;
    }
}

impl FrameSource for PcmStream {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let total = self.len();
        if self.pos >= total {
            return (0, false);
        }

        let n = frames.len().min(total - self.pos);
        let bytes = &self.data[self.pos * FRAME_BYTES..(self.pos + n) * FRAME_BYTES];
        for (frame, chunk) in frames.iter_mut().zip(bytes.chunks_exact(FRAME_BYTES)) {
            let left = i16::from_le_bytes([chunk[0], chunk[1]]);
            let right = i16::from_le_bytes([chunk[2], chunk[3]]);
            frame[0] = f64::from(left) / 32768.0;
            frame[1] = f64::from(right) / 32768.0;
        }
        self.pos += n;
        (n, true)
    }
}
