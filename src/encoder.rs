//! External encoder invocation.
//!
//! [`Encoder`] launches an encode and hands back an [`EncodeProcess`] the
//! video runner polls. [`Ffmpeg`] is the real implementation; tests drive the
//! runner with in-memory fakes.

use crate::constants::{AUDIO_CODEC, FFMPEG, STDERR_TAIL_BYTES, VIDEO_CODEC};
use crate::error::{CompressionError, Result};
use crate::preset::EncoderPreset;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Everything the encoder needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preset: EncoderPreset,
    pub video_kbps: u32,
    pub audio_kbps: u32,
    /// Ask the encoder to stream machine-readable progress.
    pub report_progress: bool,
}

impl EncodeRequest {
    /// Argument vector for `ffmpeg`, output last.
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), self.input.clone().into_os_string()];
        args.extend(
            [
                "-c:v".to_string(),
                VIDEO_CODEC.to_string(),
                "-preset".to_string(),
                self.preset.as_ffmpeg().to_string(),
                "-b:v".to_string(),
                format!("{}k", self.video_kbps),
                "-c:a".to_string(),
                AUDIO_CODEC.to_string(),
                "-b:a".to_string(),
                format!("{}k", self.audio_kbps),
            ]
            .into_iter()
            .map(OsString::from),
        );
        if self.report_progress {
            args.extend(["-progress", "pipe:1", "-nostats"].map(OsString::from));
        }
        args.push("-y".into());
        args.push(self.output.clone().into_os_string());
        args
    }
}

/// How a finished encode exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeExit {
    pub code: Option<i32>,
}

impl EncodeExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A running encode.
pub trait EncodeProcess {
    /// `Some` once the process has exited. Never blocks.
    fn try_wait(&mut self) -> Result<Option<EncodeExit>>;

    /// Stop the encode. Called at most once per process.
    fn terminate(&mut self) -> Result<()>;

    /// Captured diagnostic output, read after exit.
    fn error_output(&mut self) -> String;

    /// Media time encoded so far, when the encoder reports it.
    fn encoded_seconds(&self) -> Option<f64> {
        None
    }
}

/// Something that can start encodes.
pub trait Encoder {
    type Process: EncodeProcess;

    fn launch(&self, request: &EncodeRequest) -> Result<Self::Process>;
}

/// Encoder backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(FFMPEG)
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Encoder for Ffmpeg {
    type Process = FfmpegProcess;

    fn launch(&self, request: &EncodeRequest) -> Result<FfmpegProcess> {
        let args = request.ffmpeg_args();
        tracing::debug!(
            program = %self.program.display(),
            args = ?args,
            "launching encoder"
        );

        let stdout = if request.report_progress {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let tool = self.program.display().to_string();
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompressionError::launch(tool, "executable not found")
                } else {
                    CompressionError::launch(tool, e.to_string())
                }
            })?;

        // ffmpeg logs heavily to stderr; drain it so the child never blocks.
        let stderr_reader = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || read_tail(stderr, STDERR_TAIL_BYTES))
        });

        let encoded_us = Arc::new(AtomicU64::new(0));
        let progress_reader = child.stdout.take().map(|stdout| {
            let encoded_us = Arc::clone(&encoded_us);
            std::thread::spawn(move || {
                for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
                    if let Some(us) = parse_progress_line(&line) {
                        encoded_us.store(us, Ordering::Relaxed);
                    }
                }
            })
        });

        Ok(FfmpegProcess {
            child,
            stderr_reader,
            progress_reader,
            encoded_us,
            reports_progress: request.report_progress,
            finished: false,
        })
    }
}

/// Child handle plus the threads draining its pipes.
pub struct FfmpegProcess {
    child: Child,
    stderr_reader: Option<JoinHandle<String>>,
    progress_reader: Option<JoinHandle<()>>,
    encoded_us: Arc<AtomicU64>,
    reports_progress: bool,
    finished: bool,
}

impl EncodeProcess for FfmpegProcess {
    fn try_wait(&mut self) -> Result<Option<EncodeExit>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.finished = true;
        }
        Ok(status.map(|s| EncodeExit { code: s.code() }))
    }

    fn terminate(&mut self) -> Result<()> {
        tracing::debug!(pid = self.child.id(), "terminating encoder");
        match self.child.kill() {
            Ok(()) => {}
            // Already exited between the last poll and now.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e.into()),
        }
        self.child.wait()?;
        self.finished = true;
        Ok(())
    }

    fn error_output(&mut self) -> String {
        if let Some(handle) = self.progress_reader.take() {
            let _ = handle.join();
        }
        self.stderr_reader
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    fn encoded_seconds(&self) -> Option<f64> {
        if !self.reports_progress {
            return None;
        }
        Some(self.encoded_us.load(Ordering::Relaxed) as f64 / 1_000_000.0)
    }
}

impl Drop for FfmpegProcess {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Read a stream to EOF, keeping at most the last `limit` bytes.
fn read_tail(mut reader: impl Read, limit: usize) -> String {
    let mut kept: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                kept.extend_from_slice(&chunk[..n]);
                if kept.len() > limit * 2 {
                    kept.drain(..kept.len() - limit);
                }
            }
        }
    }
    if kept.len() > limit {
        kept.drain(..kept.len() - limit);
    }
    String::from_utf8_lossy(&kept).trim().to_string()
}

/// Encoded time in microseconds from one `-progress` line.
///
/// ffmpeg writes both `out_time_us` and the misnamed `out_time_ms`, which
/// also carries microseconds.
pub fn parse_progress_line(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => value.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EncodeRequest {
        EncodeRequest {
            input: PathBuf::from("in.mp4"),
            output: PathBuf::from("out.mp4"),
            preset: EncoderPreset::Slow,
            video_kbps: 3367,
            audio_kbps: 128,
            report_progress: false,
        }
    }

    fn as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = as_strings(request().ffmpeg_args());
        assert_eq!(
            args,
            vec![
                "-i", "in.mp4", "-c:v", "libx264", "-preset", "slow", "-b:v", "3367k", "-c:a",
                "aac", "-b:a", "128k", "-y", "out.mp4"
            ]
        );
    }

    #[test]
    fn test_ffmpeg_args_with_progress() {
        let mut req = request();
        req.report_progress = true;
        let args = as_strings(req.ffmpeg_args());
        let pos = args.iter().position(|a| a == "-progress").unwrap();
        assert_eq!(args[pos + 1], "pipe:1");
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert_eq!(args[args.len() - 2], "-y");
    }

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("out_time_us=1500000"), Some(1_500_000));
        assert_eq!(parse_progress_line("out_time_ms=2000000"), Some(2_000_000));
        assert_eq!(parse_progress_line("out_time=00:00:01.500000"), None);
        assert_eq!(parse_progress_line("out_time_us=N/A"), None);
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn test_read_tail_keeps_the_end() {
        let data = "a".repeat(100) + "the end";
        let tail = read_tail(data.as_bytes(), 7);
        assert_eq!(tail, "the end");

        let tail = read_tail("short".as_bytes(), 1024);
        assert_eq!(tail, "short");
    }

    #[test]
    fn test_missing_encoder_is_launch_failure() {
        let ffmpeg = Ffmpeg::new("definitely-not-a-real-ffmpeg-binary");
        let result = ffmpeg.launch(&request());
        assert!(matches!(
            result,
            Err(CompressionError::ProcessLaunchFailure { .. })
        ));
    }

    #[test]
    fn test_exit_success() {
        assert!(EncodeExit { code: Some(0) }.success());
        assert!(!EncodeExit { code: Some(1) }.success());
        assert!(!EncodeExit { code: None }.success());
    }
}
