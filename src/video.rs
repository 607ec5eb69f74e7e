//! Video compression runner.
//!
//! Drives one job through `Idle → Probing → Encoding → {Completed | Cancelled | Failed}`,
//! reporting every step through a [`JobEvent`] callback.

use crate::bitrate::BitratePlan;
use crate::constants::{POLL_INTERVAL_MS, PROGRESS_CAP, PROGRESS_DONE, PROGRESS_STEP};
use crate::encoder::{EncodeProcess, EncodeRequest, Encoder};
use crate::error::{CompressionError, Result};
use crate::job::{CancelToken, CompressionJob, JobEvent, JobOutcome, JobState, SizeReport};
use crate::preset::EncoderPreset;
use crate::probe::DurationProbe;
use crate::validation::{ensure_distinct_output, prepare_output_path};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Where progress numbers come from while the encoder runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Fixed step per poll tick, capped below 100. Not tied to the encode.
    #[default]
    Synthetic,
    /// Encoded media time over probed duration, from the encoder's own report.
    Measured,
}

/// Next progress value while the encode is still running.
///
/// Never reaches 100; that value is reserved for a successful exit.
pub fn next_progress(
    current: u8,
    mode: ProgressMode,
    encoded_s: Option<f64>,
    duration_s: f64,
) -> u8 {
    let next = match (mode, encoded_s) {
        (ProgressMode::Measured, Some(encoded)) if duration_s > 0.0 => {
            let pct = (encoded / duration_s * 100.0).floor();
            if pct.is_nan() || pct < 0.0 {
                0
            } else {
                pct.min(PROGRESS_CAP as f64) as u8
            }
        }
        _ => current.saturating_add(PROGRESS_STEP),
    };
    next.max(current).min(PROGRESS_CAP)
}

#[derive(Debug, Clone)]
pub struct VideoCompressor<P, E> {
    prober: P,
    encoder: E,
    poll_interval: Duration,
    progress_mode: ProgressMode,
}

impl<P: DurationProbe, E: Encoder> VideoCompressor<P, E> {
    pub fn new(prober: P, encoder: E) -> Self {
        Self {
            prober,
            encoder,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            progress_mode: ProgressMode::default(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_progress_mode(mut self, progress_mode: ProgressMode) -> Self {
        self.progress_mode = progress_mode;
        self
    }

    /// Run a job to a terminal outcome. Never panics on job errors; every
    /// failure ends up in [`JobOutcome::Failed`].
    pub fn run(
        &self,
        job: &CompressionJob,
        cancel: &CancelToken,
        on_event: &mut dyn FnMut(JobEvent),
    ) -> JobOutcome {
        on_event(JobEvent::State(JobState::Idle));
        let outcome = match self.execute(job, cancel, on_event) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(input = %job.input.display(), error = %err, "video job failed");
                JobOutcome::Failed(err)
            }
        };
        on_event(JobEvent::State(outcome.state()));
        outcome
    }

    fn execute(
        &self,
        job: &CompressionJob,
        cancel: &CancelToken,
        on_event: &mut dyn FnMut(JobEvent),
    ) -> Result<JobOutcome> {
        let target_mb = job.target_mb()?;
        ensure_distinct_output(&job.input, &job.output)?;
        prepare_output_path(&job.output)?;

        on_event(JobEvent::State(JobState::Probing));
        on_event(JobEvent::Status("Analyzing video...".to_string()));
        let duration_s = self.prober.probe_duration(&job.input)?;

        let plan = BitratePlan::new(duration_s, target_mb)?;
        if plan.overshoots_target() {
            tracing::warn!(
                target_mb,
                duration_s,
                "target too small for this duration, output will be larger than requested"
            );
        }
        on_event(JobEvent::Status(format!(
            "Compressing video (target bitrate: {}kbps)...",
            plan.video_kbps
        )));

        let request = EncodeRequest {
            input: job.input.clone(),
            output: job.output.clone(),
            preset: EncoderPreset::lookup(job.preset_label()),
            video_kbps: plan.video_kbps,
            audio_kbps: plan.audio_kbps,
            report_progress: self.progress_mode == ProgressMode::Measured,
        };

        on_event(JobEvent::State(JobState::Encoding));
        let mut process = self.encoder.launch(&request)?;

        let mut progress = 0u8;
        let exit = loop {
            match process.try_wait() {
                Ok(Some(exit)) => break exit,
                Ok(None) => {}
                Err(err) => {
                    let _ = process.terminate();
                    remove_partial_output(&job.output);
                    return Err(err);
                }
            }

            if cancel.is_cancelled() {
                if let Err(err) = process.terminate() {
                    tracing::warn!(error = %err, "failed to stop encoder");
                }
                remove_partial_output(&job.output);
                return Ok(JobOutcome::Cancelled);
            }

            progress = next_progress(
                progress,
                self.progress_mode,
                process.encoded_seconds(),
                duration_s,
            );
            on_event(JobEvent::Progress(progress));
            std::thread::sleep(self.poll_interval);
        };

        if !exit.success() {
            let stderr = process.error_output();
            remove_partial_output(&job.output);
            return Err(CompressionError::ProcessNonZeroExit {
                code: exit.code,
                stderr: if stderr.is_empty() {
                    "Unknown error".to_string()
                } else {
                    stderr
                },
            });
        }

        on_event(JobEvent::Progress(PROGRESS_DONE));
        on_event(JobEvent::Status(
            "Compression completed successfully!".to_string(),
        ));

        let report = size_report(&job.input, &job.output);
        Ok(JobOutcome::Completed {
            message: format!(
                "Video compressed successfully!\nSaved to: {}",
                job.output.display()
            ),
            output: job.output.clone(),
            report,
        })
    }
}

fn size_report(input: &Path, output: &Path) -> Option<SizeReport> {
    let original_bytes = fs::metadata(input).ok()?.len();
    let compressed_bytes = fs::metadata(output).ok()?.len();
    Some(SizeReport {
        original_bytes,
        compressed_bytes,
    })
}

fn remove_partial_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => tracing::debug!(output = %output.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(output = %output.display(), error = %e, "could not remove partial output"),
    }
}
