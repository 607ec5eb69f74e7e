//! Background execution of compression jobs.
//!
//! Each job gets its own thread, cancel token, and event channel. The caller
//! reads [`JobEvent`]s from the handle and collects the [`JobOutcome`] with
//! [`JobHandle::wait`].

use crate::encoder::{Encoder, Ffmpeg};
use crate::job::{CancelToken, CompressionJob, JobEvent, JobOutcome, MediaKind};
use crate::processing::{ImageCodec, ImageCompressor, StandardImageCodec};
use crate::probe::{DurationProbe, Ffprobe};
use crate::video::VideoCompressor;
use crate::error::CompressionError;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Routes a job to the video or image runner by its media kind.
#[derive(Debug, Clone)]
pub struct Compressor<P = Ffprobe, E = Ffmpeg, C = StandardImageCodec> {
    video: VideoCompressor<P, E>,
    image: ImageCompressor<C>,
}

impl Compressor {
    /// Real tools at the given locations.
    pub fn with_tools(ffprobe: Ffprobe, ffmpeg: Ffmpeg) -> Self {
        Self::new(
            VideoCompressor::new(ffprobe, ffmpeg),
            ImageCompressor::new(StandardImageCodec::default()),
        )
    }
}

impl<P: DurationProbe, E: Encoder, C: ImageCodec> Compressor<P, E, C> {
    pub fn new(video: VideoCompressor<P, E>, image: ImageCompressor<C>) -> Self {
        Self { video, image }
    }

    pub fn run(
        &self,
        job: &CompressionJob,
        cancel: &CancelToken,
        on_event: &mut dyn FnMut(JobEvent),
    ) -> JobOutcome {
        match job.kind {
            MediaKind::Video => self.video.run(job, cancel, on_event),
            MediaKind::Image => self.image.run(job, on_event),
        }
    }
}

/// A job running on its own thread.
pub struct JobHandle {
    cancel: CancelToken,
    events: Receiver<JobEvent>,
    thread: JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Ask the job to stop. Video jobs notice on their next poll tick;
    /// image jobs run to completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Events in emission order. The iterator ends once the job finishes.
    pub fn events(&self) -> mpsc::Iter<'_, JobEvent> {
        self.events.iter()
    }

    /// Block until the job finishes.
    pub fn wait(self) -> JobOutcome {
        self.thread.join().unwrap_or_else(|_| {
            JobOutcome::Failed(CompressionError::Io(std::io::Error::other(
                "compression worker panicked",
            )))
        })
    }
}

/// Start `job` on a new thread.
pub fn spawn_job<P, E, C>(compressor: Arc<Compressor<P, E, C>>, job: CompressionJob) -> JobHandle
where
    P: DurationProbe + Send + Sync + 'static,
    E: Encoder + Send + Sync + 'static,
    C: ImageCodec + Send + Sync + 'static,
{
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let worker_cancel = cancel.clone();

    let thread = std::thread::spawn(move || {
        // A dropped receiver just means nobody is listening.
        let mut send = |event: JobEvent| {
            let _ = tx.send(event);
        };
        compressor.run(&job, &worker_cancel, &mut send)
    });

    JobHandle {
        cancel,
        events: rx,
        thread,
    }
}
