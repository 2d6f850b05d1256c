//! The frame loop: integrate, sample, draw, once per timeline entry.

use crate::driver::IntegrationDriver;
use crate::error::{RunError, RunFailure, SinkError, Stage};
use crate::history::FrameHistory;
use crate::integrator::Integrator;
use crate::sampler::{FrameSample, FrameSampler};
use crate::state::OrbitalState;
use crate::timeline::Timeline;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a sink may look at while drawing frame `index`.
///
/// `history` holds frames `0..=index` and nothing later.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub index: usize,
    pub time: f64,
    pub total: usize,
    pub state: &'a OrbitalState,
    pub history: &'a FrameHistory,
    pub sample: &'a FrameSample,
}

pub trait RenderSink {
    fn draw_frame(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Persists the artifact. Called once, after the last frame.
    fn finish(&mut self) -> Result<(), SinkError>;

    /// Discards anything written so far. Called instead of `finish` when a
    /// run fails.
    fn abort(&mut self) {}
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn draw_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        (**self).draw_frame(frame)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub frames: usize,
    pub final_time: f64,
    pub history: FrameHistory,
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    cancel: Option<Arc<AtomicBool>>,
    progress_every: usize,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        AnimationDriver {
            cancel: None,
            progress_every: 10,
        }
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The run stops before the next frame once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Logs progress every `n` frames. Zero disables progress logging.
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    pub fn run<I, S>(
        &self,
        timeline: &Timeline,
        driver: &mut IntegrationDriver<I>,
        sampler: &FrameSampler,
        sink: &mut S,
    ) -> Result<RunSummary, RunError>
    where
        I: Integrator,
        S: RenderSink + ?Sized,
    {
        let total = timeline.len();
        let mut history = sampler.history(total);

        info!(
            frames = total,
            start = timeline.start(),
            end = timeline.end(),
            mode = ?sampler.mode,
            "starting run"
        );

        let fail = |sink: &mut S, frame: usize, stage: Stage, source: RunFailure| {
            warn!(frame, %stage, error = %source, "run failed, discarding output");
            sink.abort();
            RunError {
                frame,
                stage,
                frames_completed: frame,
                source,
            }
        };

        let mut final_time = timeline.start();

        for (i, t) in timeline.iter().enumerate() {
            if self.cancelled() {
                return Err(fail(sink, i, Stage::Cancelled, RunFailure::Cancelled));
            }

            let state = driver
                .advance(t)
                .map_err(|e| fail(sink, i, Stage::Integrate, e.into()))?;

            let sample = sampler
                .sample(&state, i, &mut history)
                .map_err(|e| fail(sink, i, Stage::Sample, e.into()))?;

            let frame = Frame {
                index: i,
                time: state.time(),
                total,
                state: &state,
                history: &history,
                sample: &sample,
            };

            sink.draw_frame(&frame)
                .map_err(|e| fail(sink, i, Stage::Render, e.into()))?;

            final_time = state.time();

            if self.progress_every > 0 && (i + 1) % self.progress_every == 0 {
                info!(frame = i + 1, total, t = final_time, "progress");
            } else {
                debug!(frame = i, t = final_time, "frame drawn");
            }
        }

        sink.finish()
            .map_err(|e| fail(sink, total, Stage::Finish, e.into()))?;

        info!(frames = total, final_time, "run complete");

        Ok(RunSummary {
            frames: total,
            final_time,
            history,
        })
    }
}
