//! SessionRunner: one full pass over a frame sequence.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use cpu_time::ProcessTime;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::session::display::{
    BOX_COLOR, BOX_THICKNESS, FrameDisplay, OverlayWriter, draw_region,
};
use crate::session::frame_source::{FrameSource, read_frame};
use crate::session::ground_truth;
use crate::session::{ResultSink, TrackerSession};
use crate::tracker::{Region, TemplateTracker, VisualTracker};

/// Timing of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub frames: usize,
    pub wall_time: Duration,
    pub cpu_time: Duration,
}

impl SessionReport {
    /// Mean wall-clock seconds per frame.
    pub fn wall_per_frame(&self) -> f64 {
        per_frame(self.wall_time, self.frames)
    }

    /// Mean process CPU seconds per frame.
    pub fn cpu_per_frame(&self) -> f64 {
        per_frame(self.cpu_time, self.frames)
    }

    fn log(&self) {
        log::info!(
            "Elapsed time (CPU time)={:.6}, number of images={}, elapsed time per frame in sec={:.6}",
            self.cpu_time.as_secs_f64(),
            self.frames,
            self.cpu_per_frame()
        );
        log::info!(
            "Elapsed time (Wall clock)={:.6}, number of images={}, elapsed time per frame in sec={:.6}",
            self.wall_time.as_secs_f64(),
            self.frames,
            self.wall_per_frame()
        );
    }
}

fn per_frame(total: Duration, frames: usize) -> f64 {
    if frames == 0 {
        0.0
    } else {
        total.as_secs_f64() / frames as f64
    }
}

/// Drives a tracker over an ordered frame sequence, logging one region per
/// frame.
///
/// Frames are processed strictly in order: decode, track, log, display.
/// Any failure aborts the run; lines already logged stay on disk.
pub struct SessionRunner<T: VisualTracker> {
    session: TrackerSession<T>,
    display: Option<Box<dyn FrameDisplay>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<T: VisualTracker> SessionRunner<T> {
    /// Runner with no display and no cancellation.
    pub fn new(tracker: T) -> Self {
        Self {
            session: TrackerSession::new(tracker),
            display: None,
            cancel: None,
        }
    }

    /// Render each frame with its region and hand it to `display`.
    pub fn with_display<D: FrameDisplay + 'static>(mut self, display: D) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Stop at the next frame boundary once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The session driven by this runner.
    pub fn session(&self) -> &TrackerSession<T> {
        &self.session
    }

    /// Full run over a data directory laid out as `img/` plus
    /// `groundtruth_rect.txt`.
    ///
    /// Inputs are validated before the result log is created, so a bad frame
    /// directory or annotation leaves no output behind.
    pub fn run_dataset(&mut self, config: &RunConfig) -> Result<SessionReport> {
        let frames = FrameSource::open(config.image_dir())?;
        log::info!("Number of input images={}", frames.len());
        if frames.is_empty() {
            return Err(Error::no_frames(format!(
                "no frames found in {}",
                config.image_dir().display()
            )));
        }

        let seed = ground_truth::parse_first_line(config.ground_truth_path())?;
        log::info!("seed region {seed:?}");

        let mut sink = ResultSink::create(&config.output_path)?;
        let report = self.run(&frames, seed, &mut sink)?;
        sink.finish()?;
        Ok(report)
    }

    /// Track `seed` through every frame of `frames`, appending to `sink`.
    pub fn run<W: Write>(
        &mut self,
        frames: &FrameSource,
        seed: Region,
        sink: &mut ResultSink<W>,
    ) -> Result<SessionReport> {
        let total = frames.len();
        if total == 0 {
            return Err(Error::no_frames("frame sequence is empty"));
        }

        let cpu_start = ProcessTime::now();
        let wall_start = Instant::now();

        for (index, path) in frames.iter().enumerate() {
            if self.cancelled() {
                log::warn!("cancelled after {index} of {total} frames");
                return Err(Error::Cancelled);
            }
            log::info!("processing ({}/{}), {}", index + 1, total, path.display());
            self.process_frame(index, path, seed, sink)?;
        }

        self.session.finish();
        let report = SessionReport {
            frames: total,
            wall_time: wall_start.elapsed(),
            cpu_time: cpu_start.elapsed(),
        };
        report.log();
        Ok(report)
    }

    fn process_frame<W: Write>(
        &mut self,
        index: usize,
        path: &Path,
        seed: Region,
        sink: &mut ResultSink<W>,
    ) -> Result<()> {
        let mut frame = read_frame(path)?;

        // The first frame logs the seed itself, not a tracker estimate.
        let region = if index == 0 {
            self.session.start(seed, &frame)?;
            seed
        } else {
            self.session.advance(&frame)?
        };
        log::debug!("frame {index}: {region:?}");
        sink.append(&region)?;

        if let Some(display) = self.display.as_mut() {
            draw_region(&mut frame, &region, BOX_COLOR, BOX_THICKNESS);
            display.show(index, &frame)?;
        }
        Ok(())
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Run the bundled [`TemplateTracker`] as configured by `config`.
pub fn run(config: &RunConfig) -> Result<SessionReport> {
    let tracker = TemplateTracker::new(config.tracker);
    let mut runner = SessionRunner::new(tracker);
    if config.show {
        runner = runner.with_display(OverlayWriter::new(&config.overlay_dir)?);
    }
    runner.run_dataset(config)
}
