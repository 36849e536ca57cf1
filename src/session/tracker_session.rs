//! TrackerSession: the init/update lifecycle around one tracker.

use crate::error::{Error, Result};
use crate::session::SessionState;
use crate::tracker::{Frame, Region, VisualTracker};

/// Owns a tracker for the length of one sequence and enforces its call order:
/// exactly one `start`, then any number of `advance` calls, one per frame.
pub struct TrackerSession<T: VisualTracker> {
    tracker: T,
    state: SessionState,
    frames_processed: usize,
}

impl<T: VisualTracker> TrackerSession<T> {
    /// Wrap an unseeded tracker.
    pub fn new(tracker: T) -> Self {
        Self {
            tracker,
            state: SessionState::Uninitialized,
            frames_processed: 0,
        }
    }

    /// Seed the tracker with the first frame of the sequence.
    ///
    /// The seed is handed over as-is; bounds checking is the tracker's job.
    pub fn start(&mut self, seed: Region, first_frame: &Frame) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(Error::State(format!(
                "start called in state {:?}",
                self.state
            )));
        }

        self.tracker
            .init(seed, first_frame)
            .map_err(|e| Error::Tracker(Box::new(e)))?;
        self.state = SessionState::Initialized;
        self.frames_processed = 1;
        Ok(())
    }

    /// Feed the next frame in sequence and return the tracker's region.
    pub fn advance(&mut self, frame: &Frame) -> Result<Region> {
        match self.state {
            SessionState::Initialized | SessionState::Tracking(_) => {}
            state => {
                return Err(Error::State(format!("advance called in state {state:?}")));
            }
        }

        let region = self
            .tracker
            .update(frame)
            .map_err(|e| Error::Tracker(Box::new(e)))?;
        self.state = SessionState::Tracking(self.frames_processed);
        self.frames_processed += 1;
        Ok(region)
    }

    /// Close the session; later `start`/`advance` calls fail.
    pub fn finish(&mut self) {
        self.state = SessionState::Finished;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames handed to the tracker so far, the seed frame included.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    /// Borrow the wrapped tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Give the tracker back, ending the session.
    pub fn into_inner(self) -> T {
        self.tracker
    }
}
