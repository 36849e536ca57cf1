//! Single-object tracking over ordered image sequences.
//!
//! A [`SessionRunner`] seeds any [`VisualTracker`] from the first line of a
//! ground-truth annotation, advances it one frame at a time and logs one
//! `x,y,width,height` line per frame.

pub mod config;
pub mod error;
pub mod session;
pub mod tracker;

pub use config::{Cli, RunConfig};
pub use error::{ConfigStage, Error, Result};
pub use session::{
    FrameSource, ResultSink, SessionReport, SessionRunner, SessionState, TrackerSession,
};
pub use tracker::{
    FeatureMode, Frame, Region, TemplateTracker, TrackerConfig, VisualTracker,
};
