//! Tracking-session lifecycle: frame enumeration, seeding from ground truth,
//! the per-frame loop and result logging.

mod display;
mod frame_source;
pub mod ground_truth;
mod result_sink;
mod runner;
mod session_state;
mod tracker_session;

pub use display::{BOX_COLOR, BOX_THICKNESS, FrameDisplay, OverlayWriter, draw_region};
pub use frame_source::{FrameSource, read_frame};
pub use ground_truth::{Quadrilateral, parse_first_line, parse_line, parse_region};
pub use result_sink::ResultSink;
pub use runner::{SessionReport, SessionRunner, run};
pub use session_state::SessionState;
pub use tracker_session::TrackerSession;
