mod features;
mod kalman_filter;
mod region;
mod template_tracker;
mod visual_tracker;

pub use features::FeatureMode;
pub use kalman_filter::MotionFilter;
pub use region::Region;
pub use template_tracker::{TemplateTracker, TemplateTrackerError, TrackerConfig};
pub use visual_tracker::{Frame, VisualTracker};
