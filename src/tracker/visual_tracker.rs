//! Trait for single-object visual trackers.

use image::RgbImage;

use crate::tracker::Region;

/// One decoded RGB frame.
pub type Frame = RgbImage;

/// Trait for single-object trackers driven frame by frame.
///
/// Implement this trait to run any tracking algorithm inside a
/// [`TrackerSession`](crate::session::TrackerSession).
///
/// # Example
///
/// ```ignore
/// use seqtrack_rs::{Frame, Region, VisualTracker};
///
/// struct StaticTracker {
///     region: Region,
/// }
///
/// impl VisualTracker for StaticTracker {
///     type Error = std::convert::Infallible;
///
///     fn init(&mut self, region: Region, _frame: &Frame) -> Result<(), Self::Error> {
///         self.region = region;
///         Ok(())
///     }
///
///     fn update(&mut self, _frame: &Frame) -> Result<Region, Self::Error> {
///         Ok(self.region)
///     }
/// }
/// ```
pub trait VisualTracker {
    /// Error type for tracker failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Seed the tracker with the object's location in the first frame.
    fn init(&mut self, region: Region, frame: &Frame) -> Result<(), Self::Error>;

    /// Locate the object in the next frame of the sequence.
    fn update(&mut self, frame: &Frame) -> Result<Region, Self::Error>;
}

impl<T: VisualTracker + ?Sized> VisualTracker for Box<T> {
    type Error = T::Error;

    fn init(&mut self, region: Region, frame: &Frame) -> Result<(), Self::Error> {
        (**self).init(region, frame)
    }

    fn update(&mut self, frame: &Frame) -> Result<Region, Self::Error> {
        (**self).update(frame)
    }
}
