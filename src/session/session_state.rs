/// Lifecycle of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Tracker constructed, no frame seen yet
    #[default]
    Uninitialized,
    /// Seeded with the first frame
    Initialized,
    /// Advanced through frame `n` (zero-based index in the sequence)
    Tracking(usize),
    /// Run completed, no further frames accepted
    Finished,
}
