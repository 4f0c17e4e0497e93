/// Indicates how a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Completed all requested ticks.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of [`System::run`](super::System::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// How the run terminated.
    pub status: Status,

    /// Number of ticks completed.
    pub ticks: usize,
}
