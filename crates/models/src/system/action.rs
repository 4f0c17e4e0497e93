/// Control actions supported by [`System::run`](super::System::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the run early and return the solution so far.
    StopEarly,
}
