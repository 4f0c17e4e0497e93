/// Health of an integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every advance since the last reinitialization succeeded.
    Successful,

    /// A previous advance failed; further advances are no-ops.
    Unsuccessful,
}

/// The result of a non-failing advance call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State and time moved to exactly `t + dt`.
    Advanced,

    /// Nothing changed because an earlier advance failed.
    Stalled,
}
