use super::{System, Tick};

/// Event emitted by [`System::run`] after each tick.
#[derive(Debug)]
pub struct Event<'a, M> {
    /// The tick number, starting at 1.
    pub tick: usize,

    /// The system after the tick, with every member already advanced.
    pub system: &'a System<M>,

    /// Per-member results of the tick.
    pub report: &'a Tick,
}
