use kinetic_core::Observer;

/// Extracts named samples from a run event.
///
/// Implement this on your own event type to pass a [`Recorder`] directly as
/// an observer. Return `None` from [`time`][Traceable::time] to skip the
/// event, or `None` in a trace slot to skip only that trace.
///
/// For event types foreign to your crate, such as
/// [`system::Event`](kinetic_models::system::Event), wrap `&mut Recorder` in a
/// closure and call [`Recorder::record`] instead.
pub trait Traceable<const N: usize> {
    /// The time of this event, or `None` to skip recording entirely.
    fn time(&self) -> Option<f64>;

    /// The sampled value of each trace.
    fn traces(&self) -> [Option<f64>; N];
}

/// An observer that collects `N` named `(time, value)` traces during a run.
///
/// # Example
///
/// ```ignore
/// let mut recorder = Recorder::<1>::new(["height"]);
/// system.run(100, |event: &Event<'_, _>| -> Option<Action> {
///     let ball = event.system.get("ball")?;
///     recorder.record(event.system.elapsed(), [Some(ball.state()[0])]);
///     None
/// });
/// let apex = recorder.series(0).map(|(_, y)| y).fold(f64::MIN, f64::max);
/// ```
#[derive(Debug, Clone)]
pub struct Recorder<const N: usize> {
    names: [String; N],
    data: [Vec<(f64, f64)>; N],
}

impl<const N: usize> Recorder<N> {
    /// Creates an empty recorder with the given trace names.
    #[must_use]
    pub fn new(names: [&str; N]) -> Self {
        Self {
            names: names.map(str::to_owned),
            data: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Records one sample across all traces.
    ///
    /// A `None` slot skips that trace while leaving the others unaffected.
    pub fn record(&mut self, time: f64, traces: [Option<f64>; N]) {
        for (samples, value) in self.data.iter_mut().zip(traces) {
            if let Some(value) = value {
                samples.push((time, value));
            }
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String; N] {
        &self.names
    }

    /// Iterates over the samples of one trace in recording order.
    ///
    /// Each call starts again from the first sample. An out-of-range index
    /// yields nothing.
    pub fn series(&self, trace: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.data.get(trace).into_iter().flatten().copied()
    }

    /// Iterates over the samples of the trace with the given name.
    pub fn series_named(&self, name: &str) -> impl Iterator<Item = (f64, f64)> + '_ {
        let trace = self.names.iter().position(|n| n == name).unwrap_or(N);
        self.series(trace)
    }

    /// Returns the most recent sample of one trace.
    #[must_use]
    pub fn last(&self, trace: usize) -> Option<(f64, f64)> {
        self.data.get(trace)?.last().copied()
    }

    /// Returns the number of samples in one trace.
    #[must_use]
    pub fn len(&self, trace: usize) -> usize {
        self.data.get(trace).map_or(0, Vec::len)
    }

    /// Returns `true` if no trace holds a sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Vec::is_empty)
    }
}

impl<const N: usize, E, A> Observer<E, A> for Recorder<N>
where
    E: Traceable<N>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if let Some(time) = event.time() {
            self.record(time, event.traces());
        }
        None
    }
}

/// Allows `&mut Recorder<N>` to be passed to runs that take an observer by
/// value, so the traces can be read after the run completes.
impl<const N: usize, E, A> Observer<E, A> for &mut Recorder<N>
where
    E: Traceable<N>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        (*self).observe(event)
    }
}
