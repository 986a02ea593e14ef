/// Events emitted while a preparation run advances.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A named pipeline phase (loading, mapping, aligning, ...) has begun.
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A phase with a known number of discrete steps, such as output staging.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback; silent without one.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `step` as the phase `name`. `PhaseFinish` is reported only when it succeeds.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        step: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { name });
        let value = step()?;
        self.report(Progress::PhaseFinish);
        Ok(value)
    }
}
