use std::fmt::{Debug, Formatter};
use std::time::{Duration, Instant};
use crate::{GpioInput, GpioResult};

/// A debounced GPIO input.
///
/// A change of the raw input is accepted immediately, after which the input is locked
/// for [Self::debounce_time] so contact bounce cannot toggle it back.
pub struct TimedDebounce<'a> {
    input: &'a dyn GpioInput,
    state: bool,
    locked_since: Option<Instant>,
    pub debounce_time: Duration,
}

impl <'a> TimedDebounce<'a> {
    pub fn new(input: &'a dyn GpioInput) -> Self {
        Self {
            input,
            state: false,
            locked_since: None,
            debounce_time: Duration::from_millis(50),
        }
    }

    pub fn with_debounce_time(mut self, debounce_time: Duration) -> Self {
        self.debounce_time = debounce_time;
        self
    }

    /// Samples the input at `now` and returns the debounced state.
    pub fn update(&mut self, now: Instant) -> GpioResult<bool> {
        let raw = self.input.read()?;

        if let Some(since) = self.locked_since {
            if now.saturating_duration_since(since) < self.debounce_time {
                return Ok(self.state);
            }
            self.locked_since = None;
        }

        if raw != self.state {
            self.state = raw;
            self.locked_since = Some(now);
        }

        Ok(self.state)
    }

    /// The last debounced state, without sampling.
    pub fn state(&self) -> bool {
        self.state
    }
}

impl Debug for TimedDebounce<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(debounced)", self.input)
    }
}
