mod gpio;

use std::collections::VecDeque;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use crate::GpioResult;
pub use gpio::*;

/// The `Keypad` trait defines the interface for keypad input devices.
pub trait Keypad: Debug {
    type Key;

    /// Scans the keypad and returns every key currently held.
    fn read(&self) -> GpioResult<Vec<Self::Key>>;
}

/// A single key edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeypadEvent {
    pub key: usize,
    pub pressed: bool,
}

/// Turns keypad scans into debounced press/release edges, handed out one at a
/// time.
///
/// A new scan only happens once every edge of the previous scan was consumed, so
/// edges come out in the order they were detected. Each key is debounced on its
/// own the way [crate::debounce::TimedDebounce] does it: an edge is accepted at
/// once and the key is then locked for [Self::debounce_time].
#[derive(Debug)]
pub struct KeyEvents<'a> {
    keypad: &'a dyn Keypad<Key = usize>,
    held: Vec<bool>,
    locked_since: Vec<Option<Instant>>,
    pending: VecDeque<KeypadEvent>,
    pub debounce_time: Duration,
}

impl<'a> KeyEvents<'a> {
    pub fn new(keypad: &'a dyn Keypad<Key = usize>, key_count: usize) -> Self {
        KeyEvents {
            keypad,
            held: vec![false; key_count],
            locked_since: vec![None; key_count],
            pending: VecDeque::new(),
            debounce_time: Duration::from_millis(20),
        }
    }

    pub fn with_debounce_time(mut self, debounce_time: Duration) -> Self {
        self.debounce_time = debounce_time;
        self
    }

    /// Returns the next key edge, scanning the keypad if none is pending.
    pub fn poll(&mut self) -> GpioResult<Option<KeypadEvent>> {
        self.poll_at(Instant::now())
    }

    /// Same as [Self::poll], scanning at `now`.
    pub fn poll_at(&mut self, now: Instant) -> GpioResult<Option<KeypadEvent>> {
        if self.pending.is_empty() {
            self.scan(now)?;
        }
        Ok(self.pending.pop_front())
    }

    fn scan(&mut self, now: Instant) -> GpioResult<()> {
        let mut now_held = vec![false; self.held.len()];
        for key in self.keypad.read()? {
            if let Some(slot) = now_held.get_mut(key) {
                *slot = true;
            }
        }

        for (key, &is) in now_held.iter().enumerate() {
            if let Some(since) = self.locked_since[key] {
                if now.saturating_duration_since(since) < self.debounce_time {
                    continue;
                }
                self.locked_since[key] = None;
            }

            if self.held[key] != is {
                self.held[key] = is;
                self.locked_since[key] = Some(now);
                self.pending.push_back(KeypadEvent { key, pressed: is });
            }
        }
        Ok(())
    }
}
