//! Hardware collaborator interfaces and their implementations.
//!
//! The dispatcher only sees the traits below. [gpio] implements the inputs and the
//! indicators on top of `macrodial_gpio`, [lcd] renders surfaces to a character LCD
//! and [hid] emits actions as USB keyboard reports.

pub mod gpio;
pub mod hid;
pub mod lcd;

use crate::action::Keycode;
use crate::error::DialResult;
use crate::event::KeyEvent;
use crate::led::Color;
use crate::surface::Surface;

pub use gpio::*;
pub use hid::*;
pub use lcd::*;

/// Source of debounced key edges.
pub trait KeySource {
    /// Returns at most one pending key edge.
    fn next_event(&mut self) -> DialResult<Option<KeyEvent>>;
}

/// A rotary input reporting its absolute detent count.
pub trait RotaryInput {
    fn position(&mut self) -> DialResult<i32>;
}

/// A debounced push switch.
pub trait PressInput {
    fn is_pressed(&mut self) -> DialResult<bool>;
}

/// The 12 key indicators.
pub trait Indicators {
    fn write(&mut self, slot: usize, color: Color) -> DialResult<()>;
}

/// The visual surface of the active page.
pub trait Display {
    /// Replaces whatever is shown with `surface`.
    fn show(&mut self, surface: &Surface) -> DialResult<()>;
}

/// Receiver of keyboard actions.
pub trait ActionSink {
    /// Presses `keys` together and releases them.
    fn send(&mut self, keys: &[Keycode]) -> DialResult<()>;
    /// Presses `keys` together and keeps them held.
    fn press(&mut self, keys: &[Keycode]) -> DialResult<()>;
    fn release_all(&mut self) -> DialResult<()>;
}

/// An [ActionSink] that only logs, for running without a HID gadget.
#[derive(Debug, Default)]
pub struct LogSink;

impl ActionSink for LogSink {
    fn send(&mut self, keys: &[Keycode]) -> DialResult<()> {
        log::info!("Send {:?}", keys);
        Ok(())
    }

    fn press(&mut self, keys: &[Keycode]) -> DialResult<()> {
        log::info!("Press {:?}", keys);
        Ok(())
    }

    fn release_all(&mut self) -> DialResult<()> {
        log::info!("Release all");
        Ok(())
    }
}
