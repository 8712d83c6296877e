//! Collaborator implementations on top of `macrodial_gpio`.

use crate::SLOTS;
use crate::error::DialResult;
use crate::event::KeyEvent;
use crate::hal::{Indicators, KeySource, PressInput, RotaryInput};
use crate::led::Color;
use macrodial_gpio::GpioBusOutput;
use macrodial_gpio::debounce::TimedDebounce;
use macrodial_gpio::keypad::KeyEvents;
use macrodial_gpio::rotenc::RotEnc;
use std::fmt::{Debug, Formatter};
use std::time::Instant;

impl KeySource for KeyEvents<'_> {
    fn next_event(&mut self) -> DialResult<Option<KeyEvent>> {
        Ok(self.poll()?.map(|event| KeyEvent { slot: event.key, pressed: event.pressed }))
    }
}

impl RotaryInput for RotEnc<'_> {
    fn position(&mut self) -> DialResult<i32> {
        Ok(self.update()?)
    }
}

impl PressInput for TimedDebounce<'_> {
    fn is_pressed(&mut self) -> DialResult<bool> {
        Ok(self.update(Instant::now())?)
    }
}

/// Single-colour indicator LEDs, one GPIO line per slot.
///
/// A slot is lit when the brightest channel of its colour reaches `threshold`, so
/// dim "off" colours stay dark.
pub struct GpioIndicators<'a> {
    lines: &'a dyn GpioBusOutput<SLOTS>,
    lit: [bool; SLOTS],
    pub threshold: u8,
}

impl<'a> GpioIndicators<'a> {
    pub fn new(lines: &'a dyn GpioBusOutput<SLOTS>) -> Self {
        GpioIndicators {
            lines,
            lit: [false; SLOTS],
            threshold: 64,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Which slots are currently lit.
    pub fn lit(&self) -> [bool; SLOTS] {
        self.lit
    }
}

impl Debug for GpioIndicators<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioIndicators({:?})", self.lines)
    }
}

impl Indicators for GpioIndicators<'_> {
    fn write(&mut self, slot: usize, color: Color) -> DialResult<()> {
        let Some(lit) = self.lit.get_mut(slot) else {
            return Err(crate::DialError::InvalidSlot(slot));
        };
        *lit = color.r.max(color.g).max(color.b) >= self.threshold;
        self.lines.write(&self.lit)?;
        Ok(())
    }
}
