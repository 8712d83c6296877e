//! Key indicator state and the animator that renders it.

use crate::SLOTS;
use crate::error::DialResult;
use crate::hal::Indicators;
use rgb::RGB8;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub type Color = RGB8;

pub const BLACK: Color = RGB8 { r: 0, g: 0, b: 0 };
pub const WHITE: Color = RGB8 { r: 255, g: 255, b: 255 };

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum LedMode {
    #[default]
    Off,
    On,
    Blink,
    /// Not animated yet, renders like [LedMode::Off].
    Pulse,
}

/// Animation state of one key indicator.
///
/// Every setter raises the change signal; the [LedAnimator] clears it when it
/// renders, so several changes between two renders produce a single write.
#[derive(Clone, Debug)]
pub struct LedState {
    on_color: Color,
    off_color: Color,
    mode: LedMode,
    interval: Duration,
    signaled: bool,
}

impl Default for LedState {
    fn default() -> Self {
        LedState {
            on_color: WHITE,
            off_color: BLACK,
            mode: LedMode::Off,
            interval: Duration::from_millis(100),
            signaled: true,
        }
    }
}

impl LedState {
    pub fn on_color(&self) -> Color {
        self.on_color
    }

    pub fn off_color(&self) -> Color {
        self.off_color
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_on_color(&mut self, on_color: Color) {
        self.on_color = on_color;
        self.signaled = true;
    }

    pub fn set_off_color(&mut self, off_color: Color) {
        self.off_color = off_color;
        self.signaled = true;
    }

    pub fn set_mode(&mut self, mode: LedMode) {
        self.mode = mode;
        self.signaled = true;
    }

    /// Sets the blink half-period. Zero is clamped to one millisecond.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
        self.signaled = true;
    }

    pub fn reset(&mut self) {
        self.set_mode(LedMode::Off);
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// Clears the change signal, returning whether it was raised.
    pub fn take_signal(&mut self) -> bool {
        std::mem::replace(&mut self.signaled, false)
    }

    /// The colour to show `elapsed` after the animation epoch.
    pub fn color_at(&self, elapsed: Duration) -> Color {
        match self.mode {
            LedMode::Off | LedMode::Pulse => self.off_color,
            LedMode::On => self.on_color,
            LedMode::Blink => {
                let half_periods = elapsed.as_nanos() / self.interval.as_nanos();
                if half_periods % 2 == 1 { self.on_color } else { self.off_color }
            }
        }
    }
}

/// Renders the indicator states to the hardware.
///
/// A slot is written when its signal is raised, or on every `blink_tick` while it
/// blinks. Idle slots are never rewritten.
#[derive(Debug)]
pub struct LedAnimator {
    epoch: Instant,
    blink_tick: Duration,
    last_write: [Option<Instant>; SLOTS],
}

impl LedAnimator {
    pub fn new(epoch: Instant, blink_tick: Duration) -> Self {
        LedAnimator {
            epoch,
            blink_tick,
            last_write: [None; SLOTS],
        }
    }

    /// Renders every slot that is due at `now`.
    pub fn render(
        &mut self,
        now: Instant,
        leds: &mut [LedState; SLOTS],
        indicators: &mut dyn Indicators,
    ) -> DialResult<()> {
        let elapsed = now.saturating_duration_since(self.epoch);

        for (slot, led) in leds.iter_mut().enumerate() {
            let signaled = led.take_signal();
            let blink_due = led.mode() == LedMode::Blink
                && self.last_write[slot]
                    .is_none_or(|last| now.saturating_duration_since(last) >= self.blink_tick);

            if signaled || blink_due {
                indicators.write(slot, led.color_at(elapsed))?;
                self.last_write[slot] = Some(now);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = RGB8 { r: 255, g: 0, b: 0 };
    const DIM: Color = RGB8 { r: 0, g: 32, b: 32 };

    #[derive(Default)]
    struct Recorder(Vec<(usize, Color)>);

    impl Indicators for Recorder {
        fn write(&mut self, slot: usize, color: Color) -> DialResult<()> {
            self.0.push((slot, color));
            Ok(())
        }
    }

    fn leds() -> [LedState; SLOTS] {
        std::array::from_fn(|_| LedState::default())
    }

    #[test]
    fn every_setter_raises_the_signal() {
        let mut led = LedState::default();
        assert!(led.take_signal());
        assert!(!led.is_signaled());

        led.set_on_color(RED);
        assert!(led.take_signal());
        led.set_off_color(DIM);
        assert!(led.take_signal());
        led.set_mode(LedMode::On);
        assert!(led.take_signal());
        assert!(!led.take_signal());
    }

    #[test]
    fn blink_alternates_every_interval() {
        let mut led = LedState::default();
        led.set_on_color(RED);
        led.set_off_color(DIM);
        led.set_mode(LedMode::Blink);

        let ms = Duration::from_millis;
        assert_eq!(led.color_at(ms(50)), DIM);
        assert_eq!(led.color_at(ms(150)), RED);
        assert_eq!(led.color_at(ms(250)), DIM);
        assert_eq!(led.color_at(ms(350)), RED);
    }

    #[test]
    fn pulse_renders_as_off() {
        let mut led = LedState::default();
        led.set_on_color(RED);
        led.set_off_color(DIM);
        led.set_mode(LedMode::Pulse);
        assert_eq!(led.color_at(Duration::from_millis(150)), DIM);
    }

    #[test]
    fn idle_slots_are_written_once() {
        let epoch = Instant::now();
        let mut animator = LedAnimator::new(epoch, Duration::from_millis(1));
        let mut leds = leds();
        let mut out = Recorder::default();

        animator.render(epoch, &mut leds, &mut out).unwrap();
        assert_eq!(out.0.len(), SLOTS);

        out.0.clear();
        animator.render(epoch + Duration::from_millis(5), &mut leds, &mut out).unwrap();
        assert!(out.0.is_empty());
    }

    #[test]
    fn changes_before_a_render_coalesce() {
        let epoch = Instant::now();
        let mut animator = LedAnimator::new(epoch, Duration::from_millis(1));
        let mut leds = leds();
        let mut out = Recorder::default();
        animator.render(epoch, &mut leds, &mut out).unwrap();
        out.0.clear();

        leds[4].set_on_color(RED);
        leds[4].set_mode(LedMode::On);
        animator.render(epoch + Duration::from_millis(1), &mut leds, &mut out).unwrap();

        assert_eq!(out.0, vec![(4, RED)]);
    }

    #[test]
    fn blinking_slots_are_rewritten_on_the_tick() {
        let epoch = Instant::now();
        let mut animator = LedAnimator::new(epoch, Duration::from_millis(10));
        let mut leds = leds();
        let mut out = Recorder::default();
        leds[0].set_on_color(RED);
        leds[0].set_mode(LedMode::Blink);
        animator.render(epoch, &mut leds, &mut out).unwrap();
        out.0.clear();

        animator.render(epoch + Duration::from_millis(5), &mut leds, &mut out).unwrap();
        assert!(out.0.is_empty());

        animator.render(epoch + Duration::from_millis(110), &mut leds, &mut out).unwrap();
        assert_eq!(out.0, vec![(0, RED)]);
    }
}
