use crate::{GpioInput, GpioResult};

/// Represents the direction of one detent of rotation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RotEncRotation {
    Clockwise,
    CounterClockwise,
}

impl RotEncRotation {
    /// `+1` for clockwise, `-1` for counter-clockwise.
    pub fn signum(self) -> i32 {
        match self {
            RotEncRotation::Clockwise => 1,
            RotEncRotation::CounterClockwise => -1,
        }
    }
}

/// A quadrature rotary encoder decoder that keeps an absolute detent count.
///
/// It has to be polled often enough to see every quadrature state. Does not handle
/// the push switch; see [crate::debounce::TimedDebounce] for that.
#[derive(Debug)]
pub struct RotEnc<'a> {
    pub pin_a: &'a dyn GpioInput,
    pub pin_b: &'a dyn GpioInput,
    state: (bool, bool),
    ticks_per_detent: u8,
    tick_count: i8,
    /// Reads after which an incomplete detent is discarded.
    reading_limit: u32,
    reads_since_tick: Option<u32>,
    reversed: bool,
    position: i32,
}

impl<'a> RotEnc<'a> {
    const STATES_CLOCKWISE: [(bool, bool); 4] = [
        (false, false),
        (true, false),
        (true, true),
        (false, true),
    ];

    pub fn new(pin_a: &'a dyn GpioInput, pin_b: &'a dyn GpioInput) -> Self {
        let mut rot_enc = RotEnc {
            pin_a,
            pin_b,
            state: (false, false),
            ticks_per_detent: 2,
            tick_count: 0,
            reading_limit: 200,
            reads_since_tick: None,
            reversed: false,
            position: 0,
        };
        rot_enc.state = rot_enc.read_raw().unwrap_or((false, false));
        rot_enc
    }

    /// Sets how many quadrature transitions make up one detent.
    pub fn with_ticks_per_detent(mut self, ticks: u8) -> Self {
        self.ticks_per_detent = ticks.clamp(1, i8::MAX as u8);
        self
    }

    /// Swaps the rotation direction, for encoders wired the other way around.
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn read_raw(&self) -> GpioResult<(bool, bool)> {
        let a = self.pin_a.read()?;
        let b = self.pin_b.read()?;
        Ok((a, b))
    }

    /// Samples the pins and returns a rotation if a full detent was completed.
    ///
    /// Also advances [Self::position].
    pub fn read(&mut self) -> GpioResult<Option<RotEncRotation>> {
        let previous_state = self.state;
        let current_state = self.read_raw()?;
        self.state = current_state;

        if let Some(reads) = self.reads_since_tick.as_mut() {
            *reads += 1;
            if *reads >= self.reading_limit {
                self.reads_since_tick = None;
                self.tick_count = 0;
            }
        }

        if current_state == previous_state {
            return Ok(None);
        }

        let len = Self::STATES_CLOCKWISE.len();
        let previous_index = Self::STATES_CLOCKWISE.iter().position(|&s| s == previous_state);
        let current_index = Self::STATES_CLOCKWISE.iter().position(|&s| s == current_state);

        if let (Some(prev_idx), Some(curr_idx)) = (previous_index, current_index) {
            if (prev_idx + 1) % len == curr_idx {
                self.tick_count += 1;
                self.reads_since_tick = Some(0);
            } else if (curr_idx + 1) % len == prev_idx {
                self.tick_count -= 1;
                self.reads_since_tick = Some(0);
            }
        }

        let detent = self.ticks_per_detent as i8;
        let rotation = if self.tick_count >= detent {
            Some(RotEncRotation::Clockwise)
        } else if self.tick_count <= -detent {
            Some(RotEncRotation::CounterClockwise)
        } else {
            None
        };

        let rotation = rotation.map(|rotation| {
            self.tick_count = 0;
            self.reads_since_tick = None;
            match (rotation, self.reversed) {
                (r, false) => r,
                (RotEncRotation::Clockwise, true) => RotEncRotation::CounterClockwise,
                (RotEncRotation::CounterClockwise, true) => RotEncRotation::Clockwise,
            }
        });

        if let Some(rotation) = rotation {
            self.position += rotation.signum();
        }

        Ok(rotation)
    }

    /// Polls the encoder and returns the absolute detent count.
    pub fn update(&mut self) -> GpioResult<i32> {
        self.read()?;
        Ok(self.position)
    }

    /// The absolute detent count since construction.
    pub fn position(&self) -> i32 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeInput;

    fn step(a: &FakeInput, b: &FakeInput, enc: &mut RotEnc, state: (bool, bool)) -> Option<RotEncRotation> {
        a.0.set(state.0);
        b.0.set(state.1);
        enc.read().unwrap()
    }

    #[test]
    fn two_transitions_make_a_detent() {
        let a = FakeInput::default();
        let b = FakeInput::default();
        let mut enc = RotEnc::new(&a, &b);

        assert_eq!(step(&a, &b, &mut enc, (true, false)), None);
        assert_eq!(step(&a, &b, &mut enc, (true, true)), Some(RotEncRotation::Clockwise));
        assert_eq!(enc.position(), 1);

        assert_eq!(step(&a, &b, &mut enc, (true, false)), None);
        assert_eq!(step(&a, &b, &mut enc, (false, false)), Some(RotEncRotation::CounterClockwise));
        assert_eq!(step(&a, &b, &mut enc, (false, true)), None);
        assert_eq!(step(&a, &b, &mut enc, (true, true)), Some(RotEncRotation::CounterClockwise));
        assert_eq!(enc.position(), -1);
    }

    #[test]
    fn reversed_encoder_counts_the_other_way() {
        let a = FakeInput::default();
        let b = FakeInput::default();
        let mut enc = RotEnc::new(&a, &b).with_reversed(true);

        step(&a, &b, &mut enc, (true, false));
        step(&a, &b, &mut enc, (true, true));
        assert_eq!(enc.update().unwrap(), -1);
    }

    #[test]
    fn incomplete_detent_expires() {
        let a = FakeInput::default();
        let b = FakeInput::default();
        let mut enc = RotEnc::new(&a, &b);

        step(&a, &b, &mut enc, (true, false));
        for _ in 0..200 {
            enc.read().unwrap();
        }
        assert_eq!(step(&a, &b, &mut enc, (true, true)), None);
        assert_eq!(enc.position(), 0);
    }
}
