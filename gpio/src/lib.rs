//! GPIO abstraction for the macrodial hardware.
//!
//! The traits here are implemented by the [gpiod] backend on real hardware and by
//! simple in-memory pins in tests. Everything built on top of them (the keypad
//! matrix, the rotary encoders, the debounced switch and the character LCD) only
//! talks to these traits.
pub mod gpiod;
pub mod lcd;
pub mod debounce;
pub mod keypad;
pub mod rotenc;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO lines available.
    fn count(&self) -> GpioResult<usize>;

    /// Gets the GPIO pin at the given index.
    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>>;

    /// Gets a bus of GPIO pins at the given indices, in order.
    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>>;
}

/// Specifies the active level of a GPIO line.
///
/// Keypad rows and the encoder switch are wired to ground, so they are read as
/// active-low.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

impl GpioActiveLevel {
    /// Gets the electrical state for a logical `value`.
    pub fn get_state(&self, value: bool) -> bool {
        match self {
            GpioActiveLevel::High => value,
            GpioActiveLevel::Low => !value,
        }
    }
}

/// Specifies the bias (pull resistor) of a GPIO line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioBias {
    #[default] None,
    PullUp,
    PullDown,
}

/// Specifies how an output line drives its levels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioDriveMode {
    /// Driven high or low with low impedance.
    #[default] PushPull,
    /// Driven low or left floating when high. Keypad columns use this so two
    /// keys pressed on one row never short two columns together.
    OpenDrain,
    /// Driven high or left floating when low.
    OpenSource,
}

/// Line settings shared by single pins and buses.
///
/// Backends that cannot change a setting return [GpioError::NotSupported].
pub trait GpioLineConfig {
    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }

    fn bias(&self) -> GpioBias {
        GpioBias::None
    }
    fn set_bias(&mut self, _bias: GpioBias) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }

    fn drive_mode(&self) -> GpioDriveMode {
        GpioDriveMode::PushPull
    }
    fn set_drive_mode(&mut self, _mode: GpioDriveMode) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioPin: GpioLineConfig + Debug {
    /// Requests the pin as an input.
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>>;
    /// Requests the pin as an output.
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>>;
}

pub trait GpioInput: Debug {
    /// Reads the logical state of the pin.
    fn read(&self) -> GpioResult<bool>;
}

pub trait GpioOutput: Debug {
    /// Writes the logical state of the pin.
    fn write(&self, value: bool) -> GpioResult<()>;
}

pub trait GpioBus<const N: usize>: GpioLineConfig + Debug {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>>;
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>>;
}

pub trait GpioBusInput<const N: usize>: Debug {
    fn read(&self) -> GpioResult<[bool; N]>;
}

pub trait GpioBusOutput<const N: usize>: Debug {
    fn write(&self, values: &[bool; N]) -> GpioResult<()>;
}

impl dyn GpioBusOutput<4> + '_ {
    /// Writes a nibble to the bus, LSb on the first line.
    pub fn write_nibble(&self, value: u8) -> GpioResult<()> {
        if value > 0b1111 {
            return Err(GpioError::InvalidArgument);
        }

        let values = std::array::from_fn(|i| value & (1 << i) != 0);
        self.write(&values)
    }
}

/// Writes a single active line on a bus, all others inactive.
pub fn write_one_hot<const N: usize>(bus: &dyn GpioBusOutput<N>, active: usize) -> GpioResult<()> {
    if active >= N {
        return Err(GpioError::InvalidArgument);
    }
    let values = std::array::from_fn(|i| i == active);
    bus.write(&values)
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory lines for driver tests.
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Default)]
    pub struct FakeInput(pub Cell<bool>);

    impl GpioInput for FakeInput {
        fn read(&self) -> GpioResult<bool> {
            Ok(self.0.get())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeOutput(pub RefCell<Vec<bool>>);

    impl GpioOutput for FakeOutput {
        fn write(&self, value: bool) -> GpioResult<()> {
            self.0.borrow_mut().push(value);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeBusOutput<const N: usize>(pub RefCell<Vec<[bool; N]>>);

    impl<const N: usize> GpioBusOutput<N> for FakeBusOutput<N> {
        fn write(&self, values: &[bool; N]) -> GpioResult<()> {
            self.0.borrow_mut().push(*values);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBusOutput;
    use super::*;

    #[test]
    fn nibble_is_written_lsb_first() {
        let bus = FakeBusOutput::<4>::default();
        let output: &dyn GpioBusOutput<4> = &bus;
        output.write_nibble(0b0110).unwrap();
        assert_eq!(bus.0.borrow()[0], [false, true, true, false]);
        assert_eq!(output.write_nibble(0x10), Err(GpioError::InvalidArgument));
    }

    #[test]
    fn one_hot_drives_a_single_line() {
        let bus = FakeBusOutput::<3>::default();
        write_one_hot(&bus, 2).unwrap();
        assert_eq!(bus.0.borrow()[0], [false, false, true]);
        assert_eq!(write_one_hot(&bus, 3), Err(GpioError::InvalidArgument));
    }
}
