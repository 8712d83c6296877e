//! [GpiodDriver], backed by the Linux GPIO character device through the gpiod crate.
use crate::{
    GpioActiveLevel, GpioBias, GpioBus, GpioBusInput, GpioBusOutput, GpioDriveMode, GpioDriver,
    GpioError, GpioInput, GpioLineConfig, GpioOutput, GpioPin, GpioResult,
};
use bitvec::vec::BitVec;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::atomic::AtomicU8;

/// GPIO driver over one gpiochip. Tracks which lines are claimed so a line is never
/// handed out twice.
pub struct GpiodDriver {
    chip: gpiod::Chip,
    used_lines: BitVec<AtomicU8>,
}

impl GpiodDriver {
    pub fn new(chip: gpiod::Chip) -> Self {
        let n = chip.num_lines() as usize;
        Self {
            chip,
            used_lines: BitVec::repeat(false, n),
        }
    }

    /// Opens the chip at `path`, e.g. `/dev/gpiochip0`.
    pub fn open(path: impl AsRef<Path>) -> GpioResult<Self> {
        Ok(Self::new(gpiod::Chip::new(path.as_ref())?))
    }

    fn claim(&self, indices: &[usize]) -> GpioResult<()> {
        let n = self.count()?;
        if indices.iter().any(|&index| index >= n) {
            return Err(GpioError::InvalidArgument);
        }
        if indices.iter().any(|&index| self.used_lines[index]) {
            return Err(GpioError::AlreadyInUse);
        }
        for &index in indices {
            self.used_lines.set_aliased(index, true);
        }
        Ok(())
    }

    fn release(&self, indices: &[usize]) {
        for &index in indices {
            self.used_lines.set_aliased(index, false);
        }
    }
}

impl Debug for GpiodDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpiodDriver({})", self.chip.name())
    }
}

impl GpioDriver for GpiodDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(self.chip.num_lines() as usize)
    }

    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>> {
        self.claim(&[index])?;
        Ok(Box::new(GpiodLines::new(self, [index])))
    }

    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>> {
        self.claim(&indices)?;
        Ok(Box::new(GpiodLines::new(self, indices)))
    }
}

impl From<GpioActiveLevel> for gpiod::Active {
    fn from(level: GpioActiveLevel) -> Self {
        match level {
            GpioActiveLevel::High => gpiod::Active::High,
            GpioActiveLevel::Low => gpiod::Active::Low,
        }
    }
}

impl From<GpioBias> for gpiod::Bias {
    fn from(bias: GpioBias) -> Self {
        match bias {
            GpioBias::None => gpiod::Bias::Disable,
            GpioBias::PullUp => gpiod::Bias::PullUp,
            GpioBias::PullDown => gpiod::Bias::PullDown,
        }
    }
}

impl From<GpioDriveMode> for gpiod::Drive {
    fn from(mode: GpioDriveMode) -> Self {
        match mode {
            GpioDriveMode::PushPull => gpiod::Drive::PushPull,
            GpioDriveMode::OpenDrain => gpiod::Drive::OpenDrain,
            GpioDriveMode::OpenSource => gpiod::Drive::OpenSource,
        }
    }
}

/// A claimed set of lines. A single pin is a set of one.
struct GpiodLines<'a, const N: usize> {
    driver: &'a GpiodDriver,
    indices: [usize; N],
    active_level: GpioActiveLevel,
    bias: GpioBias,
    drive_mode: GpioDriveMode,
}

impl<'a, const N: usize> GpiodLines<'a, N> {
    fn new(driver: &'a GpiodDriver, indices: [usize; N]) -> Self {
        Self {
            driver,
            indices,
            active_level: GpioActiveLevel::High,
            bias: GpioBias::None,
            drive_mode: GpioDriveMode::PushPull,
        }
    }

    fn offsets(&self) -> Vec<u32> {
        self.indices.iter().map(|&index| index as u32).collect()
    }

    fn request_input(&self) -> GpioResult<gpiod::Lines<gpiod::Input>> {
        let options = gpiod::Options::input(self.offsets())
            .consumer(env!("CARGO_PKG_NAME"))
            .active(self.active_level.into())
            .bias(self.bias.into());
        Ok(self.driver.chip.request_lines(options)?)
    }

    fn request_output(&self) -> GpioResult<gpiod::Lines<gpiod::Output>> {
        let options = gpiod::Options::output(self.offsets())
            .consumer(env!("CARGO_PKG_NAME"))
            .active(self.active_level.into())
            .bias(self.bias.into())
            .drive(self.drive_mode.into());
        Ok(self.driver.chip.request_lines(options)?)
    }
}

impl<const N: usize> Debug for GpiodLines<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}", self.driver, self.indices)
    }
}

impl<const N: usize> Drop for GpiodLines<'_, N> {
    fn drop(&mut self) {
        self.driver.release(&self.indices);
    }
}

impl<const N: usize> GpioLineConfig for GpiodLines<'_, N> {
    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }

    fn bias(&self) -> GpioBias {
        self.bias
    }

    fn set_bias(&mut self, bias: GpioBias) -> GpioResult<()> {
        self.bias = bias;
        Ok(())
    }

    fn drive_mode(&self) -> GpioDriveMode {
        self.drive_mode
    }

    fn set_drive_mode(&mut self, mode: GpioDriveMode) -> GpioResult<()> {
        self.drive_mode = mode;
        Ok(())
    }
}

impl GpioPin for GpiodLines<'_, 1> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>> {
        let lines = self.request_input()?;
        Ok(Box::new(Requested { owner: &*self, lines }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>> {
        let lines = self.request_output()?;
        Ok(Box::new(Requested { owner: &*self, lines }))
    }
}

impl<const N: usize> GpioBus<N> for GpiodLines<'_, N> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>> {
        let lines = self.request_input()?;
        Ok(Box::new(Requested { owner: &*self, lines }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>> {
        let lines = self.request_output()?;
        Ok(Box::new(Requested { owner: &*self, lines }))
    }
}

/// Lines requested from the kernel in one direction.
struct Requested<'a, const N: usize, D> {
    owner: &'a GpiodLines<'a, N>,
    lines: gpiod::Lines<D>,
}

impl<const N: usize, D> Debug for Requested<'_, N, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[requested]", self.owner)
    }
}

impl GpioInput for Requested<'_, 1, gpiod::Input> {
    fn read(&self) -> GpioResult<bool> {
        let [value] = self.lines.get_values([false])?;
        Ok(value)
    }
}

impl GpioOutput for Requested<'_, 1, gpiod::Output> {
    fn write(&self, value: bool) -> GpioResult<()> {
        self.lines.set_values([value])?;
        Ok(())
    }
}

impl<const N: usize> GpioBusInput<N> for Requested<'_, N, gpiod::Input> {
    fn read(&self) -> GpioResult<[bool; N]> {
        Ok(self.lines.get_values([false; N])?)
    }
}

impl<const N: usize> GpioBusOutput<N> for Requested<'_, N, gpiod::Output> {
    fn write(&self, values: &[bool; N]) -> GpioResult<()> {
        self.lines.set_values(*values)?;
        Ok(())
    }
}
