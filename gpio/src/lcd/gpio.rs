use crate::lcd::CharLcd;
use crate::{GpioBusOutput, GpioOutput, GpioResult};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::Duration;

/// HD44780 driver over a 4-bit data bus, write-only (RW tied low).
pub struct GpioCharLcd<'a> {
    pin_e: &'a dyn GpioOutput,
    pin_rs: &'a dyn GpioOutput,
    data_bus: &'a dyn GpioBusOutput<4>,
    rows: usize,
    columns: usize,
}

impl Debug for GpioCharLcd<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioCharLcd({}x{}, {:?})", self.columns, self.rows, self.data_bus)
    }
}

impl<'a> GpioCharLcd<'a> {
    pub fn new_4bit(
        pin_e: &'a dyn GpioOutput,
        pin_rs: &'a dyn GpioOutput,
        data_bus: &'a dyn GpioBusOutput<4>,
        columns: usize,
        rows: usize,
    ) -> Self {
        GpioCharLcd { pin_e, pin_rs, data_bus, rows, columns }
    }

    fn pulse_e(&self) -> GpioResult<()> {
        self.pin_e.write(true)?;
        sleep(Duration::from_micros(1));
        self.pin_e.write(false)?;
        // Most instructions take 37 us; clear and home take up to 1.52 ms.
        sleep(Duration::from_micros(50));
        Ok(())
    }

    fn write_nibble(&self, nibble: u8) -> GpioResult<()> {
        self.data_bus.write_nibble(nibble & 0x0F)?;
        self.pulse_e()
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);
        self.pin_rs.write(rs)?;
        self.write_nibble(data >> 4)?;
        self.write_nibble(data)
    }
}

impl CharLcd for GpioCharLcd<'_> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn init(&mut self) -> GpioResult<()> {
        self.pin_rs.write(false)?;
        // Reset sequence into 4-bit mode.
        for nibble in [0b0011, 0b0011, 0b0011, 0b0010] {
            self.write_nibble(nibble)?;
            sleep(Duration::from_millis(5));
        }
        // Function set: 4-bit, two lines, 5x8 font.
        self.send_command(0b0010_1000)?;
        // Display on, cursor off, blink off.
        self.send_command(0b0000_1100)?;
        self.clear_display()?;
        // Entry mode: cursor moves right, no shift.
        self.send_command(0b0000_0110)
    }

    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(0b0000_0001)?;
        sleep(Duration::from_millis(2));
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }
}
