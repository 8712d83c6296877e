//! HD44780-compatible character LCDs.
mod gpio;

use crate::{GpioError, GpioResult};
pub use gpio::*;
use std::fmt::Debug;

/// A character LCD driven through the HD44780 instruction set.
pub trait CharLcd: Debug {
    /// Number of text rows.
    fn rows(&self) -> usize;
    /// Number of characters per row.
    fn columns(&self) -> usize;

    /// Initializes the controller: interface width, two-line mode, display on, cursor off.
    fn init(&mut self) -> GpioResult<()>;

    /// Clears the display and moves the cursor home.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(0b0000_0001)
    }

    /// Moves the cursor to `row`, `col`.
    fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()> {
        // DDRAM row offsets of the common 20x4 and 16x2 modules.
        const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
        if row >= self.rows().min(ROW_OFFSETS.len()) || col >= self.columns() {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(0b1000_0000 | (ROW_OFFSETS[row] + col as u8))
    }

    /// Prints ASCII text at the cursor, replacing anything else with `?`.
    fn print(&mut self, text: &str) -> GpioResult<()> {
        for c in text.chars() {
            let byte = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' };
            self.send_data(byte)?;
        }
        Ok(())
    }

    /// Sends an instruction byte (RS low).
    fn send_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends a data byte (RS high).
    fn send_data(&mut self, data: u8) -> GpioResult<()>;
}
