use std::fmt::{Debug, Formatter};
use crate::{write_one_hot, GpioBusInput, GpioBusOutput, GpioResult};
use crate::keypad::Keypad;

/// Columns of the key matrix.
pub const KEYPAD_COLS: usize = 3;
/// Rows of the key matrix.
pub const KEYPAD_ROWS: usize = 4;
/// Keys on the matrix, numbered row by row from the top left.
pub const KEYPAD_KEYS: usize = KEYPAD_COLS * KEYPAD_ROWS;

/// A GPIO-scanned 3x4 key matrix.
///
/// Each column is driven active in turn while the rows are read. Key `n` sits at
/// column `n % 3`, row `n / 3`.
pub struct GpioKeypad<'a> {
    cols: &'a dyn GpioBusOutput<KEYPAD_COLS>,
    rows: &'a dyn GpioBusInput<KEYPAD_ROWS>,
}

impl Debug for GpioKeypad<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioKeypad({:?}, {:?})", self.cols, self.rows)
    }
}

impl <'a> GpioKeypad<'a> {
    pub fn new(
        cols: &'a dyn GpioBusOutput<KEYPAD_COLS>,
        rows: &'a dyn GpioBusInput<KEYPAD_ROWS>,
    ) -> Self {
        GpioKeypad { cols, rows }
    }
}

impl Keypad for GpioKeypad<'_> {
    type Key = usize;

    fn read(&self) -> GpioResult<Vec<usize>> {
        let mut pressed = Vec::new();

        for col in 0..KEYPAD_COLS {
            write_one_hot(self.cols, col)?;
            let rows = self.rows.read()?;
            for (row, &active) in rows.iter().enumerate() {
                if active {
                    pressed.push(row * KEYPAD_COLS + col);
                }
            }
        }

        pressed.sort_unstable();
        Ok(pressed)
    }
}
