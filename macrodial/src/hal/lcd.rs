//! [Display] on a character LCD.

use crate::error::DialResult;
use crate::hal::Display;
use crate::surface::Surface;
use log::trace;
use macrodial_gpio::lcd::CharLcd;

/// Draws surfaces on a [CharLcd], rewriting only the rows that changed.
#[derive(Debug)]
pub struct LcdDisplay<'a> {
    lcd: &'a mut dyn CharLcd,
    shown: Vec<String>,
}

impl<'a> LcdDisplay<'a> {
    /// Wraps an initialized `lcd`, which is assumed to be blank.
    pub fn new(lcd: &'a mut dyn CharLcd) -> Self {
        let shown = vec![" ".repeat(lcd.columns()); lcd.rows()];
        LcdDisplay { lcd, shown }
    }
}

impl Display for LcdDisplay<'_> {
    fn show(&mut self, surface: &Surface) -> DialResult<()> {
        let lines = surface.to_lines(self.lcd.columns(), self.lcd.rows());
        for (row, line) in lines.iter().enumerate() {
            if self.shown.get(row) == Some(line) {
                continue;
            }
            trace!("LCD row {}: {:?}", row, line);
            self.lcd.set_cursor(row, 0)?;
            self.lcd.print(line)?;
        }
        self.shown = lines;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrodial_gpio::GpioResult;

    /// Records the text written to each row.
    #[derive(Debug, Default)]
    struct TextLcd {
        cursor: usize,
        rows: Vec<String>,
        commands: usize,
    }

    impl CharLcd for TextLcd {
        fn rows(&self) -> usize {
            2
        }

        fn columns(&self) -> usize {
            8
        }

        fn init(&mut self) -> GpioResult<()> {
            Ok(())
        }

        fn set_cursor(&mut self, row: usize, _col: usize) -> GpioResult<()> {
            self.cursor = row;
            self.commands += 1;
            Ok(())
        }

        fn send_command(&mut self, _command: u8) -> GpioResult<()> {
            Ok(())
        }

        fn send_data(&mut self, data: u8) -> GpioResult<()> {
            self.rows.resize(2, String::new());
            self.rows[self.cursor].push(data as char);
            Ok(())
        }
    }

    #[test]
    fn only_changed_rows_are_rewritten() {
        let mut lcd = TextLcd::default();
        let mut display = LcdDisplay::new(&mut lcd);

        let mut surface = Surface::titled(Some("Select"));
        surface.label = Some("Probe".into());
        display.show(&surface).unwrap();

        surface.label = Some("Rapids".into());
        display.show(&surface).unwrap();
        drop(display);

        assert_eq!(lcd.rows[0], " Select ");
        assert_eq!(lcd.rows[1], " Probe   Rapids ");
        assert_eq!(lcd.commands, 3);
    }
}
