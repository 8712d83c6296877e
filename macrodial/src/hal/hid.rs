//! USB HID boot keyboard output through a Linux gadget device.

use crate::action::Keycode;
use crate::error::DialResult;
use crate::hal::ActionSink;
use log::{trace, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Non-modifier keys a boot report can carry.
pub const REPORT_KEYS: usize = 6;

/// Builds the 8-byte boot keyboard report for `keys` held together.
///
/// Keys beyond the sixth non-modifier are dropped.
pub fn report_for(keys: &[Keycode]) -> [u8; 8] {
    let mut report = [0u8; 8];
    let mut next = 2;
    for &key in keys {
        match key.modifier_bit() {
            Some(bit) => report[0] |= bit,
            None if next < report.len() => {
                if !report[2..next].contains(&key.usage()) {
                    report[next] = key.usage();
                    next += 1;
                }
            }
            None => warn!("More than {} keys held, dropping {:?}.", REPORT_KEYS, key),
        }
    }
    report
}

/// Keyboard writing boot reports to `device`, usually `/dev/hidg0`.
///
/// Keys pressed with [ActionSink::press] stay in every following report until
/// [ActionSink::release_all].
#[derive(Debug)]
pub struct HidKeyboard<W: Write> {
    device: W,
    held: Vec<Keycode>,
}

impl HidKeyboard<File> {
    pub fn open(path: impl AsRef<Path>) -> DialResult<Self> {
        let device = OpenOptions::new().write(true).open(path)?;
        Ok(Self::new(device))
    }
}

impl<W: Write> HidKeyboard<W> {
    pub fn new(device: W) -> Self {
        HidKeyboard { device, held: Vec::new() }
    }

    pub fn held(&self) -> &[Keycode] {
        &self.held
    }

    pub fn into_inner(self) -> W {
        self.device
    }
}

fn write_report(device: &mut impl Write, keys: &[Keycode]) -> DialResult<()> {
    let report = report_for(keys);
    trace!("HID report {:02x?}", report);
    device.write_all(&report)?;
    device.flush()?;
    Ok(())
}

impl<W: Write> ActionSink for HidKeyboard<W> {
    fn send(&mut self, keys: &[Keycode]) -> DialResult<()> {
        let combined: Vec<Keycode> = self.held.iter().chain(keys).copied().collect();
        write_report(&mut self.device, &combined)?;
        write_report(&mut self.device, &self.held)
    }

    fn press(&mut self, keys: &[Keycode]) -> DialResult<()> {
        for &key in keys {
            if !self.held.contains(&key) {
                self.held.push(key);
            }
        }
        write_report(&mut self.device, &self.held)
    }

    fn release_all(&mut self) -> DialResult<()> {
        self.held.clear();
        write_report(&mut self.device, &[])
    }
}
