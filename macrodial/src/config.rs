//! The JSON config file: timings and the ordinary pages with their slot bindings.

use crate::SLOTS;
use crate::action::AxisBindings;
use crate::app::Settings;
use crate::builtin;
use crate::error::{DialError, DialResult};
use crate::key::KeySettings;
use crate::page::Page;
use dotenv::var;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Idle time before the panel goes to sleep.
    pub sleep_seconds: u32,
    pub blink_interval_ms: u64,
    pub blink_tick_ms: u64,
    /// Pause between two dispatcher ticks.
    pub tick_ms: u64,
    pub selection_title: String,
    /// Ordinary pages, in selection order.
    pub pages: Vec<PageConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub title: String,
    #[serde(default)]
    pub layout: PageLayout,
    #[serde(default)]
    pub keys: Vec<SlotConfig>,
    /// Jog bindings, only used by [PageLayout::JogDial].
    #[serde(default)]
    pub jog: AxisBindings,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    #[default]
    Buttons,
    JogDial,
}

/// Settings of one bound slot. Slots left out stay unbound.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SlotConfig {
    pub slot: usize,
    #[serde(flatten)]
    pub settings: KeySettings,
}

impl SlotConfig {
    pub fn new(slot: usize, settings: KeySettings) -> Self {
        SlotConfig { slot, settings }
    }
}

fn config_path() -> PathBuf {
    let config_str = var_os("CONFIG_FILE");
    let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("config.json"));
    Path::new(config_str).to_path_buf()
}

impl Config {
    /// Loads the config file, `Ok(None)` if there is none. A file that does not
    /// parse is an error rather than a silent fallback to the defaults.
    pub fn try_load() -> DialResult<Option<Self>> {
        let config_path = config_path();
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    pub fn save(&self) -> DialResult<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let file = std::fs::File::create(Path::new(&config_str))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            sleep_time: time::Duration::seconds(self.sleep_seconds.into()),
            blink_interval: Duration::from_millis(self.blink_interval_ms),
            blink_tick: Duration::from_millis(self.blink_tick_ms),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn build_pages(&self) -> DialResult<Vec<Page>> {
        if self.pages.is_empty() {
            return Err(DialError::NoPages);
        }
        self.pages.iter().map(PageConfig::build).collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sleep_seconds: 15 * 60,
            blink_interval_ms: 100,
            blink_tick_ms: 1,
            tick_ms: 1,
            selection_title: "Selection".to_string(),
            pages: builtin::cnc_pages(),
        }
    }
}

impl PageConfig {
    /// Builds the page, rejecting slots that are out of range or bound twice.
    pub fn build(&self) -> DialResult<Page> {
        let mut keys: [KeySettings; SLOTS] = Default::default();
        let mut bound = [false; SLOTS];
        for slot in &self.keys {
            if slot.slot >= SLOTS {
                return Err(DialError::InvalidSlot(slot.slot));
            }
            if std::mem::replace(&mut bound[slot.slot], true) {
                return Err(DialError::DuplicateSlot {
                    page: self.title.clone(),
                    slot: slot.slot,
                });
            }
            keys[slot.slot] = slot.settings.clone();
        }

        Ok(match self.layout {
            PageLayout::Buttons => Page::buttons(&self.title, keys),
            PageLayout::JogDial => Page::jog_dial(&self.title, keys, self.jog.clone()),
        })
    }
}
