//! Per-slot key configuration and runtime state.

use crate::action::Action;
use crate::led::{BLACK, Color, WHITE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How a key slot reacts to presses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum KeyMode {
    /// Unbound: no indicator feedback, no press action.
    #[default]
    None,
    Moment,
    /// Like [KeyMode::Moment], and fires the hold action once held long enough.
    LongMoment,
    Press,
}

/// Static configuration of one key slot on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub name: String,
    pub on_color: Color,
    pub off_color: Color,
    pub mode: KeyMode,
    pub on_press: Option<Action>,
    pub on_release: Option<Action>,
    pub on_hold: Option<Action>,
    #[serde(with = "millis")]
    pub long_moment_time: Duration,
}

impl Default for KeySettings {
    fn default() -> Self {
        KeySettings {
            name: String::new(),
            on_color: WHITE,
            off_color: BLACK,
            mode: KeyMode::None,
            on_press: None,
            on_release: None,
            on_hold: None,
            long_moment_time: Duration::from_secs(2),
        }
    }
}

impl KeySettings {
    pub fn new(name: &str, on_color: Color, off_color: Color, mode: KeyMode) -> Self {
        KeySettings {
            name: name.to_string(),
            on_color,
            off_color,
            mode,
            ..Default::default()
        }
    }

    pub fn on_press(mut self, action: Action) -> Self {
        self.on_press = Some(action);
        self
    }

    pub fn on_release(mut self, action: Action) -> Self {
        self.on_release = Some(action);
        self
    }

    pub fn on_hold(mut self, action: Action) -> Self {
        self.on_hold = Some(action);
        self
    }
}

/// Runtime state of one key slot.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    pub pressed: bool,
    pub press_time: Option<Instant>,
    pub press_duration: Duration,
    pub release_time: Option<Instant>,
    /// Whether the hold action already ran for the current press.
    pub hold_fired: bool,
}

impl KeyState {
    pub fn reset(&mut self) {
        *self = KeyState::default();
    }

    pub fn press(&mut self, now: Instant) {
        self.pressed = true;
        self.press_time = Some(now);
        self.press_duration = Duration::ZERO;
        self.release_time = None;
        self.hold_fired = false;
    }

    pub fn release(&mut self, now: Instant) {
        if let Some(pressed_at) = self.press_time {
            self.press_duration = now.saturating_duration_since(pressed_at);
        }
        self.pressed = false;
        self.release_time = Some(now);
    }

    /// How long the key has been held at `now`, zero when released.
    pub fn held_for(&self, now: Instant) -> Duration {
        match (self.pressed, self.press_time) {
            (true, Some(pressed_at)) => now.saturating_duration_since(pressed_at),
            _ => Duration::ZERO,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_records_press_duration() {
        let start = Instant::now();
        let mut key = KeyState::default();

        key.press(start);
        assert_eq!(key.held_for(start + Duration::from_millis(300)), Duration::from_millis(300));

        key.release(start + Duration::from_millis(500));
        assert!(!key.pressed);
        assert_eq!(key.press_duration, Duration::from_millis(500));
        assert_eq!(key.held_for(start + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: KeySettings = serde_json::from_str(
            r#"{"name": "Stop", "mode": "Moment", "on_color": {"r": 255, "g": 0, "b": 0}}"#,
        ).unwrap();

        assert_eq!(settings.name, "Stop");
        assert_eq!(settings.mode, KeyMode::Moment);
        assert_eq!(settings.off_color, BLACK);
        assert_eq!(settings.on_press, None);
        assert_eq!(settings.long_moment_time, Duration::from_secs(2));
    }
}
