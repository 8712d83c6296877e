//! Bindable actions and the keys they emit.
//!
//! Key slots and jog dial motion are bound to [Action] values rather than closures,
//! so bindings can be loaded from the config file and inspected in tests. Every
//! action that leaves the device goes through [Action::perform] and an
//! [ActionSink].

use crate::error::DialResult;
use crate::hal::ActionSink;
use log::warn;
use serde::{Deserialize, Serialize};

/// A keyboard key, numbered by its USB HID usage ID.
///
/// The four modifiers use the left-hand usages (`0xE0..=0xE3`).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Keycode {
    A = 0x04, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    One = 0x1E, Two, Three, Four, Five, Six, Seven, Eight, Nine, Zero,
    Enter = 0x28,
    Escape,
    Backspace,
    Tab,
    Space,
    Minus,
    Equals,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon = 0x33,
    Quote,
    GraveAccent,
    Comma,
    Period,
    Slash,
    F1 = 0x3A, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Insert = 0x49,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
    RightArrow,
    LeftArrow,
    DownArrow,
    UpArrow,
    Control = 0xE0,
    Shift,
    Alt,
    Gui,
}

impl Keycode {
    /// The HID usage ID.
    pub fn usage(self) -> u8 {
        self as u8
    }

    /// The bit of this key in the report's modifier byte, if it is a modifier.
    pub fn modifier_bit(self) -> Option<u8> {
        match self {
            Keycode::Control | Keycode::Shift | Keycode::Alt | Keycode::Gui => {
                Some(1 << (self.usage() - Keycode::Control.usage()))
            }
            _ => None,
        }
    }
}

/// A jog axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Press the combination and release it.
    Send(Vec<Keycode>),
    /// Press the combination and keep it held until [Action::ReleaseAll].
    Press(Vec<Keycode>),
    /// Release every held key.
    ReleaseAll,
    /// Send the combination `count` times.
    Repeat { keys: Vec<Keycode>, count: u32 },
    /// Toggle the jog axis. Only meaningful on jog dial pages.
    SelectAxis(Axis),
}

impl Action {
    pub fn send(keys: &[Keycode]) -> Self {
        Action::Send(keys.to_vec())
    }

    pub fn press(keys: &[Keycode]) -> Self {
        Action::Press(keys.to_vec())
    }

    /// Executes the action on `sink`.
    pub fn perform(&self, sink: &mut dyn ActionSink) -> DialResult<()> {
        match self {
            Action::Send(keys) => sink.send(keys),
            Action::Press(keys) => sink.press(keys),
            Action::ReleaseAll => sink.release_all(),
            Action::Repeat { keys, count } => {
                for _ in 0..*count {
                    sink.send(keys)?;
                }
                Ok(())
            }
            Action::SelectAxis(axis) => {
                warn!("Axis selection ({:?}) is only handled by jog dial pages, ignoring.", axis);
                Ok(())
            }
        }
    }
}

/// What one detent of jog rotation does, per direction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct JogBinding {
    pub negative: Action,
    pub positive: Action,
}

impl JogBinding {
    fn shifted(negative: Keycode, positive: Keycode) -> Self {
        JogBinding {
            negative: Action::send(&[Keycode::Shift, negative]),
            positive: Action::send(&[Keycode::Shift, positive]),
        }
    }

    /// The action for a rotation of sign `delta`, `None` for zero.
    pub fn for_delta(&self, delta: i32) -> Option<&Action> {
        match delta.signum() {
            -1 => Some(&self.negative),
            1 => Some(&self.positive),
            _ => None,
        }
    }
}

/// Jog bindings of the three axes. Defaults to the gSender keyboard jog shortcuts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AxisBindings {
    pub x: JogBinding,
    pub y: JogBinding,
    pub z: JogBinding,
}

impl AxisBindings {
    pub fn for_axis(&self, axis: Axis) -> &JogBinding {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl Default for AxisBindings {
    fn default() -> Self {
        AxisBindings {
            x: JogBinding::shifted(Keycode::LeftArrow, Keycode::RightArrow),
            y: JogBinding::shifted(Keycode::DownArrow, Keycode::UpArrow),
            z: JogBinding::shifted(Keycode::PageDown, Keycode::PageUp),
        }
    }
}
