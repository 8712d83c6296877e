//! The built-in CNC page set, bound to the gSender keyboard shortcuts. Used when
//! no config file exists.

use crate::action::{Action, Axis, AxisBindings, Keycode};
use crate::config::{PageConfig, PageLayout, SlotConfig};
use crate::key::{KeyMode, KeySettings};
use crate::led::Color;
use rgb::RGB8;

const HIGHLIGHT: Color = RGB8 { r: 255, g: 0, b: 20 };
const TEAL: Color = RGB8 { r: 0, g: 32, b: 32 };
const OLIVE: Color = RGB8 { r: 32, g: 32, b: 0 };

fn slot(slot: usize, name: &str, on_color: Color, off_color: Color, on_press: Action) -> SlotConfig {
    let settings = KeySettings::new(name, on_color, off_color, KeyMode::Moment).on_press(on_press);
    SlotConfig::new(slot, settings)
}

/// A key that jogs while held.
fn held(slot_index: usize, name: &str, keys: &[Keycode]) -> SlotConfig {
    let mut config = slot(slot_index, name, HIGHLIGHT, OLIVE, Action::press(keys));
    config.settings.on_release = Some(Action::ReleaseAll);
    config
}

fn shifted(key: Keycode) -> Action {
    Action::send(&[Keycode::Shift, key])
}

fn job_control() -> Vec<SlotConfig> {
    vec![
        slot(0, "Stop", RGB8::new(255, 0, 0), RGB8::new(32, 0, 0), shifted(Keycode::Two)),
        slot(1, "Pause", HIGHLIGHT, TEAL, shifted(Keycode::One)),
        slot(2, "Start", RGB8::new(0, 255, 0), RGB8::new(0, 32, 0), shifted(Keycode::GraveAccent)),
    ]
}

fn jog_speeds() -> Vec<SlotConfig> {
    vec![
        slot(3, "Precise", HIGHLIGHT, OLIVE, shifted(Keycode::X)),
        slot(4, "Normal", HIGHLIGHT, OLIVE, shifted(Keycode::C)),
        slot(5, "Rapid", HIGHLIGHT, OLIVE, shifted(Keycode::V)),
    ]
}

fn page(title: &str, layout: PageLayout, keys: Vec<SlotConfig>) -> PageConfig {
    PageConfig {
        title: title.to_string(),
        layout,
        keys,
        jog: AxisBindings::default(),
    }
}

pub fn cnc_pages() -> Vec<PageConfig> {
    let arrows = [
        slot(6, "Z-", HIGHLIGHT, OLIVE, shifted(Keycode::PageDown)),
        held(7, "Y+", &[Keycode::Shift, Keycode::UpArrow]),
        slot(8, "Z+", HIGHLIGHT, OLIVE, shifted(Keycode::PageUp)),
        held(9, "X-", &[Keycode::Shift, Keycode::LeftArrow]),
        held(10, "Y-", &[Keycode::Shift, Keycode::DownArrow]),
        held(11, "X+", &[Keycode::Shift, Keycode::RightArrow]),
    ];

    let axes = [
        slot(9, "X", HIGHLIGHT, TEAL, Action::SelectAxis(Axis::X)),
        slot(10, "Y", HIGHLIGHT, TEAL, Action::SelectAxis(Axis::Y)),
        slot(11, "Z", HIGHLIGHT, TEAL, Action::SelectAxis(Axis::Z)),
    ];

    let probe = [
        slot(4, "Open", HIGHLIGHT, TEAL, Action::send(&[Keycode::A])),
        slot(6, "Dia -", HIGHLIGHT, TEAL, Action::send(&[Keycode::A])),
        slot(8, "Dia +", HIGHLIGHT, TEAL, Action::send(&[Keycode::B])),
        slot(9, "Left", HIGHLIGHT, TEAL, Action::send(&[Keycode::A])),
        slot(10, "Confirm", HIGHLIGHT, TEAL, Action::send(&[Keycode::A])),
        slot(11, "Right", HIGHLIGHT, TEAL, Action::send(&[Keycode::B])),
    ];

    vec![
        page("Job Control", PageLayout::Buttons, job_control()),
        page("Arrow Jog", PageLayout::Buttons, [jog_speeds(), arrows.to_vec()].concat()),
        page("Dial Jog", PageLayout::JogDial, [jog_speeds(), axes.to_vec()].concat()),
        page("Probe", PageLayout::Buttons, [job_control(), probe.to_vec()].concat()),
        page("Rapids", PageLayout::Buttons, job_control()),
    ]
}
