//! Pages: the configurable screens of the panel.
//!
//! Exactly one page is active at a time. The dispatcher forwards every input event
//! to it, and the page reacts by updating the indicator states, performing actions
//! or asking for a page switch through a [Transition]. Pages never switch pages
//! themselves, which keeps all navigation in [crate::app::App].

use crate::SLOTS;
use crate::action::{Action, Axis, AxisBindings};
use crate::error::{DialError, DialResult};
use crate::event::{EncoderEvent, EncoderPressEvent, JogEvent, KeyEvent};
use crate::hal::{ActionSink, Display};
use crate::key::{KeyMode, KeySettings};
use crate::led::{Color, LedMode, LedState};
use crate::state::OverallState;
use crate::surface::Surface;
use log::debug;
use rgb::RGB8;

/// Index of a registered page.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PageId(pub usize);

/// Off colour of the key bound to the selected jog axis.
pub const AXIS_HIGHLIGHT: Color = RGB8 { r: 255, g: 0, b: 20 };

/// The outputs a page may drive while handling an event.
pub struct PageIo<'a> {
    pub display: &'a mut dyn Display,
    pub actions: &'a mut dyn ActionSink,
}

/// A page switch requested by the active page.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Open the selection page, remembering the current page.
    OpenSelection,
    /// Leave the selection page for the picked page.
    Commit(PageId),
    /// Leave the sleep page for the page it interrupted.
    Wake,
}

#[derive(Clone, Debug)]
pub enum PageKind {
    /// Key slots bound to actions.
    Buttons,
    /// Key slots plus the jog dial, which drives the selected axis.
    JogDial {
        bindings: AxisBindings,
        selected_axis: Option<Axis>,
    },
    /// Cycles through the ordinary pages with the encoder.
    Selection { pick: Option<PageId> },
    /// Blank screen, any encoder input wakes.
    Sleep,
}

#[derive(Clone, Debug)]
pub struct Page {
    title: Option<String>,
    keys: [KeySettings; SLOTS],
    kind: PageKind,
    surface: Option<Surface>,
}

impl Page {
    pub fn buttons(title: &str, keys: [KeySettings; SLOTS]) -> Self {
        Self::new(Some(title), keys, PageKind::Buttons)
    }

    pub fn jog_dial(title: &str, keys: [KeySettings; SLOTS], bindings: AxisBindings) -> Self {
        let kind = PageKind::JogDial { bindings, selected_axis: None };
        Self::new(Some(title), keys, kind)
    }

    pub fn selection(title: Option<&str>) -> Self {
        Self::new(title, Default::default(), PageKind::Selection { pick: None })
    }

    pub fn sleep() -> Self {
        Self::new(None, Default::default(), PageKind::Sleep)
    }

    fn new(title: Option<&str>, keys: [KeySettings; SLOTS], kind: PageKind) -> Self {
        Page {
            title: title.map(str::to_string),
            keys,
            kind,
            surface: None,
        }
    }

    /// Replaces the settings of one slot.
    pub fn with_key(mut self, slot: usize, settings: KeySettings) -> DialResult<Self> {
        *self.keys.get_mut(slot).ok_or(DialError::InvalidSlot(slot))? = settings;
        Ok(self)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn keys(&self) -> &[KeySettings; SLOTS] {
        &self.keys
    }

    pub fn kind(&self) -> &PageKind {
        &self.kind
    }

    /// Whether the page takes part in selection, as opposed to the selection and
    /// sleep pages.
    pub fn is_ordinary(&self) -> bool {
        matches!(self.kind, PageKind::Buttons | PageKind::JogDial { .. })
    }

    /// The surface shown while active, `None` while inactive.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn selected_axis(&self) -> Option<Axis> {
        match self.kind {
            PageKind::JogDial { selected_axis, .. } => selected_axis,
            _ => None,
        }
    }

    /// The page the selection page would commit to.
    pub fn pick(&self) -> Option<PageId> {
        match self.kind {
            PageKind::Selection { pick } => pick,
            _ => None,
        }
    }

    /// Turns every indicator off in the slot colours and shows the page.
    pub fn activate(&mut self, state: &mut OverallState, io: &mut PageIo) -> DialResult<()> {
        for (led, key) in state.led_states.iter_mut().zip(&self.keys) {
            led.set_mode(LedMode::Off);
            led.set_on_color(key.on_color);
            led.set_off_color(key.off_color);
        }

        let mut surface = Surface::titled(self.title.as_deref());
        match &mut self.kind {
            PageKind::Buttons => surface.grid = Some(Surface::grid_of(&self.keys)),
            PageKind::JogDial { selected_axis, .. } => {
                *selected_axis = None;
                surface.grid = Some(Surface::grid_of(&self.keys));
            }
            PageKind::Selection { pick } => {
                *pick = state
                    .previous_page
                    .filter(|page| state.page_stack.contains(page))
                    .or_else(|| state.page_stack.first().copied());
                surface.label = pick.and_then(|page| state.title_of(page)).map(str::to_string);
            }
            PageKind::Sleep => {}
        }

        io.display.show(&surface)?;
        self.surface = Some(surface);
        Ok(())
    }

    /// Releases the surface. The next page's surface replaces what is shown.
    pub fn deactivate(&mut self) {
        self.surface = None;
    }

    pub fn handle_key_event(
        &mut self,
        event: KeyEvent,
        state: &mut OverallState,
        io: &mut PageIo,
    ) -> DialResult<()> {
        let settings = self.keys.get(event.slot).ok_or(DialError::InvalidSlot(event.slot))?;

        if event.pressed {
            if settings.mode == KeyMode::None {
                return Ok(());
            }
            state.led_states[event.slot].set_mode(LedMode::On);
            if let Some(action) = &settings.on_press {
                run(action, &mut self.kind, &self.keys, &mut state.led_states, io)?;
            }
        } else {
            if let Some(action) = &settings.on_release {
                run(action, &mut self.kind, &self.keys, &mut state.led_states, io)?;
            }
            state.led_states[event.slot].set_mode(LedMode::Off);
        }
        Ok(())
    }

    /// Runs the hold action of `slot`. The dispatcher calls this once per press.
    pub fn handle_key_hold(
        &mut self,
        slot: usize,
        state: &mut OverallState,
        io: &mut PageIo,
    ) -> DialResult<()> {
        let settings = self.keys.get(slot).ok_or(DialError::InvalidSlot(slot))?;
        if settings.mode != KeyMode::LongMoment {
            return Ok(());
        }
        if let Some(action) = &settings.on_hold {
            debug!("Hold on slot {} ({}).", slot, settings.name);
            run(action, &mut self.kind, &self.keys, &mut state.led_states, io)?;
        }
        Ok(())
    }

    /// Jogs the selected axis by one binding per detent.
    pub fn handle_jog_event(&mut self, event: JogEvent, io: &mut PageIo) -> DialResult<()> {
        let PageKind::JogDial { bindings, selected_axis: Some(axis) } = &self.kind else {
            return Ok(());
        };
        if let Some(action) = bindings.for_axis(*axis).for_delta(event.delta) {
            for _ in 0..event.delta.unsigned_abs() {
                action.perform(io.actions)?;
            }
        }
        Ok(())
    }

    pub fn handle_encoder_event(
        &mut self,
        event: EncoderEvent,
        state: &OverallState,
        io: &mut PageIo,
    ) -> DialResult<Option<Transition>> {
        match &mut self.kind {
            PageKind::Selection { pick } => {
                let stack = &state.page_stack;
                if stack.is_empty() || event.delta == 0 {
                    return Ok(None);
                }

                let index = pick
                    .and_then(|page| stack.iter().position(|&id| id == page))
                    .unwrap_or(0);
                // One step per event whatever the magnitude.
                let index = if event.delta < 0 {
                    (index + stack.len() - 1) % stack.len()
                } else {
                    (index + 1) % stack.len()
                };
                *pick = Some(stack[index]);

                if let Some(surface) = &mut self.surface {
                    surface.label = state.title_of(stack[index]).map(str::to_string);
                    io.display.show(surface)?;
                }
                Ok(None)
            }
            PageKind::Sleep => Ok(Some(Transition::Wake)),
            PageKind::Buttons | PageKind::JogDial { .. } => Ok(None),
        }
    }

    pub fn handle_encoder_press(
        &mut self,
        event: EncoderPressEvent,
        state: &OverallState,
    ) -> Option<Transition> {
        if !event.pressed {
            return None;
        }
        match &self.kind {
            PageKind::Selection { pick } => pick.map(Transition::Commit),
            PageKind::Sleep => Some(Transition::Wake),
            PageKind::Buttons | PageKind::JogDial { .. } => {
                state.selection_page.map(|_| Transition::OpenSelection)
            }
        }
    }
}

/// Runs a slot action. Axis selection stays on the page, everything else goes to
/// the action sink.
fn run(
    action: &Action,
    kind: &mut PageKind,
    keys: &[KeySettings; SLOTS],
    leds: &mut [LedState; SLOTS],
    io: &mut PageIo,
) -> DialResult<()> {
    match (action, kind) {
        (Action::SelectAxis(axis), PageKind::JogDial { selected_axis, .. }) => {
            select_axis(*axis, selected_axis, keys, leds);
            Ok(())
        }
        (action, _) => action.perform(io.actions),
    }
}

/// Toggles `axis` and recolours the axis keys.
fn select_axis(
    axis: Axis,
    selected: &mut Option<Axis>,
    keys: &[KeySettings; SLOTS],
    leds: &mut [LedState; SLOTS],
) {
    *selected = if *selected == Some(axis) { None } else { Some(axis) };
    debug!("Jog axis: {:?}", selected);

    for ((key, led), slot) in keys.iter().zip(leds.iter_mut()).zip(0..) {
        if let Some(Action::SelectAxis(bound)) = &key.on_press {
            let color = if *selected == Some(*bound) { AXIS_HIGHLIGHT } else { key.off_color };
            debug!("Axis key {} off colour {:?}", slot, color);
            led.set_off_color(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Keycode;
    use crate::led::BLACK;
    use std::time::Instant;

    #[derive(Default)]
    struct Outputs {
        shown: Vec<Surface>,
        sent: Vec<Vec<Keycode>>,
    }

    impl Display for Outputs {
        fn show(&mut self, surface: &Surface) -> DialResult<()> {
            self.shown.push(surface.clone());
            Ok(())
        }
    }

    impl ActionSink for Outputs {
        fn send(&mut self, keys: &[Keycode]) -> DialResult<()> {
            self.sent.push(keys.to_vec());
            Ok(())
        }

        fn press(&mut self, keys: &[Keycode]) -> DialResult<()> {
            self.send(keys)
        }

        fn release_all(&mut self) -> DialResult<()> {
            Ok(())
        }
    }

    /// Splits one [Outputs] into the two halves of a [PageIo].
    struct Split {
        display: Outputs,
        actions: Outputs,
    }

    impl Split {
        fn new() -> Self {
            Split { display: Outputs::default(), actions: Outputs::default() }
        }

        fn io(&mut self) -> PageIo<'_> {
            PageIo { display: &mut self.display, actions: &mut self.actions }
        }
    }

    const DIM: Color = RGB8 { r: 0, g: 32, b: 32 };

    fn dial_page() -> Page {
        let axis_key = |name, axis| {
            KeySettings::new(name, AXIS_HIGHLIGHT, DIM, KeyMode::Moment)
                .on_press(Action::SelectAxis(axis))
        };
        Page::jog_dial("Dial Jog", Default::default(), AxisBindings::default())
            .with_key(9, axis_key("X", Axis::X))
            .and_then(|page| page.with_key(10, axis_key("Y", Axis::Y)))
            .unwrap()
    }

    fn press(slot: usize) -> KeyEvent {
        KeyEvent { slot, pressed: true }
    }

    #[test]
    fn unbound_slot_gives_no_feedback() {
        let mut page = Page::buttons("Rapids", Default::default());
        let mut state = OverallState::new(Instant::now());
        let mut out = Split::new();
        page.activate(&mut state, &mut out.io()).unwrap();

        page.handle_key_event(press(5), &mut state, &mut out.io()).unwrap();
        assert_eq!(state.led_states[5].mode(), LedMode::Off);

        let settings = KeySettings::new("Open", DIM, BLACK, KeyMode::None)
            .on_release(Action::send(&[Keycode::A]));
        let mut page = page.with_key(5, settings).unwrap();
        page.handle_key_event(KeyEvent { slot: 5, pressed: false }, &mut state, &mut out.io())
            .unwrap();
        assert_eq!(out.actions.sent, vec![vec![Keycode::A]]);
    }

    #[test]
    fn activation_turns_lit_slots_off() {
        let keys = std::array::from_fn(|_| {
            KeySettings::new("Start", AXIS_HIGHLIGHT, DIM, KeyMode::Moment)
        });
        let mut page = Page::buttons("Job Control", keys);
        let mut state = OverallState::new(Instant::now());
        state.led_states[3].set_mode(LedMode::On);
        state.led_states[8].set_mode(LedMode::Blink);
        let mut out = Split::new();

        page.activate(&mut state, &mut out.io()).unwrap();
        assert!(state.led_states.iter().all(|led| led.mode() == LedMode::Off));
        assert_eq!(state.led_states[3].off_color(), DIM);
        assert_eq!(state.led_states[3].on_color(), AXIS_HIGHLIGHT);
    }

    #[test]
    fn out_of_range_slot_is_an_error() {
        let mut page = Page::buttons("Rapids", Default::default());
        let mut state = OverallState::new(Instant::now());
        let mut out = Split::new();
        let result = page.handle_key_event(press(12), &mut state, &mut out.io());
        assert!(matches!(result, Err(DialError::InvalidSlot(12))));
        assert!(Page::sleep().with_key(12, KeySettings::default()).is_err());
    }

    #[test]
    fn axis_keys_toggle_and_recolour() {
        let mut page = dial_page();
        let mut state = OverallState::new(Instant::now());
        let mut out = Split::new();
        page.activate(&mut state, &mut out.io()).unwrap();

        page.handle_key_event(press(9), &mut state, &mut out.io()).unwrap();
        assert_eq!(page.selected_axis(), Some(Axis::X));
        assert_eq!(state.led_states[9].off_color(), AXIS_HIGHLIGHT);
        assert_eq!(state.led_states[10].off_color(), DIM);

        page.handle_key_event(press(10), &mut state, &mut out.io()).unwrap();
        assert_eq!(page.selected_axis(), Some(Axis::Y));
        assert_eq!(state.led_states[9].off_color(), DIM);
        assert_eq!(state.led_states[10].off_color(), AXIS_HIGHLIGHT);

        page.handle_key_event(press(10), &mut state, &mut out.io()).unwrap();
        assert_eq!(page.selected_axis(), None);
        assert_eq!(state.led_states[10].off_color(), DIM);
        assert!(out.actions.sent.is_empty());
    }

    #[test]
    fn jog_repeats_binding_per_detent() {
        let mut page = dial_page();
        let mut state = OverallState::new(Instant::now());
        let mut out = Split::new();
        page.activate(&mut state, &mut out.io()).unwrap();

        page.handle_jog_event(JogEvent { delta: 2, position: 2 }, &mut out.io()).unwrap();
        assert!(out.actions.sent.is_empty(), "no axis selected");

        page.handle_key_event(press(10), &mut state, &mut out.io()).unwrap();
        page.handle_jog_event(JogEvent { delta: -3, position: -1 }, &mut out.io()).unwrap();
        assert_eq!(out.actions.sent, vec![vec![Keycode::Shift, Keycode::DownArrow]; 3]);
    }

    #[test]
    fn activation_clears_the_axis() {
        let mut page = dial_page();
        let mut state = OverallState::new(Instant::now());
        let mut out = Split::new();
        page.activate(&mut state, &mut out.io()).unwrap();
        page.handle_key_event(press(9), &mut state, &mut out.io()).unwrap();

        page.deactivate();
        assert!(page.surface().is_none());
        page.activate(&mut state, &mut out.io()).unwrap();
        assert_eq!(page.selected_axis(), None);
    }

    #[test]
    fn selection_without_pages_stays_put() {
        let mut page = Page::selection(Some("Select page"));
        let state = OverallState::new(Instant::now());
        let mut out = Split::new();
        let event = EncoderEvent { delta: 1, position: 1 };
        assert_eq!(page.handle_encoder_event(event, &state, &mut out.io()).unwrap(), None);
        assert_eq!(page.pick(), None);
        let press = EncoderPressEvent { pressed: true };
        assert_eq!(page.handle_encoder_press(press, &state), None);
    }
}
