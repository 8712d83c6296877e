//! In-memory collaborators shared by the integration tests.
//!
//! Every fake is a cheap handle on shared state: the test keeps one clone to
//! drive inputs and inspect outputs while the [App] holds `&mut` to another.
#![allow(dead_code)]

use macrodial::action::Keycode;
use macrodial::config::Config;
use macrodial::event::KeyEvent;
use macrodial::hal::{ActionSink, Display, Indicators, KeySource, PressInput, RotaryInput};
use macrodial::led::Color;
use macrodial::page::{Page, PageId};
use macrodial::surface::Surface;
use macrodial::{App, DialResult, Hardware, SLOTS, Settings};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default)]
pub struct FakeKeys(Rc<RefCell<VecDeque<KeyEvent>>>);

impl FakeKeys {
    pub fn push(&self, slot: usize, pressed: bool) {
        self.0.borrow_mut().push_back(KeyEvent { slot, pressed });
    }

    pub fn tap(&self, slot: usize) {
        self.push(slot, true);
        self.push(slot, false);
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().len()
    }
}

impl KeySource for FakeKeys {
    fn next_event(&mut self) -> DialResult<Option<KeyEvent>> {
        Ok(self.0.borrow_mut().pop_front())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeRotary(Rc<Cell<i32>>);

impl FakeRotary {
    pub fn turn(&self, delta: i32) {
        self.0.set(self.0.get() + delta);
    }
}

impl RotaryInput for FakeRotary {
    fn position(&mut self) -> DialResult<i32> {
        Ok(self.0.get())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeSwitch(Rc<Cell<bool>>);

impl FakeSwitch {
    pub fn set(&self, pressed: bool) {
        self.0.set(pressed);
    }
}

impl PressInput for FakeSwitch {
    fn is_pressed(&mut self) -> DialResult<bool> {
        Ok(self.0.get())
    }
}

/// Remembers the last colour written to each slot and counts writes.
#[derive(Clone, Debug, Default)]
pub struct FakeIndicators {
    colors: Rc<RefCell<[Color; SLOTS]>>,
    writes: Rc<Cell<usize>>,
}

impl FakeIndicators {
    pub fn color(&self, slot: usize) -> Color {
        self.colors.borrow()[slot]
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl Indicators for FakeIndicators {
    fn write(&mut self, slot: usize, color: Color) -> DialResult<()> {
        self.colors.borrow_mut()[slot] = color;
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeDisplay(Rc<RefCell<Vec<Surface>>>);

impl FakeDisplay {
    pub fn last(&self) -> Option<Surface> {
        self.0.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Display for FakeDisplay {
    fn show(&mut self, surface: &Surface) -> DialResult<()> {
        self.0.borrow_mut().push(surface.clone());
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sent {
    Send(Vec<Keycode>),
    Press(Vec<Keycode>),
    ReleaseAll,
}

#[derive(Clone, Debug, Default)]
pub struct FakeActions(Rc<RefCell<Vec<Sent>>>);

impl FakeActions {
    /// Takes everything sent so far.
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl ActionSink for FakeActions {
    fn send(&mut self, keys: &[Keycode]) -> DialResult<()> {
        self.0.borrow_mut().push(Sent::Send(keys.to_vec()));
        Ok(())
    }

    fn press(&mut self, keys: &[Keycode]) -> DialResult<()> {
        self.0.borrow_mut().push(Sent::Press(keys.to_vec()));
        Ok(())
    }

    fn release_all(&mut self) -> DialResult<()> {
        self.0.borrow_mut().push(Sent::ReleaseAll);
        Ok(())
    }
}

/// One set of fake hardware.
#[derive(Clone, Debug, Default)]
pub struct Rig {
    pub keys: FakeKeys,
    pub encoder: FakeRotary,
    pub switch: FakeSwitch,
    pub jog: FakeRotary,
    pub indicators: FakeIndicators,
    pub display: FakeDisplay,
    pub actions: FakeActions,
}

impl Rig {
    pub fn hardware(&mut self) -> Hardware<'_> {
        Hardware {
            keys: &mut self.keys,
            encoder: &mut self.encoder,
            encoder_switch: &mut self.switch,
            jog: &mut self.jog,
            indicators: &mut self.indicators,
            display: &mut self.display,
            actions: &mut self.actions,
        }
    }
}

/// Ids of the pages registered by [cnc_app].
pub struct Pages {
    pub sleep: PageId,
    pub selection: PageId,
    /// Job Control, Arrow Jog, Dial Jog, Probe, Rapids.
    pub ordinary: Vec<PageId>,
}

pub fn settings() -> Settings {
    Settings {
        sleep_time: time::Duration::minutes(15),
        ..Default::default()
    }
}

/// An app with the built-in page set and its selection and sleep pages.
pub fn cnc_app(rig: &mut Rig, start: Instant) -> (App<'_>, Pages) {
    let config = Config::default();
    let mut app = App::new(settings(), rig.hardware(), start).unwrap();
    let sleep = app.set_sleep_page(Page::sleep());
    let selection = app.set_selection_page(Page::selection(Some(&config.selection_title)));
    let ordinary = config
        .build_pages()
        .unwrap()
        .into_iter()
        .map(|page| app.add_page(page).unwrap())
        .collect();
    (app, Pages { sleep, selection, ordinary })
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn minutes(minutes: u64) -> Duration {
    Duration::from_secs(minutes * 60)
}
