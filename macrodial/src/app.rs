//! The dispatcher: polls the collaborators, routes events to the active page and
//! performs page switches.

use crate::SLOTS;
use crate::error::{DialError, DialResult};
use crate::event::{EncoderEvent, EncoderPressEvent, JogEvent};
use crate::hal::{ActionSink, Display, Indicators, KeySource, PressInput, RotaryInput};
use crate::key::KeyMode;
use crate::led::{LedAnimator, LedState};
use crate::page::{Page, PageId, PageIo, Transition};
use crate::state::OverallState;
use log::{debug, info};
use std::time::{Duration, Instant};
use sysinfo::System;

/// The collaborators the dispatcher drives.
pub struct Hardware<'a> {
    pub keys: &'a mut dyn KeySource,
    pub encoder: &'a mut dyn RotaryInput,
    pub encoder_switch: &'a mut dyn PressInput,
    pub jog: &'a mut dyn RotaryInput,
    pub indicators: &'a mut dyn Indicators,
    pub display: &'a mut dyn Display,
    pub actions: &'a mut dyn ActionSink,
}

impl Hardware<'_> {
    fn page_io(&mut self) -> PageIo<'_> {
        PageIo {
            display: &mut *self.display,
            actions: &mut *self.actions,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub sleep_time: time::Duration,
    /// Blink half-period of every indicator.
    pub blink_interval: Duration,
    /// Minimum time between two rewrites of a blinking indicator.
    pub blink_tick: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sleep_time: time::Duration::minutes(15),
            blink_interval: Duration::from_millis(100),
            blink_tick: Duration::from_millis(1),
        }
    }
}

pub struct App<'a> {
    state: OverallState,
    pages: Vec<Page>,
    hardware: Hardware<'a>,
    animator: LedAnimator,
    encoder_held: bool,
    last_encoder_position: i32,
    last_jog_position: i32,
    system: System,
}

impl<'a> App<'a> {
    /// Creates the dispatcher. The current encoder positions become the baseline,
    /// so rotation before startup is not replayed.
    pub fn new(settings: Settings, hardware: Hardware<'a>, now: Instant) -> DialResult<Self> {
        let last_encoder_position = hardware.encoder.position()?;
        let last_jog_position = hardware.jog.position()?;
        let encoder_held = hardware.encoder_switch.is_pressed()?;

        let mut state = OverallState::new(now).with_sleep_time(settings.sleep_time);
        for led in &mut state.led_states {
            led.set_interval(settings.blink_interval);
        }

        Ok(App {
            state,
            pages: Vec::new(),
            hardware,
            animator: LedAnimator::new(now, settings.blink_tick),
            encoder_held,
            last_encoder_position,
            last_jog_position,
            system: System::new(),
        })
    }

    pub fn state(&self) -> &OverallState {
        &self.state
    }

    /// The indicator states, for animations driven from outside the pages.
    pub fn leds_mut(&mut self) -> &mut [LedState; SLOTS] {
        &mut self.state.led_states
    }

    pub fn page(&self, page: PageId) -> Option<&Page> {
        self.pages.get(page.0)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.page(self.state.current_page?)
    }

    /// Registers an ordinary page. The first one registered becomes active.
    pub fn add_page(&mut self, page: Page) -> DialResult<PageId> {
        if !page.is_ordinary() {
            return Err(DialError::NotOrdinary);
        }
        let id = self.register(page);
        self.state.page_stack.push(id);
        if self.state.current_page.is_none() {
            self.switch_to(id)?;
        }
        Ok(id)
    }

    pub fn set_selection_page(&mut self, page: Page) -> PageId {
        let id = self.register(page);
        self.state.selection_page = Some(id);
        id
    }

    pub fn set_sleep_page(&mut self, page: Page) -> PageId {
        let id = self.register(page);
        self.state.sleep_page = Some(id);
        id
    }

    fn register(&mut self, page: Page) -> PageId {
        let id = self.state.register(page.title());
        debug!("Registered page {:?} as {:?}", page.title(), id);
        self.pages.push(page);
        id
    }

    fn current(&self) -> DialResult<PageId> {
        self.state.current_page.ok_or(DialError::NoPages)
    }

    /// Runs one dispatcher tick at `now`.
    ///
    /// Inputs are handled in a fixed order: encoder switch, one key event, holds,
    /// jog dial, encoder. A switch requested by one input takes effect before the
    /// next input is routed. Indicators are rendered last.
    pub fn update(&mut self, now: Instant) -> DialResult<()> {
        self.current()?;

        let pressed = self.hardware.encoder_switch.is_pressed()?;
        if pressed != self.encoder_held {
            self.encoder_held = pressed;
            if pressed {
                self.state.touch(now);
            }
            let page = self.current()?;
            let event = EncoderPressEvent { pressed };
            let transition = self.pages[page.0].handle_encoder_press(event, &self.state);
            self.apply(transition)?;
        }

        if let Some(event) = self.hardware.keys.next_event()? {
            let key = self
                .state
                .key_states
                .get_mut(event.slot)
                .ok_or(DialError::InvalidSlot(event.slot))?;
            if event.pressed {
                key.press(now);
            } else {
                key.release(now);
            }
            self.state.touch(now);

            let page = self.current()?;
            let mut io = self.hardware.page_io();
            self.pages[page.0].handle_key_event(event, &mut self.state, &mut io)?;
        }

        self.fire_holds(now)?;

        let position = self.hardware.jog.position()?;
        if position != self.last_jog_position {
            let event = JogEvent { delta: position - self.last_jog_position, position };
            self.last_jog_position = position;
            self.state.touch(now);

            let page = self.current()?;
            self.pages[page.0].handle_jog_event(event, &mut self.hardware.page_io())?;
        }

        let position = self.hardware.encoder.position()?;
        if position != self.last_encoder_position {
            let event = EncoderEvent { delta: position - self.last_encoder_position, position };
            self.last_encoder_position = position;
            self.state.touch(now);

            let page = self.current()?;
            let mut io = self.hardware.page_io();
            let transition = self.pages[page.0].handle_encoder_event(event, &self.state, &mut io)?;
            self.apply(transition)?;
        }

        if self.state.sleep_due(now) {
            self.sleep(now)?;
        }

        self.animator.render(now, &mut self.state.led_states, &mut *self.hardware.indicators)
    }

    /// Fires the hold action of every long-moment key held past its threshold.
    fn fire_holds(&mut self, now: Instant) -> DialResult<()> {
        let page = self.current()?;
        for slot in 0..SLOTS {
            let settings = &self.pages[page.0].keys()[slot];
            let key = &self.state.key_states[slot];
            let due = settings.mode == KeyMode::LongMoment
                && key.pressed
                && !key.hold_fired
                && key.held_for(now) >= settings.long_moment_time;
            if !due {
                continue;
            }

            self.state.key_states[slot].hold_fired = true;
            let mut io = self.hardware.page_io();
            self.pages[page.0].handle_key_hold(slot, &mut self.state, &mut io)?;
        }
        Ok(())
    }

    fn apply(&mut self, transition: Option<Transition>) -> DialResult<()> {
        match transition {
            None => Ok(()),
            Some(Transition::OpenSelection) => {
                let Some(selection) = self.state.selection_page else {
                    return Ok(());
                };
                self.state.previous_page = self.state.current_page;
                self.switch_to(selection)
            }
            Some(Transition::Commit(page)) => self.switch_to(page),
            Some(Transition::Wake) => {
                let target = match self.state.wake_to_page {
                    Some(page) => page,
                    None => *self.state.page_stack.first().ok_or(DialError::NoPages)?,
                };
                info!("Waking up.");
                self.switch_to(target)
            }
        }
    }

    fn sleep(&mut self, now: Instant) -> DialResult<()> {
        let Some(sleep) = self.state.sleep_page else {
            return Ok(());
        };
        info!("Idle for {}, going to sleep.", self.state.idle_for(now));
        self.state.wake_to_page = self.state.current_page;
        self.switch_to(sleep)
    }

    /// Deactivates the current page and activates `next` on a clean state.
    ///
    /// Keys held across the switch lose their release, so everything pressed on
    /// the host is released first.
    fn switch_to(&mut self, next: PageId) -> DialResult<()> {
        if next.0 >= self.pages.len() {
            return Err(DialError::UnknownPage(next.0));
        }

        if self.state.key_states.iter().any(|key| key.pressed) {
            debug!("Keys held while switching pages, releasing all.");
            self.hardware.actions.release_all()?;
        }
        if let Some(current) = self.state.current_page {
            self.pages[current.0].deactivate();
        }
        self.state.reset();
        self.report_memory();

        self.state.current_page = Some(next);
        info!("Switched to page {}", self.state.title_of(next).unwrap_or("(untitled)"));
        let mut io = self.hardware.page_io();
        self.pages[next.0].activate(&mut self.state, &mut io)
    }

    fn report_memory(&mut self) {
        self.system.refresh_memory();
        debug!(
            "Memory: {} KiB available of {} KiB",
            self.system.available_memory() / 1024,
            self.system.total_memory() / 1024
        );
    }
}
