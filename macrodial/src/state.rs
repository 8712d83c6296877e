use crate::SLOTS;
use crate::key::KeyState;
use crate::led::LedState;
use crate::page::PageId;
use std::time::Instant;
use time::Duration;

/// The process-wide state shared by the dispatcher and the active page.
#[derive(Debug)]
pub struct OverallState {
    /// Ordinary pages in registration order, which is also the selection order.
    pub page_stack: Vec<PageId>,
    pub current_page: Option<PageId>,
    /// The page the selection page was opened from.
    pub previous_page: Option<PageId>,
    pub selection_page: Option<PageId>,
    pub sleep_page: Option<PageId>,
    /// The page that was active when the panel went to sleep.
    pub wake_to_page: Option<PageId>,
    /// Idle time after which the panel goes to sleep.
    pub sleep_time: Duration,
    pub last_interaction: Instant,
    pub led_states: [LedState; SLOTS],
    pub key_states: [KeyState; SLOTS],
    titles: Vec<Option<String>>,
}

impl OverallState {
    pub fn new(now: Instant) -> Self {
        OverallState {
            page_stack: Vec::new(),
            current_page: None,
            previous_page: None,
            selection_page: None,
            sleep_page: None,
            wake_to_page: None,
            sleep_time: Duration::minutes(15),
            last_interaction: now,
            led_states: Default::default(),
            key_states: Default::default(),
            titles: Vec::new(),
        }
    }

    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    /// Turns every indicator off and forgets all key presses.
    pub fn reset(&mut self) {
        for led in &mut self.led_states {
            led.reset();
        }
        for key in &mut self.key_states {
            key.reset();
        }
    }

    /// Allocates the id of a new page.
    pub(crate) fn register(&mut self, title: Option<&str>) -> PageId {
        self.titles.push(title.map(str::to_string));
        PageId(self.titles.len() - 1)
    }

    pub fn page_count(&self) -> usize {
        self.titles.len()
    }

    pub fn title_of(&self, page: PageId) -> Option<&str> {
        self.titles.get(page.0)?.as_deref()
    }

    pub fn is_asleep(&self) -> bool {
        self.current_page.is_some() && self.current_page == self.sleep_page
    }

    /// Records user activity at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.last_interaction = now;
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        let idle = now.saturating_duration_since(self.last_interaction);
        Duration::try_from(idle).unwrap_or(Duration::MAX)
    }

    /// Whether the idle timeout has elapsed on a page other than the sleep page.
    pub fn sleep_due(&self, now: Instant) -> bool {
        self.sleep_page.is_some() && !self.is_asleep() && self.idle_for(now) > self.sleep_time
    }
}
