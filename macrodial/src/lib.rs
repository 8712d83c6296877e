//! Page-based control panel for a CNC controller: twelve lit keys, an encoder with
//! a push switch, a jog dial and a small display.
//!
//! [app::App] polls the inputs through the [hal] traits and routes every event to
//! the active [page::Page]. Pages bind the keys and dials to [action::Action]s,
//! which leave the device as USB keyboard input.

pub mod action;
pub mod app;
pub mod builtin;
pub mod config;
pub mod error;
pub mod event;
pub mod hal;
pub mod key;
pub mod led;
pub mod page;
pub mod state;
pub mod surface;

/// Number of key slots on every page.
pub const SLOTS: usize = 12;

pub use app::{App, Hardware, Settings};
pub use error::{DialError, DialResult};
