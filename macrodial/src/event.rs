//! Normalized input events, produced by the dispatcher from raw collaborator polls.

/// A key slot went down or up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    pub slot: usize,
    pub pressed: bool,
}

/// The main encoder moved by `delta` detents, now at `position`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncoderEvent {
    pub delta: i32,
    pub position: i32,
}

/// The jog dial moved by `delta` detents, now at `position`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct JogEvent {
    pub delta: i32,
    pub position: i32,
}

/// The encoder switch changed state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncoderPressEvent {
    pub pressed: bool,
}
