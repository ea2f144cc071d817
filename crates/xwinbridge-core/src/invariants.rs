//! Invariant validation for the session state.
//!
//! Called after every processed event in debug builds.

use std::collections::HashSet;

use crate::event::Hwnd;
use crate::session::Session;

/// Error indicating which invariant was violated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    #[error("Capture holder {0} is not a registered window")]
    CaptureNotRegistered(Hwnd),

    #[error("Window {0} is registered under more than one native handle")]
    DuplicateHwnd(Hwnd),

    #[error("Desktop window {0} is not registered")]
    DesktopNotRegistered(Hwnd),
}

/// Validate all session invariants. Returns the first violation found.
pub fn validate(session: &Session) -> Result<(), InvariantError> {
    // 1. Capture holder must be registered
    if let Some(capture) = session.capture {
        if !session.registry.contains_hwnd(capture) {
            return Err(InvariantError::CaptureNotRegistered(capture));
        }
    }

    // 2. One native handle per window
    let mut seen = HashSet::new();
    for record in session.registry.records() {
        if !seen.insert(record.hwnd) {
            return Err(InvariantError::DuplicateHwnd(record.hwnd));
        }
    }

    // 3. Desktop must be registered
    if let Some(desktop) = session.desktop {
        if !session.registry.contains_hwnd(desktop) {
            return Err(InvariantError::DesktopNotRegistered(desktop));
        }
    }

    Ok(())
}
