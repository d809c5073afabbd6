//! Correlates the live-video provider's sign-in popup with the session that opened it.
//!
//! The host tells us about every browser window it opens and closes, most of which have nothing
//! to do with us. We only care about the one that appears while a broadcast is being set up: if
//! the user closes that one before the provider hands us a stream URL, the broadcast attempt has
//! been abandoned.

use crate::session::SessionState;

/// Opaque host-assigned identifier of a browser window.
///
/// The host uses `0` to mean "no window", so that value is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupHandle(i32);

impl PopupHandle {
    pub fn new(browser_id: i32) -> Option<Self> {
        (browser_id != 0).then_some(Self(browser_id))
    }

    pub fn browser_id(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PopupTracker {
    tracked: Option<PopupHandle>,
}

impl PopupTracker {
    pub fn tracked(&self) -> Option<PopupHandle> {
        self.tracked
    }

    /// Start tracking `handle` if, and only if, a broadcast is being set up.
    ///
    /// A second popup during the same setup replaces the first.
    pub fn on_open(&mut self, handle: PopupHandle, state: SessionState) {
        if state != SessionState::Setup {
            tracing::debug!(?handle, ?state, "ignoring popup opened outside setup");
            return;
        }
        if let Some(previous) = self.tracked.replace(handle) {
            tracing::debug!(?previous, ?handle, "replacing tracked popup");
        } else {
            tracing::debug!(?handle, "tracking sign-in popup");
        }
    }

    /// Returns `true` if `handle` was the tracked popup, meaning the sign-in was abandoned.
    #[must_use]
    pub fn on_close(&mut self, handle: PopupHandle) -> bool {
        if self.tracked == Some(handle) {
            self.tracked = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.tracked = None;
    }
}
