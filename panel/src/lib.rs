//! Control-panel core for a single live broadcast.
//!
//! The panel lets a user pick a capture source and a quality preset, start a broadcast, and stop
//! it again. Starting involves a third-party provider (which may pop up a sign-in window) and the
//! native broadcasting host (which does the actual encoding), each answering on its own schedule.
//! [`StreamingSessionController`] folds all of that into one [`SessionState`] and keeps the
//! panel's controls in step with it.

pub mod app;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod popup;
pub mod quality;
pub mod session;
pub mod sources;

pub use controller::StreamingSessionController;
pub use session::SessionState;
