//! The broadcast session lifecycle as a pure transition function.
//!
//! ```text
//!  Standby --start requested--> Setup --stream ready--> Starting --host started--> OnAir
//!     ^                           |                                                  |
//!     +----sign-in abandoned------+                                       stop requested
//!     |                                                                              v
//!     +---------------------------host stopped---------------------------------- Stopping
//! ```
//!
//! "host stopped" is accepted in every state and always lands in `Standby`. Any other event that
//! is not drawn above is ignored.

use crate::sources::SourceDescriptor;
use livecast_bridge::protocol::UpdateControlsCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Standby,
    /// Waiting for the live-video provider to hand out a stream URL.
    Setup,
    /// Waiting for the host to acknowledge the start request.
    Starting,
    OnAir,
    /// Waiting for the host to acknowledge the stop request.
    Stopping,
}

impl SessionState {
    pub const ALL: [SessionState; 5] = [
        SessionState::Standby,
        SessionState::Setup,
        SessionState::Starting,
        SessionState::OnAir,
        SessionState::Stopping,
    ];
}

/// Something that may move the session along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StartRequested {
        description: String,
        source: SourceDescriptor,
    },
    StopRequested,
    StreamReady { stream_url: String },
    /// The user closed the provider's sign-in popup before a stream URL arrived.
    SignInAbandoned,
    HostStarted,
    HostStopped,
}

/// Work the caller must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the provider for a destination; `source` is what gets streamed once one exists.
    OpenProviderFlow {
        description: String,
        source: SourceDescriptor,
    },
    StartStream { stream_url: String },
    StopStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: SessionState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

impl SessionState {
    /// Where `event` takes the session from `self`, or `None` if `self` ignores `event`.
    pub fn on(self, event: SessionEvent) -> Option<Transition> {
        use SessionEvent::*;
        use SessionState::*;

        let transition = match (self, event) {
            (_, HostStopped) => Transition::to(Standby),
            (
                Standby,
                StartRequested {
                    description,
                    source,
                },
            ) => Transition::to(Setup).with(Effect::OpenProviderFlow {
                description,
                source,
            }),
            (Setup, StreamReady { stream_url }) => {
                Transition::to(Starting).with(Effect::StartStream { stream_url })
            }
            (Setup, SignInAbandoned) => Transition::to(Standby),
            (Starting, HostStarted) => Transition::to(OnAir),
            (OnAir, StopRequested) => Transition::to(Stopping).with(Effect::StopStream),
            (
                Standby | Setup | Starting | OnAir | Stopping,
                StartRequested { .. }
                | StopRequested
                | StreamReady { .. }
                | SignInAbandoned
                | HostStarted,
            ) => return None,
        };
        Some(transition)
    }

    /// How the start/stop controls look in this state.
    pub fn affordances(self) -> Affordances {
        let (status, button, enabled) = match self {
            SessionState::Standby => ("ready", ButtonLabel::Start, true),
            SessionState::Setup => ("creating broadcast", ButtonLabel::Start, false),
            SessionState::Starting => ("starting broadcast", ButtonLabel::Start, false),
            SessionState::OnAir => ("live", ButtonLabel::Stop, true),
            SessionState::Stopping => ("stopping broadcast", ButtonLabel::Stop, false),
        };
        Affordances {
            status,
            button,
            button_enabled: enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    Start,
    Stop,
}

impl ButtonLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonLabel::Start => "start",
            ButtonLabel::Stop => "stop",
        }
    }
}

/// The user-visible projection of a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub status: &'static str,
    pub button: ButtonLabel,
    pub button_enabled: bool,
}

impl Affordances {
    pub fn to_command(self) -> UpdateControlsCommand {
        UpdateControlsCommand {
            status: self.status.to_string(),
            button_text: self.button.as_str().to_string(),
            button_disabled: !self.button_enabled,
        }
    }
}
