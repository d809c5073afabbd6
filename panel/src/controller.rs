//! The one place that owns and mutates the broadcast session.
//!
//! Every entry point here corresponds to one external signal (a click, a provider callback, a
//! host acknowledgement, a popup notification). Each is handled to completion, including all
//! requests it fires off and the re-render of the controls, before it returns. Callers must
//! therefore feed events in one at a time from a single task, which is what
//! [`app::run`](crate::app::run) does.

use crate::collaborators::{HostBridge, LiveVideoProvider, PanelView};
use crate::popup::{PopupHandle, PopupTracker};
use crate::quality::{PresetNotFound, QualityPresetRegistry};
use crate::session::{Effect, SessionEvent, SessionState, Transition};
use crate::sources::SourceDescriptor;
use eyre::Context;
use livecast_bridge::protocol::{HostEvent, PanelAction};

#[derive(Debug)]
pub struct StreamingSessionController<C> {
    state: SessionState,
    popup: PopupTracker,
    /// The source picked when the current (or most recent) start was requested.
    source: SourceDescriptor,
    presets: QualityPresetRegistry,
    service_label: String,
    io: C,
}

impl<C> StreamingSessionController<C>
where
    C: HostBridge + LiveVideoProvider + PanelView,
{
    pub fn new(io: C, presets: QualityPresetRegistry, service_label: impl Into<String>) -> Self {
        Self {
            state: SessionState::default(),
            popup: PopupTracker::default(),
            source: SourceDescriptor::default(),
            presets,
            service_label: service_label.into(),
            io,
        }
    }

    /// Bring a freshly connected panel in line with the controller.
    ///
    /// Renders the controls and the quality drop-down, and tells the host about the quality the
    /// drop-down starts out with.
    pub fn attach(&mut self, sources: &[SourceDescriptor]) {
        self.io.render_controls(self.state.affordances());
        self.io.render_sources(sources);
        self.io.render_quality_options(&self.presets);
        if let Some(preset) = self.presets.first() {
            self.io.set_video_quality(preset);
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn io(&self) -> &C {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut C {
        &mut self.io
    }

    /// The tracked sign-in popup, if any.
    pub fn tracked_popup(&self) -> Option<PopupHandle> {
        self.popup.tracked()
    }

    #[tracing::instrument(skip(self))]
    pub fn request_start(&mut self, description: &str, source: SourceDescriptor) {
        self.apply(SessionEvent::StartRequested {
            description: description.to_string(),
            source,
        });
    }

    #[tracing::instrument(skip(self))]
    pub fn request_stop(&mut self) {
        self.apply(SessionEvent::StopRequested);
    }

    /// The panel has a single start/stop button whose meaning depends on the state.
    pub fn on_button_clicked(&mut self, description: &str, source: SourceDescriptor) {
        match self.state {
            SessionState::Standby => self.request_start(description, source),
            SessionState::OnAir => self.request_stop(),
            state => tracing::debug!(?state, "ignoring click on disabled button"),
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn on_provider_user_resolved(&mut self, user_name: &str) {
        self.io.render_user_name(user_name);
    }

    #[tracing::instrument(skip(self))]
    pub fn on_provider_stream_ready(&mut self, stream_url: &str) {
        self.apply(SessionEvent::StreamReady {
            stream_url: stream_url.to_string(),
        });
    }

    #[tracing::instrument(skip(self))]
    pub fn on_host_stream_started(&mut self) {
        self.apply(SessionEvent::HostStarted);
    }

    #[tracing::instrument(skip(self))]
    pub fn on_host_stream_stopped(&mut self) {
        self.apply(SessionEvent::HostStopped);
    }

    #[tracing::instrument(skip(self))]
    pub fn on_popup_opened(&mut self, handle: PopupHandle) {
        self.popup.on_open(handle, self.state);
    }

    #[tracing::instrument(skip(self))]
    pub fn on_popup_closed(&mut self, handle: PopupHandle) {
        if self.popup.on_close(handle) {
            tracing::info!("sign-in popup closed before a stream was created");
            self.apply(SessionEvent::SignInAbandoned);
        }
    }

    /// Push the settings of preset `id` to the host. Allowed in any state, including on air.
    #[tracing::instrument(skip(self))]
    pub fn select_quality(&mut self, id: &str) -> Result<(), PresetNotFound> {
        let preset = self.presets.get(id)?;
        self.io.set_video_quality(preset);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn set_mic(&mut self, on: bool) {
        if on {
            self.io.set_mic_on();
        } else {
            self.io.set_mic_off();
        }
    }

    pub fn on_sources_changed(&mut self, sources: &[SourceDescriptor]) {
        tracing::debug!(count = sources.len(), "source list refreshed");
        self.io.render_sources(sources);
    }

    /// Route one event from the host to the matching entry point.
    pub fn handle_event(&mut self, event: HostEvent) -> eyre::Result<()> {
        match event {
            HostEvent::Action(action) => match action.action {
                PanelAction::StreamingButtonClicked {
                    description,
                    source,
                } => self.on_button_clicked(&description, SourceDescriptor::from(source)),
                PanelAction::QualityChanged { preset } => self
                    .select_quality(&preset)
                    .context("apply quality selection")?,
                PanelAction::MicToggled { on } => self.set_mic(on),
                other => tracing::warn!(?other, "ignoring unknown panel action"),
            },
            HostEvent::StreamStarted => self.on_host_stream_started(),
            HostEvent::StreamStopped => self.on_host_stream_stopped(),
            HostEvent::PopupAboutToOpen(popup) => match PopupHandle::new(popup.browser_id) {
                Some(handle) => self.on_popup_opened(handle),
                None => tracing::debug!("ignoring popup without a browser id"),
            },
            HostEvent::PopupClosed(popup) => match PopupHandle::new(popup.browser_id) {
                Some(handle) => self.on_popup_closed(handle),
                None => tracing::debug!("ignoring popup without a browser id"),
            },
            HostEvent::SourcesChanged(msg) => {
                let sources: Vec<_> = msg.sources.into_iter().map(SourceDescriptor::from).collect();
                self.on_sources_changed(&sources);
            }
            HostEvent::ProviderUserResolved(msg) => self.on_provider_user_resolved(&msg.user_name),
            HostEvent::ProviderStreamReady(msg) => self.on_provider_stream_ready(&msg.stream_url),
            HostEvent::Info(info) => {
                tracing::warn!(host_version = %info.host_version, "ignoring repeated info message");
            }
            HostEvent::ClosePanel => {}
            other => tracing::warn!(?other, "ignoring unknown host event"),
        }
        Ok(())
    }

    /// Run `event` through the transition table and carry out whatever it asks for.
    fn apply(&mut self, event: SessionEvent) {
        let from = self.state;
        let Some(Transition { next, effects }) = from.on(event.clone()) else {
            tracing::debug!(state = ?from, ?event, "event ignored in current state");
            return;
        };

        tracing::info!(?from, to = ?next, "session transition");
        self.state = next;
        if next != SessionState::Setup {
            self.popup.clear();
        }

        for effect in effects {
            match effect {
                Effect::OpenProviderFlow {
                    description,
                    source,
                } => {
                    self.source = source;
                    self.io.create_live_video(&description);
                }
                Effect::StartStream { stream_url } => {
                    self.io
                        .start_stream(&self.service_label, &stream_url, &self.source);
                }
                Effect::StopStream => self.io.stop_stream(),
            }
        }

        self.io.render_controls(next.affordances());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityPreset;
    use crate::session::Affordances;
    use livecast_bridge::protocol::{ActionMessage, PopupMessage, ProviderStreamMessage};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        StartStream {
            label: String,
            url: String,
            source: String,
        },
        StopStream,
        Quality(String),
        MicOn,
        MicOff,
        CreateLiveVideo(String),
        Controls(Affordances),
        Sources(usize),
        QualityOptions(usize),
        UserName(String),
    }

    #[derive(Debug, Default)]
    struct Recorder(Vec<Call>);

    impl HostBridge for Recorder {
        fn start_stream(&mut self, label: &str, stream_url: &str, source: &SourceDescriptor) {
            self.0.push(Call::StartStream {
                label: label.to_string(),
                url: stream_url.to_string(),
                source: source.as_str().to_string(),
            });
        }
        fn stop_stream(&mut self) {
            self.0.push(Call::StopStream);
        }
        fn set_video_quality(&mut self, preset: &QualityPreset) {
            self.0.push(Call::Quality(preset.id.clone()));
        }
        fn set_mic_on(&mut self) {
            self.0.push(Call::MicOn);
        }
        fn set_mic_off(&mut self) {
            self.0.push(Call::MicOff);
        }
    }

    impl LiveVideoProvider for Recorder {
        fn create_live_video(&mut self, description: &str) {
            self.0.push(Call::CreateLiveVideo(description.to_string()));
        }
    }

    impl PanelView for Recorder {
        fn render_controls(&mut self, affordances: Affordances) {
            self.0.push(Call::Controls(affordances));
        }
        fn render_sources(&mut self, sources: &[SourceDescriptor]) {
            self.0.push(Call::Sources(sources.len()));
        }
        fn render_quality_options(&mut self, presets: &QualityPresetRegistry) {
            self.0.push(Call::QualityOptions(presets.list().len()));
        }
        fn render_user_name(&mut self, user_name: &str) {
            self.0.push(Call::UserName(user_name.to_string()));
        }
    }

    type Controller = StreamingSessionController<Recorder>;

    const URL: &str = "rtmp://live-api-s.example/rtmp/1234?s_ps=1";

    fn controller() -> Controller {
        StreamingSessionController::new(
            Recorder::default(),
            QualityPresetRegistry::default(),
            "Facebook Live",
        )
    }

    fn source() -> SourceDescriptor {
        SourceDescriptor::new("Lineage II:l2.exe:0x3e")
    }

    fn popup(id: i32) -> PopupHandle {
        PopupHandle::new(id).unwrap()
    }

    /// A controller that has been walked into `state` along the happy path, with its recorded
    /// calls cleared.
    fn controller_in(state: SessionState) -> Controller {
        let mut c = controller();
        let path = [
            SessionState::Standby,
            SessionState::Setup,
            SessionState::Starting,
            SessionState::OnAir,
            SessionState::Stopping,
        ];
        for step in path {
            if c.state() == state {
                break;
            }
            match step {
                SessionState::Standby => c.request_start("walk", source()),
                SessionState::Setup => c.on_provider_stream_ready(URL),
                SessionState::Starting => c.on_host_stream_started(),
                SessionState::OnAir => c.request_stop(),
                SessionState::Stopping => unreachable!(),
            }
        }
        assert_eq!(c.state(), state);
        c.io_mut().0.clear();
        c
    }

    fn label(c: &Controller) -> &'static str {
        c.state().affordances().button.as_str()
    }

    #[test]
    fn attach_renders_initial_panel() {
        let mut c = controller();
        c.attach(&[source()]);
        assert_eq!(
            c.io().0,
            vec![
                Call::Controls(SessionState::Standby.affordances()),
                Call::Sources(1),
                Call::QualityOptions(3),
                Call::Quality("high".to_string()),
            ]
        );
        assert_eq!(c.state(), SessionState::Standby);
    }

    #[test]
    fn start_from_standby_opens_provider_flow() {
        let mut c = controller();
        c.request_start("weekly siege", source());
        assert_eq!(c.state(), SessionState::Setup);
        assert_eq!(
            c.io().0,
            vec![
                Call::CreateLiveVideo("weekly siege".to_string()),
                Call::Controls(SessionState::Setup.affordances()),
            ]
        );
    }

    #[test]
    fn start_is_a_no_op_outside_standby() {
        for state in [
            SessionState::Setup,
            SessionState::Starting,
            SessionState::OnAir,
            SessionState::Stopping,
        ] {
            let mut c = controller_in(state);
            c.request_start("again", source());
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, Vec::<Call>::new(), "{state:?}");
        }
    }

    #[test]
    fn stop_from_on_air() {
        let mut c = controller_in(SessionState::OnAir);
        c.request_stop();
        assert_eq!(c.state(), SessionState::Stopping);
        assert_eq!(
            c.io().0,
            vec![
                Call::StopStream,
                Call::Controls(SessionState::Stopping.affordances()),
            ]
        );
    }

    #[test]
    fn stop_is_a_no_op_outside_on_air() {
        for state in [
            SessionState::Standby,
            SessionState::Setup,
            SessionState::Starting,
            SessionState::Stopping,
        ] {
            let mut c = controller_in(state);
            c.request_stop();
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, Vec::<Call>::new(), "{state:?}");
        }
    }

    #[test]
    fn host_stopped_resets_from_every_state() {
        for state in SessionState::ALL {
            let mut c = controller_in(state);
            c.on_host_stream_stopped();
            assert_eq!(c.state(), SessionState::Standby, "{state:?}");
            c.on_host_stream_stopped();
            assert_eq!(c.state(), SessionState::Standby, "{state:?}");
            assert_eq!(
                c.io().0,
                vec![
                    Call::Controls(SessionState::Standby.affordances()),
                    Call::Controls(SessionState::Standby.affordances()),
                ]
            );
        }
    }

    #[test]
    fn double_click_while_busy_does_nothing() {
        for state in [
            SessionState::Setup,
            SessionState::Starting,
            SessionState::Stopping,
        ] {
            let mut c = controller_in(state);
            c.on_button_clicked("again", source());
            c.on_button_clicked("again", source());
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, Vec::<Call>::new(), "{state:?}");
        }
    }

    #[test]
    fn button_toggles_between_start_and_stop() {
        let mut c = controller();
        c.on_button_clicked("desc", source());
        assert_eq!(c.state(), SessionState::Setup);

        let mut c = controller_in(SessionState::OnAir);
        c.on_button_clicked("ignored", source());
        assert_eq!(c.state(), SessionState::Stopping);
        assert_eq!(c.io().0[0], Call::StopStream);
    }

    #[test]
    fn popup_opened_outside_setup_is_not_tracked() {
        for state in [
            SessionState::Standby,
            SessionState::Starting,
            SessionState::OnAir,
            SessionState::Stopping,
        ] {
            let mut c = controller_in(state);
            c.on_popup_opened(popup(9));
            assert_eq!(c.tracked_popup(), None);
            c.on_popup_closed(popup(9));
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, Vec::<Call>::new(), "{state:?}");
        }
    }

    #[test]
    fn closing_an_untracked_popup_during_setup_is_ignored() {
        let mut c = controller_in(SessionState::Setup);
        c.on_popup_opened(popup(42));
        c.on_popup_closed(popup(43));
        assert_eq!(c.state(), SessionState::Setup);
        assert_eq!(c.tracked_popup(), Some(popup(42)));
        assert_eq!(c.io().0, Vec::<Call>::new());
    }

    #[test]
    fn late_popup_close_after_stream_ready_is_ignored() {
        let mut c = controller_in(SessionState::Setup);
        c.on_popup_opened(popup(42));
        c.on_provider_stream_ready(URL);
        assert_eq!(c.state(), SessionState::Starting);
        assert_eq!(c.tracked_popup(), None);

        c.on_popup_closed(popup(42));
        assert_eq!(c.state(), SessionState::Starting);
    }

    #[test]
    fn stream_ready_outside_setup_sends_nothing() {
        for state in [
            SessionState::Standby,
            SessionState::Starting,
            SessionState::OnAir,
            SessionState::Stopping,
        ] {
            let mut c = controller_in(state);
            c.on_provider_stream_ready(URL);
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, Vec::<Call>::new(), "{state:?}");
        }
    }

    #[test]
    fn user_name_is_display_only() {
        for state in SessionState::ALL {
            let mut c = controller_in(state);
            c.on_provider_user_resolved("Jane Streamer");
            assert_eq!(c.state(), state);
            assert_eq!(c.io().0, vec![Call::UserName("Jane Streamer".to_string())]);
        }
    }

    #[test]
    fn quality_changes_never_touch_the_session() {
        for state in SessionState::ALL {
            let mut c = controller_in(state);
            for preset in ["low", "medium", "high"] {
                c.select_quality(preset).unwrap();
            }
            c.set_mic(true);
            c.set_mic(false);
            assert_eq!(c.state(), state);
            assert_eq!(
                c.io().0,
                vec![
                    Call::Quality("low".to_string()),
                    Call::Quality("medium".to_string()),
                    Call::Quality("high".to_string()),
                    Call::MicOn,
                    Call::MicOff,
                ]
            );
        }
    }

    #[test]
    fn unknown_quality_fails() {
        let mut c = controller();
        assert_eq!(
            c.select_quality("4k").unwrap_err(),
            PresetNotFound("4k".to_string())
        );
        assert_eq!(c.io().0, Vec::<Call>::new());
    }

    #[test]
    fn full_broadcast_cycle() {
        let mut c = controller();
        let mut labels = vec![label(&c)];

        c.request_start("boss rush", source());
        assert_eq!(c.state(), SessionState::Setup);
        labels.push(label(&c));

        c.on_provider_stream_ready(URL);
        assert_eq!(c.state(), SessionState::Starting);
        labels.push(label(&c));

        c.on_host_stream_started();
        assert_eq!(c.state(), SessionState::OnAir);
        labels.push(label(&c));

        c.request_stop();
        assert_eq!(c.state(), SessionState::Stopping);
        labels.push(label(&c));

        c.on_host_stream_stopped();
        assert_eq!(c.state(), SessionState::Standby);
        labels.push(label(&c));

        assert_eq!(labels, ["start", "start", "start", "stop", "stop", "start"]);
        assert_eq!(
            c.io().0,
            vec![
                Call::CreateLiveVideo("boss rush".to_string()),
                Call::Controls(SessionState::Setup.affordances()),
                Call::StartStream {
                    label: "Facebook Live".to_string(),
                    url: URL.to_string(),
                    source: "Lineage II:l2.exe:0x3e".to_string(),
                },
                Call::Controls(SessionState::Starting.affordances()),
                Call::Controls(SessionState::OnAir.affordances()),
                Call::StopStream,
                Call::Controls(SessionState::Stopping.affordances()),
                Call::Controls(SessionState::Standby.affordances()),
            ]
        );
    }

    #[test]
    fn abandoned_sign_in() {
        let mut c = controller();
        c.request_start("", source());
        c.on_popup_opened(popup(42));
        assert_eq!(c.state(), SessionState::Setup);
        assert_eq!(c.tracked_popup(), Some(popup(42)));

        c.on_popup_closed(popup(42));
        assert_eq!(c.state(), SessionState::Standby);
        assert_eq!(c.tracked_popup(), None);
        assert!(
            !c.io()
                .0
                .iter()
                .any(|call| matches!(call, Call::StartStream { .. }))
        );

        // a stream URL that shows up after the user gave up is stale
        c.on_provider_stream_ready(URL);
        assert_eq!(c.state(), SessionState::Standby);
    }

    #[test]
    fn stray_popup() {
        let mut c = controller();
        c.on_popup_opened(popup(7));
        assert_eq!(c.state(), SessionState::Standby);
        c.on_popup_closed(popup(7));
        assert_eq!(c.state(), SessionState::Standby);
        assert_eq!(c.io().0, Vec::<Call>::new());
    }

    #[test]
    fn a_new_attempt_streams_the_newly_picked_source() {
        let mut c = controller_in(SessionState::Setup);
        c.on_popup_opened(popup(1));
        c.on_popup_closed(popup(1));
        c.request_start("second try", SourceDescriptor::new("Aion:aion.bin"));
        c.on_provider_stream_ready(URL);
        assert!(c.io().0.contains(&Call::StartStream {
            label: "Facebook Live".to_string(),
            url: URL.to_string(),
            source: "Aion:aion.bin".to_string(),
        }));
    }

    #[test]
    fn host_events_are_routed() {
        let mut c = controller();
        c.handle_event(HostEvent::Action(ActionMessage {
            action: PanelAction::StreamingButtonClicked {
                description: "from host".to_string(),
                source: "Aion:aion.bin".to_string(),
            },
        }))
        .unwrap();
        c.handle_event(HostEvent::PopupAboutToOpen(PopupMessage { browser_id: 0 }))
            .unwrap();
        assert_eq!(c.tracked_popup(), None);
        c.handle_event(HostEvent::PopupAboutToOpen(PopupMessage { browser_id: 5 }))
            .unwrap();
        assert_eq!(c.tracked_popup(), Some(popup(5)));
        c.handle_event(HostEvent::ProviderStreamReady(ProviderStreamMessage {
            stream_url: URL.to_string(),
        }))
        .unwrap();
        c.handle_event(HostEvent::StreamStarted).unwrap();
        assert_eq!(c.state(), SessionState::OnAir);

        c.handle_event(HostEvent::Action(ActionMessage {
            action: PanelAction::MicToggled { on: true },
        }))
        .unwrap();
        assert_eq!(c.io().0.last(), Some(&Call::MicOn));
    }

    #[test]
    fn unknown_quality_from_host_is_an_error() {
        let mut c = controller();
        let err = c
            .handle_event(HostEvent::Action(ActionMessage {
                action: PanelAction::QualityChanged {
                    preset: "8k".to_string(),
                },
            }))
            .unwrap_err();
        assert!(err.to_string().contains("apply quality selection"), "{err}");
        assert!(err.downcast_ref::<PresetNotFound>().is_some());
    }
}
