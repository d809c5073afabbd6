//! The things the session controller talks to but does not own.
//!
//! All of these are fire-and-forget: nothing here returns a result, and anything the other side
//! has to say comes back later as a separate event. In production a single [`HostHandle`] plays
//! every role, since the provider flow and the panel's widgets both live inside the host.

use crate::quality::{QualityPreset, QualityPresetRegistry};
use crate::session::Affordances;
use crate::sources::{self, SourceDescriptor};
use livecast_bridge::HostHandle;
use livecast_bridge::protocol::{
    CreateLiveVideoCommand, PanelCommand, StreamingStartCommand, UpdateQualityOptionsCommand,
    UpdateUserNameCommand,
};

/// Requests to the native broadcasting host.
pub trait HostBridge {
    fn start_stream(&mut self, label: &str, stream_url: &str, source: &SourceDescriptor);
    fn stop_stream(&mut self);
    fn set_video_quality(&mut self, preset: &QualityPreset);
    fn set_mic_on(&mut self);
    fn set_mic_off(&mut self);
}

/// The third-party service that hands out stream destinations.
///
/// Creating a live video eventually produces up to two callbacks: one naming the signed-in
/// user, and one with the stream URL. Either may never arrive.
pub trait LiveVideoProvider {
    fn create_live_video(&mut self, description: &str);
}

/// The panel's widgets.
pub trait PanelView {
    fn render_controls(&mut self, affordances: Affordances);
    fn render_sources(&mut self, sources: &[SourceDescriptor]);
    fn render_quality_options(&mut self, presets: &QualityPresetRegistry);
    fn render_user_name(&mut self, user_name: &str);
}

impl HostBridge for HostHandle {
    fn start_stream(&mut self, label: &str, stream_url: &str, source: &SourceDescriptor) {
        self.send(PanelCommand::StreamingStart(
            StreamingStartCommand::builder()
                .service_provider(label)
                .stream_url(stream_url)
                .source(source.as_str())
                .build()
                .expect("all fields are set"),
        ));
    }

    fn stop_stream(&mut self) {
        self.send(PanelCommand::StreamingStop);
    }

    fn set_video_quality(&mut self, preset: &QualityPreset) {
        self.send(PanelCommand::VideoQualityUpdate(preset.to_command()));
    }

    fn set_mic_on(&mut self) {
        self.send(PanelCommand::MicOn);
    }

    fn set_mic_off(&mut self) {
        self.send(PanelCommand::MicOff);
    }
}

impl LiveVideoProvider for HostHandle {
    fn create_live_video(&mut self, description: &str) {
        self.send(PanelCommand::CreateLiveVideo(CreateLiveVideoCommand {
            description: description.to_string(),
        }));
    }
}

impl PanelView for HostHandle {
    fn render_controls(&mut self, affordances: Affordances) {
        self.send(PanelCommand::UpdateControls(affordances.to_command()));
    }

    fn render_sources(&mut self, sources: &[SourceDescriptor]) {
        self.send(PanelCommand::UpdateSources(sources::selector(sources)));
    }

    fn render_quality_options(&mut self, presets: &QualityPresetRegistry) {
        self.send(PanelCommand::UpdateQualityOptions(
            UpdateQualityOptionsCommand {
                options: presets.options(),
            },
        ));
    }

    fn render_user_name(&mut self, user_name: &str) {
        self.send(PanelCommand::UpdateUserName(UpdateUserNameCommand {
            user_name: user_name.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use livecast_bridge::protocol::{UpdateControlsCommand, VideoQualityCommand};
    use pretty_assertions::assert_eq;

    #[test]
    fn host_handle_speaks_the_wire_protocol() {
        let (mut handle, mut rx) = HostHandle::detached();
        let presets = QualityPresetRegistry::default();

        handle.start_stream(
            "Facebook Live",
            "rtmp://live/abc",
            &SourceDescriptor::new("Aion:0x1"),
        );
        handle.set_video_quality(presets.get("medium").unwrap());
        handle.render_controls(SessionState::OnAir.affordances());
        handle.set_mic_off();

        let mut sent = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            sent.push(cmd);
        }
        assert_eq!(
            sent,
            vec![
                PanelCommand::StreamingStart(StreamingStartCommand {
                    service_provider: "Facebook Live".to_string(),
                    stream_url: "rtmp://live/abc".to_string(),
                    source: "Aion:0x1".to_string(),
                }),
                PanelCommand::VideoQualityUpdate(VideoQualityCommand {
                    width: 854,
                    height: 480,
                    fps: 25,
                    bitrate: 2000,
                }),
                PanelCommand::UpdateControls(UpdateControlsCommand {
                    status: "live".to_string(),
                    button_text: "stop".to_string(),
                    button_disabled: false,
                }),
                PanelCommand::MicOff,
            ]
        );
    }
}
