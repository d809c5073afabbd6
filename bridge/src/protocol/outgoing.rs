use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Everything the panel can ask of the broadcasting host.
///
/// None of these have a synchronous reply. Where the host has something to say back (a stream
/// having started, say) it does so with a separate [`HostEvent`](super::HostEvent).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum PanelCommand {
    Pair(PairCommand),
    StreamingStart(StreamingStartCommand),
    StreamingStop,
    VideoQualityUpdate(VideoQualityCommand),
    MicOn,
    MicOff,
    CreateLiveVideo(CreateLiveVideoCommand),
    UpdateControls(UpdateControlsCommand),
    UpdateSources(UpdateSourcesCommand),
    UpdateQualityOptions(UpdateQualityOptionsCommand),
    UpdateUserName(UpdateUserNameCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCommand {
    pub id: String,
}

/// Asks the host to start pushing the given source to the given ingest URL.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingStartCommand {
    /// Human-readable name of the service being streamed to.
    #[builder(setter(into))]
    pub service_provider: String,

    /// Where the host should push the stream.
    #[builder(setter(into))]
    pub stream_url: String,

    /// Which window or application to capture, exactly as the host reported it.
    #[builder(setter(into))]
    pub source: String,
}

impl StreamingStartCommand {
    pub fn builder() -> StreamingStartCommandBuilder {
        StreamingStartCommandBuilder::default()
    }
}

/// Output settings for the encoder. May be sent at any time, including mid-broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQualityCommand {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// In kbps.
    pub bitrate: u32,
}

impl VideoQualityCommand {
    pub fn builder() -> VideoQualityCommandBuilder {
        VideoQualityCommandBuilder::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLiveVideoCommand {
    pub description: String,
}

/// The full state of the start/stop control group.
///
/// These are always sent together so that the panel never shows, say, a "stop" label on a
/// disabled button left over from a previous state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateControlsCommand {
    pub status: String,
    pub button_text: String,
    pub button_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSourcesCommand {
    pub enabled: bool,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQualityOptionsCommand {
    pub options: Vec<SelectOption>,
}

/// One entry in a drop-down.
///
/// `value` is what comes back in actions when the entry is picked, `text` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserNameCommand {
    pub user_name: String,
}
