use serde::{Deserialize, Serialize};

/// Everything the broadcasting host can send to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum HostEvent {
    Info(InfoMessage),
    Action(ActionMessage),
    StreamStarted,
    StreamStopped,
    PopupAboutToOpen(PopupMessage),
    PopupClosed(PopupMessage),
    SourcesChanged(SourcesMessage),
    ProviderUserResolved(ProviderUserMessage),
    ProviderStreamReady(ProviderStreamMessage),
    ClosePanel,
}

/// The host's answer to the pair command.
///
/// Carries the list of capturable sources known at the time of pairing so that the panel can
/// render its source selector before the first `sourcesChanged` arrives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct InfoMessage {
    pub host_version: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl InfoMessage {
    pub fn new(host_version: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            host_version: host_version.into(),
            sources,
        }
    }
}

/// A user interaction with one of the panel's controls, forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub action: PanelAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "id")]
#[non_exhaustive]
pub enum PanelAction {
    /// The start/stop button was pressed.
    ///
    /// The host reports what the description field and the source selector held at the time of
    /// the click. `source` is empty when no source is selected.
    #[serde(rename_all = "camelCase")]
    StreamingButtonClicked {
        #[serde(default)]
        description: String,
        #[serde(default)]
        source: String,
    },
    #[serde(rename_all = "camelCase")]
    QualityChanged { preset: String },
    #[serde(rename_all = "camelCase")]
    MicToggled { on: bool },
}

/// Identifies a browser window that the host is about to open or has just closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupMessage {
    pub browser_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesMessage {
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserMessage {
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStreamMessage {
    pub stream_url: String,
}
