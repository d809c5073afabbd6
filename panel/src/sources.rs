use livecast_bridge::protocol::{SelectOption, UpdateSourcesCommand};

/// Placeholder shown in the source selector when there is nothing to capture.
pub const NO_SOURCES_TEXT: &str = "no running sources";

/// A capturable window or application, as reported by the host.
///
/// Descriptors look like `<title>:<host-specific suffix>`. We never interpret them beyond
/// pulling out the title for display; the full string goes back to the host unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceDescriptor(String);

impl SourceDescriptor {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn title(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl From<String> for SourceDescriptor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What the source selector should show for a given source list.
pub fn selector(sources: &[SourceDescriptor]) -> UpdateSourcesCommand {
    if sources.is_empty() {
        return UpdateSourcesCommand {
            enabled: false,
            options: vec![SelectOption {
                value: String::new(),
                text: NO_SOURCES_TEXT.to_string(),
            }],
        };
    }

    UpdateSourcesCommand {
        enabled: true,
        options: sources
            .iter()
            .map(|source| SelectOption {
                value: source.as_str().to_string(),
                text: source.title().to_string(),
            })
            .collect(),
    }
}
