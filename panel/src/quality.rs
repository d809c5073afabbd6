//! The fixed menu of encoder output settings the user can pick from.

use indexmap::IndexMap;
use livecast_bridge::protocol::{SelectOption, VideoQualityCommand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// A named bundle of output resolution, frame rate, and bitrate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityPreset {
    pub id: String,
    pub resolution: Resolution,
    pub fps: u32,
    pub bitrate_kbps: u32,
}

impl QualityPreset {
    fn new(id: &str, width: u32, height: u32, fps: u32, bitrate_kbps: u32) -> Self {
        Self {
            id: id.to_string(),
            resolution: Resolution { width, height },
            fps,
            bitrate_kbps,
        }
    }

    /// What the quality drop-down shows for this preset.
    pub fn option_text(&self) -> String {
        format!(
            "{}, {}*{}, fps: {}, bitrate: {}",
            self.id, self.resolution.width, self.resolution.height, self.fps, self.bitrate_kbps
        )
    }

    pub fn to_command(&self) -> VideoQualityCommand {
        VideoQualityCommand {
            width: self.resolution.width,
            height: self.resolution.height,
            fps: self.fps,
            bitrate: self.bitrate_kbps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no quality preset named {0:?}")]
pub struct PresetNotFound(pub String);

/// Read-only lookup table of [`QualityPreset`]s, in definition order.
#[derive(Debug, Clone)]
pub struct QualityPresetRegistry {
    presets: IndexMap<String, QualityPreset>,
}

impl QualityPresetRegistry {
    /// Build a registry from presets in the order they should be displayed.
    ///
    /// The table must be non-empty and ids must be unique.
    pub fn new(presets: impl IntoIterator<Item = QualityPreset>) -> eyre::Result<Self> {
        let mut map = IndexMap::new();
        for preset in presets {
            if map.contains_key(&preset.id) {
                eyre::bail!("quality preset {:?} is defined more than once", preset.id);
            }
            map.insert(preset.id.clone(), preset);
        }
        if map.is_empty() {
            eyre::bail!("at least one quality preset is required");
        }
        Ok(Self { presets: map })
    }

    pub fn list(&self) -> impl ExactSizeIterator<Item = &QualityPreset> {
        self.presets.values()
    }

    pub fn get(&self, id: &str) -> Result<&QualityPreset, PresetNotFound> {
        self.presets
            .get(id)
            .ok_or_else(|| PresetNotFound(id.to_string()))
    }

    /// The preset a freshly rendered drop-down has selected.
    pub fn first(&self) -> Option<&QualityPreset> {
        self.presets.first().map(|(_, preset)| preset)
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.list()
            .map(|preset| SelectOption {
                value: preset.id.clone(),
                text: preset.option_text(),
            })
            .collect()
    }
}

impl Default for QualityPresetRegistry {
    fn default() -> Self {
        Self {
            presets: [
                QualityPreset::new("high", 1280, 720, 30, 2500),
                QualityPreset::new("medium", 854, 480, 25, 2000),
                QualityPreset::new("low", 640, 360, 20, 1500),
            ]
            .into_iter()
            .map(|preset| (preset.id.clone(), preset))
            .collect(),
        }
    }
}
