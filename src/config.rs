use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::inventory::error::read_json;

pub const CONFIG_PATH: &str = "config/hud.json";

/// A label/value row added to non-crafting tooltips when the item carries `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalMetadataField {
    pub metadata: String,
    pub value: String,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub catalog_path: String,
    pub snapshot_path: String,
    pub locale_path: String,
    /// Read host events from stdin and write gestures to stdout.
    pub stdin_bridge: bool,
    pub additional_metadata: Vec<AdditionalMetadataField>,
    /// Tooltip distance from the pointer, in logical pixels.
    pub tooltip_offset: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            catalog_path: "assets/data/items.json".into(),
            snapshot_path: "assets/data/inventories.json".into(),
            locale_path: "assets/locale/en.json".into(),
            stdin_bridge: true,
            additional_metadata: Vec::new(),
            tooltip_offset: 16.0,
        }
    }
}

pub fn load_config() -> HudConfig {
    if !std::path::Path::new(CONFIG_PATH).exists() {
        return HudConfig::default();
    }
    match read_json(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load {}: {}", CONFIG_PATH, e);
            HudConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: HudConfig = serde_json::from_str(
            r#"{ "stdin_bridge": false, "additional_metadata": [{ "metadata": "plate", "value": "Plate" }] }"#,
        )
        .unwrap();
        assert!(!config.stdin_bridge);
        assert_eq!(config.catalog_path, HudConfig::default().catalog_path);
        assert_eq!(config.additional_metadata[0].value, "Plate");
    }
}
