use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from funnel.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Name of the collection directory holding the bank documents
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            collection: default_collection(),
        }
    }
}

fn default_collection() -> String {
    "banks".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Total known eligible organizations. The progress gauge divides by
    /// this fixed universe, not by however many banks have been entered.
    #[serde(default = "default_universe")]
    pub universe: u32,
}

impl Default for PipelineSection {
    fn default() -> Self {
        PipelineSection {
            universe: default_universe(),
        }
    }
}

fn default_universe() -> u32 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub show_key_hints: bool,
    /// Theme color overrides, e.g. `background = "#0C001B"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Per-stage color overrides, e.g. `converted = "#44FF88"`
    #[serde(default)]
    pub stage_colors: HashMap<String, String>,
}
