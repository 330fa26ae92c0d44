use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ops::views::{Filter, SortKey};

/// Persisted TUI state (written to .state.json in the funnel/ directory)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub sort: SortKey,
    /// Last committed search
    #[serde(default)]
    pub last_search: Option<String>,
    /// Cursor index into the visible list
    #[serde(default)]
    pub cursor: usize,
}

/// Read .state.json from the funnel directory
pub fn read_ui_state(funnel_dir: &Path) -> Option<UiState> {
    let path = funnel_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the funnel directory
pub fn write_ui_state(funnel_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = funnel_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
