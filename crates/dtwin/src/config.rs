use crate::classify::DEFAULT_EXCLUSIONS;
use serde::{Deserialize, Serialize};

/// Conversion engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reserved wire names left out of serialized twins.
    pub reserved_exclusions: Vec<String>,
    /// Indent serialized documents.
    pub pretty: bool,
}

// --- Default ---

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserved_exclusions: DEFAULT_EXCLUSIONS.iter().map(|name| (*name).to_owned()).collect(),
            pretty: false,
        }
    }
}
