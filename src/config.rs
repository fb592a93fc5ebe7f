use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Label of the form session; attached to every log line of the manager.
    pub session: String,
    /// Initial capacity of the per-component binding index.
    pub component_capacity: usize,
}

pub const DEFAULT_COMPONENT_CAPACITY: usize = 64;

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            session: uuid::Uuid::new_v4().to_string(),
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
        }
    }
}

impl ManagerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

