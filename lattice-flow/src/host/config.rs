//! Renderer configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for a [`Renderer`](super::Renderer).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use lattice_flow::host::RendererConfig;
///
/// let config = RendererConfig::from_json(r#"{ "max_flush_passes": 8 }"#).unwrap();
/// assert_eq!(config.max_flush_passes, 8);
/// assert!(config.warn_on_duplicate_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Upper bound on flush passes. A render that keeps writing to state it
    /// reads would otherwise never settle.
    pub max_flush_passes: usize,

    /// Log a warning when two sibling components share a key.
    pub warn_on_duplicate_keys: bool,
}

impl RendererConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: 32,
            warn_on_duplicate_keys: true,
        }
    }
}
