//! Core configuration for vizij-layers-core.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Naming policy and tolerances shared by the scene, the codec and the transfer engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reserved name of the layer at index 0 of every take.
    pub base_layer_name: String,
    /// Prefix for freshly created layers ("AnimLayer1", "AnimLayer2", ...).
    pub new_layer_prefix: String,
    /// Suffix appended to the name of a duplicated take.
    pub take_copy_suffix: String,
    /// How far (in ticks) a record may run backwards in time before decode rejects it.
    pub time_tolerance_ticks: i64,
    /// Frames per second used when frame ranges are converted to ticks.
    pub frame_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_layer_name: "BaseAnimation".to_string(),
            new_layer_prefix: "AnimLayer".to_string(),
            take_copy_suffix: "-Copy".to_string(),
            time_tolerance_ticks: 0,
            frame_rate: 30.0,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
