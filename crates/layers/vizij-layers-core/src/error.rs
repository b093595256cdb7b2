//! Error types for keyframe capture and layer transfer

use serde::{Deserialize, Serialize};

use crate::channel::ChannelPath;

/// Errors surfaced by the codec, the collectors and the transfer engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LayersError {
    /// Unsorted keyframe records, unknown enum codes or out-of-range parameters
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// A captured channel does not exist on the destination
    #[error("Unresolved channel: {path}")]
    UnresolvedChannel { path: ChannelPath },

    /// A take, layer or component could not be made the active target
    #[error("Host state error: {reason}")]
    HostState { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl LayersError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn host_state(reason: impl Into<String>) -> Self {
        Self::HostState {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "input",
            Self::UnresolvedChannel { .. } => "channel",
            Self::HostState { .. } => "host",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for LayersError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
