//! Layer attributes, take time spans and the explicit (take, layer) write context.

use serde::{Deserialize, Serialize};

use crate::error::LayersError;
use crate::ids::{LayerId, TakeId};
use crate::keyframe::KeyTime;

/// How a layer combines with the layers below it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerMode {
    #[default]
    Additive,
    Override,
    OverridePassthrough,
}

impl LayerMode {
    pub fn code(self) -> u8 {
        match self {
            Self::Additive => 0,
            Self::Override => 1,
            Self::OverridePassthrough => 2,
        }
    }
}

impl TryFrom<u8> for LayerMode {
    type Error = LayersError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Additive),
            1 => Ok(Self::Override),
            2 => Ok(Self::OverridePassthrough),
            other => Err(LayersError::malformed(format!("unknown layer mode {other}"))),
        }
    }
}

/// How rotations accumulate across layers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationMode {
    /// Euler channels blend independently.
    #[default]
    PerChannel,
    /// Rotations blend as quaternions.
    PerLayer,
}

impl RotationMode {
    pub fn code(self) -> u8 {
        match self {
            Self::PerChannel => 0,
            Self::PerLayer => 1,
        }
    }
}

impl TryFrom<u8> for RotationMode {
    type Error = LayersError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::PerChannel),
            1 => Ok(Self::PerLayer),
            other => Err(LayersError::malformed(format!(
                "unknown rotation mode {other}"
            ))),
        }
    }
}

/// Lowest and highest accepted layer weight.
pub const WEIGHT_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerAttributes {
    pub name: String,
    pub mode: LayerMode,
    pub rotation_mode: RotationMode,
    /// Blend weight in percent (0.0 to 100.0).
    pub weight: f64,
    pub muted: bool,
}

impl Default for LayerAttributes {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: LayerMode::default(),
            rotation_mode: RotationMode::default(),
            weight: 100.0,
            muted: false,
        }
    }
}

impl LayerAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_mode(mut self, mode: LayerMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn with_rotation_mode(mut self, rotation_mode: RotationMode) -> Self {
        self.rotation_mode = rotation_mode;
        self
    }

    #[inline]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Copy the attributes a transferred layer inherits (name, mode, rotation mode, weight);
    /// mute state stays with the destination.
    pub fn inherit_from(&mut self, source: &LayerAttributes) {
        self.name = source.name.clone();
        self.mode = source.mode;
        self.rotation_mode = source.rotation_mode;
        self.weight = source.weight;
    }
}

/// Check a layer weight against [`WEIGHT_RANGE`].
pub fn validate_weight(weight: f64) -> Result<f64, LayersError> {
    let (lo, hi) = WEIGHT_RANGE;
    if weight.is_finite() && (lo..=hi).contains(&weight) {
        Ok(weight)
    } else {
        Err(LayersError::malformed(format!(
            "layer weight {weight} must be between {lo} and {hi}"
        )))
    }
}

/// Local time span of a take.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: KeyTime,
    pub stop: KeyTime,
}

impl TimeSpan {
    pub fn new(start: KeyTime, stop: KeyTime) -> Self {
        Self { start, stop }
    }

    /// Span from `start_frame` to `stop_frame`; the start must precede the stop.
    pub fn from_frames(start_frame: i64, stop_frame: i64, fps: f64) -> Result<Self, LayersError> {
        if start_frame >= stop_frame {
            return Err(LayersError::malformed(format!(
                "frame range start {start_frame} must be before stop {stop_frame}"
            )));
        }
        if !(fps.is_finite() && fps > 0.0) {
            return Err(LayersError::malformed(format!("invalid frame rate {fps}")));
        }
        Ok(Self {
            start: KeyTime::from_frame(start_frame, fps),
            stop: KeyTime::from_frame(stop_frame, fps),
        })
    }
}

/// Explicit write target for collect/scan/decode: one layer of one take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerContext {
    pub take: TakeId,
    pub layer: LayerId,
}

impl LayerContext {
    pub fn new(take: TakeId, layer: LayerId) -> Self {
        Self { take, layer }
    }
}
