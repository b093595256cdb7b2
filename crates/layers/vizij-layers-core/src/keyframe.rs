//! Keyframe data model: host-native time, key enums and the default tangent weight.

use serde::{Deserialize, Serialize};

use crate::error::LayersError;

/// Host-native ticks per second.
pub const TICKS_PER_SECOND: i64 = 46_186_158_000;

/// Weight the host assigns to an unweighted tangent.
pub const DEFAULT_TANGENT_WEIGHT: f64 = 1.0 / 3.0;

/// Whether a stored tangent weight is the host default.
///
/// Weights round-trip through single precision on the host, so 1/3 never compares equal;
/// anything strictly inside (0.3333, 0.3334) counts as default.
#[inline]
pub fn is_default_weight(weight: f64) -> bool {
    0.3333 < weight && weight < 0.3334
}

/// Absolute time in host ticks.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct KeyTime(pub i64);

impl KeyTime {
    pub const ZERO: KeyTime = KeyTime(0);

    #[inline]
    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Time of `frame` at `fps` frames per second, rounded to the nearest tick.
    pub fn from_frame(frame: i64, fps: f64) -> Self {
        let ticks = frame as f64 * TICKS_PER_SECOND as f64 / fps;
        KeyTime(ticks.round() as i64)
    }

    /// Frame position of this time at `fps`.
    pub fn frame(self, fps: f64) -> f64 {
        self.0 as f64 * fps / TICKS_PER_SECOND as f64
    }
}

impl From<i64> for KeyTime {
    fn from(ticks: i64) -> Self {
        KeyTime(ticks)
    }
}

/// Segment interpolation leaving a key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Cubic,
}

impl Interpolation {
    pub fn code(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Linear => 1,
            Self::Cubic => 2,
        }
    }
}

impl TryFrom<u8> for Interpolation {
    type Error = LayersError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Constant),
            1 => Ok(Self::Linear),
            2 => Ok(Self::Cubic),
            other => Err(LayersError::malformed(format!(
                "unknown interpolation code {other}"
            ))),
        }
    }
}

/// How a key's tangents are computed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TangentMode {
    #[default]
    Auto,
    /// Tension/continuity/bias; cannot be driven by explicit derivatives.
    Tcb,
    User,
    /// Independent left/right tangents.
    Break,
    ClampProgressive,
    TimeIndependent,
}

impl TangentMode {
    pub fn code(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Tcb => 1,
            Self::User => 2,
            Self::Break => 3,
            Self::ClampProgressive => 4,
            Self::TimeIndependent => 5,
        }
    }

    /// Mode to apply on reconstruction: TCB is downgraded to broken tangents so the stored
    /// derivatives can be written back.
    #[inline]
    pub fn reconstructible(self) -> Self {
        match self {
            Self::Tcb => Self::Break,
            other => other,
        }
    }
}

impl TryFrom<u8> for TangentMode {
    type Error = LayersError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Tcb),
            2 => Ok(Self::User),
            3 => Ok(Self::Break),
            4 => Ok(Self::ClampProgressive),
            5 => Ok(Self::TimeIndependent),
            other => Err(LayersError::malformed(format!(
                "unknown tangent mode code {other}"
            ))),
        }
    }
}

/// Which side a constant segment holds; only meaningful for [`Interpolation::Constant`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstantMode {
    /// Hold this key's value until the next key.
    #[default]
    Normal,
    /// Jump to the next key's value immediately.
    Next,
}

impl ConstantMode {
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Next => 1,
        }
    }
}

impl TryFrom<u8> for ConstantMode {
    type Error = LayersError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Next),
            other => Err(LayersError::malformed(format!(
                "unknown constant mode code {other}"
            ))),
        }
    }
}

/// One sample on a curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: KeyTime,
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub tangent_mode: TangentMode,
    #[serde(default)]
    pub constant_mode: ConstantMode,
    #[serde(default)]
    pub left_derivative: f64,
    #[serde(default)]
    pub right_derivative: f64,
    #[serde(default = "default_weight")]
    pub left_weight: f64,
    #[serde(default = "default_weight")]
    pub right_weight: f64,
}

fn default_weight() -> f64 {
    DEFAULT_TANGENT_WEIGHT
}

impl Keyframe {
    /// A key with the host's defaults: cubic, auto tangents, flat, unweighted.
    pub fn new(time: KeyTime, value: f64) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::default(),
            tangent_mode: TangentMode::default(),
            constant_mode: ConstantMode::default(),
            left_derivative: 0.0,
            right_derivative: 0.0,
            left_weight: DEFAULT_TANGENT_WEIGHT,
            right_weight: DEFAULT_TANGENT_WEIGHT,
        }
    }

    #[inline]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[inline]
    pub fn with_tangent_mode(mut self, tangent_mode: TangentMode) -> Self {
        self.tangent_mode = tangent_mode;
        self
    }

    #[inline]
    pub fn with_constant_mode(mut self, constant_mode: ConstantMode) -> Self {
        self.constant_mode = constant_mode;
        self
    }

    #[inline]
    pub fn with_derivatives(mut self, left: f64, right: f64) -> Self {
        self.left_derivative = left;
        self.right_derivative = right;
        self
    }

    #[inline]
    pub fn with_weights(mut self, left: f64, right: f64) -> Self {
        self.left_weight = left;
        self.right_weight = right;
        self
    }
}
