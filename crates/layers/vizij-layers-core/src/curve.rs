//! Curve access traits and the in-memory curve.
//!
//! Hosts expose their native curve objects through [`CurveSource`] (read) and
//! [`CurveTarget`] (write). [`Curve`] implements both and is what the in-memory scene stores.

use serde::{Deserialize, Serialize};

use crate::keyframe::{ConstantMode, Interpolation, KeyTime, Keyframe, TangentMode};

/// Read access to a host curve.
pub trait CurveSource {
    fn key_count(&self) -> usize;

    /// Key at `index` in time order.
    fn key(&self, index: usize) -> Option<Keyframe>;

    fn is_empty(&self) -> bool {
        self.key_count() == 0
    }
}

/// Write access to a host curve.
///
/// Setters address keys by position; callers only pass indices returned by
/// [`CurveTarget::add_key`].
pub trait CurveTarget {
    /// Remove every key.
    fn clear(&mut self);

    /// Insert a key at `time` (replacing the value of an existing key at the same time) and
    /// return its index.
    fn add_key(&mut self, time: KeyTime, value: f64) -> usize;

    fn set_interpolation(&mut self, index: usize, interpolation: Interpolation);
    fn set_tangent_mode(&mut self, index: usize, tangent_mode: TangentMode);
    fn set_constant_mode(&mut self, index: usize, constant_mode: ConstantMode);
    fn set_left_derivative(&mut self, index: usize, derivative: f64);
    fn set_right_derivative(&mut self, index: usize, derivative: f64);
    fn set_left_weight(&mut self, index: usize, weight: f64);
    fn set_right_weight(&mut self, index: usize, weight: f64);
}

/// Keyframes of one channel under one (take, layer), ordered by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from keys in any order; keys sharing a time keep their relative order.
    pub fn from_keys(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by_key(|k| k.time);
        Self { keys }
    }

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn key_mut(&mut self, index: usize) -> Option<&mut Keyframe> {
        self.keys.get_mut(index)
    }
}

impl CurveSource for Curve {
    fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn key(&self, index: usize) -> Option<Keyframe> {
        self.keys.get(index).copied()
    }
}

impl CurveTarget for Curve {
    fn clear(&mut self) {
        self.keys.clear();
    }

    fn add_key(&mut self, time: KeyTime, value: f64) -> usize {
        match self.keys.binary_search_by_key(&time, |k| k.time) {
            Ok(idx) => {
                self.keys[idx].value = value;
                idx
            }
            Err(idx) => {
                self.keys.insert(idx, Keyframe::new(time, value));
                idx
            }
        }
    }

    fn set_interpolation(&mut self, index: usize, interpolation: Interpolation) {
        if let Some(k) = self.key_mut(index) {
            k.interpolation = interpolation;
        }
    }

    fn set_tangent_mode(&mut self, index: usize, tangent_mode: TangentMode) {
        if let Some(k) = self.key_mut(index) {
            k.tangent_mode = tangent_mode;
        }
    }

    fn set_constant_mode(&mut self, index: usize, constant_mode: ConstantMode) {
        if let Some(k) = self.key_mut(index) {
            k.constant_mode = constant_mode;
        }
    }

    fn set_left_derivative(&mut self, index: usize, derivative: f64) {
        if let Some(k) = self.key_mut(index) {
            k.left_derivative = derivative;
        }
    }

    fn set_right_derivative(&mut self, index: usize, derivative: f64) {
        if let Some(k) = self.key_mut(index) {
            k.right_derivative = derivative;
        }
    }

    fn set_left_weight(&mut self, index: usize, weight: f64) {
        if let Some(k) = self.key_mut(index) {
            k.left_weight = weight;
        }
    }

    fn set_right_weight(&mut self, index: usize, weight: f64) {
        if let Some(k) = self.key_mut(index) {
            k.right_weight = weight;
        }
    }
}
