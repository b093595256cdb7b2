//! Keyframe codec: snapshot a curve into portable records and rebuild a curve from them.

use serde::{Deserialize, Serialize};

use crate::curve::{CurveSource, CurveTarget};
use crate::error::LayersError;
use crate::keyframe::{
    is_default_weight, ConstantMode, Interpolation, KeyTime, Keyframe, TangentMode,
};
use crate::Result;

/// One encoded keyframe. Enum fields carry the host's integer codes so records survive
/// hosts that extend the enumerations; unknown or out-of-range codes are rejected on decode
/// rather than at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyRecord {
    /// Absolute time in ticks.
    pub time: i64,
    pub value: f64,
    pub interpolation: i64,
    pub tangent_mode: i64,
    pub constant_mode: i64,
    pub left_derivative: f64,
    pub right_derivative: f64,
    pub left_weight: f64,
    pub right_weight: f64,
}

impl From<&Keyframe> for KeyRecord {
    fn from(k: &Keyframe) -> Self {
        Self {
            time: k.time.ticks(),
            value: k.value,
            interpolation: i64::from(k.interpolation.code()),
            tangent_mode: i64::from(k.tangent_mode.code()),
            constant_mode: i64::from(k.constant_mode.code()),
            left_derivative: k.left_derivative,
            right_derivative: k.right_derivative,
            left_weight: k.left_weight,
            right_weight: k.right_weight,
        }
    }
}

/// Encode every key of `curve` in time order. Pure snapshot; values are not transformed.
pub fn encode<C: CurveSource + ?Sized>(curve: &C) -> Vec<KeyRecord> {
    (0..curve.key_count())
        .filter_map(|i| curve.key(i))
        .map(|k| KeyRecord::from(&k))
        .collect()
}

/// Replace all keys of `target` with `records`, rejecting any backwards step in time.
pub fn decode<T: CurveTarget + ?Sized>(target: &mut T, records: &[KeyRecord]) -> Result<()> {
    decode_with_tolerance(target, records, 0)
}

fn enum_code(record: usize, field: &str, code: i64) -> Result<u8> {
    u8::try_from(code).map_err(|_| {
        LayersError::malformed(format!("record {record} has {field} code {code} out of range"))
    })
}

/// Key fields validated ahead of any mutation of the target.
struct ValidKey {
    time: KeyTime,
    interpolation: Interpolation,
    tangent_mode: TangentMode,
    constant_mode: ConstantMode,
}

fn validate(records: &[KeyRecord], tolerance_ticks: i64) -> Result<Vec<ValidKey>> {
    let tolerance = tolerance_ticks.max(0);
    let mut keys = Vec::with_capacity(records.len());
    let mut last: Option<i64> = None;
    for (i, r) in records.iter().enumerate() {
        let mut time = r.time;
        if let Some(prev) = last {
            if time < prev {
                if prev - time > tolerance {
                    return Err(LayersError::malformed(format!(
                        "record {i} at tick {time} precedes previous record at tick {prev}"
                    )));
                }
                time = prev;
            }
        }
        if !r.value.is_finite() {
            return Err(LayersError::malformed(format!(
                "record {i} has a non-finite value"
            )));
        }
        let interpolation = enum_code(i, "interpolation", r.interpolation)?;
        let tangent_mode = enum_code(i, "tangent-mode", r.tangent_mode)?;
        let constant_mode = enum_code(i, "constant-mode", r.constant_mode)?;
        keys.push(ValidKey {
            time: KeyTime(time),
            interpolation: Interpolation::try_from(interpolation)?,
            tangent_mode: TangentMode::try_from(tangent_mode)?,
            constant_mode: ConstantMode::try_from(constant_mode)?,
        });
        last = Some(time);
    }
    Ok(keys)
}

/// [`decode`] allowing records to run up to `tolerance_ticks` backwards; such records are
/// snapped onto the previous record's time.
///
/// Validation happens before the target is touched, so a malformed record list leaves the
/// target untouched. Keys are written in two passes: all keys and their modes first, then
/// derivatives and weights, because the host recomputes neighbouring tangents whenever a
/// key is inserted. Default weights are never written back, which would otherwise flag the
/// key as weighted and change its shape.
pub fn decode_with_tolerance<T: CurveTarget + ?Sized>(
    target: &mut T,
    records: &[KeyRecord],
    tolerance_ticks: i64,
) -> Result<()> {
    let keys = validate(records, tolerance_ticks)?;

    target.clear();

    let mut indices = Vec::with_capacity(keys.len());
    for (key, record) in keys.iter().zip(records) {
        let idx = target.add_key(key.time, record.value);
        target.set_interpolation(idx, key.interpolation);
        target.set_tangent_mode(idx, key.tangent_mode.reconstructible());
        target.set_constant_mode(idx, key.constant_mode);
        indices.push(idx);
    }

    for (idx, record) in indices.into_iter().zip(records) {
        target.set_left_derivative(idx, record.left_derivative);
        target.set_right_derivative(idx, record.right_derivative);
        if !is_default_weight(record.left_weight) {
            target.set_left_weight(idx, record.left_weight);
        }
        if !is_default_weight(record.right_weight) {
            target.set_right_weight(idx, record.right_weight);
        }
    }
    Ok(())
}

/// Serialize records to the JSON wire shape (kebab-case keys).
pub fn records_to_json(records: &[KeyRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

pub fn records_from_json(s: &str) -> Result<Vec<KeyRecord>> {
    Ok(serde_json::from_str(s)?)
}
