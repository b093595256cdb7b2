//! Batch layer and take management.
//!
//! Attribute edits skip the base layer of a take; deleting the base layer clears its curves
//! instead. Every operation returns what the host actually did (assigned names, created ids)
//! since hosts may adjust names for uniqueness.

use log::debug;

use crate::channel::ChannelPath;
use crate::config::Config;
use crate::host::AnimationHost;
use crate::ids::{LayerId, TakeId};
use crate::layer::{
    validate_weight, LayerAttributes, LayerContext, LayerMode, RotationMode, TimeSpan,
};
use crate::transfer::{DestinationReport, LayerTransfer, TakeSelection};
use crate::Result;

/// Apply `edit` to every non-base layer in `layers`. Returns the names assigned by the host.
fn edit_layers<H, F>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    edit: F,
) -> Result<Vec<String>>
where
    H: AnimationHost + ?Sized,
    F: Fn(&mut LayerAttributes),
{
    let mut names = Vec::with_capacity(layers.len());
    for &layer in layers {
        let ctx = LayerContext::new(take, layer);
        if host.is_base_layer(ctx)? {
            continue;
        }
        let mut attrs = host.layer_attributes(ctx)?;
        edit(&mut attrs);
        names.push(host.set_layer_attributes(ctx, &attrs)?);
    }
    Ok(names)
}

pub fn rename_layers<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    name: &str,
) -> Result<Vec<String>> {
    edit_layers(host, take, layers, |a| a.name = name.to_string())
}

pub fn set_layers_muted<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    muted: bool,
) -> Result<()> {
    edit_layers(host, take, layers, |a| a.muted = muted).map(drop)
}

pub fn set_layers_mode<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    mode: LayerMode,
) -> Result<()> {
    edit_layers(host, take, layers, |a| a.mode = mode).map(drop)
}

pub fn set_layers_rotation_mode<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    rotation_mode: RotationMode,
) -> Result<()> {
    edit_layers(host, take, layers, |a| a.rotation_mode = rotation_mode).map(drop)
}

/// Set the weight of every non-base layer. The value is checked before any layer changes.
pub fn set_layers_weight<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
    weight: f64,
) -> Result<()> {
    let weight = validate_weight(weight)?;
    edit_layers(host, take, layers, |a| a.weight = weight).map(drop)
}

/// Empty every curve on a layer. Returns the number of channels cleared.
pub fn clear_layer<H: AnimationHost + ?Sized>(host: &mut H, ctx: LayerContext) -> Result<usize> {
    host.set_current_take(ctx.take)?;
    host.select_layer_exclusive(ctx)?;

    let mut keyed: Vec<ChannelPath> = Vec::new();
    for component in host.components() {
        let Some(root) = host.channel_root(component) else {
            continue;
        };
        let root_path = ChannelPath::new(host.component_name(component)?);
        keyed.extend(
            root.curve_channels(root_path)
                .filter(|p| host.curve(ctx, p).is_some_and(|c| !c.is_empty())),
        );
    }
    for path in &keyed {
        host.curve_target(ctx, path)?.clear();
    }
    debug!("cleared {} channels on layer {:?}", keyed.len(), ctx.layer);
    Ok(keyed.len())
}

/// Delete layers; a base layer is cleared rather than deleted.
pub fn delete_layers<H: AnimationHost + ?Sized>(
    host: &mut H,
    take: TakeId,
    layers: &[LayerId],
) -> Result<()> {
    for &layer in layers {
        let ctx = LayerContext::new(take, layer);
        if host.is_base_layer(ctx)? {
            clear_layer(host, ctx)?;
        } else {
            host.delete_layer(ctx)?;
        }
    }
    Ok(())
}

/// Append copies of `layers` (attributes and curves) on top of their own take, keeping their
/// relative order.
pub fn duplicate_layers<H: AnimationHost + ?Sized>(
    host: &mut H,
    cfg: &Config,
    take: TakeId,
    layers: &[LayerId],
) -> Result<DestinationReport> {
    let engine = LayerTransfer::new(cfg.clone());
    let capture = engine.capture_take(host, &TakeSelection::new(take, layers.to_vec()))?;
    Ok(engine.replay(host, &capture, take))
}

/// Copy each take with all layers and curves, named `<name><take_copy_suffix>`.
pub fn duplicate_takes<H: AnimationHost + ?Sized>(
    host: &mut H,
    cfg: &Config,
    takes: &[TakeId],
) -> Result<Vec<TakeId>> {
    let mut copies = Vec::with_capacity(takes.len());
    for &take in takes {
        let name = format!("{}{}", host.take_name(take)?, cfg.take_copy_suffix);
        copies.push(host.copy_take(take, &name)?);
    }
    Ok(copies)
}

pub fn rename_takes<H: AnimationHost + ?Sized>(
    host: &mut H,
    takes: &[TakeId],
    name: &str,
) -> Result<Vec<String>> {
    takes.iter().map(|&t| host.rename_take(t, name)).collect()
}

pub fn delete_takes<H: AnimationHost + ?Sized>(host: &mut H, takes: &[TakeId]) -> Result<()> {
    takes.iter().try_for_each(|&t| host.delete_take(t))
}

/// Set the time span of every take from a frame range at `cfg.frame_rate`.
pub fn set_frame_range<H: AnimationHost + ?Sized>(
    host: &mut H,
    cfg: &Config,
    takes: &[TakeId],
    start_frame: i64,
    stop_frame: i64,
) -> Result<TimeSpan> {
    let span = TimeSpan::from_frames(start_frame, stop_frame, cfg.frame_rate)?;
    for &take in takes {
        host.set_time_span(take, span)?;
    }
    Ok(span)
}
