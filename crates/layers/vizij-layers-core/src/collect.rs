//! Curve collector: encode every keyed channel of a component on one layer.

use indexmap::IndexMap;
use log::trace;

use crate::channel::ChannelPath;
use crate::codec::{encode, KeyRecord};
use crate::host::AnimationHost;
use crate::ids::ComponentId;
use crate::layer::LayerContext;
use crate::Result;

/// Encoded curves keyed by channel path, in traversal order.
pub type ChannelCurves = IndexMap<ChannelPath, Vec<KeyRecord>>;

/// Collect the non-empty curves of `component` on `ctx`.
///
/// Channels without keys on this layer are omitted. A component without a channel tree
/// yields an empty map.
pub fn collect<H: AnimationHost + ?Sized>(
    host: &H,
    ctx: LayerContext,
    component: ComponentId,
) -> Result<ChannelCurves> {
    // surfaces a missing take/layer instead of returning nothing
    host.layer_attributes(ctx)?;

    let mut curves = ChannelCurves::new();
    let Some(root) = host.channel_root(component) else {
        return Ok(curves);
    };
    let root_path = ChannelPath::new(host.component_name(component)?);
    for path in root.curve_channels(root_path) {
        match host.curve(ctx, &path) {
            Some(curve) if !curve.is_empty() => {
                trace!("collect {path}: {} keys", curve.key_count());
                let records = encode(curve);
                curves.insert(path, records);
            }
            _ => {}
        }
    }
    Ok(curves)
}

/// Collect several components into one map; later components win on duplicate paths.
pub fn collect_all<H: AnimationHost + ?Sized>(
    host: &H,
    ctx: LayerContext,
    components: &[ComponentId],
) -> Result<ChannelCurves> {
    let mut merged = ChannelCurves::new();
    for &component in components {
        merged.extend(collect(host, ctx, component)?);
    }
    Ok(merged)
}
