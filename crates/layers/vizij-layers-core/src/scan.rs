//! Animated-component scan.

use log::trace;

use crate::channel::{ChannelNode, ChannelPath};
use crate::host::AnimationHost;
use crate::ids::ComponentId;
use crate::layer::LayerContext;
use crate::Result;

/// Whether any keyable channel under `root` has keys on `ctx`. Stops at the first hit.
pub fn has_keys<H: AnimationHost + ?Sized>(
    host: &H,
    ctx: LayerContext,
    root: &ChannelNode,
    root_path: ChannelPath,
) -> bool {
    root.curve_channels(root_path)
        .any(|path| host.curve(ctx, &path).is_some_and(|c| !c.is_empty()))
}

/// Components with at least one keyed channel on `ctx`, in scene order.
///
/// Components without a channel tree are skipped; that is the normal case for
/// non-animatable scene objects.
pub fn scan<H: AnimationHost + ?Sized>(host: &H, ctx: LayerContext) -> Result<Vec<ComponentId>> {
    host.layer_attributes(ctx)?;

    let mut animated = Vec::new();
    for component in host.components() {
        let Some(root) = host.channel_root(component) else {
            trace!("scan: component {component:?} has no channels");
            continue;
        };
        let root_path = ChannelPath::new(host.component_name(component)?);
        if has_keys(host, ctx, root, root_path) {
            animated.push(component);
        }
    }
    Ok(animated)
}
