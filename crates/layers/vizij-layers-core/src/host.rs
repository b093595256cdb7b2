//! Host adapter boundary.
//!
//! An animation host (a DCC application, the in-memory [`crate::scene::Scene`], a JS bridge)
//! implements [`AnimationHost`]. Core operations receive an explicit [`LayerContext`] and
//! only call the activation methods where the host needs its current take/layer set before
//! curves can be read or written.

use crate::channel::{ChannelNode, ChannelPath};
use crate::curve::{CurveSource, CurveTarget};
use crate::ids::{ComponentId, LayerId, TakeId};
use crate::layer::{LayerAttributes, LayerContext, TimeSpan};
use crate::Result;

pub trait AnimationHost {
    // ----- takes -----

    /// All takes in scene order.
    fn takes(&self) -> Vec<TakeId>;
    fn take_name(&self, take: TakeId) -> Result<String>;
    fn time_span(&self, take: TakeId) -> Result<TimeSpan>;
    fn set_time_span(&mut self, take: TakeId, span: TimeSpan) -> Result<()>;
    /// Copy a take with all its layers and curves. Returns the new take.
    fn copy_take(&mut self, take: TakeId, name: &str) -> Result<TakeId>;
    /// Rename a take. Returns the name actually assigned after the host's uniqueness policy.
    fn rename_take(&mut self, take: TakeId, name: &str) -> Result<String>;
    fn delete_take(&mut self, take: TakeId) -> Result<()>;

    // ----- layers -----

    /// Layer stack of a take, bottom to top. Index 0 is the base layer.
    fn layers(&self, take: TakeId) -> Result<Vec<LayerId>>;
    fn layer_attributes(&self, ctx: LayerContext) -> Result<LayerAttributes>;
    /// Apply attributes. Returns the name actually assigned after the uniqueness policy.
    fn set_layer_attributes(&mut self, ctx: LayerContext, attrs: &LayerAttributes)
        -> Result<String>;
    /// Append a new layer on top of the take's stack.
    fn create_layer(&mut self, take: TakeId) -> Result<LayerId>;
    fn delete_layer(&mut self, ctx: LayerContext) -> Result<()>;

    // ----- activation -----

    fn set_current_take(&mut self, take: TakeId) -> Result<()>;
    /// Make `ctx.layer` the only selected layer of `ctx.take`.
    fn select_layer_exclusive(&mut self, ctx: LayerContext) -> Result<()>;

    // ----- components and curves -----

    fn components(&self) -> Vec<ComponentId>;
    fn component_name(&self, component: ComponentId) -> Result<String>;
    /// Root of the component's channel tree; `None` for components that are not animatable.
    fn channel_root(&self, component: ComponentId) -> Option<&ChannelNode>;
    /// Curve of a channel on a layer, if the channel has one there.
    fn curve(&self, ctx: LayerContext, path: &ChannelPath) -> Option<&dyn CurveSource>;
    /// Writable curve of a channel on a layer; fails with `UnresolvedChannel` for unknown
    /// channels.
    fn curve_target(&mut self, ctx: LayerContext, path: &ChannelPath)
        -> Result<&mut dyn CurveTarget>;

    /// Whether `ctx.layer` is the base layer of `ctx.take`.
    fn is_base_layer(&self, ctx: LayerContext) -> Result<bool> {
        Ok(self.layers(ctx.take)?.first() == Some(&ctx.layer))
    }
}
