//! In-memory animation host.
//!
//! `Scene` owns components (with optional channel trees), takes with their layer stacks and
//! the curves of every (layer, channel). It implements [`AnimationHost`] with the same
//! observable policies a DCC host applies: names are made unique within their scope, new
//! layers are appended on top, the base layer cannot be deleted, and a layer can only be
//! selected on the current take.

use hashbrown::{HashMap, HashSet};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelNode, ChannelPath, SEPARATOR};
use crate::codec::decode_with_tolerance;
use crate::collect::{collect_all, ChannelCurves};
use crate::config::Config;
use crate::curve::{Curve, CurveSource, CurveTarget};
use crate::error::LayersError;
use crate::host::AnimationHost;
use crate::ids::{ComponentId, IdAllocator, LayerId, TakeId};
use crate::layer::{validate_weight, LayerAttributes, LayerContext, TimeSpan};
use crate::Result;

#[derive(Clone, Debug)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub root: Option<ChannelNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationLayer {
    pub id: LayerId,
    pub attributes: LayerAttributes,
}

#[derive(Clone, Debug)]
pub struct Take {
    pub id: TakeId,
    pub name: String,
    pub span: TimeSpan,
    /// Bottom to top; index 0 is the base layer.
    pub layers: Vec<AnimationLayer>,
}

impl Take {
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers
            .iter()
            .map(|l| l.attributes.name.as_str())
            .collect()
    }

    pub fn layer(&self, id: LayerId) -> Option<&AnimationLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&AnimationLayer> {
        self.layers.iter().find(|l| l.attributes.name == name)
    }
}

/// `wanted` if unused, otherwise the first free `"{wanted} {n}"` with n = 1, 2, ...
pub fn unique_name<'a>(taken: impl IntoIterator<Item = &'a str>, wanted: &str) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();
    if !taken.contains(&wanted) {
        return wanted.to_string();
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{wanted} {n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    cfg: Config,
    ids: IdAllocator,
    components: Vec<Component>,
    takes: Vec<Take>,
    /// Every keyable channel path and the component owning it.
    channels: HashMap<ChannelPath, ComponentId>,
    curves: HashMap<LayerId, HashMap<ChannelPath, Curve>>,
    current_take: Option<TakeId>,
    selected_layer: Option<LayerContext>,
}

impl Scene {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn current_take(&self) -> Option<TakeId> {
        self.current_take
    }

    pub fn selected_layer(&self) -> Option<LayerContext> {
        self.selected_layer
    }

    // ----- components -----

    /// Add a component; its keyable channels become addressable by path. Component names
    /// must be unique because they prefix every channel path, and no name in the tree may
    /// contain the path separator. A component whose paths collide with each other or with
    /// an existing channel is rejected before anything is registered.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        root: Option<ChannelNode>,
    ) -> Result<ComponentId> {
        let name = name.into();
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(LayersError::host_state(format!(
                "invalid component name '{name}'"
            )));
        }
        if self.components.iter().any(|c| c.name == name) {
            return Err(LayersError::host_state(format!(
                "component name '{name}' already in use"
            )));
        }
        let mut paths = Vec::new();
        if let Some(root) = &root {
            if let Some(bad) = root.invalid_descendant_name() {
                return Err(LayersError::host_state(format!(
                    "invalid channel name '{bad}' in component '{name}'"
                )));
            }
            let mut seen = HashSet::new();
            for path in root.curve_channels(ChannelPath::new(name.as_str())) {
                if self.channels.contains_key(&path) || !seen.insert(path.clone()) {
                    return Err(LayersError::host_state(format!(
                        "channel path '{path}' already in use"
                    )));
                }
                paths.push(path);
            }
        }
        let id = self.ids.alloc_component();
        for path in paths {
            self.channels.insert(path, id);
        }
        self.components.push(Component { id, name, root });
        Ok(id)
    }

    /// Remove a component together with its curves on every layer.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<()> {
        let idx = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LayersError::host_state(format!("component {id:?} not found")))?;
        self.components.remove(idx);
        self.channels.retain(|_, owner| *owner != id);
        let channels = &self.channels;
        for curves in self.curves.values_mut() {
            curves.retain(|path, _| channels.contains_key(path));
        }
        Ok(())
    }

    pub fn component_by_name(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    // ----- takes and layers -----

    /// Add a take holding only a base layer.
    pub fn add_take(&mut self, name: &str) -> TakeId {
        let id = self.ids.alloc_take();
        let name = unique_name(self.takes.iter().map(|t| t.name.as_str()), name);
        let base = AnimationLayer {
            id: self.ids.alloc_layer(),
            attributes: LayerAttributes::named(self.cfg.base_layer_name.clone()),
        };
        self.takes.push(Take {
            id,
            name,
            span: TimeSpan::default(),
            layers: vec![base],
        });
        id
    }

    /// Append a layer on top of `take` and apply `attrs` to it.
    pub fn add_layer(&mut self, take: TakeId, attrs: LayerAttributes) -> Result<LayerId> {
        let layer = self.create_layer(take)?;
        self.set_layer_attributes(LayerContext::new(take, layer), &attrs)?;
        Ok(layer)
    }

    pub fn take(&self, id: TakeId) -> Option<&Take> {
        self.takes.iter().find(|t| t.id == id)
    }

    pub fn take_by_name(&self, name: &str) -> Option<&Take> {
        self.takes.iter().find(|t| t.name == name)
    }

    pub fn layer_names(&self, take: TakeId) -> Result<Vec<String>> {
        Ok(self
            .take_ref(take)?
            .layer_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Context of the layer named `layer` in the take named `take`.
    pub fn context_by_name(&self, take: &str, layer: &str) -> Option<LayerContext> {
        let t = self.take_by_name(take)?;
        let l = t.layer_by_name(layer)?;
        Some(LayerContext::new(t.id, l.id))
    }

    // ----- curves -----

    /// Replace the curve of `path` on `ctx`.
    pub fn set_curve(&mut self, ctx: LayerContext, path: &ChannelPath, curve: Curve) -> Result<()> {
        self.locate(ctx)?;
        if !self.channels.contains_key(path) {
            return Err(LayersError::UnresolvedChannel { path: path.clone() });
        }
        self.curves
            .entry(ctx.layer)
            .or_default()
            .insert(path.clone(), curve);
        Ok(())
    }

    pub fn curve_of(&self, ctx: LayerContext, path: &ChannelPath) -> Option<&Curve> {
        self.locate(ctx).ok()?;
        self.curves.get(&ctx.layer)?.get(path)
    }

    // ----- lookup helpers -----

    fn take_index(&self, take: TakeId) -> Result<usize> {
        self.takes
            .iter()
            .position(|t| t.id == take)
            .ok_or_else(|| LayersError::host_state(format!("take {take:?} not found")))
    }

    fn take_ref(&self, take: TakeId) -> Result<&Take> {
        Ok(&self.takes[self.take_index(take)?])
    }

    /// (take index, layer index) of a context.
    fn locate(&self, ctx: LayerContext) -> Result<(usize, usize)> {
        let ti = self.take_index(ctx.take)?;
        let li = self.takes[ti]
            .layers
            .iter()
            .position(|l| l.id == ctx.layer)
            .ok_or_else(|| {
                LayersError::host_state(format!(
                    "layer {:?} not found in take '{}'",
                    ctx.layer, self.takes[ti].name
                ))
            })?;
        Ok((ti, li))
    }

    fn forget_layer(&mut self, layer: LayerId) {
        self.curves.remove(&layer);
        if self.selected_layer.is_some_and(|s| s.layer == layer) {
            self.selected_layer = None;
        }
    }

    // ----- documents -----

    /// Build a scene from its JSON document form. The first layer of every take document
    /// describes the base layer.
    pub fn from_document(doc: &SceneDocument, cfg: Config) -> Result<Self> {
        let tolerance = cfg.time_tolerance_ticks;
        let mut scene = Scene::new(cfg);
        for c in &doc.components {
            scene.add_component(c.name.clone(), c.channels.clone())?;
        }
        for t in &doc.takes {
            let take = scene.add_take(&t.name);
            scene.set_time_span(take, t.span)?;
            for (i, l) in t.layers.iter().enumerate() {
                let layer = if i == 0 {
                    let base = scene.layers(take)?[0];
                    scene.set_layer_attributes(LayerContext::new(take, base), &l.attributes)?;
                    base
                } else {
                    scene.add_layer(take, l.attributes.clone())?
                };
                let ctx = LayerContext::new(take, layer);
                for (path, records) in &l.curves {
                    let target = scene.curve_target(ctx, path)?;
                    decode_with_tolerance(target, records, tolerance)?;
                }
            }
        }
        debug!(
            "scene loaded: {} components, {} takes",
            scene.components.len(),
            scene.takes.len()
        );
        Ok(scene)
    }

    pub fn from_json(s: &str, cfg: Config) -> Result<Self> {
        let doc: SceneDocument = serde_json::from_str(s)?;
        Self::from_document(&doc, cfg)
    }

    /// Snapshot the scene as a document; curves are listed in channel-tree order.
    pub fn to_document(&self) -> Result<SceneDocument> {
        let components: Vec<ComponentId> = self.components.iter().map(|c| c.id).collect();
        let mut takes = Vec::with_capacity(self.takes.len());
        for t in &self.takes {
            let mut layers = Vec::with_capacity(t.layers.len());
            for l in &t.layers {
                let ctx = LayerContext::new(t.id, l.id);
                layers.push(LayerDocument {
                    attributes: l.attributes.clone(),
                    curves: collect_all(self, ctx, &components)?,
                });
            }
            takes.push(TakeDocument {
                name: t.name.clone(),
                span: t.span,
                layers,
            });
        }
        Ok(SceneDocument {
            components: self
                .components
                .iter()
                .map(|c| ComponentDocument {
                    name: c.name.clone(),
                    channels: c.root.clone(),
                })
                .collect(),
            takes,
        })
    }
}

impl AnimationHost for Scene {
    fn takes(&self) -> Vec<TakeId> {
        self.takes.iter().map(|t| t.id).collect()
    }

    fn take_name(&self, take: TakeId) -> Result<String> {
        Ok(self.take_ref(take)?.name.clone())
    }

    fn time_span(&self, take: TakeId) -> Result<TimeSpan> {
        Ok(self.take_ref(take)?.span)
    }

    fn set_time_span(&mut self, take: TakeId, span: TimeSpan) -> Result<()> {
        let ti = self.take_index(take)?;
        self.takes[ti].span = span;
        Ok(())
    }

    fn copy_take(&mut self, take: TakeId, name: &str) -> Result<TakeId> {
        let source = self.take_ref(take)?.clone();
        let id = self.ids.alloc_take();
        let name = unique_name(self.takes.iter().map(|t| t.name.as_str()), name);
        let mut layers = Vec::with_capacity(source.layers.len());
        for l in &source.layers {
            let new_id = self.ids.alloc_layer();
            if let Some(curves) = self.curves.get(&l.id).cloned() {
                self.curves.insert(new_id, curves);
            }
            layers.push(AnimationLayer {
                id: new_id,
                attributes: l.attributes.clone(),
            });
        }
        self.takes.push(Take {
            id,
            name,
            span: source.span,
            layers,
        });
        Ok(id)
    }

    fn rename_take(&mut self, take: TakeId, name: &str) -> Result<String> {
        let ti = self.take_index(take)?;
        let assigned = unique_name(
            self.takes
                .iter()
                .filter(|t| t.id != take)
                .map(|t| t.name.as_str()),
            name,
        );
        self.takes[ti].name = assigned.clone();
        Ok(assigned)
    }

    fn delete_take(&mut self, take: TakeId) -> Result<()> {
        let ti = self.take_index(take)?;
        let removed = self.takes.remove(ti);
        for l in &removed.layers {
            self.forget_layer(l.id);
        }
        if self.current_take == Some(take) {
            self.current_take = None;
        }
        Ok(())
    }

    fn layers(&self, take: TakeId) -> Result<Vec<LayerId>> {
        Ok(self.take_ref(take)?.layers.iter().map(|l| l.id).collect())
    }

    fn layer_attributes(&self, ctx: LayerContext) -> Result<LayerAttributes> {
        let (ti, li) = self.locate(ctx)?;
        Ok(self.takes[ti].layers[li].attributes.clone())
    }

    fn set_layer_attributes(
        &mut self,
        ctx: LayerContext,
        attrs: &LayerAttributes,
    ) -> Result<String> {
        let (ti, li) = self.locate(ctx)?;
        validate_weight(attrs.weight)?;
        let take = &mut self.takes[ti];
        let name = unique_name(
            take.layers
                .iter()
                .filter(|l| l.id != ctx.layer)
                .map(|l| l.attributes.name.as_str()),
            &attrs.name,
        );
        let layer = &mut take.layers[li];
        layer.attributes = LayerAttributes {
            name: name.clone(),
            ..attrs.clone()
        };
        Ok(name)
    }

    fn create_layer(&mut self, take: TakeId) -> Result<LayerId> {
        let ti = self.take_index(take)?;
        let id = self.ids.alloc_layer();
        let t = &mut self.takes[ti];
        let mut n = 1u32;
        let name = loop {
            let candidate = format!("{}{n}", self.cfg.new_layer_prefix);
            if t.layer_by_name(&candidate).is_none() {
                break candidate;
            }
            n += 1;
        };
        t.layers.push(AnimationLayer {
            id,
            attributes: LayerAttributes::named(name),
        });
        Ok(id)
    }

    fn delete_layer(&mut self, ctx: LayerContext) -> Result<()> {
        let (ti, li) = self.locate(ctx)?;
        if li == 0 {
            return Err(LayersError::host_state(format!(
                "the base layer of take '{}' cannot be deleted",
                self.takes[ti].name
            )));
        }
        self.takes[ti].layers.remove(li);
        self.forget_layer(ctx.layer);
        Ok(())
    }

    fn set_current_take(&mut self, take: TakeId) -> Result<()> {
        self.take_index(take)?;
        if self.current_take != Some(take) {
            self.selected_layer = None;
        }
        self.current_take = Some(take);
        Ok(())
    }

    fn select_layer_exclusive(&mut self, ctx: LayerContext) -> Result<()> {
        self.locate(ctx)?;
        if self.current_take != Some(ctx.take) {
            return Err(LayersError::host_state(format!(
                "cannot select layer {:?}: take {:?} is not the current take",
                ctx.layer, ctx.take
            )));
        }
        self.selected_layer = Some(ctx);
        Ok(())
    }

    fn components(&self) -> Vec<ComponentId> {
        self.components.iter().map(|c| c.id).collect()
    }

    fn component_name(&self, component: ComponentId) -> Result<String> {
        self.components
            .iter()
            .find(|c| c.id == component)
            .map(|c| c.name.clone())
            .ok_or_else(|| LayersError::host_state(format!("component {component:?} not found")))
    }

    fn channel_root(&self, component: ComponentId) -> Option<&ChannelNode> {
        self.components
            .iter()
            .find(|c| c.id == component)
            .and_then(|c| c.root.as_ref())
    }

    fn curve(&self, ctx: LayerContext, path: &ChannelPath) -> Option<&dyn CurveSource> {
        let curve: &dyn CurveSource = self.curve_of(ctx, path)?;
        Some(curve)
    }

    fn curve_target(
        &mut self,
        ctx: LayerContext,
        path: &ChannelPath,
    ) -> Result<&mut dyn CurveTarget> {
        self.locate(ctx)?;
        if !self.channels.contains_key(path) {
            return Err(LayersError::UnresolvedChannel { path: path.clone() });
        }
        let curve: &mut dyn CurveTarget = self
            .curves
            .entry(ctx.layer)
            .or_default()
            .entry(path.clone())
            .or_default();
        Ok(curve)
    }
}

// ----- JSON document form -----

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
    #[serde(default)]
    pub takes: Vec<TakeDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub name: String,
    #[serde(default)]
    pub channels: Option<ChannelNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeDocument {
    pub name: String,
    #[serde(default)]
    pub span: TimeSpan,
    #[serde(default)]
    pub layers: Vec<LayerDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    #[serde(flatten)]
    pub attributes: LayerAttributes,
    #[serde(default)]
    pub curves: ChannelCurves,
}
