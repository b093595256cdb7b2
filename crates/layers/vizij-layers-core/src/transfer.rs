//! Layer transfer engine.
//!
//! A transfer runs in two halves per selected source take:
//!
//! * **capture**: activate the take, walk its stack top-down (the order hosts list layers
//!   in), and for every selected layer scan and collect its curves together with its
//!   attributes. The captured list is then reversed so it runs bottom-to-top.
//! * **replay**: for every destination take, append one new layer per capture (hosts only
//!   ever append on top), copy the inherited attributes and decode every captured curve onto
//!   the same channel path of the new layer.
//!
//! Appending in bottom-to-top order leaves the destination with the source's relative
//! stacking. Failures are isolated: an unresolved or malformed channel is reported and the
//! rest of the layer is still written, and a destination that cannot be prepared does not
//! stop the other destinations.

use hashbrown::HashSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::channel::ChannelPath;
use crate::codec::decode_with_tolerance;
use crate::collect::{collect_all, ChannelCurves};
use crate::config::Config;
use crate::error::LayersError;
use crate::host::AnimationHost;
use crate::ids::{LayerId, TakeId};
use crate::layer::{LayerAttributes, LayerContext};
use crate::scan::scan;
use crate::Result;

/// Source take and the layers selected in it. Layer order here does not matter; the take's
/// own stack decides it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeSelection {
    pub take: TakeId,
    pub layers: Vec<LayerId>,
}

impl TakeSelection {
    pub fn new(take: TakeId, layers: Vec<LayerId>) -> Self {
        Self { take, layers }
    }
}

/// Everything a destination needs to rebuild one source layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerCapture {
    pub source: LayerContext,
    pub attributes: LayerAttributes,
    pub curves: ChannelCurves,
}

/// Captured layers of one take, bottom-to-top (replay order).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeCapture {
    pub take: TakeId,
    pub layers: Vec<LayerCapture>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedLayer {
    pub source: LayerContext,
    pub layer: LayerId,
    /// Name assigned by the host, which may differ from the source name.
    pub name: String,
    pub channels_written: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelFailure {
    pub layer: LayerId,
    pub path: ChannelPath,
    pub error: LayersError,
}

/// Outcome of replaying one source take onto one destination take.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationReport {
    pub source: TakeId,
    pub take: TakeId,
    pub created: Vec<CreatedLayer>,
    pub channel_errors: Vec<ChannelFailure>,
    /// Set when the destination could not be prepared or a layer could not be created;
    /// replay onto this destination stopped there.
    pub error: Option<LayersError>,
}

impl DestinationReport {
    fn new(source: TakeId, take: TakeId) -> Self {
        Self {
            source,
            take,
            created: Vec::new(),
            channel_errors: Vec::new(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.channel_errors.is_empty()
    }
}

/// A source take whose selected layers could not be captured; nothing from it was replayed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub take: TakeId,
    pub error: LayersError,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    pub sources: Vec<SourceFailure>,
    pub destinations: Vec<DestinationReport>,
}

impl TransferReport {
    pub fn is_ok(&self) -> bool {
        self.sources.is_empty() && self.destinations.iter().all(DestinationReport::is_ok)
    }

    /// Every layer created, in creation order.
    pub fn created(&self) -> impl Iterator<Item = &CreatedLayer> {
        self.destinations.iter().flat_map(|d| d.created.iter())
    }

    pub fn channel_errors(&self) -> impl Iterator<Item = &ChannelFailure> {
        self.destinations.iter().flat_map(|d| d.channel_errors.iter())
    }
}

#[derive(Clone, Debug, Default)]
pub struct LayerTransfer {
    cfg: Config,
}

impl LayerTransfer {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Capture the selected layers of one take, returned bottom-to-top.
    ///
    /// Fails with `HostState` if the take or one of the selected layers no longer exists, or
    /// if the take cannot be activated.
    pub fn capture_take<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        selection: &TakeSelection,
    ) -> Result<TakeCapture> {
        let stack = host.layers(selection.take)?;
        if let Some(missing) = selection.layers.iter().find(|l| !stack.contains(*l)) {
            return Err(LayersError::host_state(format!(
                "layer {missing:?} is not part of take {:?}",
                selection.take
            )));
        }
        let selected: HashSet<LayerId> = selection.layers.iter().copied().collect();

        let mut layers = Vec::with_capacity(selected.len());
        if selected.is_empty() {
            return Ok(TakeCapture {
                take: selection.take,
                layers,
            });
        }

        host.set_current_take(selection.take)?;
        for &layer in stack.iter().rev().filter(|l| selected.contains(*l)) {
            let ctx = LayerContext::new(selection.take, layer);
            host.select_layer_exclusive(ctx)?;
            let attributes = host.layer_attributes(ctx)?;
            let animated = scan(&*host, ctx)?;
            let curves = collect_all(&*host, ctx, &animated)?;
            debug!(
                "captured layer '{}' ({} components, {} channels)",
                attributes.name,
                animated.len(),
                curves.len()
            );
            layers.push(LayerCapture {
                source: ctx,
                attributes,
                curves,
            });
        }
        layers.reverse();

        Ok(TakeCapture {
            take: selection.take,
            layers,
        })
    }

    /// Capture every selection, in selection order.
    pub fn capture<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        selections: &[TakeSelection],
    ) -> Result<Vec<TakeCapture>> {
        selections
            .iter()
            .map(|s| self.capture_take(host, s))
            .collect()
    }

    /// Rebuild a captured take on one destination take. Never fails as a whole; problems are
    /// recorded in the returned report.
    pub fn replay<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        capture: &TakeCapture,
        destination: TakeId,
    ) -> DestinationReport {
        let mut report = DestinationReport::new(capture.take, destination);
        if capture.layers.is_empty() {
            return report;
        }
        if let Err(e) = host.set_current_take(destination) {
            warn!("destination take {destination:?} unavailable: {e}");
            report.error = Some(e);
            return report;
        }
        for layer in &capture.layers {
            match self.replay_layer(host, layer, destination, &mut report.channel_errors) {
                Ok(created) => report.created.push(created),
                Err(e) => {
                    warn!(
                        "replay of layer '{}' onto take {destination:?} stopped: {e}",
                        layer.attributes.name
                    );
                    report.error = Some(e);
                    break;
                }
            }
        }
        report
    }

    fn replay_layer<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        capture: &LayerCapture,
        destination: TakeId,
        failures: &mut Vec<ChannelFailure>,
    ) -> Result<CreatedLayer> {
        let layer = host.create_layer(destination)?;
        let ctx = LayerContext::new(destination, layer);

        let mut attributes = host.layer_attributes(ctx)?;
        attributes.inherit_from(&capture.attributes);
        let name = host.set_layer_attributes(ctx, &attributes)?;
        host.select_layer_exclusive(ctx)?;

        let mut written = 0;
        for (path, records) in &capture.curves {
            let outcome = host
                .curve_target(ctx, path)
                .and_then(|target| {
                    decode_with_tolerance(target, records, self.cfg.time_tolerance_ticks)
                });
            match outcome {
                Ok(()) => written += 1,
                Err(error) => {
                    warn!("channel {path} on layer '{name}': {error}");
                    failures.push(ChannelFailure {
                        layer,
                        path: path.clone(),
                        error,
                    });
                }
            }
        }
        debug!("replayed layer '{name}' onto take {destination:?}: {written} channels");

        Ok(CreatedLayer {
            source: capture.source,
            layer,
            name,
            channels_written: written,
        })
    }

    /// Transfer the selected layers onto every destination take.
    ///
    /// Each source take is captured and immediately replayed onto all destinations, so
    /// selecting a take as both source and destination duplicates its layers. Destinations
    /// repeated in `destinations` receive the layers once per occurrence. A source take that
    /// cannot be captured is recorded in `sources` and the remaining selections still run.
    pub fn transfer<H: AnimationHost + ?Sized>(
        &self,
        host: &mut H,
        selections: &[TakeSelection],
        destinations: &[TakeId],
    ) -> TransferReport {
        let mut report = TransferReport::default();
        for selection in selections {
            let capture = match self.capture_take(host, selection) {
                Ok(capture) => capture,
                Err(error) => {
                    warn!("capture of take {:?} failed: {error}", selection.take);
                    report.sources.push(SourceFailure {
                        take: selection.take,
                        error,
                    });
                    continue;
                }
            };
            for &destination in destinations {
                report
                    .destinations
                    .push(self.replay(host, &capture, destination));
            }
        }
        report
    }
}

/// [`LayerTransfer::transfer`] with the default configuration.
pub fn transfer<H: AnimationHost + ?Sized>(
    host: &mut H,
    selections: &[TakeSelection],
    destinations: &[TakeId],
) -> TransferReport {
    LayerTransfer::default().transfer(host, selections, destinations)
}
