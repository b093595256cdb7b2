//! Checked-state model for choosing source layers and destination takes.
//!
//! Source state is held per layer; a take counts as checked while any of its layers is.

use serde::{Deserialize, Serialize};

use crate::error::LayersError;
use crate::host::AnimationHost;
use crate::ids::{LayerId, TakeId};
use crate::layer::LayerContext;
use crate::transfer::TakeSelection;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub layer: LayerId,
    pub name: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeEntry {
    pub take: TakeId,
    pub name: String,
    /// Bottom to top.
    pub layers: Vec<LayerEntry>,
}

impl TakeEntry {
    pub fn checked(&self) -> bool {
        self.layers.iter().any(|l| l.checked)
    }
}

fn matches(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

/// Source side: every take with its layers, nothing checked initially.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub takes: Vec<TakeEntry>,
}

impl SourceSelection {
    pub fn from_host<H: AnimationHost + ?Sized>(host: &H) -> Result<Self> {
        let mut takes = Vec::new();
        for take in host.takes() {
            let mut layers = Vec::new();
            for layer in host.layers(take)? {
                let attrs = host.layer_attributes(LayerContext::new(take, layer))?;
                layers.push(LayerEntry {
                    layer,
                    name: attrs.name,
                    checked: false,
                });
            }
            takes.push(TakeEntry {
                take,
                name: host.take_name(take)?,
                layers,
            });
        }
        Ok(Self { takes })
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut LayerEntry> {
        self.takes.iter_mut().flat_map(|t| t.layers.iter_mut())
    }

    fn entry_mut(&mut self, take: TakeId) -> Result<&mut TakeEntry> {
        self.takes
            .iter_mut()
            .find(|t| t.take == take)
            .ok_or_else(|| LayersError::host_state(format!("take {take:?} is not listed")))
    }

    pub fn check_all(&mut self) {
        self.layers_mut().for_each(|l| l.checked = true);
    }

    pub fn check_none(&mut self) {
        self.layers_mut().for_each(|l| l.checked = false);
    }

    pub fn invert_layers(&mut self) {
        self.layers_mut().for_each(|l| l.checked = !l.checked);
    }

    /// Case-insensitive substring match. A matching take name applies to all its layers.
    pub fn check_by_name(&mut self, pattern: &str, checked: bool) {
        for take in &mut self.takes {
            let whole_take = matches(&take.name, pattern);
            for layer in &mut take.layers {
                if whole_take || matches(&layer.name, pattern) {
                    layer.checked = checked;
                }
            }
        }
    }

    pub fn set_take_checked(&mut self, take: TakeId, checked: bool) -> Result<()> {
        self.entry_mut(take)?
            .layers
            .iter_mut()
            .for_each(|l| l.checked = checked);
        Ok(())
    }

    pub fn set_layer_checked(&mut self, take: TakeId, layer: LayerId, checked: bool) -> Result<()> {
        let entry = self.entry_mut(take)?;
        let l = entry
            .layers
            .iter_mut()
            .find(|l| l.layer == layer)
            .ok_or_else(|| {
                LayersError::host_state(format!("layer {layer:?} is not listed under {take:?}"))
            })?;
        l.checked = checked;
        Ok(())
    }

    pub fn is_take_checked(&self, take: TakeId) -> bool {
        self.takes
            .iter()
            .find(|t| t.take == take)
            .is_some_and(TakeEntry::checked)
    }

    /// Checked layers grouped by take, in listing order. Takes without checked layers are
    /// left out.
    pub fn to_take_selections(&self) -> Vec<TakeSelection> {
        self.takes
            .iter()
            .filter(|t| t.checked())
            .map(|t| {
                TakeSelection::new(
                    t.take,
                    t.layers.iter().filter(|l| l.checked).map(|l| l.layer).collect(),
                )
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationEntry {
    pub take: TakeId,
    pub name: String,
    pub checked: bool,
}

/// Destination side: a flat list of takes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationSelection {
    pub takes: Vec<DestinationEntry>,
}

impl DestinationSelection {
    pub fn from_host<H: AnimationHost + ?Sized>(host: &H) -> Result<Self> {
        let takes = host
            .takes()
            .into_iter()
            .map(|take| {
                Ok(DestinationEntry {
                    take,
                    name: host.take_name(take)?,
                    checked: false,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { takes })
    }

    pub fn check_all(&mut self) {
        self.takes.iter_mut().for_each(|t| t.checked = true);
    }

    pub fn check_none(&mut self) {
        self.takes.iter_mut().for_each(|t| t.checked = false);
    }

    pub fn invert(&mut self) {
        self.takes.iter_mut().for_each(|t| t.checked = !t.checked);
    }

    pub fn check_by_name(&mut self, pattern: &str, checked: bool) {
        self.takes
            .iter_mut()
            .filter(|t| matches(&t.name, pattern))
            .for_each(|t| t.checked = checked);
    }

    pub fn set_checked(&mut self, take: TakeId, checked: bool) -> Result<()> {
        let entry = self
            .takes
            .iter_mut()
            .find(|t| t.take == take)
            .ok_or_else(|| LayersError::host_state(format!("take {take:?} is not listed")))?;
        entry.checked = checked;
        Ok(())
    }

    /// Checked takes in listing order.
    pub fn takes(&self) -> Vec<TakeId> {
        self.takes
            .iter()
            .filter(|t| t.checked)
            .map(|t| t.take)
            .collect()
    }
}
