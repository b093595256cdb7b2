//! Identifiers and a simple allocator for scene entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TakeId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// Monotonic allocator for ComponentId, TakeId, and LayerId.
/// Layer ids are unique across the whole scene, not just within one take.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_component: u32,
    next_take: u32,
    next_layer: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_component(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component = self.next_component.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_take(&mut self) -> TakeId {
        let id = TakeId(self.next_take);
        self.next_take = self.next_take.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer = self.next_layer.wrapping_add(1);
        id
    }
}
