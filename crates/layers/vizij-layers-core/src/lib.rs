//! Vizij Layers Core (host-agnostic)
//!
//! Captures animation curves as portable keyframe records and rebuilds animation layers on
//! other takes. The host application is reached through [`AnimationHost`]; [`Scene`] is the
//! in-memory host used by the wasm adapter and the tests.

pub mod channel;
pub mod codec;
pub mod collect;
pub mod config;
pub mod curve;
pub mod error;
pub mod host;
pub mod ids;
pub mod keyframe;
pub mod layer;
pub mod manage;
pub mod scan;
pub mod scene;
pub mod selection;
pub mod transfer;

pub type Result<T> = core::result::Result<T, LayersError>;

// Re-exports for consumers (adapters)
pub use channel::{ChannelNode, ChannelPath};
pub use codec::{decode, decode_with_tolerance, encode, KeyRecord};
pub use collect::{collect, collect_all, ChannelCurves};
pub use config::Config;
pub use curve::{Curve, CurveSource, CurveTarget};
pub use error::LayersError;
pub use host::AnimationHost;
pub use ids::{ComponentId, LayerId, TakeId};
pub use keyframe::{ConstantMode, Interpolation, KeyTime, Keyframe, TangentMode, TICKS_PER_SECOND};
pub use layer::{LayerAttributes, LayerContext, LayerMode, RotationMode, TimeSpan};
pub use scan::{has_keys, scan};
pub use scene::{Scene, SceneDocument};
pub use selection::{DestinationSelection, SourceSelection};
pub use transfer::{
    transfer, ChannelFailure, CreatedLayer, DestinationReport, LayerCapture, LayerTransfer,
    SourceFailure, TakeCapture, TakeSelection, TransferReport,
};
