//! Scene assets: decoding and the background loader thread.

pub mod images;
pub mod model;
pub mod worker;

pub use images::{BackgroundImage, EnvironmentMap};
pub use model::{Material, MeshData, Model, TextureData};
pub use worker::{AssetEvent, AssetKind, AssetPayload, AssetWorker};
