//! The provider/group tree and the visualization assembly step.
//!
//! A [`DataProviderManager`] owns one tree of providers and groups plus the
//! application-wide global settings, and publishes a revision counter that
//! observers subscribe to instead of polling. The [`assembler`] walks a tree
//! snapshot with a per-provider-type transform registry and folds it into a
//! renderable scene: layers, a combined bounding box, annotations, an
//! accumulator threaded across siblings, and aggregated loading/error
//! status.

pub mod assembler;
pub mod error;
pub mod group;
pub mod layers;
pub mod manager;
pub mod registry;
pub mod transforms;

#[cfg(test)]
mod tests;

pub use assembler::{assemble_scene, AssembledScene};
pub use error::SceneError;
pub use group::{Group, GroupType, TreeItem};
pub use layers::{
    AccumulatedData, Annotation, Grid2dLayer, GroupVisualization, PointsLayer, ProviderVisualization, SceneItem,
    SceneLayer,
};
pub use manager::DataProviderManager;
pub use registry::{LayerTransforms, TransformContext, TransformError, TransformRegistry};
