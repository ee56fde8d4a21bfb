//! Bevy side of scattering: the controller lives on an entity as
//! `ScatterInstancer`, its instance buffer is an `InstanceBatch` bound to a
//! child entity, and dirty batches are baked into one merged mesh (positions,
//! normals and UVs of the source mesh, duplicated per instance transform).
//! One draw call per scatter, compatible with StandardMaterial / Bevy PBR.

pub mod components;
pub mod host;
pub mod resources;
pub mod systems;

pub use components::{BatchStats, InstanceBatch, ScatterInstancer, ScatterInstances, SourceMesh};
pub use host::{BevyScatterHost, GltfSource, ScatterEnv};
pub use resources::ScatterInstancingConfig;
