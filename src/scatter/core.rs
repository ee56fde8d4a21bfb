// src/scatter/core.rs
//! Core types/traits for seeded, single-mesh scattering.
//! Keep this file dependency-light; the sampler and controller build on it and
//! the Bevy adapter only implements the traits at the bottom.

use bevy::math::EulerRot;
use bevy::prelude::*; // Vec3, Quat, Transform
use serde::{Deserialize, Serialize};

// ---------- Configuration values ----------

/// Seed for the scatter stream; changing it reshuffles every instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScatterSeed(pub i64);

/// Reference to the mesh every instance draws. May be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshSource(pub String);

impl MeshSource {
    pub fn new(path: impl Into<String>) -> Self { Self(path.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.trim().is_empty() }
}

impl From<&str> for MeshSource {
    fn from(path: &str) -> Self { Self::new(path) }
}

impl From<String> for MeshSource {
    fn from(path: String) -> Self { Self(path) }
}

/// Extents (meters) of the rectangular placement region, centered at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaDimensions {
    pub width: f32,
    pub depth: f32,
}

impl AreaDimensions {
    /// Validated constructor; both extents must be `>= 0`.
    pub fn new(width: f32, depth: f32) -> Result<Self, ScatterConfigError> {
        // NaN fails both comparisons, so test for the accepted range instead.
        if !(width >= 0.0 && depth >= 0.0) {
            return Err(ScatterConfigError::NegativeArea { width, depth });
        }
        Ok(Self { width, depth })
    }
}

impl Default for AreaDimensions {
    fn default() -> Self { Self { width: 5.0, depth: 5.0 } }
}

pub const DEFAULT_INSTANCE_COUNT: u32 = 50;

/// Everything a rebuild reads. Mutated only through the controller's setters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub mesh_source: MeshSource,
    pub instance_count: u32,
    pub area: AreaDimensions,
    pub seed: ScatterSeed,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            mesh_source: MeshSource::default(),
            instance_count: DEFAULT_INSTANCE_COUNT,
            area: AreaDimensions::default(),
            seed: ScatterSeed(0),
        }
    }
}

/// Check a requested instance count; must be in `1..=u32::MAX`.
pub fn validate_instance_count(count: i64) -> Result<u32, ScatterConfigError> {
    if count <= 0 {
        return Err(ScatterConfigError::NonPositiveCount(count));
    }
    u32::try_from(count).map_err(|_| ScatterConfigError::InstanceCountOutOfRange(count))
}

// ---------- Errors ----------

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScatterConfigError {
    #[error("instance count must be positive, got {0}")]
    NonPositiveCount(i64),
    #[error("instance count {0} does not fit the instance buffer")]
    InstanceCountOutOfRange(i64),
    #[error("area dimensions must be non-negative, got ({width}, {depth})")]
    NegativeArea { width: f32, depth: f32 },
}

// ---------- Sampling I/O ----------

/// Raw sample for one instance, before composition into a `Transform`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterProbe {
    /// World position; `y` is always 0.
    pub translation: Vec3,
    /// Euler angles (radians) about X, Y, Z. Only Y is sampled.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl ScatterProbe {
    /// Scale, then rotate about X, Y, Z in that order; translation is assigned as-is.
    pub fn to_transform(&self) -> Transform {
        let r = self.rotation;
        Transform {
            translation: self.translation,
            rotation: Quat::from_euler(EulerRot::ZYX, r.z, r.y, r.x),
            scale: self.scale,
        }
    }
}

/// A mesh resolved from a `MeshSource`, with its first material slot.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMesh<M, Mat> {
    pub mesh: M,
    pub material: Mat,
}

// ---------- Traits: randomness, instancing, host ----------

/// Seedable stream of floats. Identical seeds must give identical sequences.
pub trait RandomStream {
    /// Rewind the stream to the start of `seed`'s sequence.
    fn set_seed(&mut self, seed: ScatterSeed);
    /// Next value in `[lo, hi]`; advances the stream by exactly one draw.
    fn next_float_in_range(&mut self, lo: f32, hi: f32) -> f32;
}

/// Renderable that draws one mesh many times from an indexed transform buffer.
/// Every call takes effect immediately.
pub trait InstancingTarget {
    type Mesh: Clone;
    type Material: Clone;

    /// Resize the buffer. New slots hold the identity transform.
    fn set_instance_count(&mut self, count: usize);
    fn set_mesh(&mut self, mesh: Option<Self::Mesh>);
    fn set_material(&mut self, material: Option<Self::Material>);
    fn set_instance_transform(&mut self, index: usize, transform: Transform);
}

/// Scene/editor environment that owns the instancing target and loads meshes.
pub trait ScatterHost {
    type Target: InstancingTarget;

    /// False while the runtime is not live; rebuilds are skipped.
    fn is_ready(&self) -> bool;

    /// Create, attach and take ownership of a new instancing target.
    fn create_target(&mut self) -> Self::Target;

    /// Resolve a source to its mesh and first material, or `None` if it cannot be.
    fn resolve_mesh(
        &mut self,
        source: &MeshSource,
    ) -> Option<
        ResolvedMesh<
            <Self::Target as InstancingTarget>::Mesh,
            <Self::Target as InstancingTarget>::Material,
        >,
    >;
}
