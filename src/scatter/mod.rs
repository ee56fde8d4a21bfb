//! Seeded scattering of one mesh over a planar area.
//!
//! `sampler` turns a seeded stream into transforms, `controller` keeps the
//! configuration and refills an instancing target on every change, and
//! `instancing` + `plugin` host all of it inside a Bevy app.

pub mod controller;
pub mod core;
pub mod instancing;
pub mod plugin;
pub mod preset;
pub mod rng;
pub mod sampler;

pub use controller::{MeshResolution, RebuildOutcome, ScatterController, ScatterEdit, ScatterState};
pub use self::core::{
    AreaDimensions, InstancingTarget, MeshSource, RandomStream, ResolvedMesh, ScatterConfig,
    ScatterConfigError, ScatterHost, ScatterProbe, ScatterSeed,
};
pub use instancing::{ScatterEnv, ScatterInstancer};
pub use plugin::{PendingPreset, ScatterPlugin, ScatterSettings};
pub use preset::ScatterPreset;
pub use rng::SeededStream;
