// src/scatter/instancing/resources.rs

use bevy::prelude::*;

#[derive(Resource)]
pub struct ScatterInstancingConfig {
    /// Merged meshes built per frame; the rest wait for later frames.
    pub max_bakes_per_frame: usize,
}
impl Default for ScatterInstancingConfig {
    fn default() -> Self {
        Self {
            max_bakes_per_frame: 1, // 1 per frame avoids spikes
        }
    }
}
