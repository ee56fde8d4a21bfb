//! Scatter plugin wiring (glue).
//! - Preset asset/loader
//! - Settings + instancing budget
//! - First rebuild, preset application, bake of dirty batches

use bevy::asset::LoadState;
use bevy::prelude::*;

use super::instancing::resources::ScatterInstancingConfig;
use super::instancing::systems::{bake_dirty_batches, initialize_new_scatters};
use super::instancing::{ScatterEnv, ScatterInstancer};
use super::preset::{ScatterPreset, ScatterPresetAssetPlugin};

/// Where the default preset lives.
#[derive(Resource, Clone)]
pub struct ScatterSettings {
    pub preset_path: String,
}
impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            preset_path: "scatter/meadow.scatter.ron".to_string(),
        }
    }
}

/// Preset waiting to be applied to this entity's `ScatterInstancer`.
#[derive(Component, Clone)]
pub struct PendingPreset(pub Handle<ScatterPreset>);

pub struct ScatterPlugin;
impl Plugin for ScatterPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ScatterPresetAssetPlugin)
            .init_resource::<ScatterSettings>()
            .init_resource::<ScatterInstancingConfig>()
            .add_systems(
                Update,
                (
                    initialize_new_scatters,
                    apply_loaded_presets.after(initialize_new_scatters),
                    bake_dirty_batches.after(apply_loaded_presets),
                ),
            );
    }
}

/// Apply each loaded preset as one edit (single rebuild), then drop the marker.
fn apply_loaded_presets(
    mut env: ScatterEnv,
    presets: Res<Assets<ScatterPreset>>,
    mut q: Query<(Entity, &mut ScatterInstancer, &PendingPreset)>,
) {
    for (entity, mut scatter, pending) in q.iter_mut() {
        let Some(preset) = presets.get(&pending.0) else {
            let failed = env
                .asset_server()
                .and_then(|assets| assets.get_load_state(pending.0.id()))
                .is_some_and(|state| matches!(state, LoadState::Failed(_)));
            if failed {
                warn!("Scatter {:?}: preset failed to load; keeping current configuration", entity);
                env.commands().entity(entity).remove::<PendingPreset>();
            }
            continue;
        };

        match scatter.apply(preset.to_edit(), &mut env.host(entity)) {
            Ok(outcome) => info!("Scatter {:?}: applied preset ({:?})", entity, outcome),
            Err(err) => warn!("Scatter {:?}: rejected preset: {}", entity, err),
        }
        env.commands().entity(entity).remove::<PendingPreset>();
    }
}
