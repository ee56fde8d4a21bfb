use bevy::prelude::*;

mod setup;
mod input;
mod actions;
mod ui;

use actions::ActionState;
use input::{camera_controller, input_mapping_system, scatter_edit_system};
use scatterfield::ScatterPlugin;
use ui::{refresh_config_overlay, spawn_config_overlay};

fn main() {
    App::new()
        // core engine plugins
        .add_plugins(DefaultPlugins)
        // instanced scattering: presets, rebuilds, merged-mesh bakes
        .add_plugins(ScatterPlugin)
        .init_resource::<ActionState>()
        // camera, light, ground and the scatter entity
        .add_systems(Startup, (setup::setup, spawn_config_overlay))
        // input -> camera + scatter edits, then the overlay
        .add_systems(
            Update,
            (
                input_mapping_system,
                camera_controller.after(input_mapping_system),
                scatter_edit_system.after(input_mapping_system),
                refresh_config_overlay.after(scatter_edit_system),
            ),
        )
        .run();
}
