use bevy::prelude::*;

use scatterfield::scatter::instancing::BatchStats;
use scatterfield::scatter::ScatterInstancer;

#[derive(Component)]
pub struct ConfigOverlay;

pub fn spawn_config_overlay(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
        BackgroundColor(Color::linear_rgba(0.0, 0.0, 0.0, 0.6)),
    ))
    .with_children(|parent| {
        parent.spawn((
            Text::new("Scatter: waiting for preset"),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(Color::WHITE),
            ConfigOverlay,
        ));
    });
}

/// Mirror the first scatter's configuration and bake stats into the overlay.
pub fn refresh_config_overlay(
    q_scatters: Query<&ScatterInstancer>,
    q_stats: Query<&BatchStats>,
    mut q_text: Query<&mut Text, With<ConfigOverlay>>,
) {
    let Ok(mut text) = q_text.single_mut() else { return; };
    let Some(scatter) = q_scatters.iter().next() else { return; };

    let cfg = scatter.config();
    let vertices = scatter
        .target()
        .and_then(|batch| q_stats.get(batch.entity).ok())
        .map_or(0, |stats| stats.merged_vertex_count);
    let mesh = if cfg.mesh_source.is_empty() { "<none>" } else { cfg.mesh_source.as_str() };

    let line = format!(
        "mesh: {mesh}\ncount: {}  area: {:.1} x {:.1}  seed: {}\nvertices: {vertices}\n\
         [R] reseed  [Up/Down] count  [Left/Right] area",
        cfg.instance_count, cfg.area.width, cfg.area.depth, cfg.seed.0,
    );
    if text.0 != line {
        text.0 = line;
    }
}
