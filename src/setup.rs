use bevy::prelude::*;
use scatterfield::scatter::{PendingPreset, ScatterInstancer, ScatterSettings};

use crate::input::CameraOrbit;

#[derive(Component)]
pub struct MainCamera;

/// Ground extent (meters) under the scatter.
const GROUND_SIZE: f32 = 60.0;

pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    assets: Res<AssetServer>,
    settings: Res<ScatterSettings>,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-2.5, 4.5, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        CameraOrbit {
            focus: Vec3::ZERO,
            radius: 18.0,
            yaw: 0.6,
            pitch: 0.5,
        },
    ));

    // 3) Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(86, 112, 64),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::default(),
    ));

    // 4) Scatter, configured from the default preset once it loads
    commands.spawn((
        Name::new("Scatter"),
        ScatterInstancer::default(),
        PendingPreset(assets.load(settings.preset_path.as_str())),
        Transform::default(),
        Visibility::default(),
    ));
    info!("Scatter: loading preset '{}'", settings.preset_path);
}
