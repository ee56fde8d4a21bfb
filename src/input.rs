use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::input::{mouse::MouseMotion, keyboard::KeyCode, ButtonInput};

use scatterfield::scatter::{ScatterConfigError, ScatterEnv, ScatterInstancer};

use crate::actions::{PlayerAction, ActionState};
use crate::setup::MainCamera;

pub const MOVE_SPEED: f32 = 12.0;
pub const ROTATE_SPEED: f32 = 0.2;
pub const MAX_CAMERA_DT: f32 = 0.05; // never use a dt larger than 50ms

pub const COUNT_STEP: i64 = 10;
pub const AREA_STEP: f32 = 1.0;

#[derive(Component)]
pub struct CameraOrbit {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

pub fn input_mapping_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut action_state: ResMut<ActionState>,
) {
    action_state.set(PlayerAction::MoveForward, keys.pressed(KeyCode::KeyW));
    action_state.set(PlayerAction::MoveBackward, keys.pressed(KeyCode::KeyS));
    action_state.set(PlayerAction::MoveLeft, keys.pressed(KeyCode::KeyA));
    action_state.set(PlayerAction::MoveRight, keys.pressed(KeyCode::KeyD));

    action_state.trigger(PlayerAction::Reseed, keys.just_pressed(KeyCode::KeyR));
    action_state.trigger(PlayerAction::MoreInstances, keys.just_pressed(KeyCode::ArrowUp));
    action_state.trigger(PlayerAction::FewerInstances, keys.just_pressed(KeyCode::ArrowDown));
    action_state.trigger(PlayerAction::WidenArea, keys.just_pressed(KeyCode::ArrowRight));
    action_state.trigger(PlayerAction::NarrowArea, keys.just_pressed(KeyCode::ArrowLeft));
}

/// Keyboard edits; every accepted or rejected setter call still rebuilds.
pub fn scatter_edit_system(
    action_state: Res<ActionState>,
    mut env: ScatterEnv,
    mut q_scatters: Query<(Entity, &mut ScatterInstancer)>,
) {
    for (entity, mut scatter) in &mut q_scatters {
        let cfg = scatter.config().clone();
        let mut host = env.host(entity);

        if action_state.triggered(PlayerAction::Reseed) {
            scatter.set_seed(cfg.seed.0.wrapping_add(1), &mut host);
            info!("Scatter: seed -> {}", cfg.seed.0.wrapping_add(1));
        }
        if action_state.triggered(PlayerAction::MoreInstances) {
            report(scatter.set_instance_count(i64::from(cfg.instance_count) + COUNT_STEP, &mut host).map(|_| ()));
        }
        if action_state.triggered(PlayerAction::FewerInstances) {
            report(scatter.set_instance_count(i64::from(cfg.instance_count) - COUNT_STEP, &mut host).map(|_| ()));
        }
        if action_state.triggered(PlayerAction::WidenArea) {
            let (w, d) = (cfg.area.width + AREA_STEP, cfg.area.depth + AREA_STEP);
            report(scatter.set_area_dimensions(w, d, &mut host).map(|_| ()));
        }
        if action_state.triggered(PlayerAction::NarrowArea) {
            let (w, d) = (cfg.area.width - AREA_STEP, cfg.area.depth - AREA_STEP);
            report(scatter.set_area_dimensions(w, d, &mut host).map(|_| ()));
        }
    }
}

fn report(result: Result<(), ScatterConfigError>) {
    if let Err(err) = result {
        info!("Scatter: edit rejected: {err}");
    }
}

pub fn camera_controller(
    time: Res<Time>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    action_state: Res<ActionState>,
    mut query: Query<(&mut Transform, &mut CameraOrbit), With<MainCamera>>,
) {
    // 0) Clamp delta
    let mut dt = time.delta_secs();
    if dt > MAX_CAMERA_DT {
        dt = MAX_CAMERA_DT;
    }

    let Ok((mut tf, mut orbit)) = query.single_mut() else { return; };

    // 1) Camera-relative movement
    let forward = Vec2::new(-orbit.yaw.cos(), -orbit.yaw.sin());
    let right = Vec2::new(-forward.y, forward.x);

    let mut dir = Vec2::ZERO;
    if action_state.pressed(PlayerAction::MoveForward) { dir += forward; }
    if action_state.pressed(PlayerAction::MoveBackward) { dir -= forward; }
    if action_state.pressed(PlayerAction::MoveLeft) { dir -= right; }
    if action_state.pressed(PlayerAction::MoveRight) { dir += right; }

    if dir != Vec2::ZERO {
        let delta = dir.normalize() * MOVE_SPEED * dt;
        orbit.focus.x += delta.x;
        orbit.focus.z += delta.y;
    }

    // 2) Zoom
    for ev in scroll_evr.read() {
        let amount = match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.02,
        };
        orbit.radius = (orbit.radius - amount).clamp(2.0, 200.0);
    }

    // 3) Orbit
    if mouse_buttons.pressed(MouseButton::Middle) {
        for ev in motion_evr.read() {
            orbit.yaw += ev.delta.x * ROTATE_SPEED * dt;
            orbit.pitch += ev.delta.y * ROTATE_SPEED * dt;
        }
    }

    // Stay above the ground plane.
    orbit.pitch = orbit.pitch.clamp(0.05, std::f32::consts::FRAC_PI_2 - 0.01);

    // 4) Position camera
    let xz_radius = orbit.radius * orbit.pitch.cos();
    let offset = Vec3::new(
        xz_radius * orbit.yaw.cos(),
        orbit.radius * orbit.pitch.sin(),
        xz_radius * orbit.yaw.sin(),
    );

    tf.translation = orbit.focus + offset;
    tf.look_at(orbit.focus, Vec3::Y);
}
