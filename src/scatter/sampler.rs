// src/scatter/sampler.rs
//! Uniform planar sampling of one instance transform.
//!
//! Each call performs exactly six draws, always in this order:
//! pos.x, pos.z, yaw, scale.x, scale.y, scale.z. Reordering them changes every
//! seeded layout, so keep the sequence intact.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::core::{RandomStream, ScatterProbe};

pub const DRAWS_PER_INSTANCE: usize = 6;

pub const POSITION_RANGE: (f32, f32) = (-0.5, 0.5);
pub const YAW_RANGE: (f32, f32) = (-PI, PI);
pub const SCALE_RANGE: (f32, f32) = (0.5, 1.5);

/// Sample one placement inside a `width` x `depth` area centered at the origin.
pub fn sample<S: RandomStream + ?Sized>(stream: &mut S, width: f32, depth: f32) -> ScatterProbe {
    let (p_lo, p_hi) = POSITION_RANGE;
    let x = stream.next_float_in_range(p_lo, p_hi) * width;
    let z = stream.next_float_in_range(p_lo, p_hi) * depth;

    let yaw = stream.next_float_in_range(YAW_RANGE.0, YAW_RANGE.1);

    let (s_lo, s_hi) = SCALE_RANGE;
    let sx = stream.next_float_in_range(s_lo, s_hi);
    let sy = stream.next_float_in_range(s_lo, s_hi);
    let sz = stream.next_float_in_range(s_lo, s_hi);

    ScatterProbe {
        // Planar: y stays at 0.
        translation: Vec3::new(x, 0.0, z),
        rotation: Vec3::new(0.0, yaw, 0.0),
        scale: Vec3::new(sx, sy, sz),
    }
}

#[inline]
pub fn sample_transform<S: RandomStream + ?Sized>(stream: &mut S, width: f32, depth: f32) -> Transform {
    sample(stream, width, depth).to_transform()
}
