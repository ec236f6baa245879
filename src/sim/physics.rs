//! Gravity/drag regime selection
//!
//! Drag and gravity scale always snap to one of a small set of regime values
//! derived from {truly-on-ground, jetpack, vertical velocity sign, magnet}.
//! The speed clamps work by raising drag rather than truncating velocity, so
//! overshoot decays smoothly.

use super::body::PlayerBody;
use crate::consts::{
    CLAMP_X_DRAG, CLAMP_Y_DRAG, DEFAULT_DRAG, DEFAULT_GRAVITY, FALL_MULTIPLIER, LINEAR_DRAG,
};

/// Ground-idle braking drag
const GROUND_IDLE_DRAG: f32 = LINEAR_DRAG * 2.5;
/// Airborne drag
const AIR_DRAG: f32 = LINEAR_DRAG * 0.15;

/// Select the gravity/drag regime for this tick. Returns true when the
/// player is steering against their current horizontal velocity.
pub fn modify_physics(
    body: &mut PlayerBody,
    direction: f32,
    truly_on_ground: bool,
    jetpack_on: bool,
    magnet_engaged: bool,
) -> bool {
    let changing_direction = (direction > 0.0 && body.velocity.x < 0.0)
        || (direction < 0.0 && body.velocity.x > 0.0);

    if truly_on_ground {
        body.gravity_scale = 0.0;
        body.drag = if direction == 0.0 || changing_direction {
            GROUND_IDLE_DRAG
        } else {
            DEFAULT_DRAG
        };
    } else {
        body.drag = AIR_DRAG;
        if jetpack_on {
            body.gravity_scale = DEFAULT_GRAVITY / 2.0;
            if body.velocity.y < 0.0 {
                body.drag = LINEAR_DRAG;
            }
        } else if body.velocity.y < 0.0 {
            body.gravity_scale = DEFAULT_GRAVITY * FALL_MULTIPLIER;
        } else {
            body.gravity_scale = DEFAULT_GRAVITY * FALL_MULTIPLIER / 2.0;
        }

        // Magnet force fights gravity; halve it while the field is engaged
        if magnet_engaged {
            body.gravity_scale = DEFAULT_GRAVITY / 2.0;
        }
    }

    changing_direction
}

/// Brake toward the jetpack ceiling without a hard velocity cut
pub fn apply_max_jetpack_speed(body: &mut PlayerBody) {
    if body.drag < LINEAR_DRAG {
        body.drag = LINEAR_DRAG / 2.0;
    }
}

/// Raise drag once |vx| exceeds the (magnet-modulated) horizontal cap
pub fn apply_max_horizontal_speed(body: &mut PlayerBody, max_speed: f32) {
    if body.velocity.x.abs() > max_speed && body.drag < CLAMP_X_DRAG {
        body.drag = CLAMP_X_DRAG;
    }
}

/// Raise drag once |vy| exceeds the (magnet-modulated) vertical cap
pub fn apply_max_vertical_speed(body: &mut PlayerBody, max_speed: f32) {
    if body.velocity.y.abs() > max_speed && body.drag < CLAMP_Y_DRAG {
        body.drag = CLAMP_Y_DRAG;
    }
}
