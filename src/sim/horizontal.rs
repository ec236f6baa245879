//! Horizontal motor
//!
//! Constant-magnitude force scaled by signed input, facing-flip detection,
//! and the magnet-modulated horizontal speed cap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::magnet::{modulated_max_speed, MagnetLauncher};
use super::physics;
use crate::consts::{HORIZONTAL_FORCE, MAX_X_SPEED};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalMotor {
    facing_right: bool,
}

impl Default for HorizontalMotor {
    fn default() -> Self {
        Self { facing_right: true }
    }
}

impl HorizontalMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// Apply the drive force and the speed-cap drag. Returns the new
    /// facing when it flipped this tick.
    pub fn apply(
        &mut self,
        body: &mut PlayerBody,
        direction: f32,
        launcher: &MagnetLauncher,
        repel_on: bool,
        attract_on: bool,
    ) -> Option<bool> {
        body.add_force(Vec2::new(direction * HORIZONTAL_FORCE, 0.0));

        let flipped = if direction > 0.0 && !self.facing_right {
            self.facing_right = true;
            Some(true)
        } else if direction < 0.0 && self.facing_right {
            self.facing_right = false;
            Some(false)
        } else {
            None
        };

        let max = self.max_speed(body, launcher, repel_on, attract_on);
        physics::apply_max_horizontal_speed(body, max);
        flipped
    }

    fn max_speed(
        &self,
        body: &PlayerBody,
        launcher: &MagnetLauncher,
        repel_on: bool,
        attract_on: bool,
    ) -> f32 {
        if !(repel_on ^ attract_on) {
            return MAX_X_SPEED;
        }
        match launcher.projectile() {
            Some(proj) => {
                let rel = body.position - proj.position;
                let distance = rel.length();
                let angle = rel.y.atan2(rel.x);
                modulated_max_speed(MAX_X_SPEED, angle.cos(), body.velocity.x, distance, attract_on)
            }
            None => MAX_X_SPEED,
        }
    }
}
