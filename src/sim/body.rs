//! Player rigid body
//!
//! Mass-1 body integrated explicitly each physics tick. Forces accumulate
//! during the tick; `integrate` applies gravity, linear damping and moves
//! the body. Drag and gravity scale are regime values set by
//! [`crate::sim::physics`], never arbitrary blends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DRAG, DEFAULT_GRAVITY, GRAVITY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    /// Linear damping coefficient (engine-style `1/(1+drag*dt)` decay)
    pub drag: f32,
    /// Blended surface friction from the friction controller
    pub surface_friction: f32,
    #[serde(skip)]
    force: Vec2,
}

impl PlayerBody {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            gravity_scale: DEFAULT_GRAVITY,
            drag: DEFAULT_DRAG,
            surface_friction: 0.0,
            force: Vec2::ZERO,
        }
    }

    /// Accumulate a continuous force for this tick (mass 1)
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Instantaneous velocity change (mass 1)
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }

    /// Advance one fixed step: forces and gravity, then damping, then move
    pub fn integrate(&mut self, dt: f32) {
        let accel = self.force + Vec2::new(0.0, GRAVITY * self.gravity_scale);
        self.velocity += accel * dt;
        self.velocity *= 1.0 / (1.0 + self.drag * dt);
        self.position += self.velocity * dt;
        self.force = Vec2::ZERO;
    }
}
