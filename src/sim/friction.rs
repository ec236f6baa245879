//! Platform friction and co-motion
//!
//! Surface grip eases between a low and high value depending on whether the
//! player is riding a moving platform without touching the controls, and the
//! platform's per-tick displacement is forwarded to the body so the player
//! rides along.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::world::{PlatformId, Raycaster};
use crate::consts::{FRICTION_LERP_SPEED, HIGH_FRICTION, LOW_FRICTION, PLATFORM_DELTA_CLAMP};
use crate::lerp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrictionController {
    current: f32,
    /// Platform position at the previous tick, while riding one
    last_platform_pos: Option<(PlatformId, Vec2)>,
}

impl Default for FrictionController {
    fn default() -> Self {
        Self::new()
    }
}

impl FrictionController {
    pub fn new() -> Self {
        Self {
            current: LOW_FRICTION,
            last_platform_pos: None,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Ease grip toward high when parked on a moving platform, low otherwise,
    /// and carry the player by the platform's displacement since last tick.
    pub fn update(
        &mut self,
        body: &mut PlayerBody,
        world: &impl Raycaster,
        platform: Option<PlatformId>,
        recent_input: bool,
        dt: f32,
    ) {
        let riding = platform.is_some() && !recent_input;
        let target = if riding { HIGH_FRICTION } else { LOW_FRICTION };
        self.current = lerp(self.current, target, FRICTION_LERP_SPEED * dt);
        body.surface_friction = self.current;

        match platform.and_then(|id| world.platform_position(id).map(|p| (id, p))) {
            Some((id, pos)) => {
                if let Some((last_id, last_pos)) = self.last_platform_pos {
                    if last_id == id {
                        let delta = pos - last_pos;
                        // A teleporting platform must not fling the player
                        if delta.length() <= PLATFORM_DELTA_CLAMP {
                            body.position += delta;
                        }
                    }
                }
                self.last_platform_pos = Some((id, pos));
            }
            None => self.last_platform_pos = None,
        }
    }
}
