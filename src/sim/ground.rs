//! Ground sensing
//!
//! Dual downward leg rays at two lengths decide on-ground vs overlapping
//! (penetrating) vs truly-on-ground, with a coyote timer for late jumps and
//! a stuck-in-ground kill timer guarding against tunneling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{LayerMask, PlatformId, Raycaster, SurfaceTag};
use crate::consts::{
    COYOTE_TIME, GROUND_RAY_LENGTH, IN_GROUND_KILL_TIME, IN_GROUND_PROBE_OFFSET, LEG_OFFSET,
    LEG_RAY_LENGTH, NEAR_GROUND_RAY_LENGTH, PLANK_DROP_INTENT,
};

/// Ground contact flags, recomputed in full every tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GroundState {
    /// Either long ray hits
    pub on_ground: bool,
    /// Either short ray hits (body is penetrating the surface)
    pub overlapping_ground: bool,
    /// Close enough to stand but not penetrating
    pub truly_on_ground: bool,
    /// Extended-ray pre-landing cue
    pub near_ground: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundSensor {
    mask: LayerMask,
    /// Seconds since the last truly-on-ground tick
    coyote_timer: f32,
    in_ground_timer: f32,
    state: GroundState,
    /// False while downward intent drops the player through planks
    pub planks_enabled: bool,
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundSensor {
    pub fn new() -> Self {
        Self {
            mask: LayerMask::GROUND | LayerMask::PLANK,
            // Start well past the coyote window; airborne until proven otherwise
            coyote_timer: 1.0,
            in_ground_timer: 0.0,
            state: GroundState::default(),
            planks_enabled: true,
        }
    }

    pub fn state(&self) -> GroundState {
        self.state
    }

    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    /// Strong downward intent restricts sensing to solid ground so the
    /// player falls through pass-through planks.
    pub fn select_ground_layer(&mut self, vertical_intent: f32) {
        if vertical_intent <= PLANK_DROP_INTENT {
            self.mask = LayerMask::GROUND;
            self.planks_enabled = false;
        } else {
            self.mask = LayerMask::GROUND | LayerMask::PLANK;
            self.planks_enabled = true;
        }
    }

    fn leg_hits(&self, world: &impl Raycaster, position: Vec2, length: f32) -> (bool, bool) {
        let offset = Vec2::new(LEG_OFFSET, 0.0);
        let left = world
            .cast(position - offset, Vec2::NEG_Y, length, self.mask)
            .is_some();
        let right = world
            .cast(position + offset, Vec2::NEG_Y, length, self.mask)
            .is_some();
        (left, right)
    }

    /// Recompute all contact flags and advance the coyote timer
    pub fn probe(&mut self, world: &impl Raycaster, position: Vec2, dt: f32) -> GroundState {
        let (long_l, long_r) = self.leg_hits(world, position, GROUND_RAY_LENGTH);
        let (short_l, short_r) = self.leg_hits(world, position, LEG_RAY_LENGTH);
        let (near_l, near_r) = self.leg_hits(world, position, NEAR_GROUND_RAY_LENGTH);

        let on_ground = long_l || long_r;
        let overlapping = short_l || short_r;
        let truly = on_ground && !overlapping;

        self.state = GroundState {
            on_ground,
            overlapping_ground: overlapping,
            truly_on_ground: truly,
            near_ground: (near_l || near_r) && !overlapping,
        };

        if truly {
            self.coyote_timer = 0.0;
        } else {
            self.coyote_timer += dt;
        }

        self.state
    }

    /// True for [0, COYOTE_TIME) after the last truly-on-ground tick
    pub fn recently_grounded(&self) -> bool {
        self.coyote_timer < COYOTE_TIME
    }

    /// Moving platform under either long leg ray, if any
    pub fn on_moving_platform(&self, world: &impl Raycaster, position: Vec2) -> Option<PlatformId> {
        let offset = Vec2::new(LEG_OFFSET, 0.0);
        for origin in [position - offset, position + offset] {
            if let Some(hit) = world.cast(origin, Vec2::NEG_Y, GROUND_RAY_LENGTH, self.mask) {
                if hit.tag == SurfaceTag::MovingPlatform {
                    return hit.body;
                }
            }
        }
        None
    }

    /// Narrow, vertically offset probe against solid ground only. Returns
    /// true once contact has persisted past the kill time (player dies).
    pub fn check_stuck_in_ground(&mut self, world: &impl Raycaster, position: Vec2, dt: f32) -> bool {
        let offset = Vec2::new(LEG_OFFSET / 2.0, IN_GROUND_PROBE_OFFSET);
        let left = world
            .cast(
                position - Vec2::new(offset.x, 0.0) + Vec2::new(0.0, offset.y),
                Vec2::NEG_Y,
                GROUND_RAY_LENGTH,
                LayerMask::GROUND,
            )
            .is_some();
        let right = world
            .cast(
                position + Vec2::new(offset.x, offset.y),
                Vec2::NEG_Y,
                GROUND_RAY_LENGTH,
                LayerMask::GROUND,
            )
            .is_some();

        if left || right {
            self.in_ground_timer += dt;
            if self.in_ground_timer >= IN_GROUND_KILL_TIME {
                return true;
            }
        } else {
            self.in_ground_timer = 0.0;
        }
        false
    }
}
