//! Polarity - 2D magnet-platformer movement and tether simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ground sensing, motors, magnet physics)
//! - `tether`: Procedural electric-tether arc geometry (master/child arcs)
//! - `noise`: Seeded value noise used by arc synthesis and glow flicker
//! - `effects`: Particle/visual effect sink abstraction
//! - `settings`: Persisted preferences (string-keyed ints/blobs)

pub mod effects;
pub mod noise;
pub mod settings;
pub mod sim;
pub mod tether;

pub use noise::NoiseField;
pub use settings::{PrefStore, Preferences};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// World gravity (units/s², downward)
    pub const GRAVITY: f32 = -9.81;

    /// Ground sensing rays
    pub const GROUND_RAY_LENGTH: f32 = 0.9;
    pub const NEAR_GROUND_RAY_LENGTH: f32 = 1.25;
    pub const LEG_RAY_LENGTH: f32 = 0.78;
    /// Horizontal offset of the two leg rays from body center
    pub const LEG_OFFSET: f32 = 0.42;
    /// Grace window after leaving the ground during which a jump is allowed
    pub const COYOTE_TIME: f32 = 0.1;
    /// Vertical offset of the narrower stuck-in-ground probe
    pub const IN_GROUND_PROBE_OFFSET: f32 = 0.25;
    /// Continuous in-ground contact beyond this kills the player
    pub const IN_GROUND_KILL_TIME: f32 = 0.15;
    /// Downward input intent at or below this drops through planks
    pub const PLANK_DROP_INTENT: f32 = -0.25;

    /// Platform friction blending
    pub const FRICTION_LERP_SPEED: f32 = 10.0;
    pub const LOW_FRICTION: f32 = 0.05;
    pub const HIGH_FRICTION: f32 = 0.8;
    /// Window during which directional/jump/magnet input counts as recent
    pub const INPUT_MEMORY_DURATION: f32 = 0.1;
    /// Platform deltas above this are treated as a teleport and ignored
    pub const PLATFORM_DELTA_CLAMP: f32 = 0.5;

    /// Drag and gravity regimes
    pub const LINEAR_DRAG: f32 = 3.0;
    pub const DEFAULT_GRAVITY: f32 = 1.0;
    pub const FALL_MULTIPLIER: f32 = 3.0;
    pub const DEFAULT_DRAG: f32 = 0.05;
    pub const CLAMP_X_DRAG: f32 = 2.5;
    pub const CLAMP_Y_DRAG: f32 = 3.0;
    /// Gravity scale forced while the death animation plays
    pub const DEATH_GRAVITY_SCALE: f32 = 1.5;

    /// Horizontal motor
    pub const HORIZONTAL_FORCE: f32 = 15.0;
    pub const MAX_X_SPEED: f32 = 11.0;

    /// Vertical motor
    pub const MAX_Y_SPEED: f32 = 20.0;
    pub const JUMP_BUFFER: f32 = 0.15;
    /// Post-jump window that suppresses the vertical speed clamp
    pub const CLAMP_SUPPRESS_TIME: f32 = 0.7;
    pub const JUMP_IMPULSE: f32 = 7.0;

    /// Jetpack
    pub const JETPACK_TOTAL_TIME: f32 = 1.2;
    pub const JETPACK_FORCE: f32 = 12.0;
    pub const MAX_JET_SPEED: f32 = 19.0;
    pub const JETPACK_RECOVERY_DELAY: f32 = 0.25;
    /// Fuel recovers faster than it depletes
    pub const JETPACK_RECOVERY_RATE: f32 = 1.4;
    /// Force boost while ascending slower than JETPACK_SLOW_SPEED
    pub const JETPACK_SLOW_BOOST: f32 = 1.4;
    pub const JETPACK_SLOW_SPEED: f32 = 5.0;

    /// Magnet force curve (tuned 1/sqrt(d), not inverse-square)
    pub const MAGNET_REPEL_DISTANCE_FORCE: f32 = 98.0;
    pub const MAGNET_ATTRACT_DISTANCE_FORCE: f32 = -87.0;
    pub const MAGNET_REPEL_BASE_FORCE: f32 = 7.0;
    pub const MAGNET_ATTRACT_BASE_FORCE: f32 = -7.0;
    pub const MAGNET_MAX_DISTANCE: f32 = 30.0;
    /// Minimum effective distance, clamps out the singularity
    pub const MAGNET_MIN_DISTANCE: f32 = 1.1;

    /// Magnet projectile
    pub const MAGNET_LIFETIME: f32 = 5.0;
    pub const MAGNET_LAUNCH_SPEED: f32 = 25.0;
    /// Back-offset of the surface-normal probe origin
    pub const MAGNET_PROBE_BACK: f32 = 0.35;
    /// Up/down skew of the two probe rays
    pub const MAGNET_PROBE_SKEW: f32 = 0.3;
    pub const MAGNET_PROBE_LENGTH: f32 = 1.0;
}

/// Left-hand perpendicular of a vector
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Linear interpolation with the factor clamped to [0, 1] (engine Lerp
/// semantics; callers feed `rate * dt`)
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Signed unit direction of a scalar, 0 for 0
#[inline]
pub fn signum_or_zero(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perp_rotates_left() {
        assert_eq!(perp(Vec2::X), Vec2::Y);
        assert_eq!(perp(Vec2::Y), Vec2::NEG_X);
    }

    #[test]
    fn test_lerp_clamps_factor() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
    }

    #[test]
    fn test_signum_or_zero() {
        assert_eq!(signum_or_zero(3.2), 1.0);
        assert_eq!(signum_or_zero(-0.1), -1.0);
        assert_eq!(signum_or_zero(0.0), 0.0);
    }
}
