//! Magnet projectile and force model
//!
//! Exactly one projectile exists per launcher. It flies under gravity,
//! attaches to sticky surfaces (snapping to the raycast surface normal),
//! shatters on non-stick surfaces and expires after a fixed lifetime.
//!
//! The force curve is a tuned `base + mult / sqrt(d)`, not inverse-square.
//! Speed caps are modulated by the angle and distance to the magnet so
//! swinging with the field can exceed them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{LayerMask, PlatformId, RayHit, Raycaster, SurfaceTag};
use crate::consts::{
    GRAVITY, MAGNET_ATTRACT_BASE_FORCE, MAGNET_ATTRACT_DISTANCE_FORCE, MAGNET_LAUNCH_SPEED,
    MAGNET_LIFETIME, MAGNET_MAX_DISTANCE, MAGNET_MIN_DISTANCE, MAGNET_PROBE_BACK,
    MAGNET_PROBE_LENGTH, MAGNET_PROBE_SKEW, MAGNET_REPEL_BASE_FORCE,
    MAGNET_REPEL_DISTANCE_FORCE,
};
use crate::{perp, signum_or_zero};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Repel,
    Attract,
}

/// Continuous force on the player while one polarity is held. `relative`
/// is player minus magnet. None beyond the effective range.
pub fn magnet_force(polarity: Polarity, relative: Vec2) -> Option<Vec2> {
    let distance = relative.length();
    if distance > MAGNET_MAX_DISTANCE || distance < f32::EPSILON {
        return None;
    }
    let clamped = distance.max(MAGNET_MIN_DISTANCE);
    let (mult, base) = match polarity {
        Polarity::Repel => (MAGNET_REPEL_DISTANCE_FORCE, MAGNET_REPEL_BASE_FORCE),
        Polarity::Attract => (MAGNET_ATTRACT_DISTANCE_FORCE, MAGNET_ATTRACT_BASE_FORCE),
    };
    let magnitude = base + mult / clamped.sqrt();
    Some(relative / distance * magnitude)
}

/// Size of the field-pulse ripple effect, 1 at contact range fading to 0
pub fn pulse_size(distance: f32) -> f32 {
    (1.0 - 1.5 * (distance - MAGNET_MIN_DISTANCE) / MAGNET_MAX_DISTANCE).max(0.0)
}

/// Speed cap modulated by the magnet's bearing. `axis_component` is the
/// cos (horizontal cap) or sin (vertical cap) of the player-to-magnet
/// angle. Swinging with the field raises the cap up to several times the
/// base; fighting it clamps harder.
pub fn modulated_max_speed(
    base_max: f32,
    axis_component: f32,
    velocity_component: f32,
    distance: f32,
    attracting: bool,
) -> f32 {
    if distance >= MAGNET_MAX_DISTANCE {
        return base_max;
    }
    let falloff = ((MAGNET_MAX_DISTANCE - distance) / MAGNET_MAX_DISTANCE).sqrt();
    let mut sign = signum_or_zero(velocity_component);
    if attracting {
        sign = -sign;
    }
    base_max * (sign + 4.0 * axis_component * falloff).abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum ProjectilePhase {
    Flying,
    Attached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetProjectile {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians; aligned opposite the surface normal once attached
    pub rotation: f32,
    phase: ProjectilePhase,
    /// Set when attached to a moving platform, for co-motion
    platform: Option<(PlatformId, Vec2)>,
    death_time: f64,
}

impl MagnetProjectile {
    pub fn attached(&self) -> bool {
        self.phase == ProjectilePhase::Attached
    }

    fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Snap pose to the surface normal found by two skewed probes cast
    /// from behind the contact point. If neither connects the contact
    /// pose is kept as-is.
    fn align_to_surface(&mut self, world: &impl Raycaster, mask: LayerMask) {
        let heading = self.heading();
        let origin = self.position - heading * MAGNET_PROBE_BACK;
        let up = perp(heading);
        for dir in [
            (heading + up * MAGNET_PROBE_SKEW).normalize(),
            (heading - up * MAGNET_PROBE_SKEW).normalize(),
        ] {
            if let Some(hit) = world.cast(origin, dir, MAGNET_PROBE_LENGTH, mask) {
                self.rotation = hit.normal.y.atan2(hit.normal.x) + std::f32::consts::PI;
                self.position = hit.point;
                return;
            }
        }
    }
}

/// What happened to the projectile during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileEvent {
    None,
    Attached,
    Shattered,
    Expired,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagnetLauncher {
    projectile: Option<MagnetProjectile>,
}

impl MagnetLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projectile(&self) -> Option<&MagnetProjectile> {
        self.projectile.as_ref()
    }

    pub fn deployed(&self) -> bool {
        self.projectile.is_some()
    }

    /// Launch toward `direction`, replacing any existing projectile
    pub fn launch(&mut self, origin: Vec2, direction: Vec2, now: f64) {
        let dir = direction.normalize_or(Vec2::X);
        self.projectile = Some(MagnetProjectile {
            position: origin,
            velocity: dir * MAGNET_LAUNCH_SPEED,
            rotation: dir.y.atan2(dir.x),
            phase: ProjectilePhase::Flying,
            platform: None,
            death_time: now + f64::from(MAGNET_LIFETIME),
        });
    }

    /// Clears the projectile and everything hanging off it, same tick
    pub fn deactivate(&mut self) {
        self.projectile = None;
    }

    /// Advance flight/attachment one fixed step
    pub fn update(&mut self, world: &impl Raycaster, now: f64, dt: f32) -> ProjectileEvent {
        let Some(proj) = self.projectile.as_mut() else {
            return ProjectileEvent::None;
        };

        if now >= proj.death_time {
            self.projectile = None;
            return ProjectileEvent::Expired;
        }

        let mask = LayerMask::GROUND | LayerMask::PLANK;
        match proj.phase {
            ProjectilePhase::Flying => {
                proj.velocity.y += GRAVITY * dt;
                let motion = proj.velocity * dt;
                let travel = motion.length();
                if travel > f32::EPSILON {
                    proj.rotation = proj.velocity.y.atan2(proj.velocity.x);
                    if let Some(hit) = world.cast(proj.position, motion / travel, travel, mask) {
                        return self.resolve_contact(world, hit, mask);
                    }
                }
                proj.position += motion;
                ProjectileEvent::None
            }
            ProjectilePhase::Attached => {
                if let Some((id, last)) = proj.platform {
                    if let Some(pos) = world.platform_position(id) {
                        proj.position += pos - last;
                        proj.platform = Some((id, pos));
                    }
                }
                ProjectileEvent::None
            }
        }
    }

    fn resolve_contact(
        &mut self,
        world: &impl Raycaster,
        hit: RayHit,
        mask: LayerMask,
    ) -> ProjectileEvent {
        // Borrow checked above in update; projectile is present here
        let Some(proj) = self.projectile.as_mut() else {
            return ProjectileEvent::None;
        };
        match hit.tag {
            SurfaceTag::NonStick => {
                self.projectile = None;
                ProjectileEvent::Shattered
            }
            tag => {
                proj.velocity = Vec2::ZERO;
                proj.position = hit.point;
                proj.phase = ProjectilePhase::Attached;
                if tag == SurfaceTag::MovingPlatform {
                    proj.platform = hit
                        .body
                        .and_then(|id| world.platform_position(id).map(|p| (id, p)));
                }
                proj.align_to_surface(world, mask);
                ProjectileEvent::Attached
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::world::{BoxCollider, StageWorld};

    #[test]
    fn test_repel_force_at_ten_units() {
        let rel = Vec2::new(10.0, 0.0);
        let f = magnet_force(Polarity::Repel, rel).unwrap();
        let expected = 7.0 + 98.0 / 10.0_f32.sqrt();
        assert!((f.x - expected).abs() < 1e-4);
        assert!(f.y.abs() < 1e-6);
    }

    #[test]
    fn test_attract_force_pulls_inward() {
        let rel = Vec2::new(10.0, 0.0);
        let f = magnet_force(Polarity::Attract, rel).unwrap();
        let expected = -7.0 - 87.0 / 10.0_f32.sqrt();
        assert!((f.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_min_distance_clamps_singularity() {
        let close = magnet_force(Polarity::Repel, Vec2::new(0.2, 0.0)).unwrap();
        let at_min = 7.0 + 98.0 / MAGNET_MIN_DISTANCE.sqrt();
        assert!((close.x - at_min).abs() < 1e-4);
    }

    #[test]
    fn test_no_force_beyond_max_distance() {
        assert!(magnet_force(Polarity::Repel, Vec2::new(31.0, 0.0)).is_none());
    }

    #[test]
    fn test_force_decreases_with_distance() {
        let mut last = f32::INFINITY;
        for d in [2.0, 5.0, 10.0, 20.0, 29.0] {
            let f = magnet_force(Polarity::Repel, Vec2::new(d, 0.0)).unwrap();
            assert!(f.x < last, "force must fall off with distance");
            last = f.x;
        }
    }

    #[test]
    fn test_pulse_size_range() {
        assert!((pulse_size(MAGNET_MIN_DISTANCE) - 1.0).abs() < 1e-6);
        assert_eq!(pulse_size(MAGNET_MAX_DISTANCE), 0.0);
        let mid = pulse_size(10.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_speed_cap_raised_when_swinging_with_field() {
        // Moving right, magnet directly to the right (cos = 1), close by
        let cap = modulated_max_speed(11.0, 1.0, 5.0, 5.0, false);
        assert!(cap > 11.0);
    }

    #[test]
    fn test_speed_cap_unchanged_out_of_range() {
        assert_eq!(modulated_max_speed(11.0, 1.0, 5.0, 35.0, false), 11.0);
    }

    #[test]
    fn test_attract_flips_velocity_sign() {
        let repel = modulated_max_speed(11.0, 1.0, 5.0, 5.0, false);
        let attract = modulated_max_speed(11.0, 1.0, 5.0, 5.0, true);
        assert!((repel - attract).abs() > 1e-3);
    }

    #[test]
    fn test_launch_and_attach_to_wall() {
        let mut world = StageWorld::new();
        world.add(BoxCollider::ground(Vec2::new(5.0, -10.0), Vec2::new(6.0, 10.0)));

        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::ZERO, Vec2::X, 0.0);
        assert!(launcher.deployed());

        let mut now = 0.0_f64;
        let mut attached = false;
        for _ in 0..100 {
            if launcher.update(&world, now, SIM_DT) == ProjectileEvent::Attached {
                attached = true;
                break;
            }
            now += f64::from(SIM_DT);
        }
        assert!(attached);
        let proj = launcher.projectile().unwrap();
        assert!(proj.attached());
        assert_eq!(proj.velocity, Vec2::ZERO);
        // Snapped onto the wall face
        assert!((proj.position.x - 5.0).abs() < 0.05);
    }

    #[test]
    fn test_shatters_on_non_stick() {
        let mut world = StageWorld::new();
        let mut wall = BoxCollider::ground(Vec2::new(5.0, -10.0), Vec2::new(6.0, 10.0));
        wall.tag = SurfaceTag::NonStick;
        world.add(wall);

        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::ZERO, Vec2::X, 0.0);
        let mut now = 0.0_f64;
        let mut shattered = false;
        for _ in 0..100 {
            if launcher.update(&world, now, SIM_DT) == ProjectileEvent::Shattered {
                shattered = true;
                break;
            }
            now += f64::from(SIM_DT);
        }
        assert!(shattered);
        assert!(!launcher.deployed());
    }

    #[test]
    fn test_expires_after_lifetime() {
        let world = StageWorld::new();
        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::ZERO, Vec2::Y, 0.0);
        let ev = launcher.update(&world, f64::from(MAGNET_LIFETIME) + 0.01, SIM_DT);
        assert_eq!(ev, ProjectileEvent::Expired);
        assert!(!launcher.deployed());
    }

    #[test]
    fn test_relaunch_replaces_projectile() {
        let world = StageWorld::new();
        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::ZERO, Vec2::X, 0.0);
        launcher.update(&world, 0.0, SIM_DT);
        launcher.launch(Vec2::new(3.0, 0.0), Vec2::NEG_X, 1.0);
        let proj = launcher.projectile().unwrap();
        assert!((proj.position.x - 3.0).abs() < 1e-3);
        assert!(proj.velocity.x < 0.0);
    }

    #[test]
    fn test_rides_moving_platform_after_attach() {
        let mut world = StageWorld::new();
        let id = world.add_platform(
            Vec2::new(5.0, -10.0),
            Vec2::new(6.0, 10.0),
            Vec2::ZERO,
        );

        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::ZERO, Vec2::X, 0.0);
        let mut now = 0.0_f64;
        for _ in 0..100 {
            if launcher.update(&world, now, SIM_DT) == ProjectileEvent::Attached {
                break;
            }
            now += f64::from(SIM_DT);
        }
        let before = launcher.projectile().unwrap().position;

        world.set_platform_position(id, Vec2::new(0.0, 0.5));
        launcher.update(&world, now, SIM_DT);
        let after = launcher.projectile().unwrap().position;
        assert!((after.y - (before.y + 0.5)).abs() < 1e-5);
    }
}
