//! Raycast world abstraction
//!
//! The simulation never runs its own broad-phase: it issues single rays
//! against whatever implements [`Raycaster`] and reacts to hit/no-hit.
//! [`StageWorld`] is an axis-aligned-box implementation used by the demo
//! binary and the tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Solid ground
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    /// Pass-through plank platforms
    pub const PLANK: LayerMask = LayerMask(1 << 1);

    pub const NONE: LayerMask = LayerMask(0);

    #[inline]
    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;
    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

/// Tag carried by a hit collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceTag {
    #[default]
    Ground,
    Plank,
    MovingPlatform,
    /// Magnet projectiles shatter on these instead of sticking
    NonStick,
}

/// Handle to a moving platform body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Result of a single raycast
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
    pub tag: SurfaceTag,
    /// Set when the hit collider belongs to a moving platform
    pub body: Option<PlatformId>,
}

/// Single-ray physics query service
pub trait Raycaster {
    fn cast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Current world position of a moving platform, if it still exists
    fn platform_position(&self, id: PlatformId) -> Option<Vec2>;
}

/// One static or platform-mounted box collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxCollider {
    pub min: Vec2,
    pub max: Vec2,
    pub layer: LayerMask,
    pub tag: SurfaceTag,
    pub platform: Option<PlatformId>,
}

impl BoxCollider {
    pub fn ground(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            layer: LayerMask::GROUND,
            tag: SurfaceTag::Ground,
            platform: None,
        }
    }

    pub fn plank(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            layer: LayerMask::PLANK,
            tag: SurfaceTag::Plank,
            platform: None,
        }
    }

    fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Slab-test ray intersection; returns (distance, normal)
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        // Queries starting inside a collider report a zero-distance hit,
        // which the stuck-in-ground probe depends on.
        if self.contains(origin) {
            return Some((0.0, -dir));
        }

        let inv = Vec2::new(1.0 / dir.x, 1.0 / dir.y);
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;

        let tmin = t1.min(t2);
        let tmax = t1.max(t2);

        let t_enter = tmin.x.max(tmin.y);
        let t_exit = tmax.x.min(tmax.y);

        if t_enter > t_exit || t_exit < 0.0 || t_enter > max_distance {
            return None;
        }

        let t = t_enter.max(0.0);
        let normal = if tmin.x > tmin.y {
            Vec2::new(-dir.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, -dir.y.signum())
        };
        Some((t, normal))
    }
}

/// Static stage made of box colliders plus movable platform bodies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageWorld {
    colliders: Vec<BoxCollider>,
    /// Platform positions, indexed by PlatformId; colliders referencing a
    /// platform are offset by its position each query.
    platforms: Vec<Vec2>,
}

impl StageWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collider: BoxCollider) {
        self.colliders.push(collider);
    }

    /// Register a moving platform; the returned id indexes its position
    pub fn add_platform(&mut self, min: Vec2, max: Vec2, position: Vec2) -> PlatformId {
        let id = PlatformId(self.platforms.len() as u32);
        self.platforms.push(position);
        self.colliders.push(BoxCollider {
            min,
            max,
            layer: LayerMask::GROUND,
            tag: SurfaceTag::MovingPlatform,
            platform: Some(id),
        });
        id
    }

    pub fn set_platform_position(&mut self, id: PlatformId, position: Vec2) {
        if let Some(p) = self.platforms.get_mut(id.0 as usize) {
            *p = position;
        }
    }
}

impl Raycaster for StageWorld {
    fn cast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for c in &self.colliders {
            if !mask.contains(c.layer) {
                continue;
            }
            let offset = c
                .platform
                .and_then(|id| self.platform_position(id))
                .unwrap_or(Vec2::ZERO);
            let local_origin = origin - offset;
            if let Some((t, normal)) = c.raycast(local_origin, dir, max_distance) {
                if best.as_ref().is_none_or(|b| t < b.distance) {
                    best = Some(RayHit {
                        point: origin + dir * t,
                        normal,
                        distance: t,
                        tag: c.tag,
                        body: c.platform,
                    });
                }
            }
        }
        best
    }

    fn platform_position(&self, id: PlatformId) -> Option<Vec2> {
        self.platforms.get(id.0 as usize).copied()
    }
}
