//! Procedural electric tether between the player and the deployed magnet
//!
//! A master generator rebuilds the canonical multi-point spline every frame
//! from noise-displaced interior points. Child generators derive shorter
//! visual segments from the master array without recomputing geometry. A
//! burst manager rotates which arc groups are visible while the magnet sits
//! still, and a spark pool schedules short-lived sparks along the spline.
//!
//! Everything here is presentation-side: it reads simulation state, never
//! writes it, and degrades to hidden geometry instead of erroring.

pub mod burst;
pub mod child;
pub mod master;
pub mod sparks;

use glam::Vec2;
use rand::Rng;

use crate::effects::{Effect, EffectSink, GlowFlicker};

pub use burst::BurstManager;
pub use child::{ArcChild, ChildMode};
pub use master::{ArcMaster, ArcState, StopTransition};
pub use sparks::SparkPool;

/// Spline tangent mode at one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentMode {
    /// Smooth handles through the point
    Continuous,
    /// Hard kink
    Linear,
}

/// One point of an arc spline with its tangent handles
#[derive(Debug, Clone, Copy)]
pub struct ArcPoint {
    pub position: Vec2,
    pub left_tangent: Vec2,
    pub right_tangent: Vec2,
    pub mode: TangentMode,
}

impl ArcPoint {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            left_tangent: Vec2::ZERO,
            right_tangent: Vec2::ZERO,
            mode: TangentMode::Continuous,
        }
    }
}

/// Arc generator tunables. Defaults match the shipped tether look.
#[derive(Debug, Clone)]
pub struct ArcParams {
    /// Chord distance between dropped interior points
    pub drop_interval: f32,
    /// At or below this base-to-magnet distance the arc collapses to a
    /// straight two-point line
    pub reset_distance: f32,
    /// Per-frame magnet movement above this counts as moving
    pub move_threshold: f32,
    /// Movement must stay below the threshold this long to count as stopped
    pub stopped_min_time: f32,

    pub amplitude: f32,
    pub frequency: f32,
    pub octaves: u32,
    pub roughness: f32,
    pub speed: f32,
    pub seed: i32,

    /// Freeze-and-jump noise time instead of flowing continuously
    pub stepped: bool,
    pub stepped_hold_range: (f32, f32),

    pub corner_chance: f32,
    pub corner_reseed_interval: f32,
    pub smooth_tangent_scale: f32,
    pub corner_tangent_scale: f32,

    pub extra_chaos: bool,
    pub chaos_perp_jitter: f32,
    pub chaos_parallel_jitter: f32,
    pub chaos_frequency: f32,
    pub chaos_speed: f32,

    /// Base alpha before distance fade
    pub base_alpha: f32,
    /// Fade to zero as spline length approaches this; 0 disables the fade
    pub max_spline_length: f32,
    pub only_show_when_stopped: bool,
    pub stop_show_delay: f32,

    // child sampling
    pub copy_fraction_range: (f32, f32),
    pub lifetime_range: (f32, f32),
    pub delay_range: (f32, f32),
    pub max_extra_points: usize,
    pub child_amplitude_range: (f32, f32),
    pub anchor_step_time_range: (f32, f32),
    pub enable_movement: bool,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            drop_interval: 10.0,
            reset_distance: 1.0,
            move_threshold: 0.15,
            stopped_min_time: 0.08,
            amplitude: 1.5,
            frequency: 1.0,
            octaves: 4,
            roughness: 0.5,
            speed: 2.0,
            seed: 0,
            stepped: false,
            stepped_hold_range: (0.05, 0.15),
            corner_chance: 0.35,
            corner_reseed_interval: 0.12,
            smooth_tangent_scale: 0.6,
            corner_tangent_scale: 0.0,
            extra_chaos: false,
            chaos_perp_jitter: 0.4,
            chaos_parallel_jitter: 0.3,
            chaos_frequency: 3.0,
            chaos_speed: 2.0,
            base_alpha: 1.0,
            max_spline_length: 0.0,
            only_show_when_stopped: false,
            stop_show_delay: 0.0,
            copy_fraction_range: (0.4, 1.0),
            lifetime_range: (0.05, 0.15),
            delay_range: (0.0, 0.05),
            max_extra_points: 6,
            child_amplitude_range: (0.2, 0.6),
            anchor_step_time_range: (0.03, 0.08),
            enable_movement: false,
        }
    }
}

/// Interior point count for a chord of `length`: `length / interval`
/// rounded to nearest, half excluded downward.
pub fn interior_point_count(length: f32, interval: f32) -> usize {
    if interval <= 1e-4 {
        return 0;
    }
    let base = (length / interval).floor();
    let remainder = length % interval;
    let count = if remainder > interval * 0.5 {
        base + 1.0
    } else {
        base
    };
    count.max(0.0) as usize
}

/// Uniform sample from a range with the minimum clamped to zero and the
/// maximum clamped up to the minimum
pub(crate) fn random_range_safe(rng: &mut impl Rng, range: (f32, f32)) -> f32 {
    let min = range.0.max(0.0);
    let max = range.1.max(min);
    if max - min < f32::EPSILON {
        return min;
    }
    rng.random_range(min..max)
}

/// Full tether assembly: one master arc, its child arcs, burst-mode group
/// rotation, the spline spark pool and the endpoint flash/glow effects.
pub struct TetherRig {
    pub master: ArcMaster,
    pub children: Vec<ArcChild>,
    pub burst: BurstManager,
    sparks: SparkPool,
    base_flicker: GlowFlicker,
    magnet_flicker: GlowFlicker,
    glow_on: bool,
}

impl TetherRig {
    pub fn new(params: ArcParams, children: Vec<ArcChild>, burst: BurstManager, seed: u64) -> Self {
        let flicker_seed = params.seed;
        Self {
            master: ArcMaster::new(params, seed),
            children,
            burst,
            sparks: SparkPool::new(seed ^ 0x5eed),
            base_flicker: GlowFlicker::new(flicker_seed),
            magnet_flicker: GlowFlicker::new(flicker_seed.wrapping_add(1)),
            glow_on: false,
        }
    }

    /// Advance one frame. `magnet` is the deployed projectile position, or
    /// None when no magnet is out.
    pub fn update(
        &mut self,
        base: Vec2,
        magnet: Option<Vec2>,
        now: f64,
        dt: f32,
        sink: &mut impl EffectSink,
    ) {
        let anchors = magnet.map(|m| (base, m));
        let transition = self.master.update(anchors, now, dt);

        // Group 0 is the master; children follow as their own groups.
        let groups = 1 + self.children.len();
        self.burst.update(groups, self.master.stopped(), now);
        self.master.set_burst_visible(self.burst.group_visible(0));
        for (i, child) in self.children.iter_mut().enumerate() {
            child.set_burst_visible(self.burst.group_visible(i + 1));
            child.update(&self.master, now);
        }

        self.update_endpoint_effects(base, magnet, transition, now, sink);

        if self.master.visible() && self.master.points().len() > 2 {
            self.sparks.update(self.master.points(), now, sink);
        } else {
            self.sparks.stop_all(sink);
        }
    }

    fn update_endpoint_effects(
        &mut self,
        base: Vec2,
        magnet: Option<Vec2>,
        transition: StopTransition,
        now: f64,
        sink: &mut impl EffectSink,
    ) {
        let Some(end) = magnet else {
            self.stop_endpoint_effects(sink);
            return;
        };
        let dir = end - base;
        let angle = dir.y.atan2(dir.x);

        if transition == StopTransition::JustStopped {
            sink.play(Effect::BaseFlash, base, angle + std::f32::consts::PI);
            sink.play(Effect::MagnetFlash, end, angle);
            sink.play(Effect::BaseGlow, base, angle + std::f32::consts::PI);
            sink.play(Effect::MagnetGlow, end, angle);
            self.glow_on = true;
        }
        if self.glow_on && !self.master.stopped() {
            sink.stop(Effect::BaseGlow);
            sink.stop(Effect::MagnetGlow);
            self.glow_on = false;
        }
        if self.glow_on {
            let t = now as f32;
            sink.set_intensity(Effect::BaseGlow, self.base_flicker.intensity(t));
            sink.set_intensity(Effect::MagnetGlow, self.magnet_flicker.intensity(t));
        }

        if self.master.stopped() && self.master.visible() {
            sink.play(Effect::BaseSparks, base, angle + std::f32::consts::PI);
            sink.play(Effect::MagnetSparks, end, angle);
        } else {
            sink.stop(Effect::BaseSparks);
            sink.stop(Effect::MagnetSparks);
        }
    }

    fn stop_endpoint_effects(&mut self, sink: &mut impl EffectSink) {
        sink.stop(Effect::BaseSparks);
        sink.stop(Effect::MagnetSparks);
        if self.glow_on {
            sink.stop(Effect::BaseGlow);
            sink.stop(Effect::MagnetGlow);
            self.glow_on = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_count_rounds_half_up() {
        // 25/10: floor 2, remainder 5 is not > 5 -> stays 2
        assert_eq!(interior_point_count(25.0, 10.0), 2);
        // 26/10: remainder 6 > 5 -> rounds up
        assert_eq!(interior_point_count(26.0, 10.0), 3);
        assert_eq!(interior_point_count(4.0, 10.0), 0);
        assert_eq!(interior_point_count(30.0, 10.0), 3);
    }

    #[test]
    fn test_interior_count_monotonic_in_length() {
        let mut last = 0;
        let mut len = 0.0_f32;
        while len < 60.0 {
            let c = interior_point_count(len, 10.0);
            assert!(c >= last, "count never shrinks as length grows");
            last = c;
            len += 0.25;
        }
    }

    #[test]
    fn test_interior_count_degenerate_interval() {
        assert_eq!(interior_point_count(10.0, 0.0), 0);
    }

    fn rig(seed: u64) -> TetherRig {
        let children = vec![
            ArcChild::new(ChildMode::Sharp, ArcParams::default(), seed ^ 1),
            ArcChild::new(ChildMode::Tethered, ArcParams::default(), seed ^ 2),
        ];
        TetherRig::new(ArcParams::default(), children, BurstManager::new(true, 2, seed ^ 3), seed)
    }

    #[test]
    fn test_rig_replay_is_deterministic() {
        let run = |mut rig: TetherRig| {
            let mut sink = crate::effects::NullEffects;
            let base = Vec2::ZERO;
            let mut now = 0.0_f64;
            for i in 0..120 {
                // Drift out, then hold still
                let x = (i as f32).min(60.0) * 0.4 + 5.0;
                rig.update(base, Some(Vec2::new(x, 0.0)), now, 1.0 / 60.0, &mut sink);
                now += 1.0 / 60.0;
            }
            let mut pts: Vec<Vec2> = rig.master.points().iter().map(|p| p.position).collect();
            for child in &rig.children {
                pts.extend(child.points().iter().map(|p| p.position));
            }
            pts
        };
        assert_eq!(run(rig(11)), run(rig(11)));
    }

    #[test]
    fn test_stop_transition_fires_flash_and_glow() {
        let mut rig = rig(11);
        let mut sink = crate::effects::RecordingEffects::new();
        let base = Vec2::ZERO;
        let mut now = 0.0_f64;
        // Magnet flies out, then sits still long enough to latch stopped
        for i in 0..60 {
            let x = (i as f32).min(30.0) * 0.5 + 5.0;
            rig.update(base, Some(Vec2::new(x, 0.0)), now, 1.0 / 60.0, &mut sink);
            now += 1.0 / 60.0;
        }
        assert!(rig.master.stopped());
        assert_eq!(sink.play_count(Effect::BaseFlash), 1);
        assert_eq!(sink.play_count(Effect::MagnetFlash), 1);
        assert!(sink.play_count(Effect::BaseGlow) >= 1);

        // Recall stops every looping endpoint effect
        rig.update(base, None, now, 1.0 / 60.0, &mut sink);
        assert!(sink.was_stopped(Effect::BaseGlow));
        assert!(sink.was_stopped(Effect::MagnetSparks));
    }
}
