//! Master arc generation and magnet stop detection

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{interior_point_count, random_range_safe, ArcParams, ArcPoint, TangentMode};
use crate::noise::{hash01, NoiseField};
use crate::perp;

/// Generator state, reset whenever the magnet recalls or gets too close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcState {
    /// No magnet out
    Idle,
    /// Too close for a procedural arc; straight line
    TwoPoint,
    Spline,
}

/// Stop/start edge reported by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTransition {
    None,
    /// Stopped after having moved this activation
    JustStopped,
    JustStartedMoving,
}

/// Debounced magnet movement detector. The first frame after caching a
/// position counts as moving; stillness must persist `stopped_min_time`
/// before the stopped flag latches.
#[derive(Debug, Clone, Default)]
pub struct StopDetector {
    last_pos: Option<Vec2>,
    timer: f32,
    pub moving: bool,
    pub stopped: bool,
    /// The magnet moved at least once since this activation began
    pub has_moved: bool,
}

impl StopDetector {
    pub fn update(&mut self, pos: Vec2, dt: f32, threshold: f32, min_time: f32) {
        let Some(last) = self.last_pos else {
            self.last_pos = Some(pos);
            self.moving = true;
            self.stopped = false;
            self.timer = 0.0;
            return;
        };
        let moved = pos.distance(last);
        self.last_pos = Some(pos);

        if moved > threshold {
            self.timer = 0.0;
            self.moving = true;
            self.stopped = false;
            self.has_moved = true;
        } else {
            self.timer += dt;
            let settled = self.timer >= min_time;
            self.moving = !settled;
            self.stopped = settled;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct ArcMaster {
    pub params: ArcParams,
    noise: NoiseField,
    rng: Pcg32,
    detector: StopDetector,
    state: ArcState,
    points: Vec<ArcPoint>,
    spline_length: f32,
    alpha: f32,
    burst_visible: bool,
    stopped_since: Option<f64>,
    last_stopped: bool,
    /// Stop-show delay gate, evaluated during update so visible() stays a
    /// cheap read
    stop_delay_checked: bool,
    // stepped-time internals
    stepped_initialized: bool,
    stepped_sample_time: f32,
    next_step_time: f64,
}

impl ArcMaster {
    pub fn new(params: ArcParams, rng_seed: u64) -> Self {
        let noise = NoiseField::new(params.seed);
        let alpha = params.base_alpha;
        let only_show = params.only_show_when_stopped;
        Self {
            params,
            noise,
            rng: Pcg32::seed_from_u64(rng_seed),
            detector: StopDetector::default(),
            state: ArcState::Idle,
            points: Vec::new(),
            spline_length: 0.0,
            alpha,
            burst_visible: true,
            stopped_since: None,
            last_stopped: false,
            stop_delay_checked: !only_show,
            stepped_initialized: false,
            stepped_sample_time: 0.0,
            next_step_time: 0.0,
        }
    }

    pub fn state(&self) -> ArcState {
        self.state
    }

    pub fn points(&self) -> &[ArcPoint] {
        &self.points
    }

    pub fn spline_length(&self) -> f32 {
        self.spline_length
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn moving(&self) -> bool {
        self.detector.moving
    }

    pub fn stopped(&self) -> bool {
        self.detector.stopped
    }

    pub fn set_burst_visible(&mut self, visible: bool) {
        self.burst_visible = visible;
    }

    /// Visible once the stop-show delay (if configured) has elapsed and the
    /// burst manager allows this group
    pub fn visible(&self) -> bool {
        self.state != ArcState::Idle && self.stop_delay_complete() && self.burst_visible
    }

    fn stop_delay_complete_at(&self, now: f64) -> bool {
        if !self.params.only_show_when_stopped {
            return true;
        }
        if !self.detector.stopped {
            return false;
        }
        if self.params.stop_show_delay <= 0.0 {
            return true;
        }
        match self.stopped_since {
            Some(since) => now >= since + f64::from(self.params.stop_show_delay),
            None => false,
        }
    }

    fn stop_delay_complete(&self) -> bool {
        self.stop_delay_checked
    }

    /// Regenerate for this frame. `anchors` is (base, magnet) when a magnet
    /// is deployed.
    pub fn update(&mut self, anchors: Option<(Vec2, Vec2)>, now: f64, dt: f32) -> StopTransition {
        let Some((base, end)) = anchors else {
            return self.clear(ArcState::Idle);
        };

        self.detector.update(
            end,
            dt,
            self.params.move_threshold,
            self.params.stopped_min_time,
        );

        if self.detector.stopped && !self.last_stopped {
            self.stopped_since = Some(now);
        } else if !self.detector.stopped {
            self.stopped_since = None;
        }
        let just_stopped =
            self.detector.stopped && !self.last_stopped && self.detector.has_moved;
        let just_started = !self.detector.stopped && self.last_stopped;
        self.last_stopped = self.detector.stopped;

        let delta = end - base;
        let length = delta.length();
        self.spline_length = length;

        if length <= self.params.reset_distance {
            let t = self.clear(ArcState::TwoPoint);
            self.points = vec![ArcPoint::at(base), ArcPoint::at(end)];
            self.spline_length = length;
            self.update_alpha();
            return t;
        }

        // Degenerate chord; hold a stopped two-point pose
        if length < 1e-4 {
            self.points = vec![ArcPoint::at(base), ArcPoint::at(end)];
            self.state = ArcState::TwoPoint;
            self.stop_delay_checked = self.stop_delay_complete_at(now);
            self.update_alpha();
            return StopTransition::None;
        }

        let dir = delta / length;
        let interior = interior_point_count(length, self.params.drop_interval);
        let time = self.arc_time(now);
        self.rebuild(base, end, dir, length, interior, time);
        self.state = ArcState::Spline;
        self.stop_delay_checked = self.stop_delay_complete_at(now);
        self.update_alpha();

        if just_stopped {
            StopTransition::JustStopped
        } else if just_started {
            StopTransition::JustStartedMoving
        } else {
            StopTransition::None
        }
    }

    fn clear(&mut self, state: ArcState) -> StopTransition {
        let was_stopped = self.last_stopped;
        self.points.clear();
        self.state = state;
        self.detector.reset();
        self.stopped_since = None;
        self.last_stopped = false;
        self.stepped_initialized = false;
        self.stop_delay_checked = !self.params.only_show_when_stopped;
        if state == ArcState::Idle {
            self.spline_length = 0.0;
        }
        self.update_alpha();
        if was_stopped {
            StopTransition::JustStartedMoving
        } else {
            StopTransition::None
        }
    }

    /// Frozen-and-jumping sample time in stepped mode, wall time otherwise
    fn arc_time(&mut self, now: f64) -> f32 {
        if !self.params.stepped {
            self.stepped_initialized = false;
            return now as f32;
        }
        if !self.stepped_initialized || now >= self.next_step_time {
            self.stepped_initialized = true;
            let hold = random_range_safe(&mut self.rng, self.params.stepped_hold_range).max(1e-4);
            self.next_step_time = now + f64::from(hold);
            self.stepped_sample_time = now as f32;
        }
        self.stepped_sample_time
    }

    fn rebuild(&mut self, base: Vec2, end: Vec2, dir: Vec2, length: f32, interior: usize, time: f32) {
        let count = interior + 2;
        self.points.clear();
        self.points.reserve(count);

        // Stepped mode freezes the flow; the time jump itself animates
        let speed = if self.params.stepped { 1.0 } else { self.params.speed };

        self.points.push(ArcPoint::at(base));
        for i in 1..=interior {
            let t = i as f32 / (interior + 1) as f32;
            let mut p = base + dir * (t * length);
            let off = self.noise.arc_offset(
                t,
                time,
                self.params.amplitude,
                self.params.frequency,
                self.params.octaves,
                self.params.roughness,
                speed,
            );
            p += perp(dir) * off;
            p = self.apply_chaos(p, dir, t, time);
            self.points.push(ArcPoint::at(p));
        }
        self.points.push(ArcPoint::at(end));

        apply_mixed_tangents(&mut self.points, &self.params, dir, length, time);
    }

    fn apply_chaos(&self, p: Vec2, dir: Vec2, t: f32, time: f32) -> Vec2 {
        if !self.params.extra_chaos {
            return p;
        }
        let chaos_time = time * self.params.chaos_speed;
        let u = t * self.params.chaos_frequency + self.params.seed as f32 * 0.123;
        let n_perp = self.noise.sample_signed(u, chaos_time);
        let n_par = self.noise.sample_signed(u + 37.21, chaos_time + 11.73);
        p + perp(dir) * (n_perp * self.params.chaos_perp_jitter)
            + dir * (n_par * self.params.chaos_parallel_jitter)
    }

    fn update_alpha(&mut self) {
        self.alpha = faded_alpha(
            self.params.base_alpha,
            self.spline_length,
            self.params.max_spline_length,
        );
    }
}

/// Alpha after distance fade: full at zero length, gone at `max_len`
pub fn faded_alpha(base: f32, length: f32, max_len: f32) -> f32 {
    if max_len <= 0.0 {
        return base;
    }
    base * (1.0 - (length / max_len).clamp(0.0, 1.0))
}

/// Assign tangent handles: endpoints always smooth toward the chord,
/// interior points kinked by the stable corner hash.
pub(super) fn apply_mixed_tangents(
    points: &mut [ArcPoint],
    params: &ArcParams,
    dir: Vec2,
    length: f32,
    time: f32,
) {
    let count = points.len();
    if count < 2 {
        return;
    }
    let seg_len = length / (count - 1) as f32;
    let handle = params.drop_interval.min(seg_len) * 0.5;
    let reseed_step = (time / params.corner_reseed_interval.max(1e-4)).floor() as i32;

    for i in 0..count {
        let point = &mut points[i];
        if i == 0 || i == count - 1 {
            let tan = dir * (handle * params.smooth_tangent_scale);
            point.mode = TangentMode::Continuous;
            if i == 0 {
                point.left_tangent = Vec2::ZERO;
                point.right_tangent = tan;
            } else {
                point.left_tangent = -tan;
                point.right_tangent = Vec2::ZERO;
            }
            continue;
        }

        let corner = hash01(i as i32, reseed_step, params.seed) < params.corner_chance;
        if corner {
            let tan = dir * (handle * params.corner_tangent_scale);
            point.mode = TangentMode::Linear;
            point.left_tangent = -tan;
            point.right_tangent = tan;
        } else {
            let tan = dir * (handle * params.smooth_tangent_scale);
            point.mode = TangentMode::Continuous;
            point.left_tangent = -tan;
            point.right_tangent = tan;
        }
    }
}
