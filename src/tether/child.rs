//! Child arcs derived from the master array
//!
//! A child never computes tether geometry from the magnet itself; it reads
//! the master's point array and derives a shorter segment. Three modes:
//! continuous (new random segment every frame), sharp (cached segment held
//! for a lifetime, then a gap), and tethered (a synthesized short spline
//! between two anchor indices, one of which may crawl along the array).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::master::{apply_mixed_tangents, faded_alpha, ArcMaster};
use super::{random_range_safe, ArcParams, ArcPoint, TangentMode};
use crate::noise::NoiseField;
use crate::perp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    /// Re-sample a random contiguous segment every frame
    Continuous,
    /// Cache a segment for a random lifetime, blank for a gap >= lifetime
    Sharp,
    /// Two anchor indices into the master array with a synthesized spline
    Tethered,
}

/// Live tethered-arc state
#[derive(Debug, Clone)]
struct TetherArc {
    anchor_a: usize,
    anchor_b: usize,
    point_count: usize,
    life_end: f64,
    amplitude: f32,
    /// Wave direction; randomly flipped at spawn
    perp_dir: Vec2,
    moving_anchor: Option<MovingAnchor>,
}

#[derive(Debug, Clone, Copy)]
struct MovingAnchor {
    is_a: bool,
    direction: i32,
    next_move: f64,
}

pub struct ArcChild {
    pub mode: ChildMode,
    pub params: ArcParams,
    noise: NoiseField,
    rng: Pcg32,
    points: Vec<ArcPoint>,
    visible: bool,
    spline_length: f32,
    alpha: f32,
    burst_visible: bool,
    // mirrored master flags
    stopped: bool,
    stopped_since: Option<f64>,
    last_stopped: bool,
    // sharp-mode cache
    cached: Vec<ArcPoint>,
    life_end: f64,
    delay_end: f64,
    // tethered-mode state
    tether: Option<TetherArc>,
    next_spawn: f64,
}

impl ArcChild {
    pub fn new(mode: ChildMode, params: ArcParams, rng_seed: u64) -> Self {
        let noise = NoiseField::new(params.seed);
        let alpha = params.base_alpha;
        Self {
            mode,
            params,
            noise,
            rng: Pcg32::seed_from_u64(rng_seed),
            points: Vec::new(),
            visible: false,
            spline_length: 0.0,
            alpha,
            burst_visible: true,
            stopped: false,
            stopped_since: None,
            last_stopped: false,
            cached: Vec::new(),
            life_end: 0.0,
            delay_end: 0.0,
            tether: None,
            next_spawn: 0.0,
        }
    }

    pub fn points(&self) -> &[ArcPoint] {
        &self.points
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_burst_visible(&mut self, visible: bool) {
        self.burst_visible = visible;
    }

    #[cfg(test)]
    pub(super) fn sharp_deadlines(&self) -> (f64, f64) {
        (self.life_end, self.delay_end)
    }

    pub fn update(&mut self, master: &ArcMaster, now: f64) {
        let arr = master.points();
        if arr.len() < 2 {
            self.hide();
            self.tether = None;
            return;
        }

        self.stopped = master.stopped();
        if self.stopped && !self.last_stopped {
            self.stopped_since = Some(now);
        } else if !self.stopped {
            self.stopped_since = None;
        }
        self.last_stopped = self.stopped;

        let allow = self.stop_delay_complete(now) && self.burst_visible;

        match self.mode {
            ChildMode::Continuous => self.update_continuous(arr, master, allow),
            ChildMode::Sharp => self.update_sharp(arr, master, allow, now),
            ChildMode::Tethered => self.update_tethered(arr, master, allow, now),
        }
    }

    fn hide(&mut self) {
        self.visible = false;
        self.points.clear();
    }

    fn stop_delay_complete(&self, now: f64) -> bool {
        if !self.params.only_show_when_stopped {
            return true;
        }
        if !self.stopped {
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

    /// Distance fade always uses the master's spline length, so every
    /// child fades in lockstep with the tether it decorates
    fn update_alpha(&mut self, master: &ArcMaster) {
        self.alpha = faded_alpha(
            self.params.base_alpha,
            master.spline_length(),
            self.params.max_spline_length,
        );
    }

    fn select_segment(&mut self, total: usize) -> (usize, usize) {
        let (mut min_frac, mut max_frac) = self.params.copy_fraction_range;
        min_frac = min_frac.clamp(0.0, 1.0);
        max_frac = max_frac.clamp(0.0, 1.0);
        if max_frac < min_frac {
            std::mem::swap(&mut min_frac, &mut max_frac);
        }

        let frac = random_range_safe(&mut self.rng, (min_frac, max_frac));
        let count = ((frac * total as f32).round() as usize).clamp(2, total);
        let start = self.rng.random_range(0..=total - count);
        (start, count)
    }

    fn update_continuous(&mut self, arr: &[ArcPoint], master: &ArcMaster, allow: bool) {
        if !allow {
            self.hide();
            return;
        }
        let (start, count) = self.select_segment(arr.len());
        self.points.clear();
        self.points.extend_from_slice(&arr[start..start + count]);
        self.spline_length = self.points[0]
            .position
            .distance(self.points[count - 1].position);
        self.visible = true;
        self.update_alpha(master);
    }

    fn update_sharp(&mut self, arr: &[ArcPoint], master: &ArcMaster, allow: bool, now: f64) {
        if self.cached.is_empty() || now >= self.delay_end {
            let (start, count) = self.select_segment(arr.len());
            self.cached.clear();
            self.cached.extend_from_slice(&arr[start..start + count]);

            let life = random_range_safe(&mut self.rng, self.params.lifetime_range);
            // The gap may never be shorter than the hold
            let delay = random_range_safe(&mut self.rng, self.params.delay_range).max(life);
            self.life_end = now + f64::from(life);
            self.delay_end = now + f64::from(delay);
        }

        let visible = !self.cached.is_empty() && now < self.life_end && allow;
        if visible {
            self.points.clear();
            self.points.extend_from_slice(&self.cached);
            let n = self.points.len();
            self.spline_length = self.points[0].position.distance(self.points[n - 1].position);
            self.visible = true;
            self.update_alpha(master);
        } else {
            self.hide();
        }
    }

    fn update_tethered(&mut self, arr: &[ArcPoint], master: &ArcMaster, allow: bool, now: f64) {
        if !allow {
            self.tether = None;
            self.hide();
            return;
        }

        if let Some(t) = &self.tether {
            if now >= t.life_end {
                self.tether = None;
                self.next_spawn =
                    now + f64::from(random_range_safe(&mut self.rng, self.params.delay_range));
                self.hide();
                return;
            }
            // Master shrank under us; drop the arc and respawn immediately
            if t.anchor_a >= arr.len() || t.anchor_b >= arr.len() {
                log::debug!("tethered arc anchors out of range, respawning");
                self.tether = None;
                self.next_spawn = now;
                self.hide();
                return;
            }
            self.step_moving_anchor(arr.len(), now);
            self.build_tethered_geometry(arr, master, now);
            return;
        }

        if now < self.next_spawn {
            self.hide();
            return;
        }
        if !self.try_spawn_tethered(arr, now) {
            self.next_spawn =
                now + f64::from(random_range_safe(&mut self.rng, self.params.delay_range));
            self.hide();
            return;
        }
        self.build_tethered_geometry(arr, master, now);
    }

    fn try_spawn_tethered(&mut self, arr: &[ArcPoint], now: f64) -> bool {
        let total = arr.len();
        if total < 4 {
            return false;
        }
        let max_span = total - 1;
        const MIN_SPAN: usize = 3;

        let (mut min_frac, mut max_frac) = self.params.copy_fraction_range;
        min_frac = min_frac.clamp(0.0, 1.0);
        max_frac = max_frac.clamp(0.0, 1.0);
        if max_frac < min_frac {
            std::mem::swap(&mut min_frac, &mut max_frac);
        }

        let frac = random_range_safe(&mut self.rng, (min_frac, max_frac));
        let span = ((frac * max_span as f32).round() as usize).clamp(MIN_SPAN, max_span);
        let max_start = max_span - span;
        let a = self.rng.random_range(0..=max_start);
        let b = a + span;
        if b - a < MIN_SPAN {
            return false;
        }

        let master_interior = b - a - 1;
        let min_interior = master_interior.max(2);
        let max_interior = self.params.max_extra_points.max(min_interior);
        let interior = self.rng.random_range(min_interior..=max_interior);

        let pa = arr[a].position;
        let pb = arr[b].position;
        let d = (pb - pa).normalize_or(Vec2::X);
        let mut wave_perp = perp(d);
        if self.rng.random_bool(0.5) {
            wave_perp = -wave_perp;
        }

        let amplitude = {
            let (lo, hi) = self.params.child_amplitude_range;
            let lo = lo.max(0.0);
            random_range_safe(&mut self.rng, (lo, hi.max(lo)))
        };
        let life = random_range_safe(&mut self.rng, self.params.lifetime_range);

        let mut moving_anchor = None;
        if self.params.enable_movement {
            let last = total - 1;
            let is_a = self.rng.random_bool(0.5);
            let idx = if is_a { a } else { b };
            // Crawl toward the nearer end of the master array
            let direction = if last - idx < idx { 1 } else { -1 };
            let next_index = idx as i32 + direction;
            if next_index > 0 && (next_index as usize) < last {
                let step = random_range_safe(&mut self.rng, self.params.anchor_step_time_range);
                moving_anchor = Some(MovingAnchor {
                    is_a,
                    direction,
                    next_move: now + f64::from(step),
                });
            }
        }

        self.tether = Some(TetherArc {
            anchor_a: a,
            anchor_b: b,
            point_count: interior + 2,
            life_end: now + f64::from(life),
            amplitude,
            perp_dir: wave_perp,
            moving_anchor,
        });
        true
    }

    fn step_moving_anchor(&mut self, master_len: usize, now: f64) {
        let Some(tether) = self.tether.as_mut() else {
            return;
        };
        let Some(anchor) = tether.moving_anchor else {
            return;
        };
        if master_len < 2 {
            tether.moving_anchor = None;
            return;
        }
        if now < anchor.next_move {
            return;
        }

        let last = master_len - 1;
        let idx = if anchor.is_a {
            tether.anchor_a
        } else {
            tether.anchor_b
        }
        .min(last);
        let next = idx as i32 + anchor.direction;

        // Stepping into an endpoint parks the anchor there and stops
        if next <= 0 || next as usize >= last {
            let clamped = next.clamp(0, last as i32) as usize;
            if anchor.is_a {
                tether.anchor_a = clamped;
            } else {
                tether.anchor_b = clamped;
            }
            tether.moving_anchor = None;
            return;
        }

        if anchor.is_a {
            tether.anchor_a = next as usize;
        } else {
            tether.anchor_b = next as usize;
        }
        let step = random_range_safe(&mut self.rng, self.params.anchor_step_time_range);
        tether.moving_anchor = Some(MovingAnchor {
            next_move: now + f64::from(step),
            ..anchor
        });
    }

    fn build_tethered_geometry(&mut self, arr: &[ArcPoint], master: &ArcMaster, now: f64) {
        let Some(tether) = self.tether.clone() else {
            return;
        };
        let total = tether.point_count;
        if total < 2 {
            return;
        }

        let pa = arr[tether.anchor_a.min(arr.len() - 1)].position;
        let pb = arr[tether.anchor_b.min(arr.len() - 1)].position;
        let chord = pb - pa;
        let length = chord.length().max(1e-4);
        let dir = chord / length;
        let jitter_perp = perp(dir);

        self.spline_length = length;
        let time = now as f32;
        let speed = if self.params.stepped { 1.0 } else { self.params.speed };

        self.points.clear();
        self.points.reserve(total);
        self.points.push(ArcPoint::at(pa));

        let interior = total - 2;
        for i in 1..=interior {
            let t = i as f32 / (interior + 1) as f32;
            let mut p = pa.lerp(pb, t);

            let wave = (std::f32::consts::PI * t).sin() * tether.amplitude;
            p += tether.perp_dir * wave;

            let off = self.noise.arc_offset(
                t,
                time,
                self.params.amplitude,
                self.params.frequency,
                self.params.octaves,
                self.params.roughness,
                speed,
            );
            p += jitter_perp * off;
            p = self.apply_chaos(p, dir, t, time);

            self.points.push(ArcPoint::at(p));
        }
        self.points.push(ArcPoint::at(pb));

        apply_mixed_tangents(&mut self.points, &self.params, dir, length, time);
        self.pin_endpoint_tangents(length);
        self.visible = true;
        self.update_alpha(master);
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

    /// Tethered endpoints aim at their immediate neighbors so the arc
    /// blends into the master curve instead of following the raw chord
    fn pin_endpoint_tangents(&mut self, length: f32) {
        let total = self.points.len();
        if total < 2 {
            return;
        }
        let seg_len = length / (total - 1) as f32;
        let handle = self.params.drop_interval.min(seg_len) * 0.5;

        let p0 = self.points[0].position;
        let p1 = self.points[1.min(total - 1)].position;
        let p_last = self.points[total - 1].position;
        let p_before = self.points[total - 2].position;

        let tan0 = (p1 - p0).normalize_or_zero() * handle;
        let tan_last = (p_before - p_last).normalize_or_zero() * handle;

        self.points[0].mode = TangentMode::Continuous;
        self.points[0].left_tangent = Vec2::ZERO;
        self.points[0].right_tangent = tan0;

        self.points[total - 1].mode = TangentMode::Continuous;
        self.points[total - 1].left_tangent = tan_last;
        self.points[total - 1].right_tangent = Vec2::ZERO;
    }
}
