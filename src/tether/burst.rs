//! Burst scheduling for arc groups
//!
//! While the magnet is moving every arc group draws. Once it stops, the
//! tether flickers: short bursts that each reveal a random subset of the
//! groups, re-rolled when the burst's lifetime runs out.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::random_range_safe;

pub struct BurstManager {
    pub enabled: bool,
    /// Upper bound on groups shown per burst; clamped to the group count
    pub max_visible: usize,
    pub lifetime_range: (f32, f32),
    rng: Pcg32,
    visible: Vec<bool>,
    indices: Vec<usize>,
    burst_end: f64,
    was_stopped: bool,
}

impl BurstManager {
    pub fn new(enabled: bool, max_visible: usize, rng_seed: u64) -> Self {
        Self {
            enabled,
            max_visible,
            lifetime_range: (0.08, 0.2),
            rng: Pcg32::seed_from_u64(rng_seed),
            visible: Vec::new(),
            indices: Vec::new(),
            burst_end: 0.0,
            was_stopped: false,
        }
    }

    pub fn group_visible(&self, group: usize) -> bool {
        self.visible.get(group).copied().unwrap_or(true)
    }

    pub fn update(&mut self, group_count: usize, stopped: bool, now: f64) {
        self.visible.resize(group_count, true);

        if !self.enabled {
            self.visible.fill(true);
            return;
        }

        if !stopped {
            self.visible.fill(true);
            self.burst_end = 0.0;
            self.was_stopped = false;
            return;
        }

        if !self.was_stopped || self.burst_end <= 0.0 || now >= self.burst_end {
            self.begin_burst(group_count, now);
        }
        self.was_stopped = true;
    }

    fn begin_burst(&mut self, group_count: usize, now: f64) {
        self.visible.fill(false);
        let desired = self.max_visible.clamp(0, group_count);
        let life = random_range_safe(&mut self.rng, self.lifetime_range);
        self.burst_end = now + f64::from(life);

        self.indices.clear();
        self.indices.extend(0..group_count);
        // Partial shuffle; only the first `desired` slots need to be uniform
        for i in 0..desired {
            let j = self.rng.random_range(i..group_count);
            self.indices.swap(i, j);
        }
        for &idx in &self.indices[..desired] {
            self.visible[idx] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_shows_everything() {
        let mut b = BurstManager::new(false, 1, 7);
        b.update(5, true, 0.0);
        assert!((0..5).all(|g| b.group_visible(g)));
    }

    #[test]
    fn test_moving_shows_everything() {
        let mut b = BurstManager::new(true, 1, 7);
        b.update(5, false, 0.0);
        assert!((0..5).all(|g| b.group_visible(g)));
    }

    #[test]
    fn test_burst_limits_visible_groups() {
        let mut b = BurstManager::new(true, 2, 7);
        b.update(5, true, 0.0);
        let shown = (0..5).filter(|&g| b.group_visible(g)).count();
        assert_eq!(shown, 2);
    }

    #[test]
    fn test_burst_stable_within_lifetime() {
        let mut b = BurstManager::new(true, 2, 7);
        b.update(5, true, 0.0);
        let first: Vec<bool> = (0..5).map(|g| b.group_visible(g)).collect();
        // Minimum burst lifetime is 0.08s
        b.update(5, true, 0.01);
        let second: Vec<bool> = (0..5).map(|g| b.group_visible(g)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_burst_after_lifetime() {
        let mut b = BurstManager::new(true, 2, 7);
        b.update(5, true, 0.0);
        // Past the maximum lifetime of 0.2s a fresh subset is rolled
        b.update(5, true, 0.3);
        let shown = (0..5).filter(|&g| b.group_visible(g)).count();
        assert_eq!(shown, 2);
    }

    #[test]
    fn test_max_visible_clamped_to_group_count() {
        let mut b = BurstManager::new(true, 10, 7);
        b.update(3, true, 0.0);
        let shown = (0..3).filter(|&g| b.group_visible(g)).count();
        assert_eq!(shown, 3);
    }

    #[test]
    fn test_restop_starts_fresh_burst() {
        let mut b = BurstManager::new(true, 2, 7);
        b.update(5, true, 0.0);
        b.update(5, false, 0.05);
        assert!((0..5).all(|g| b.group_visible(g)));
        b.update(5, true, 0.06);
        let shown = (0..5).filter(|&g| b.group_visible(g)).count();
        assert_eq!(shown, 2);
    }
}
