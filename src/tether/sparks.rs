//! Pooled sparks scattered along the tether spline
//!
//! A small fixed pool of spark slots; each batch picks distinct interior
//! spline points and fires a short one-shot at each. Slots are recycled
//! once their spark runs out.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{random_range_safe, ArcPoint};
use crate::effects::{Effect, EffectSink};

const POOL_SIZE: usize = 5;
/// Sparks per interior spline point, rounded
const DENSITY: f32 = 0.3;
const BATCH_INTERVAL: (f32, f32) = (0.05, 0.2);
const SPARK_DURATION: (f32, f32) = (0.05, 0.15);

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    playing: bool,
    end_time: f64,
}

pub struct SparkPool {
    rng: Pcg32,
    slots: [Slot; POOL_SIZE],
    next_batch: f64,
    scratch: Vec<usize>,
}

impl SparkPool {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(rng_seed),
            slots: [Slot::default(); POOL_SIZE],
            next_batch: 0.0,
            scratch: Vec::new(),
        }
    }

    pub fn stop_all(&mut self, sink: &mut impl EffectSink) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.playing {
                slot.playing = false;
                sink.stop(Effect::Spark(i as u8));
            }
        }
    }

    pub fn update(&mut self, points: &[ArcPoint], now: f64, sink: &mut impl EffectSink) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.playing && now >= slot.end_time {
                slot.playing = false;
                sink.stop(Effect::Spark(i as u8));
            }
        }

        if now < self.next_batch {
            return;
        }
        self.next_batch = now + f64::from(random_range_safe(&mut self.rng, BATCH_INTERVAL));

        let count = points.len();
        if count <= 2 {
            return;
        }
        let interior = count - 2;
        let desired = ((interior as f32 * DENSITY).round() as usize).min(POOL_SIZE);
        if desired == 0 {
            return;
        }

        // Distinct interior indices for this batch
        self.scratch.clear();
        self.scratch.extend(1..count - 1);
        for i in 0..desired.min(self.scratch.len()) {
            let j = self.rng.random_range(i..self.scratch.len());
            self.scratch.swap(i, j);
        }

        let mut spawned = 0;
        for slot_idx in 0..POOL_SIZE {
            if spawned >= desired || spawned >= self.scratch.len() {
                break;
            }
            let slot = &mut self.slots[slot_idx];
            if slot.playing && now < slot.end_time {
                continue;
            }
            let point = self.scratch[spawned];
            let duration = random_range_safe(&mut self.rng, SPARK_DURATION);
            slot.playing = true;
            slot.end_time = now + f64::from(duration);
            sink.play(Effect::Spark(slot_idx as u8), points[point].position, 0.0);
            spawned += 1;
        }
    }
}
