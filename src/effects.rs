//! Particle/visual effect sink
//!
//! The simulation never renders; it reports effect triggers through this
//! sink and moves on. Playback, pooled emitter ownership and looping are
//! the renderer's problem.

use glam::Vec2;

use crate::noise::NoiseField;

/// Identity of a visual effect the simulation can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Dust puff on a ground direction change
    DirectionDust,
    /// Shockwave ring while magnet force is applied (sized per tick)
    MagnetPulse { repel: bool },
    /// Looping sparks at the tether base (player end)
    BaseSparks,
    /// Looping sparks at the tether magnet end
    MagnetSparks,
    /// One-shot flash at the base when the magnet stops
    BaseFlash,
    /// One-shot flash at the magnet end when the magnet stops
    MagnetFlash,
    /// Looping glow at the base while the magnet stays stopped
    BaseGlow,
    /// Looping glow at the magnet end while the magnet stays stopped
    MagnetGlow,
    /// Pooled spark along the spline (slot index)
    Spark(u8),
}

/// Fire-and-forget effect sink. Implementations must tolerate redundant
/// `play`/`stop` calls (looping effects are re-positioned by re-playing).
pub trait EffectSink {
    fn play(&mut self, effect: Effect, at: Vec2, rotation: f32);
    fn stop(&mut self, effect: Effect);

    /// Scaled variant used by the magnet pulse; defaults to a plain play.
    fn play_sized(&mut self, effect: Effect, at: Vec2, size: f32) {
        self.play(effect, at, size);
    }

    /// Intensity channel for glow flicker; ignored by default.
    fn set_intensity(&mut self, _effect: Effect, _intensity: f32) {}
}

/// Sink that drops everything (headless runs)
#[derive(Debug, Default)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn play(&mut self, _effect: Effect, _at: Vec2, _rotation: f32) {}
    fn stop(&mut self, _effect: Effect) {}
}

/// Sink that records every call, for tests
#[derive(Debug, Default)]
pub struct RecordingEffects {
    pub played: Vec<(Effect, Vec2, f32)>,
    pub stopped: Vec<Effect>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_count(&self, effect: Effect) -> usize {
        self.played.iter().filter(|(e, _, _)| *e == effect).count()
    }

    pub fn was_stopped(&self, effect: Effect) -> bool {
        self.stopped.contains(&effect)
    }

    pub fn clear(&mut self) {
        self.played.clear();
        self.stopped.clear();
    }
}

impl EffectSink for RecordingEffects {
    fn play(&mut self, effect: Effect, at: Vec2, rotation: f32) {
        self.played.push((effect, at, rotation));
    }

    fn stop(&mut self, effect: Effect) {
        self.stopped.push(effect);
    }
}

/// Noise-driven intensity flicker for the stopped-glow effects
#[derive(Debug, Clone)]
pub struct GlowFlicker {
    pub base_intensity: f32,
    /// 0.5 = ±50% brightness
    pub flicker_amount: f32,
    pub flicker_speed: f32,
    noise: NoiseField,
    offset: f32,
}

impl GlowFlicker {
    pub fn new(seed: i32) -> Self {
        Self {
            base_intensity: 1.0,
            flicker_amount: 0.5,
            flicker_speed: 8.0,
            noise: NoiseField::new(seed),
            offset: (seed as f32 * 0.618).fract() * 1000.0,
        }
    }

    /// Intensity at time `t` seconds
    pub fn intensity(&self, t: f32) -> f32 {
        let n = self
            .noise
            .sample_signed(t * self.flicker_speed + self.offset, 0.0);
        self.base_intensity * (1.0 + n * self.flicker_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_counts() {
        let mut sink = RecordingEffects::new();
        sink.play(Effect::BaseFlash, Vec2::ZERO, 0.0);
        sink.play(Effect::BaseFlash, Vec2::X, 0.0);
        sink.stop(Effect::BaseGlow);
        assert_eq!(sink.play_count(Effect::BaseFlash), 2);
        assert!(sink.was_stopped(Effect::BaseGlow));
        assert!(!sink.was_stopped(Effect::MagnetGlow));
    }

    #[test]
    fn test_flicker_stays_within_amount() {
        let f = GlowFlicker::new(11);
        for i in 0..200 {
            let v = f.intensity(i as f32 * 0.016);
            assert!(v >= 1.0 - 0.5 - 1e-3);
            assert!(v <= 1.0 + 0.5 + 1e-3);
        }
    }

    #[test]
    fn test_flicker_actually_flickers() {
        let f = GlowFlicker::new(11);
        let a = f.intensity(0.1);
        let b = f.intensity(0.9);
        assert!((a - b).abs() > 1e-4);
    }
}
