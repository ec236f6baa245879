//! Per-tick input sampling and input-memory timestamps
//!
//! The host feeds one [`InputSample`] per physics tick. [`InputState`]
//! latches held flags, stamps "last active" times for the friction
//! input-memory window, and derives the exclusive repel/attract state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::INPUT_MEMORY_DURATION;

/// Raw input for one tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    /// Continuous movement vector; x drives the horizontal motor, y is
    /// vertical intent (plank drop / jetpack visual)
    pub movement: Vec2,
    pub jump_held: bool,
    pub repel_held: bool,
    pub attract_held: bool,
    /// Edge-triggered magnet launch
    pub launch_pressed: bool,
    pub launch_held: bool,
}

impl InputSample {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Latched input state with last-active stamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputState {
    pub movement: Vec2,
    pub jump_held: bool,
    pub repel_on: bool,
    pub attract_button_held: bool,
    pub launch_held: bool,
    /// Persisted preference: holding launch counts as attract
    pub hold_to_attract: bool,

    pub last_move_time: f64,
    pub last_jump_time: f64,
    pub last_repel_time: f64,
    pub last_attract_time: f64,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            jump_held: false,
            repel_on: false,
            attract_button_held: false,
            launch_held: false,
            hold_to_attract: false,
            // Far in the past so nothing reads as "recent" at t=0
            last_move_time: -10.0,
            last_jump_time: -10.0,
            last_repel_time: -10.0,
            last_attract_time: -10.0,
        }
    }
}

impl InputState {
    /// Latch one tick's sample and stamp activity times.
    /// `magnet_out` gates the magnet stamps: holding repel with no magnet
    /// deployed is not "interacting".
    pub fn latch(&mut self, sample: &InputSample, now: f64, magnet_out: bool) {
        self.movement = sample.movement;
        self.jump_held = sample.jump_held;
        self.repel_on = sample.repel_held;
        self.attract_button_held = sample.attract_held;
        self.launch_held = sample.launch_held;

        if sample.movement.x.abs() > 0.1 {
            self.last_move_time = now;
        }
        if sample.jump_held {
            self.last_jump_time = now;
        }
        if sample.repel_held && magnet_out {
            self.last_repel_time = now;
        }
        if sample.attract_held && magnet_out {
            self.last_attract_time = now;
        }
    }

    /// Attract is on when the button is held, or when the hold-to-attract
    /// preference turns the launch button into an attract hold.
    pub fn attract_on(&self) -> bool {
        self.attract_button_held || (self.hold_to_attract && self.launch_held)
    }

    /// Exactly one of repel/attract engaged (holding both cancels out)
    pub fn magnet_engaged(&self) -> bool {
        self.repel_on ^ self.attract_on()
    }

    /// True while any directional/jump/magnet input happened within the
    /// input-memory window. Used to decide platform friction.
    pub fn has_recent_input(&self, now: f64, magnet_out: bool) -> bool {
        let window = f64::from(INPUT_MEMORY_DURATION);
        let recent_move = now - self.last_move_time < window;
        let recent_jump = now - self.last_jump_time < window;
        let recent_magnet = magnet_out
            && ((self.repel_on && now - self.last_repel_time < window)
                || (self.attract_on() && now - self.last_attract_time < window));
        recent_move || recent_jump || recent_magnet
    }
}
