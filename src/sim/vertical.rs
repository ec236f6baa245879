//! Vertical motor
//!
//! Buffered jumps, jetpack thrust and fuel bookkeeping, and the vertical
//! speed clamps. Fuel runs on the frame clock; forces run on the fixed
//! tick. All waiting is deadline timestamps compared against session time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::magnet::{modulated_max_speed, MagnetLauncher};
use super::physics;
use crate::consts::{
    CLAMP_SUPPRESS_TIME, JETPACK_FORCE, JETPACK_RECOVERY_DELAY, JETPACK_RECOVERY_RATE,
    JETPACK_SLOW_BOOST, JETPACK_SLOW_SPEED, JETPACK_TOTAL_TIME, JUMP_BUFFER, JUMP_IMPULSE,
    MAX_JET_SPEED, MAX_Y_SPEED,
};

/// Derived thruster state for animation/audio collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JetpackVisual {
    Off,
    Firing,
    /// Held with an empty tank
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalMotor {
    /// Remaining burn time, clamped to [0, JETPACK_TOTAL_TIME]
    fuel: f32,
    jetpack_on: bool,
    /// Buffered-jump expiry; 0 when consumed
    jump_deadline: f64,
    /// Until this time the vertical speed clamp is suppressed post-jump
    clamp_suppress_deadline: f64,
    /// Fuel recovery may not start before this
    recovery_deadline: f64,
}

impl Default for VerticalMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl VerticalMotor {
    pub fn new() -> Self {
        Self {
            fuel: JETPACK_TOTAL_TIME,
            jetpack_on: false,
            jump_deadline: 0.0,
            clamp_suppress_deadline: 0.0,
            recovery_deadline: 0.0,
        }
    }

    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    pub fn fuel_fraction(&self) -> f32 {
        self.fuel / JETPACK_TOTAL_TIME
    }

    pub fn jetpack_on(&self) -> bool {
        self.jetpack_on
    }

    pub fn visual_state(&self, jump_held: bool, truly_on_ground: bool) -> JetpackVisual {
        if self.jetpack_on {
            JetpackVisual::Firing
        } else if jump_held && !truly_on_ground && self.fuel <= 0.0 {
            JetpackVisual::Empty
        } else {
            JetpackVisual::Off
        }
    }

    /// Frame-clock bookkeeping: jump buffering, jetpack activation and
    /// fuel depletion/recovery.
    pub fn frame(&mut self, now: f64, dt: f32, jump_held: bool, truly_on_ground: bool) {
        if jump_held {
            self.jump_deadline = now + f64::from(JUMP_BUFFER);
            if truly_on_ground {
                self.clamp_suppress_deadline = now + f64::from(CLAMP_SUPPRESS_TIME);
            }
        }

        // Ground contact refills the tank outright; the rate-based path
        // below only serves mid-air recovery after the delay
        if truly_on_ground {
            self.fuel = JETPACK_TOTAL_TIME;
        }

        self.jetpack_on = jump_held && !truly_on_ground && self.fuel > 0.0;

        if self.jetpack_on {
            self.fuel -= dt;
            self.recovery_deadline = now + f64::from(JETPACK_RECOVERY_DELAY);
        } else if now >= self.recovery_deadline {
            self.fuel += JETPACK_RECOVERY_RATE * dt;
        }
        self.fuel = self.fuel.clamp(0.0, JETPACK_TOTAL_TIME);
    }

    /// Fixed-tick force application. Returns true when a buffered jump
    /// fired this tick.
    pub fn fixed_tick(
        &mut self,
        body: &mut PlayerBody,
        now: f64,
        truly_on_ground: bool,
        repel_on: bool,
        attract_on: bool,
        launcher: &MagnetLauncher,
    ) -> bool {
        let mut jumped = false;
        if truly_on_ground && self.jump_deadline > now {
            body.velocity.y = 0.0;
            body.add_impulse(Vec2::new(0.0, JUMP_IMPULSE));
            self.jump_deadline = 0.0;
            jumped = true;
        }

        if self.jetpack_on {
            let boost = if body.velocity.y < JETPACK_SLOW_SPEED {
                JETPACK_SLOW_BOOST
            } else {
                1.0
            };
            body.add_force(Vec2::new(0.0, JETPACK_FORCE * boost));

            if body.velocity.y > MAX_JET_SPEED && now >= self.clamp_suppress_deadline {
                // Either polarity held leaves the ascent unclamped entirely
                if repel_on || attract_on {
                    return jumped;
                }
                physics::apply_max_jetpack_speed(body);
            }
        }

        let max = self.max_speed(body, launcher, repel_on, attract_on);
        physics::apply_max_vertical_speed(body, max);
        jumped
    }

    fn max_speed(
        &self,
        body: &PlayerBody,
        launcher: &MagnetLauncher,
        repel_on: bool,
        attract_on: bool,
    ) -> f32 {
        if !(repel_on ^ attract_on) {
            return MAX_Y_SPEED;
        }
        match launcher.projectile() {
            Some(proj) => {
                let rel = body.position - proj.position;
                let distance = rel.length();
                let angle = rel.y.atan2(rel.x);
                modulated_max_speed(MAX_Y_SPEED, angle.sin(), body.velocity.y, distance, attract_on)
            }
            None => MAX_Y_SPEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CLAMP_Y_DRAG, DEFAULT_DRAG, LINEAR_DRAG, SIM_DT};

    fn idle_launcher() -> MagnetLauncher {
        MagnetLauncher::new()
    }

    #[test]
    fn test_buffered_jump_fires_on_ground() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        body.velocity.y = -2.0;

        motor.frame(0.0, SIM_DT, true, true);
        let jumped = motor.fixed_tick(&mut body, 0.0, true, false, false, &idle_launcher());
        assert!(jumped);
        // Velocity zeroed before the impulse, so exactly the impulse remains
        assert!((body.velocity.y - JUMP_IMPULSE).abs() < 1e-6);
    }

    #[test]
    fn test_jump_buffer_expires() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);

        // Press in the air, land after the buffer window has expired
        motor.frame(0.0, SIM_DT, true, false);
        let late = f64::from(JUMP_BUFFER) + 0.01;
        motor.frame(late, SIM_DT, false, true);
        let jumped = motor.fixed_tick(&mut body, late, true, false, false, &idle_launcher());
        assert!(!jumped);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_buffered_jump_fires_on_late_landing_within_window() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);

        motor.frame(0.0, SIM_DT, true, false);
        let jumped = motor.fixed_tick(&mut body, 0.1, true, false, false, &idle_launcher());
        assert!(jumped);
    }

    #[test]
    fn test_jump_consumed_once() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        motor.frame(0.0, SIM_DT, true, true);
        assert!(motor.fixed_tick(&mut body, 0.0, true, false, false, &idle_launcher()));
        body.velocity.y = 0.0;
        assert!(!motor.fixed_tick(&mut body, 0.02, true, false, false, &idle_launcher()));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_jetpack_depletes_and_cuts_out() {
        let mut motor = VerticalMotor::new();
        let mut now = 0.0_f64;
        // Hold in the air until the tank runs dry
        while motor.fuel() > 0.0 {
            motor.frame(now, SIM_DT, true, false);
            now += f64::from(SIM_DT);
            assert!(now < 2.0, "fuel must deplete in finite time");
        }
        motor.frame(now, SIM_DT, true, false);
        assert!(!motor.jetpack_on());
        assert_eq!(motor.visual_state(true, false), JetpackVisual::Empty);
    }

    #[test]
    fn test_fuel_recovery_waits_for_delay() {
        let mut motor = VerticalMotor::new();
        // Burn a little fuel
        motor.frame(0.0, SIM_DT, true, false);
        let after_burn = motor.fuel();
        assert!(after_burn < JETPACK_TOTAL_TIME);

        // Released, airborne, still inside the recovery delay
        let t1 = f64::from(SIM_DT);
        motor.frame(t1, SIM_DT, false, false);
        assert_eq!(motor.fuel(), after_burn);

        // Past the delay, fuel climbs at the recovery rate
        let t2 = t1 + f64::from(JETPACK_RECOVERY_DELAY) + 0.01;
        motor.frame(t2, SIM_DT, false, false);
        assert!((motor.fuel() - (after_burn + JETPACK_RECOVERY_RATE * SIM_DT)).abs() < 1e-5);
    }

    #[test]
    fn test_ground_contact_refills_fuel_outright() {
        let mut motor = VerticalMotor::new();
        // Burn most of the tank
        let mut now = 0.0_f64;
        for _ in 0..40 {
            motor.frame(now, SIM_DT, true, false);
            now += f64::from(SIM_DT);
        }
        assert!(motor.fuel() < JETPACK_TOTAL_TIME / 2.0);

        // A single grounded frame restores the full tank
        motor.frame(now, SIM_DT, false, true);
        assert_eq!(motor.fuel(), JETPACK_TOTAL_TIME);
    }

    #[test]
    fn test_fuel_clamped_to_capacity() {
        let mut motor = VerticalMotor::new();
        for i in 0..100 {
            motor.frame(f64::from(i) * 0.02, SIM_DT, false, true);
        }
        assert_eq!(motor.fuel(), JETPACK_TOTAL_TIME);
    }

    #[test]
    fn test_jetpack_thrust_boosted_at_low_ascent() {
        let mut motor = VerticalMotor::new();
        motor.frame(0.0, SIM_DT, true, false);
        assert!(motor.jetpack_on());

        let mut slow = PlayerBody::new(Vec2::ZERO);
        slow.velocity.y = 1.0;
        motor.fixed_tick(&mut slow, 0.0, false, false, false, &idle_launcher());
        slow.integrate(SIM_DT);

        let mut fast = PlayerBody::new(Vec2::ZERO);
        fast.velocity.y = 10.0;
        motor.fixed_tick(&mut fast, 0.0, false, false, false, &idle_launcher());
        fast.integrate(SIM_DT);

        let slow_gain = slow.velocity.y - 1.0;
        let fast_gain = fast.velocity.y - 10.0;
        assert!(slow_gain > fast_gain);
    }

    #[test]
    fn test_jet_ceiling_drag_suppressed_after_jump() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);

        // Jump on the ground arms the suppress window
        motor.frame(0.0, SIM_DT, true, true);
        motor.fixed_tick(&mut body, 0.0, true, false, false, &idle_launcher());

        // Thruster firing past the ceiling, still inside the window
        motor.frame(0.05, SIM_DT, true, false);
        assert!(motor.jetpack_on());
        body.velocity.y = MAX_JET_SPEED + 0.5;
        body.drag = DEFAULT_DRAG;
        motor.fixed_tick(&mut body, 0.1, false, false, false, &idle_launcher());
        assert!(body.drag < LINEAR_DRAG / 2.0, "suppress window active");

        body.drag = DEFAULT_DRAG;
        motor.fixed_tick(
            &mut body,
            f64::from(CLAMP_SUPPRESS_TIME) + 0.1,
            false,
            false,
            false,
            &idle_launcher(),
        );
        assert_eq!(body.drag, LINEAR_DRAG / 2.0);
    }

    #[test]
    fn test_jet_ceiling_only_brakes_while_thrusting() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        assert!(!motor.jetpack_on());

        // Over the jet ceiling but under the vertical cap with the
        // thruster off: no braking at all
        body.velocity.y = MAX_JET_SPEED + 0.5;
        body.drag = DEFAULT_DRAG;
        motor.fixed_tick(&mut body, 10.0, false, false, false, &idle_launcher());
        assert_eq!(body.drag, DEFAULT_DRAG);
    }

    #[test]
    fn test_polarity_hold_skips_jet_ceiling() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);

        motor.frame(0.0, SIM_DT, true, false);
        assert!(motor.jetpack_on());
        body.velocity.y = MAX_JET_SPEED + 0.5;
        body.drag = DEFAULT_DRAG;
        motor.fixed_tick(&mut body, 10.0, false, true, false, &idle_launcher());
        assert_eq!(body.drag, DEFAULT_DRAG);
    }

    #[test]
    fn test_vertical_overspeed_engages_clamp_drag() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        body.velocity.y = MAX_Y_SPEED + 5.0;
        body.drag = DEFAULT_DRAG;
        motor.fixed_tick(&mut body, 10.0, false, false, false, &idle_launcher());
        assert_eq!(body.drag, CLAMP_Y_DRAG);
    }

    #[test]
    fn test_rising_into_repel_field_lowers_cap() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        // Rising under the base cap, repel magnet directly overhead at a
        // distance where the falloff term is 0.375: cap = 20 * |1 - 1.5| = 10
        body.velocity.y = 13.0;
        body.drag = DEFAULT_DRAG;
        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::new(0.0, 25.78125), Vec2::X, 0.0);
        motor.fixed_tick(&mut body, 10.0, false, true, false, &launcher);
        assert_eq!(body.drag, CLAMP_Y_DRAG);
    }

    #[test]
    fn test_cap_unmodulated_when_both_polarities_held() {
        let mut motor = VerticalMotor::new();
        let mut body = PlayerBody::new(Vec2::ZERO);
        body.velocity.y = 13.0;
        body.drag = DEFAULT_DRAG;
        let mut launcher = MagnetLauncher::new();
        launcher.launch(Vec2::new(0.0, 25.78125), Vec2::X, 0.0);
        motor.fixed_tick(&mut body, 10.0, false, true, true, &launcher);
        assert_eq!(body.drag, DEFAULT_DRAG, "base cap of 20 applies");
    }
}
