//! Session tick orchestration
//!
//! One [`Session`] owns the whole player simulation. The host calls
//! [`Session::frame`] once per rendered frame with the elapsed wall time;
//! fixed physics ticks run off an accumulator inside it. Within one fixed
//! tick, sensing always completes before force application so motors read
//! same-tick ground state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::friction::FrictionController;
use super::ground::GroundSensor;
use super::horizontal::HorizontalMotor;
use super::input::{InputSample, InputState};
use super::magnet::{magnet_force, pulse_size, MagnetLauncher, Polarity, ProjectileEvent};
use super::physics;
use super::vertical::VerticalMotor;
use super::world::Raycaster;
use crate::consts::{
    DEATH_GRAVITY_SCALE, GROUND_RAY_LENGTH, LEG_OFFSET, LEG_RAY_LENGTH, MAX_SUBSTEPS, SIM_DT,
};

/// Rest height of the body center above a surface, inside the
/// truly-on-ground band between the short and long sensing rays
const STAND_HEIGHT: f32 = (LEG_RAY_LENGTH + GROUND_RAY_LENGTH) / 2.0;

/// Things that happened during a tick, drained by the host for effects,
/// audio and tether wiring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    /// Grounded and steering against current velocity
    DirectionChangeDust,
    Jumped,
    /// New facing; true = right
    Flipped(bool),
    MagnetLaunched,
    MagnetAttached,
    MagnetShattered,
    MagnetExpired,
    /// Field engaged this tick; size drives the ripple effect
    MagnetPulse { repel: bool, size: f32 },
    PlayerDied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Simulation clock, advanced only by fixed ticks
    time: f64,
    accumulator: f32,
    pub body: PlayerBody,
    pub input: InputState,
    pub ground: GroundSensor,
    pub friction: FrictionController,
    pub vertical: VerticalMotor,
    pub horizontal: HorizontalMotor,
    pub launcher: MagnetLauncher,
    alive: bool,
    /// Set on death; input is ignored while disabled
    movement_disabled: bool,
    #[serde(skip)]
    events: Vec<TickEvent>,
}

impl Session {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            time: 0.0,
            accumulator: 0.0,
            body: PlayerBody::new(spawn),
            input: InputState::default(),
            ground: GroundSensor::new(),
            friction: FrictionController::new(),
            vertical: VerticalMotor::new(),
            horizontal: HorizontalMotor::new(),
            launcher: MagnetLauncher::new(),
            alive: true,
            movement_disabled: false,
            events: Vec::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn alive(&self) -> bool {
        self.alive
    }

    /// The polarity currently engaged, if exactly one is held and a
    /// projectile is deployed
    pub fn polarity(&self) -> Option<Polarity> {
        if !self.launcher.deployed() || !self.input.magnet_engaged() {
            return None;
        }
        if self.input.repel_on {
            Some(Polarity::Repel)
        } else {
            Some(Polarity::Attract)
        }
    }

    /// Advance by one rendered frame. Latches input, runs frame-clock
    /// bookkeeping, then as many fixed ticks as the accumulator allows.
    pub fn frame(&mut self, world: &impl Raycaster, sample: &InputSample, dt: f32) {
        let sample = if self.movement_disabled {
            InputSample::idle()
        } else {
            *sample
        };
        self.input.latch(&sample, self.time, self.launcher.deployed());

        if sample.launch_pressed && self.alive {
            let aim = if sample.movement.length_squared() > 0.01 {
                sample.movement
            } else if self.horizontal.facing_right() {
                Vec2::X
            } else {
                Vec2::NEG_X
            };
            self.launcher.launch(self.body.position, aim, self.time);
            self.events.push(TickEvent::MagnetLaunched);
        }

        let truly = self.ground.state().truly_on_ground;
        self.vertical.frame(self.time, dt, self.input.jump_held, truly);

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.fixed_tick(world, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Dropped time on a spiral-of-death frame is intentional
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::warn!(
                "frame fell behind, dropping {:.3}s of simulation time",
                self.accumulator
            );
            self.accumulator = 0.0;
        }
    }

    /// One fixed physics step: sense, friction, regime, motors, magnet,
    /// integrate.
    pub fn fixed_tick(&mut self, world: &impl Raycaster, dt: f32) {
        if !self.alive {
            // Death fall: fixed gravity, no input, no clamps
            self.body.gravity_scale = DEATH_GRAVITY_SCALE;
            self.body.integrate(dt);
            self.time += f64::from(dt);
            return;
        }

        let direction = self.input.movement.x;
        self.ground.select_ground_layer(self.input.movement.y);
        let gs = self.ground.probe(world, self.body.position, dt);

        if self
            .ground
            .check_stuck_in_ground(world, self.body.position, dt)
        {
            self.kill_player();
            self.time += f64::from(dt);
            return;
        }

        let platform = self.ground.on_moving_platform(world, self.body.position);
        let recent = self.input.has_recent_input(self.time, self.launcher.deployed());
        self.friction
            .update(&mut self.body, world, platform, recent, dt);

        let polarity = self.polarity();
        let magnet_engaged = polarity.is_some();

        let changing = physics::modify_physics(
            &mut self.body,
            direction,
            gs.truly_on_ground,
            self.vertical.jetpack_on(),
            magnet_engaged,
        );
        if changing && gs.truly_on_ground {
            self.events.push(TickEvent::DirectionChangeDust);
        }

        let can_jump = gs.truly_on_ground || self.ground.recently_grounded();
        if self.vertical.fixed_tick(
            &mut self.body,
            self.time,
            can_jump,
            self.input.repel_on,
            self.input.attract_on(),
            &self.launcher,
        ) {
            self.events.push(TickEvent::Jumped);
        }

        if let Some(facing) = self.horizontal.apply(
            &mut self.body,
            direction,
            &self.launcher,
            self.input.repel_on,
            self.input.attract_on(),
        ) {
            self.events.push(TickEvent::Flipped(facing));
        }

        if let (Some(polarity), Some(proj)) = (polarity, self.launcher.projectile()) {
            let rel = self.body.position - proj.position;
            if let Some(force) = magnet_force(polarity, rel) {
                self.body.add_force(force);
                self.events.push(TickEvent::MagnetPulse {
                    repel: polarity == Polarity::Repel,
                    size: pulse_size(rel.length()),
                });
            }
        }

        match self.launcher.update(world, self.time, dt) {
            ProjectileEvent::Attached => self.events.push(TickEvent::MagnetAttached),
            ProjectileEvent::Shattered => self.events.push(TickEvent::MagnetShattered),
            ProjectileEvent::Expired => self.events.push(TickEvent::MagnetExpired),
            ProjectileEvent::None => {}
        }

        self.body.integrate(dt);
        self.resolve_ground_contact(world);
        self.time += f64::from(dt);
    }

    /// Descending feet may not end a tick inside a surface: snap the body
    /// back up to stand height and cancel the downward velocity. Uses the
    /// sensor's current layer mask so plank drops still pass through.
    fn resolve_ground_contact(&mut self, world: &impl Raycaster) {
        if self.body.velocity.y > 0.0 {
            return;
        }
        let offset = Vec2::new(LEG_OFFSET, 0.0);
        let mask = self.ground.mask();
        let mut depth: Option<f32> = None;
        for origin in [self.body.position - offset, self.body.position + offset] {
            if let Some(hit) = world.cast(origin, Vec2::NEG_Y, LEG_RAY_LENGTH, mask) {
                depth = Some(depth.map_or(hit.distance, |d: f32| d.min(hit.distance)));
            }
        }
        if let Some(d) = depth {
            self.body.position.y += STAND_HEIGHT - d;
            self.body.velocity.y = 0.0;
        }
    }

    /// Zero velocity, force the death gravity, disable input and clear the
    /// magnet and everything hanging off it, all within this tick.
    pub fn kill_player(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.movement_disabled = true;
        self.body.velocity = Vec2::ZERO;
        self.body.gravity_scale = DEATH_GRAVITY_SCALE;
        self.input = InputState {
            hold_to_attract: self.input.hold_to_attract,
            ..InputState::default()
        };
        self.launcher.deactivate();
        self.events.push(TickEvent::PlayerDied);
    }

    pub fn drain_events(&mut self) -> Vec<TickEvent> {
        std::mem::take(&mut self.events)
    }
}
