//! Headless scripted demo
//!
//! Runs a short movement script against a small stage at 60 fps frames
//! (50 Hz fixed physics underneath) and logs what the simulation reports.
//! Useful for eyeballing tuning changes without a renderer attached.

use glam::Vec2;
use polarity::effects::{Effect, EffectSink};
use polarity::settings::{MemoryStore, Preferences};
use polarity::sim::{BoxCollider, InputSample, Session, StageWorld, TickEvent};
use polarity::tether::{ArcChild, ArcParams, BurstManager, ChildMode, TetherRig};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEMO_SECONDS: f32 = 12.0;

/// Sink that narrates effect triggers instead of rendering them
struct LogEffects;

impl EffectSink for LogEffects {
    fn play(&mut self, effect: Effect, at: Vec2, _rotation: f32) {
        log::debug!("effect {effect:?} at ({:.2}, {:.2})", at.x, at.y);
    }

    fn stop(&mut self, effect: Effect) {
        log::trace!("effect {effect:?} stopped");
    }
}

fn build_stage() -> StageWorld {
    let mut world = StageWorld::new();
    // Floor
    world.add(BoxCollider::ground(
        Vec2::new(-40.0, -2.0),
        Vec2::new(40.0, 0.0),
    ));
    // Drop-through plank above the floor
    world.add(BoxCollider::plank(
        Vec2::new(4.0, 2.8),
        Vec2::new(9.0, 3.0),
    ));
    // Wall the magnet can stick to
    world.add(BoxCollider::ground(
        Vec2::new(14.0, 0.0),
        Vec2::new(15.0, 10.0),
    ));
    world
}

fn build_tether(seed: u64) -> TetherRig {
    let mut params = ArcParams::default();
    params.seed = 7;
    params.extra_chaos = true;

    let mut sharp = ArcParams::default();
    sharp.seed = 8;
    sharp.base_alpha = 0.6;

    let mut tethered = ArcParams::default();
    tethered.seed = 9;
    tethered.enable_movement = true;

    let children = vec![
        ArcChild::new(ChildMode::Sharp, sharp, seed.wrapping_add(1)),
        ArcChild::new(ChildMode::Tethered, tethered, seed.wrapping_add(2)),
    ];
    let burst = BurstManager::new(true, 2, seed.wrapping_add(3));
    TetherRig::new(params, children, burst, seed)
}

/// Input script keyed by demo time
fn sample_at(t: f32) -> InputSample {
    let mut s = InputSample::default();
    match t {
        t if t < 2.0 => s.movement = Vec2::new(1.0, 0.0),
        t if t < 2.5 => {
            s.movement = Vec2::new(1.0, 0.0);
            s.jump_held = true;
        }
        t if t < 4.0 => s.movement = Vec2::new(1.0, 0.0),
        t if t < 4.1 => {
            // Fire the magnet at the wall
            s.launch_pressed = true;
            s.launch_held = true;
            s.movement = Vec2::new(1.0, 0.0);
        }
        t if t < 7.0 => s.attract_held = true,
        t if t < 9.0 => s.repel_held = true,
        t if t < 11.0 => {
            s.movement = Vec2::new(-1.0, 0.0);
            s.jump_held = true;
        }
        _ => {}
    }
    s
}

fn main() {
    env_logger::init();
    log::info!("polarity headless demo starting");

    let mut prefs = Preferences::new(MemoryStore::new());
    prefs.set_hold_to_attract(false);

    let world = build_stage();
    let mut session = Session::new(Vec2::new(-6.0, 2.0));
    session.input.hold_to_attract = prefs.hold_to_attract();
    let mut tether = build_tether(0x7e7e);
    let mut sink = LogEffects;

    let frames = (DEMO_SECONDS / FRAME_DT) as u32;
    for frame in 0..frames {
        let t = frame as f32 * FRAME_DT;
        session.frame(&world, &sample_at(t), FRAME_DT);

        for event in session.drain_events() {
            match event {
                TickEvent::Jumped => log::info!("[{t:.2}s] jumped"),
                TickEvent::Flipped(right) => {
                    log::debug!("[{t:.2}s] facing {}", if right { "right" } else { "left" });
                }
                TickEvent::MagnetLaunched => log::info!("[{t:.2}s] magnet launched"),
                TickEvent::MagnetAttached => log::info!("[{t:.2}s] magnet attached"),
                TickEvent::MagnetShattered => log::info!("[{t:.2}s] magnet shattered"),
                TickEvent::MagnetExpired => log::info!("[{t:.2}s] magnet expired"),
                TickEvent::MagnetPulse { repel, size } => {
                    sink.play_sized(Effect::MagnetPulse { repel }, session.body.position, size);
                }
                TickEvent::DirectionChangeDust => {
                    sink.play(Effect::DirectionDust, session.body.position, 0.0);
                }
                TickEvent::PlayerDied => log::warn!("[{t:.2}s] player died"),
            }
        }

        let magnet = session
            .launcher
            .projectile()
            .filter(|p| p.attached())
            .map(|p| p.position);
        tether.update(
            session.body.position,
            magnet,
            session.time(),
            FRAME_DT,
            &mut sink,
        );

        if frame % 60 == 0 {
            let body = &session.body;
            log::info!(
                "[{t:.2}s] pos ({:.2}, {:.2}) vel ({:.2}, {:.2}) fuel {:.2} arc pts {}",
                body.position.x,
                body.position.y,
                body.velocity.x,
                body.velocity.y,
                session.vertical.fuel(),
                tether.master.points().len(),
            );
        }
    }

    log::info!(
        "demo finished at t={:.2}s, alive={}",
        session.time(),
        session.alive()
    );
}
