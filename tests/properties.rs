//! Numeric property tests for the simulation and arc synthesis

use glam::Vec2;
use proptest::prelude::*;

use polarity::consts::JETPACK_TOTAL_TIME;
use polarity::sim::{
    magnet_force, BoxCollider, InputSample, Polarity, Session, StageWorld, VerticalMotor,
};
use polarity::tether::interior_point_count;

fn flat_world() -> StageWorld {
    let mut w = StageWorld::new();
    w.add(BoxCollider::ground(
        Vec2::new(-100.0, -2.0),
        Vec2::new(100.0, 0.0),
    ));
    w
}

fn settled_session(world: &StageWorld) -> Session {
    let mut s = Session::new(Vec2::new(0.0, 2.0));
    for _ in 0..120 {
        s.frame(world, &InputSample::idle(), 1.0 / 60.0);
    }
    s.drain_events();
    s
}

proptest! {
    #[test]
    fn fuel_stays_in_gauge_range(held in proptest::collection::vec(any::<bool>(), 1..400)) {
        let mut motor = VerticalMotor::new();
        let dt = 1.0 / 60.0;
        let mut now = 0.0_f64;
        for (i, &jump) in held.iter().enumerate() {
            // Alternate grounded stretches so recovery paths run too
            let grounded = (i / 50) % 2 == 0;
            motor.frame(now, dt, jump, grounded);
            prop_assert!(motor.fuel() >= 0.0);
            prop_assert!(motor.fuel() <= JETPACK_TOTAL_TIME);
            now += f64::from(dt);
        }
    }

    #[test]
    fn magnet_force_weakens_with_distance(
        d1 in 1.2_f32..29.0,
        step in 0.1_f32..1.0,
        angle in 0.0_f32..std::f32::consts::TAU,
    ) {
        let d2 = (d1 + step).min(29.9);
        let dir = Vec2::from_angle(angle);
        let near = magnet_force(Polarity::Repel, dir * d1).map(|f| f.length());
        let far = magnet_force(Polarity::Repel, dir * d2).map(|f| f.length());
        prop_assert!(near.is_some() && far.is_some());
        prop_assert!(far.unwrap_or(0.0) <= near.unwrap_or(0.0) + 1e-3);
    }

    #[test]
    fn attract_and_repel_oppose(d in 1.2_f32..29.0, angle in 0.0_f32..std::f32::consts::TAU) {
        let rel = Vec2::from_angle(angle) * d;
        let r = magnet_force(Polarity::Repel, rel);
        let a = magnet_force(Polarity::Attract, rel);
        prop_assert!(r.is_some() && a.is_some());
        // Repel pushes along rel, attract pulls against it
        prop_assert!(r.unwrap_or(Vec2::ZERO).dot(rel) > 0.0);
        prop_assert!(a.unwrap_or(Vec2::ZERO).dot(rel) < 0.0);
    }

    #[test]
    fn interior_count_monotonic_in_length(len in 0.5_f32..200.0, extra in 0.0_f32..50.0) {
        let interval = 10.0;
        let a = interior_point_count(len, interval);
        let b = interior_point_count(len + extra, interval);
        prop_assert!(b >= a);
    }

    #[test]
    fn session_replay_is_deterministic(
        script in proptest::collection::vec((-1.0_f32..1.0, any::<bool>(), any::<bool>()), 1..120),
    ) {
        let world = flat_world();
        let run = |world: &StageWorld| {
            let mut s = settled_session(world);
            for &(x, jump, repel) in &script {
                let sample = InputSample {
                    movement: Vec2::new(x, 0.0),
                    jump_held: jump,
                    repel_held: repel,
                    ..Default::default()
                };
                s.frame(world, &sample, 1.0 / 60.0);
            }
            (s.body.position, s.body.velocity, s.vertical.fuel())
        };
        prop_assert_eq!(run(&world), run(&world));
    }
}
