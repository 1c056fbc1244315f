//! End-to-end episode scenarios on the 100×100 square loop.

use neuroracer_engine::{
    AgentPose, ControlDecision, EpisodeRunner, SensorReading, SimConfig, Track, Vec2, run_episode,
};

fn track() -> Track {
    Track::square_loop(100.0, 10.0)
}

fn config() -> SimConfig {
    SimConfig {
        tick_duration: 1.0,
        max_speed: 1.0,
        step_budget: 1000,
        ..SimConfig::default()
    }
}

fn full_throttle(_: &SensorReading) -> ControlDecision {
    ControlDecision::new(1.0, 0.0)
}

#[test]
fn straight_driver_crashes_into_a_wall_within_budget() {
    let track = track();
    let config = config();
    let mut controller = full_throttle;
    let result = run_episode(&mut controller, &track, &config).unwrap();

    assert!(result.summary.state.is_crashed());
    assert!(result.summary.ticks < config.step_budget);
    assert!(result.summary.distance > 0.0);
}

#[test]
fn episodes_are_idempotent() {
    let track = track();
    let config = config();
    let mut first_controller = full_throttle;
    let mut second_controller = full_throttle;
    let first = run_episode(&mut first_controller, &track, &config).unwrap();
    let second = run_episode(&mut second_controller, &track, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn pose_on_the_wall_is_crashed_before_any_tick() {
    let track = track();
    let config = config();
    let runner = EpisodeRunner::with_start(&track, &config, AgentPose::new(Vec2::new(50.0, 0.0), 0.0));
    assert!(runner.state().is_crashed());
}

/// Drives the square lap with 90° turns on a fixed tick schedule: with
/// `max_turn_rate` at π/2 rad/s and full speed held, a single steering tick
/// turns one corner exactly.
#[test]
fn scheduled_driver_finishes_a_lap() {
    let track = track();
    let config = SimConfig {
        tick_duration: 1.0,
        max_speed: 1.0,
        max_turn_rate: std::f32::consts::FRAC_PI_2,
        step_budget: 400,
        ..SimConfig::default()
    };

    let mut tick = 0u32;
    let mut controller = move |_: &SensorReading| {
        tick += 1;
        let steering = if matches!(tick, 45 | 134 | 222 | 310) {
            1.0
        } else {
            0.0
        };
        ControlDecision::new(1.0, steering)
    };

    let result = run_episode(&mut controller, &track, &config).unwrap();
    assert!(
        result.summary.state.is_finished(),
        "expected a finished lap, got {:?}",
        result.summary
    );
    assert_eq!(result.summary.laps, 1);
    assert!(result.summary.progress >= track.centerline_length());
    // Lap bonus plus a full lap of progress dwarfs any partial run.
    assert!(result.fitness > config.fitness.finish_bonus);
}

#[test]
fn reversing_driver_never_finishes() {
    let track = track();
    let config = SimConfig {
        step_budget: 200,
        ..config()
    };
    let mut controller = |_: &SensorReading| ControlDecision::new(-1.0, 0.0);
    let result = run_episode(&mut controller, &track, &config).unwrap();
    // Backs straight into the outer wall behind the start gate.
    assert!(result.summary.state.is_crashed());
    assert!(result.summary.progress <= 0.0);
    assert_eq!(result.summary.laps, 0);
}
