//! The episode runner: one agent, one track, one bounded drive.
//!
//! An episode steps a single agent tick by tick until it crashes, finishes
//! the configured lap count, or exhausts its step budget. Every tick runs
//! the same sequence: sense, decide, integrate, bounds check, progress
//! check, budget check.
//!
//! A controller that produces a non-finite decision, or an integration step
//! that produces a non-finite pose, terminates the episode as [`EpisodeState::Crashed`]
//! on the spot. That failure is recovered locally with floored fitness,
//! never propagated, so one degenerate genome cannot abort a generation.

use crate::{
    config::{ConfigError, SimConfig},
    controller::Controller,
    kinematics::AgentPose,
    sensor::{SensorArray, SensorReading},
    track::{ProgressTracker, Track},
};

/// Episode lifecycle. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeState {
    Running,
    Crashed,
    Finished,
    TimedOut,
}

/// What one episode amounted to, for scoring and reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub state: EpisodeState,
    /// Ticks completed before termination.
    pub ticks: u32,
    /// Net centerline progress, track units (negative for net reversing).
    pub progress: f32,
    /// Path length actually traveled, track units.
    pub distance: f32,
    /// Completed forward laps.
    pub laps: u32,
}

/// Scored outcome of [`run_episode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub fitness: f32,
    pub summary: EpisodeSummary,
}

/// Read-only view of a live episode for a rendering front end.
///
/// Taken at whatever cadence the renderer wants; the core never calls into
/// rendering.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub track: &'a Track,
    pub pose: AgentPose,
    pub reading: SensorReading,
}

/// Steps one agent through one episode.
///
/// Owns all mutable state (pose, progress, sensor buffer); the track is a
/// shared immutable reference, which is what makes concurrent episodes safe
/// without locks.
#[derive(Debug)]
pub struct EpisodeRunner<'a> {
    track: &'a Track,
    config: &'a SimConfig,
    sensors: SensorArray,
    pose: AgentPose,
    progress: ProgressTracker,
    state: EpisodeState,
    ticks: u32,
    distance: f32,
    last_reading: SensorReading,
}

impl<'a> EpisodeRunner<'a> {
    /// Starts an episode at the track's start gate.
    ///
    /// # Panics
    ///
    /// Panics if `config` has an out-of-range ray count; validate the config
    /// first.
    #[must_use]
    pub fn new(track: &'a Track, config: &'a SimConfig) -> Self {
        Self::with_start(track, config, track.start_pose())
    }

    /// Starts an episode from an explicit pose.
    ///
    /// A pose already out of bounds is classified `Crashed` at tick 0.
    #[must_use]
    pub fn with_start(track: &'a Track, config: &'a SimConfig, pose: AgentPose) -> Self {
        let state = if track.is_out_of_bounds(pose.position) {
            EpisodeState::Crashed
        } else {
            EpisodeState::Running
        };
        Self {
            track,
            config,
            sensors: SensorArray::from_config(config),
            pose,
            progress: ProgressTracker::new(track, pose.position),
            state,
            ticks: 0,
            distance: 0.0,
            last_reading: SensorReading::open(config.ray_count),
        }
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn pose(&self) -> &AgentPose {
        &self.pose
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'a> {
        Snapshot {
            track: self.track,
            pose: self.pose,
            reading: self.last_reading.clone(),
        }
    }

    /// Advances the episode by one tick; a no-op once terminal.
    pub fn tick(&mut self, controller: &mut dyn Controller) -> EpisodeState {
        if !self.state.is_running() {
            return self.state;
        }

        let reading = self.sensors.read(self.track, &self.pose);
        let decision = controller.decide(&reading);
        self.last_reading = reading;

        let Some(decision) = decision.sanitized() else {
            self.state = EpisodeState::Crashed;
            return self.state;
        };

        let before = self.pose.position;
        self.pose.integrate(decision, self.config);
        if !self.pose.is_finite() {
            self.state = EpisodeState::Crashed;
            return self.state;
        }
        self.distance += before.distance_to(self.pose.position);
        self.ticks += 1;

        if self.track.is_out_of_bounds(self.pose.position) {
            self.state = EpisodeState::Crashed;
            return self.state;
        }

        self.progress.advance(self.track, self.pose.position);
        if self.progress.completed_laps() >= self.config.laps_to_finish {
            self.state = EpisodeState::Finished;
            return self.state;
        }

        if self.ticks >= self.config.step_budget {
            self.state = EpisodeState::TimedOut;
        }
        self.state
    }

    /// Runs ticks until a terminal state; the step budget bounds the loop.
    pub fn run(&mut self, controller: &mut dyn Controller) -> EpisodeSummary {
        while self.state.is_running() {
            self.tick(controller);
        }
        self.summary()
    }

    #[must_use]
    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            state: self.state,
            ticks: self.ticks,
            progress: self.progress.total_progress(),
            distance: self.distance,
            laps: self.progress.completed_laps(),
        }
    }
}

/// Runs one complete scored episode: the single entry point any front end
/// (training loop, replay command, manual play) drives an agent through.
pub fn run_episode(
    controller: &mut dyn Controller,
    track: &Track,
    config: &SimConfig,
) -> Result<EpisodeResult, ConfigError> {
    config.validate()?;
    let mut runner = EpisodeRunner::new(track, config);
    let summary = runner.run(controller);
    Ok(EpisodeResult {
        fitness: config.fitness.score(&summary),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControlDecision;
    use crate::geometry::Vec2;

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

    #[test]
    fn test_boundary_start_is_crashed_at_tick_zero() {
        let track = track();
        let config = config();
        let on_wall = AgentPose::new(Vec2::new(100.0, 50.0), 0.0);
        let runner = EpisodeRunner::with_start(&track, &config, on_wall);
        assert!(runner.state().is_crashed());
        assert_eq!(runner.summary().ticks, 0);
    }

    #[test]
    fn test_terminal_episode_ignores_further_ticks() {
        let track = track();
        let config = config();
        let on_wall = AgentPose::new(Vec2::new(100.0, 50.0), 0.0);
        let mut runner = EpisodeRunner::with_start(&track, &config, on_wall);
        let mut controller = |_: &SensorReading| ControlDecision::new(1.0, 0.0);
        assert!(runner.tick(&mut controller).is_crashed());
        assert_eq!(runner.summary().ticks, 0);
    }

    #[test]
    fn test_nan_decision_crashes_immediately() {
        let track = track();
        let config = config();
        let mut controller = |_: &SensorReading| ControlDecision::new(f32::NAN, 0.0);
        let result = run_episode(&mut controller, &track, &config).unwrap();
        assert!(result.summary.state.is_crashed());
        assert_eq!(result.summary.ticks, 0);
        assert_eq!(result.summary.distance, 0.0);
        // Floored, not propagated.
        assert!(result.fitness >= config.fitness.floor);
    }

    #[test]
    fn test_coasting_agent_times_out() {
        let track = track();
        let config = SimConfig {
            step_budget: 50,
            ..config()
        };
        let mut controller = |_: &SensorReading| ControlDecision::COAST;
        let result = run_episode(&mut controller, &track, &config).unwrap();
        assert!(result.summary.state.is_timed_out());
        assert_eq!(result.summary.ticks, 50);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let track = track();
        let config = SimConfig {
            step_budget: 0,
            ..SimConfig::default()
        };
        let mut controller = |_: &SensorReading| ControlDecision::COAST;
        let result = run_episode(&mut controller, &track, &config);
        assert_eq!(result.unwrap_err(), ConfigError::ZeroStepBudget);
    }

    #[test]
    fn test_snapshot_reflects_latest_tick() {
        let track = track();
        let config = config();
        let mut runner = EpisodeRunner::new(&track, &config);
        let initial = runner.snapshot();
        assert_eq!(initial.reading.as_slice(), &[1.0; 7]);

        let mut controller = |_: &SensorReading| ControlDecision::new(1.0, 0.0);
        runner.tick(&mut controller);
        let snapshot = runner.snapshot();
        assert!(snapshot.pose.position.x > initial.pose.position.x);
        assert!(snapshot.reading.as_slice().iter().any(|&d| d < 1.0));
    }
}
