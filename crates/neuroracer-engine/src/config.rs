//! Simulation configuration and the data-driven fitness weighting.
//!
//! Everything tunable about an episode lives here: the sensor fan, the
//! kinematic limits, the step budget, and the fitness weights. Validation
//! fails fast at startup with a [`ConfigError`] naming the violated
//! constraint; nothing downstream re-checks.

use serde::{Deserialize, Serialize};

use crate::{episode::EpisodeSummary, sensor::MAX_SENSOR_RAYS};

#[derive(Debug, derive_more::Display, derive_more::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[display("ray count must be at least 1")]
    ZeroRayCount,
    #[display("ray count {count} exceeds the maximum of {MAX_SENSOR_RAYS}")]
    TooManyRays { count: usize },
    #[display("ray spread must be finite and non-negative")]
    InvalidRaySpread,
    #[display("ray max range must be finite and non-negative")]
    InvalidRayRange,
    #[display("tick duration must be finite and positive")]
    InvalidTickDuration,
    #[display("max speed must be finite and positive")]
    InvalidMaxSpeed,
    #[display("max turn rate must be finite and non-negative")]
    InvalidMaxTurnRate,
    #[display("step budget must be at least 1")]
    ZeroStepBudget,
    #[display("laps to finish must be at least 1")]
    ZeroLapTarget,
    #[display("fitness weights must all be finite")]
    NonFiniteFitnessWeight,
}

/// Weights folding an [`EpisodeSummary`] into a scalar fitness.
///
/// The formula is fixed (weighted sum plus terminal bonus/penalty, clamped
/// below by `floor`); what "good driving" means is entirely in the weights,
/// so play styles are tuned in configuration rather than code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Reward per track unit of net forward progress.
    pub progress_weight: f32,
    /// Reward per tick survived.
    pub survival_weight: f32,
    /// One-time bonus for finishing the configured lap count.
    pub finish_bonus: f32,
    /// One-time penalty for crashing.
    pub crash_penalty: f32,
    /// Lower bound on any episode's fitness.
    pub floor: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            progress_weight: 1.0,
            survival_weight: 0.1,
            finish_bonus: 100.0,
            crash_penalty: 10.0,
            floor: 0.0,
        }
    }
}

impl FitnessWeights {
    /// Scores a finished episode; higher is better, never below `floor`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, summary: &EpisodeSummary) -> f32 {
        let mut fitness = self.progress_weight * summary.progress
            + self.survival_weight * summary.ticks as f32;
        if summary.state.is_finished() {
            fitness += self.finish_bonus;
        }
        if summary.state.is_crashed() {
            fitness -= self.crash_penalty;
        }
        fitness.max(self.floor)
    }

    fn is_finite(&self) -> bool {
        [
            self.progress_weight,
            self.survival_weight,
            self.finish_bonus,
            self.crash_penalty,
            self.floor,
        ]
        .iter()
        .all(|w| w.is_finite())
    }
}

/// Everything an episode needs beyond the track and the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of sensor rays.
    pub ray_count: usize,
    /// Total angular spread of the ray fan, radians.
    pub ray_spread: f32,
    /// Sensor range in track units; 0 disables the sensors.
    pub ray_max_range: f32,
    /// Fixed time step, seconds.
    pub tick_duration: f32,
    /// Speed bound, track units per second.
    pub max_speed: f32,
    /// Turn rate bound at full speed, radians per second.
    pub max_turn_rate: f32,
    /// Hard tick bound per episode; guarantees termination.
    pub step_budget: u32,
    /// Forward laps required to finish.
    pub laps_to_finish: u32,
    pub fitness: FitnessWeights,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ray_count: 7,
            ray_spread: std::f32::consts::PI,
            ray_max_range: 650.0,
            tick_duration: 1.0 / 60.0,
            max_speed: 300.0,
            max_turn_rate: 200.0_f32.to_radians(),
            step_budget: 3600,
            laps_to_finish: 1,
            fitness: FitnessWeights::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ray_count == 0 {
            return Err(ConfigError::ZeroRayCount);
        }
        if self.ray_count > MAX_SENSOR_RAYS {
            return Err(ConfigError::TooManyRays {
                count: self.ray_count,
            });
        }
        if !self.ray_spread.is_finite() || self.ray_spread < 0.0 {
            return Err(ConfigError::InvalidRaySpread);
        }
        if !self.ray_max_range.is_finite() || self.ray_max_range < 0.0 {
            return Err(ConfigError::InvalidRayRange);
        }
        if !self.tick_duration.is_finite() || self.tick_duration <= 0.0 {
            return Err(ConfigError::InvalidTickDuration);
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigError::InvalidMaxSpeed);
        }
        if !self.max_turn_rate.is_finite() || self.max_turn_rate < 0.0 {
            return Err(ConfigError::InvalidMaxTurnRate);
        }
        if self.step_budget == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        if self.laps_to_finish == 0 {
            return Err(ConfigError::ZeroLapTarget);
        }
        if !self.fitness.is_finite() {
            return Err(ConfigError::NonFiniteFitnessWeight);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodeState;

    fn summary(state: EpisodeState, ticks: u32, progress: f32) -> EpisodeSummary {
        EpisodeSummary {
            state,
            ticks,
            progress,
            distance: progress.abs(),
            laps: u32::from(state.is_finished()),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            (
                SimConfig {
                    ray_count: 0,
                    ..SimConfig::default()
                },
                ConfigError::ZeroRayCount,
            ),
            (
                SimConfig {
                    ray_count: MAX_SENSOR_RAYS + 1,
                    ..SimConfig::default()
                },
                ConfigError::TooManyRays {
                    count: MAX_SENSOR_RAYS + 1,
                },
            ),
            (
                SimConfig {
                    ray_spread: -1.0,
                    ..SimConfig::default()
                },
                ConfigError::InvalidRaySpread,
            ),
            (
                SimConfig {
                    ray_max_range: f32::NAN,
                    ..SimConfig::default()
                },
                ConfigError::InvalidRayRange,
            ),
            (
                SimConfig {
                    tick_duration: 0.0,
                    ..SimConfig::default()
                },
                ConfigError::InvalidTickDuration,
            ),
            (
                SimConfig {
                    max_speed: -3.0,
                    ..SimConfig::default()
                },
                ConfigError::InvalidMaxSpeed,
            ),
            (
                SimConfig {
                    step_budget: 0,
                    ..SimConfig::default()
                },
                ConfigError::ZeroStepBudget,
            ),
            (
                SimConfig {
                    laps_to_finish: 0,
                    ..SimConfig::default()
                },
                ConfigError::ZeroLapTarget,
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_non_finite_fitness_weight_is_rejected() {
        let config = SimConfig {
            fitness: FitnessWeights {
                crash_penalty: f32::INFINITY,
                ..FitnessWeights::default()
            },
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFiniteFitnessWeight));
    }

    #[test]
    fn test_score_weighs_progress_and_survival() {
        let weights = FitnessWeights {
            progress_weight: 2.0,
            survival_weight: 0.5,
            finish_bonus: 0.0,
            crash_penalty: 0.0,
            floor: 0.0,
        };
        let fitness = weights.score(&summary(EpisodeState::TimedOut, 10, 30.0));
        assert!((fitness - 65.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_applies_terminal_bonus_and_penalty() {
        let weights = FitnessWeights {
            progress_weight: 0.0,
            survival_weight: 0.0,
            finish_bonus: 100.0,
            crash_penalty: 25.0,
            floor: -1000.0,
        };
        assert!((weights.score(&summary(EpisodeState::Finished, 5, 0.0)) - 100.0).abs() < 1e-6);
        assert!((weights.score(&summary(EpisodeState::Crashed, 5, 0.0)) + 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_never_drops_below_floor() {
        let weights = FitnessWeights {
            progress_weight: 1.0,
            survival_weight: 0.0,
            finish_bonus: 0.0,
            crash_penalty: 50.0,
            floor: 0.0,
        };
        let fitness = weights.score(&summary(EpisodeState::Crashed, 0, -12.0));
        assert_eq!(fitness, 0.0);
    }

    #[test]
    fn test_lap_completion_outscores_partial_crash() {
        // One full 360-unit lap against a crash at 10% of the lap, with the
        // lap bonus at 100: the finisher must win by at least the bonus.
        let weights = FitnessWeights {
            progress_weight: 1.0,
            survival_weight: 0.0,
            finish_bonus: 100.0,
            crash_penalty: 0.0,
            floor: 0.0,
        };
        let finisher = weights.score(&summary(EpisodeState::Finished, 400, 360.0));
        let crasher = weights.score(&summary(EpisodeState::Crashed, 40, 36.0));
        assert!(finisher - crasher >= 100.0);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SimConfig {
            ray_count: 9,
            step_budget: 1234,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_json_uses_defaults() {
        let parsed: SimConfig = serde_json::from_str(r#"{"ray_count": 5}"#).unwrap();
        assert_eq!(parsed.ray_count, 5);
        assert_eq!(parsed.step_budget, SimConfig::default().step_budget);
    }
}
