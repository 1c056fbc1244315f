//! Agent pose and the per-tick kinematic update.
//!
//! No forces or mass: speed decays by a constant friction factor, throttle
//! accelerates toward the configured maximum, and the turn rate scales with
//! the square root of the speed ratio so a near-stationary agent cannot spin
//! in place. Steering mirrors when reversing, matching how a car steers in
//! reverse.

use serde::{Deserialize, Serialize};

use crate::{config::SimConfig, controller::ControlDecision, geometry::Vec2};

/// Per-tick multiplicative speed decay.
const SPEED_FRICTION: f32 = 0.98;

/// Position, heading, and signed speed of one agent.
///
/// Owned exclusively by the episode that created it; concurrent episodes
/// never share a pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentPose {
    pub position: Vec2,
    /// Radians, counter-clockwise from +x.
    pub heading: f32,
    /// Track units per second; negative when reversing.
    pub speed: f32,
}

impl AgentPose {
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.heading.is_finite() && self.speed.is_finite()
    }

    /// Advances the pose by one fixed time step under `decision`.
    ///
    /// `decision` must already be sanitized; the caller checks the resulting
    /// pose for finiteness and treats a failure as a crash.
    pub fn integrate(&mut self, decision: ControlDecision, config: &SimConfig) {
        let dt = config.tick_duration;

        self.speed *= SPEED_FRICTION;
        self.speed = (self.speed + decision.throttle * config.max_speed * dt)
            .clamp(-config.max_speed, config.max_speed);

        if self.speed.abs() > f32::EPSILON {
            let turn_authority = (self.speed.abs() / config.max_speed).sqrt();
            self.heading +=
                decision.steering * self.speed.signum() * config.max_turn_rate * turn_authority * dt;
        }

        self.position += Vec2::from_angle(self.heading) * (self.speed * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            tick_duration: 1.0,
            max_speed: 1.0,
            max_turn_rate: 1.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_full_throttle_moves_forward() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        pose.integrate(ControlDecision::new(1.0, 0.0), &config);
        assert!((pose.speed - 1.0).abs() < 1e-6);
        assert!((pose.position.x - 1.0).abs() < 1e-6);
        assert!(pose.position.y.abs() < 1e-6);
        assert_eq!(pose.heading, 0.0);
    }

    #[test]
    fn test_speed_is_clamped_at_max() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        for _ in 0..100 {
            pose.integrate(ControlDecision::new(1.0, 0.0), &config);
        }
        assert!(pose.speed <= config.max_speed);
    }

    #[test]
    fn test_coasting_decays_speed() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        pose.integrate(ControlDecision::new(1.0, 0.0), &config);
        let moving = pose.speed;
        pose.integrate(ControlDecision::COAST, &config);
        assert!(pose.speed < moving);
    }

    #[test]
    fn test_stationary_agent_cannot_turn() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 1.0);
        pose.integrate(ControlDecision::new(0.0, 1.0), &config);
        assert_eq!(pose.heading, 1.0);
    }

    #[test]
    fn test_steering_turns_left_at_forward_speed() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        pose.integrate(ControlDecision::new(1.0, 1.0), &config);
        assert!(pose.heading > 0.0);
    }

    #[test]
    fn test_steering_mirrors_in_reverse() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        pose.integrate(ControlDecision::new(-1.0, 1.0), &config);
        assert!(pose.speed < 0.0);
        assert!(pose.heading < 0.0);
    }

    #[test]
    fn test_integration_stays_finite() {
        let config = config();
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        for _ in 0..10_000 {
            pose.integrate(ControlDecision::new(1.0, 1.0), &config);
        }
        assert!(pose.is_finite());
    }
}
