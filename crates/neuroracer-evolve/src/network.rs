//! Fixed-topology feedforward network compiled from a genome's weights.

use neuroracer_engine::{ControlDecision, Controller, SensorReading};
use serde::{Deserialize, Serialize};

use crate::EvolutionError;

/// Layer sizes of the evolved network.
///
/// Inputs are the sensor rays, outputs are throttle and steering. The shape
/// fixes the genome length: every genome in a run carries exactly
/// [`NetworkShape::weight_count`] parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkShape {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

/// Throttle and steering.
pub const CONTROL_OUTPUTS: usize = 2;

impl NetworkShape {
    /// Shape for a driving controller: one input per sensor ray.
    #[must_use]
    pub const fn driving(ray_count: usize, hidden: usize) -> Self {
        Self {
            inputs: ray_count,
            hidden,
            outputs: CONTROL_OUTPUTS,
        }
    }

    /// Flattened parameter count: per-node bias plus incoming weights for
    /// both layers.
    #[must_use]
    pub const fn weight_count(&self) -> usize {
        self.hidden * (self.inputs + 1) + self.outputs * (self.hidden + 1)
    }
}

/// A compiled, evaluation-ready network: two dense tanh layers over a flat
/// parameter buffer.
///
/// Layout: for each hidden node, `[bias, w_0, …, w_{inputs-1}]`; then for
/// each output node, `[bias, w_0, …, w_{hidden-1}]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForwardNetwork {
    shape: NetworkShape,
    weights: Vec<f32>,
}

impl FeedForwardNetwork {
    pub fn new(shape: NetworkShape, weights: Vec<f32>) -> Result<Self, EvolutionError> {
        if weights.len() != shape.weight_count() {
            return Err(EvolutionError::WeightCountMismatch {
                expected: shape.weight_count(),
                actual: weights.len(),
            });
        }
        Ok(Self { shape, weights })
    }

    #[must_use]
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    /// Forward pass. Missing inputs read as 0, extras are ignored, so a
    /// reading that disagrees with the shape degrades instead of panicking.
    #[must_use]
    pub fn activate(&self, inputs: &[f32]) -> Vec<f32> {
        let mut hidden = Vec::with_capacity(self.shape.hidden);
        let mut offset = 0;
        for _ in 0..self.shape.hidden {
            let mut sum = self.weights[offset];
            offset += 1;
            for i in 0..self.shape.inputs {
                sum += self.weights[offset] * inputs.get(i).copied().unwrap_or(0.0);
                offset += 1;
            }
            hidden.push(sum.tanh());
        }

        let mut outputs = Vec::with_capacity(self.shape.outputs);
        for _ in 0..self.shape.outputs {
            let mut sum = self.weights[offset];
            offset += 1;
            for value in &hidden {
                sum += self.weights[offset] * value;
                offset += 1;
            }
            outputs.push(sum.tanh());
        }
        outputs
    }
}

/// [`Controller`] driving from an evolved network.
///
/// The tanh output layer already lands in `[-1, 1]`, matching the control
/// ranges; the episode runner still sanitizes, so a pathological weight
/// vector degrades to a crash rather than an abort.
#[derive(Debug, Clone)]
pub struct NetworkController {
    network: FeedForwardNetwork,
}

impl NetworkController {
    #[must_use]
    pub const fn new(network: FeedForwardNetwork) -> Self {
        Self { network }
    }
}

impl Controller for NetworkController {
    fn decide(&mut self, reading: &SensorReading) -> ControlDecision {
        let outputs = self.network.activate(reading.as_slice());
        ControlDecision::new(outputs[0], outputs[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_count() {
        let shape = NetworkShape::driving(7, 8);
        // 8 * (7 + 1) + 2 * (8 + 1)
        assert_eq!(shape.weight_count(), 82);
    }

    #[test]
    fn test_rejects_wrong_weight_count() {
        let shape = NetworkShape::driving(3, 2);
        let result = FeedForwardNetwork::new(shape, vec![0.0; 5]);
        assert_eq!(
            result.unwrap_err(),
            EvolutionError::WeightCountMismatch {
                expected: shape.weight_count(),
                actual: 5,
            }
        );
    }

    #[test]
    fn test_zero_weights_produce_zero_outputs() {
        let shape = NetworkShape::driving(3, 2);
        let network = FeedForwardNetwork::new(shape, vec![0.0; shape.weight_count()]).unwrap();
        assert_eq!(network.activate(&[1.0, 0.5, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_outputs_are_bounded_and_deterministic() {
        let shape = NetworkShape::driving(4, 3);
        let weights: Vec<f32> = (0..shape.weight_count())
            .map(|i| (i as f32).sin() * 5.0)
            .collect();
        let network = FeedForwardNetwork::new(shape, weights).unwrap();
        let inputs = [0.2, 0.9, 1.0, 0.0];
        let first = network.activate(&inputs);
        assert_eq!(first.len(), CONTROL_OUTPUTS);
        for value in &first {
            assert!((-1.0..=1.0).contains(value));
        }
        assert_eq!(network.activate(&inputs), first);
    }

    #[test]
    fn test_bias_only_network() {
        let shape = NetworkShape::driving(2, 1);
        // Hidden bias drives the node high; output weights pass it through.
        let mut weights = vec![0.0; shape.weight_count()];
        weights[0] = 10.0; // hidden bias
        weights[3] = 1.0; // output 0 bias
        weights[4] = 1.0; // output 0 <- hidden
        let network = FeedForwardNetwork::new(shape, weights).unwrap();
        let outputs = network.activate(&[0.0, 0.0]);
        assert!(outputs[0] > 0.9);
        assert_eq!(outputs[1], 0.0);
    }

    #[test]
    fn test_controller_maps_outputs_to_decision() {
        let shape = NetworkShape::driving(3, 2);
        let weights: Vec<f32> = (0..shape.weight_count()).map(|i| (i as f32) * 0.1).collect();
        let network = FeedForwardNetwork::new(shape, weights).unwrap();
        let expected = network.activate(&[1.0, 1.0, 1.0]);

        let mut controller = NetworkController::new(network);
        let decision = controller.decide(&SensorReading::open(3));
        assert_eq!(decision.throttle, expected[0]);
        assert_eq!(decision.steering, expected[1]);
    }
}
