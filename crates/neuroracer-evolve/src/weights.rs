//! Weight-vector operators for the genetic algorithm.
//!
//! Network weights are signed and bounded to `[-max_weight, max_weight]`;
//! every operator clamps back into that range. There is no normalization
//! step: unlike a convex feature blend, scaling a network's weights changes
//! its behavior, so magnitude is part of the search space.

use rand::Rng;
use rand_distr::Normal;

/// Random weight vector, each component uniform in `[-max_weight, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f32, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    (0..len)
        .map(|_| rng.random_range(-max_weight..=max_weight))
        .collect()
}

/// BLX-α blend crossover.
///
/// For each position, samples uniformly from the parents' range expanded by
/// `alpha` times its width on both sides, then clamps. `alpha = 0` keeps
/// offspring strictly between the parents; around `0.5` explores beyond
/// them.
///
/// # Panics
///
/// Panics if the parent vectors have different lengths.
pub fn blx_alpha<R>(p1: &[f32], p2: &[f32], alpha: f32, max_weight: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    (0..p1.len())
        .map(|i| {
            let min = f32::min(p1[i], p2[i]);
            let max = f32::max(p1[i], p2[i]);
            let d = max - min;
            rng.random_range(min - alpha * d..=max + alpha * d)
                .clamp(-max_weight, max_weight)
        })
        .collect()
}

/// Gaussian mutation in place: each weight is perturbed by `N(0, sigma)`
/// with probability `rate`, then clamped.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, max_weight: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).unwrap();
    for w in weights {
        if rng.random_bool(rate.into()) {
            *w = (*w + rng.sample(normal)).clamp(-max_weight, max_weight);
        }
    }
}
