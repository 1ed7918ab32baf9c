//! Soft-assignment EM refinement.
//!
//! Takes the k-means initial estimate and iterates E/M steps until the total
//! parameter movement of an M-step drops below `em_threshold`, or
//! `em_max_iter` iterations elapse. Each iteration recomputes the full
//! posterior matrix from scratch; nothing persists across iterations except
//! the model parameters themselves.

use tracing::{debug, trace};

use super::dataset::FeatureSet;
use super::gmm::{Convergence, GmmParams, PhaseReport};
use super::model::DiagGmm;
use crate::error::{Error, Result};

/// Posterior responsibilities, `n_components × n_samples`, flattened
/// row-major: `at(i, j)` is mixture `i`'s responsibility for sample `j`.
struct Posteriors {
    resp: Vec<f32>,
    n_samples: usize,
}

impl Posteriors {
    fn new(n_components: usize, n_samples: usize) -> Self {
        Self {
            resp: vec![0.0; n_components * n_samples],
            n_samples,
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> f32 {
        self.resp[i * self.n_samples + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f32) {
        self.resp[i * self.n_samples + j] = value;
    }
}

/// Refine `model` on `features` by maximum likelihood.
///
/// Consumes the initial model and returns the refined one; convergence state
/// is carried in the report (`IterationLimit` means the cap was hit before
/// the threshold — the parameters are still the best estimate so far, and
/// the caller decides whether that is acceptable).
pub(crate) fn refine(
    features: &FeatureSet<'_>,
    model: DiagGmm,
    params: &GmmParams,
) -> Result<(DiagGmm, PhaseReport)> {
    let mut model = model;
    let mut posteriors = Posteriors::new(model.n_components(), features.len());
    debug!(
        n_components = model.n_components(),
        n_samples = features.len(),
        "em refinement"
    );

    let mut change = f32::INFINITY;
    let mut iteration = 0;
    while change >= params.em_threshold {
        if iteration >= params.em_max_iter {
            debug!(iteration, change, "em hit iteration cap");
            return Ok((
                model,
                PhaseReport {
                    iterations: iteration,
                    delta: change,
                    convergence: Convergence::IterationLimit,
                },
            ));
        }
        iteration += 1;

        e_step(features, &model, &mut posteriors)?;
        change = m_step(features, &posteriors, &mut model)?;
        trace!(iteration, change, "em update");
    }

    debug!(iteration, change, "em converged");
    Ok((
        model,
        PhaseReport {
            iterations: iteration,
            delta: change,
            convergence: Convergence::Converged,
        },
    ))
}

/// Fill the posterior matrix: column `j` is sample `j`'s responsibility
/// distribution over mixtures, normalized to sum to 1.
fn e_step(features: &FeatureSet<'_>, model: &DiagGmm, posteriors: &mut Posteriors) -> Result<()> {
    let n_components = model.n_components();
    for j in 0..features.len() {
        let x = features.row(j);
        let mut mass = 0.0_f32;
        for i in 0..n_components {
            let unnormalized = model.weighted_density(i, x);
            posteriors.set(i, j, unnormalized);
            mass += unnormalized;
        }
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(Error::NumericDegeneracy {
                context: "total density mass for a sample is zero or non-finite",
            });
        }
        for i in 0..n_components {
            posteriors.set(i, j, posteriors.at(i, j) / mass);
        }
    }
    Ok(())
}

/// Re-estimate means, variances, and weights from the posteriors.
///
/// Variances are computed against the *updated* mean of the same step.
/// Returns the summed absolute movement across all parameters.
fn m_step(features: &FeatureSet<'_>, posteriors: &Posteriors, model: &mut DiagGmm) -> Result<f32> {
    let n_samples = features.len();
    let dim = features.dim();

    let mut change_mean = 0.0_f32;
    let mut change_variance = 0.0_f32;
    let mut change_weight = 0.0_f32;

    for (j, component) in model.components_mut().iter_mut().enumerate() {
        let soft_count: f32 = (0..n_samples).map(|k| posteriors.at(j, k)).sum();
        if !(soft_count > 0.0) {
            return Err(Error::NumericDegeneracy {
                context: "a mixture's effective sample count collapsed to zero",
            });
        }

        for d in 0..dim {
            let weighted_sum: f32 = (0..n_samples)
                .map(|k| posteriors.at(j, k) * features.row(k)[d])
                .sum();
            let new_mean = weighted_sum / soft_count;
            change_mean += (new_mean - component.mean[d]).abs();
            component.mean[d] = new_mean;

            let weighted_sq_dev: f32 = (0..n_samples)
                .map(|k| {
                    let dev = features.row(k)[d] - new_mean;
                    posteriors.at(j, k) * dev * dev
                })
                .sum();
            let new_variance = weighted_sq_dev / soft_count;
            change_variance += (new_variance - component.variance[d]).abs();
            component.variance[d] = new_variance;
        }

        let new_weight = soft_count / n_samples as f32;
        change_weight += (new_weight - component.weight).abs();
        component.weight = new_weight;
    }

    Ok(change_mean + change_variance + change_weight)
}
