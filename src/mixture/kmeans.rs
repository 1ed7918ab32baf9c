//! Hard-assignment k-means initialization.
//!
//! Produces the initial mixture estimate that EM refinement starts from:
//! Lloyd iterations over a hard partition, with automatic repair of
//! under-populated ("bad") cells, followed by a one-shot variance and weight
//! computation from the final partition.
//!
//! ## Bad-cell repair
//!
//! A cell whose member count drops below `min_samples` cannot support a
//! variance estimate. The repair replants that cell's mean at the most
//! populous cell's current member mean, shifted by `perturb` on every
//! dimension, so the next reclustering pass can split the populous cell's
//! mass between the two centers. At most one cell is repaired per outer
//! iteration; scans run in index order, so ties go to the lowest index and
//! the repair sequence is deterministic for a fixed input.

use rand::prelude::*;
use tracing::{debug, trace};

use super::dataset::FeatureSet;
use super::gmm::{Convergence, GmmParams, Init, PhaseReport};
use super::model::{Component, DiagGmm};
use super::util::squared_euclidean;
use crate::error::{Error, Result};

/// Outcome of the initialization phase.
#[derive(Debug)]
pub(crate) struct Initialized {
    pub(crate) model: DiagGmm,
    pub(crate) report: PhaseReport,
    pub(crate) repairs: usize,
}

/// Run k-means over `features` and derive the initial mixture parameters.
///
/// Pure with respect to its inputs: all state lives in locals, and the
/// result is returned by value.
pub(crate) fn initialize(
    features: &FeatureSet<'_>,
    n_components: usize,
    params: &GmmParams,
) -> Result<Initialized> {
    let mut means = seed_means(features, n_components, &params.init);
    debug!(
        n_components,
        n_samples = features.len(),
        dim = features.dim(),
        "k-means initialization"
    );

    let mut members: Vec<Vec<usize>> = Vec::new();
    let mut change = f32::INFINITY;
    let mut iteration = 0;
    let mut repairs = 0;

    while iteration < params.max_iter && change >= params.threshold {
        iteration += 1;
        members = recluster(features, &means);

        if let Some(bad) = first_bad_cell(&members, params.min_samples) {
            let donor = most_populous(&members);
            let largest = members[donor].len();
            if largest < params.min_samples {
                return Err(Error::UnrecoverablePartition {
                    min_samples: params.min_samples,
                    largest,
                });
            }

            let mut replanted = member_mean(features, &members[donor]);
            for v in &mut replanted {
                *v += params.perturb;
            }
            debug!(bad, donor, iteration, "repairing under-populated cell");
            means[bad] = replanted;
            repairs += 1;

            members = recluster(features, &means);
        }

        change = update_means(features, &members, &mut means);
        trace!(iteration, change, "k-means update");
    }

    let convergence = if change < params.threshold {
        Convergence::Converged
    } else {
        Convergence::IterationLimit
    };
    debug!(iteration, change, repairs, ?convergence, "k-means finished");

    let model = finalize(features, &members, means, params)?;
    Ok(Initialized {
        model,
        report: PhaseReport {
            iterations: iteration,
            delta: change,
            convergence,
        },
        repairs,
    })
}

/// Pick the starting means according to the seeding policy.
fn seed_means(features: &FeatureSet<'_>, n_components: usize, init: &Init) -> Vec<Vec<f32>> {
    match init {
        Init::FirstK => (0..n_components)
            .map(|i| features.row(i).to_vec())
            .collect(),
        Init::Random { seed } => {
            let mut rng: Box<dyn RngCore> = match seed {
                Some(s) => Box::new(StdRng::seed_from_u64(*s)),
                None => Box::new(rand::rng()),
            };
            rand::seq::index::sample(&mut rng, features.len(), n_components)
                .iter()
                .map(|i| features.row(i).to_vec())
                .collect()
        }
    }
}

/// Rebuild the member lists from scratch: each sample goes to the mixture
/// with the smallest squared Euclidean distance. Only a strictly smaller
/// distance replaces the incumbent, so the lowest index wins ties.
fn recluster(features: &FeatureSet<'_>, means: &[Vec<f32>]) -> Vec<Vec<usize>> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); means.len()];
    for j in 0..features.len() {
        let x = features.row(j);
        let mut closest = 0;
        let mut closest_dist = f32::INFINITY;
        for (i, mean) in means.iter().enumerate() {
            let d = squared_euclidean(x, mean);
            if d < closest_dist {
                closest_dist = d;
                closest = i;
            }
        }
        members[closest].push(j);
    }
    members
}

/// First cell (index order) with fewer than `min_samples` members.
fn first_bad_cell(members: &[Vec<usize>], min_samples: usize) -> Option<usize> {
    members.iter().position(|m| m.len() < min_samples)
}

/// Cell with the most members; strict comparison, lowest index wins ties.
fn most_populous(members: &[Vec<usize>]) -> usize {
    let mut best = 0;
    for i in 1..members.len() {
        if members[i].len() > members[best].len() {
            best = i;
        }
    }
    best
}

/// Arithmetic mean of the listed samples (zeros when the list is empty).
fn member_mean(features: &FeatureSet<'_>, members: &[usize]) -> Vec<f32> {
    let mut mean = vec![0.0_f32; features.dim()];
    for &j in members {
        for (m, &x) in mean.iter_mut().zip(features.row(j)) {
            *m += x;
        }
    }
    if !members.is_empty() {
        let inv = 1.0 / members.len() as f32;
        for m in &mut mean {
            *m *= inv;
        }
    }
    mean
}

/// Move every mean to its members' arithmetic mean; returns the summed
/// squared per-dimension movement across all mixtures.
///
/// A cell that ended the pass empty takes the zeroed accumulator as its
/// mean; the next pass's bad-cell check picks such a cell up for repair.
fn update_means(
    features: &FeatureSet<'_>,
    members: &[Vec<usize>],
    means: &mut [Vec<f32>],
) -> f32 {
    let mut change = 0.0_f32;
    for (mean, cell) in means.iter_mut().zip(members) {
        let updated = member_mean(features, cell);
        let mut moved = 0.0_f32;
        for (old, new) in mean.iter().zip(&updated) {
            let d = new - old;
            moved += d * d;
        }
        change += moved;
        *mean = updated;
    }
    change
}

/// Compute variances and weights from the final partition and assemble the
/// initial model.
fn finalize(
    features: &FeatureSet<'_>,
    members: &[Vec<usize>],
    means: Vec<Vec<f32>>,
    params: &GmmParams,
) -> Result<DiagGmm> {
    let n = features.len();
    let dim = features.dim();

    // Per-dimension variance: mean squared deviation from the final mean.
    let mut variances: Vec<Vec<f32>> = Vec::with_capacity(means.len());
    for (mean, cell) in means.iter().zip(members) {
        let mut variance = vec![0.0_f32; dim];
        for &j in cell {
            for ((v, &x), &m) in variance.iter_mut().zip(features.row(j)).zip(mean) {
                let d = x - m;
                *v += d * d;
            }
        }
        if !cell.is_empty() {
            let inv = 1.0 / cell.len() as f32;
            for v in &mut variance {
                *v *= inv;
            }
        }
        if variance.iter().any(|&v| v <= 0.0) {
            return Err(Error::NumericDegeneracy {
                context: "a cluster variance collapsed to zero after k-means",
            });
        }
        variances.push(variance);
    }

    // Weights from member counts, then floor-and-rescale.
    let mut weights: Vec<f32> = members.iter().map(|m| m.len() as f32 / n as f32).collect();

    let max_weight = weights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max_weight < params.min_weight {
        return Err(Error::DegenerateWeights {
            max_weight,
            min_weight: params.min_weight,
        });
    }

    let floored: Vec<bool> = weights.iter().map(|&w| w < params.min_weight).collect();
    let n_floored = floored.iter().filter(|&&f| f).count();
    if n_floored > 0 {
        let unfloored_sum: f32 = weights
            .iter()
            .zip(&floored)
            .filter(|(_, &f)| !f)
            .map(|(&w, _)| w)
            .sum();
        let rescale = (1.0 - n_floored as f32 * params.min_weight) / unfloored_sum;
        for (w, &f) in weights.iter_mut().zip(&floored) {
            if f {
                debug!(weight = *w, floor = params.min_weight, "flooring weight");
                *w = params.min_weight;
            } else {
                *w *= rescale;
            }
        }
    }

    let components = means
        .into_iter()
        .zip(variances)
        .zip(weights)
        .map(|((mean, variance), weight)| Component {
            mean,
            variance,
            weight,
        })
        .collect();
    Ok(DiagGmm::new(dim, components))
}
