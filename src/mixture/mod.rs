//! Gaussian mixture fitting for dense vectors.
//!
//! ## Hard vs Soft Assignment
//!
//! **Hard assignment** puts each sample in exactly one cluster. That is how
//! the k-means phase works, and it is cheap, but it loses information when a
//! sample genuinely sits between groups.
//!
//! **Soft assignment** gives each sample a probability distribution over
//! mixtures (its *responsibilities*). A point halfway between two components
//! might be 55% one and 45% the other. The EM phase works entirely in these
//! terms.
//!
//! ## The two phases
//!
//! ### K-means initialization
//!
//! Classic Lloyd iterations: assign each sample to the nearest mean, then
//! move each mean to the average of its samples. Repeat until the total mean
//! movement drops below a threshold or an iteration cap is hit.
//!
//! Two things are layered on top of the plain algorithm:
//!
//! - **Bad-cell repair**: a cluster that falls below `min_samples` members
//!   gets its mean replanted next to the most populous cluster's mean (plus
//!   a small perturbation on every dimension), so the next pass can split
//!   that mass in two. One repair per outer iteration.
//! - **Finalization**: per-dimension variances and a weight per mixture are
//!   computed from the final hard partition, with small weights floored to
//!   `min_weight` and the remainder rescaled so weights still sum to 1.
//!
//! ### EM refinement
//!
//! Expectation-Maximization on the diagonal-covariance mixture likelihood:
//!
//! ```text
//! p(x) = Σ_i w_i · N(x; μ_i, diag(σ²_i))
//! ```
//!
//! The E-step computes every sample's responsibilities under the current
//! parameters; the M-step re-estimates means, variances, and weights from
//! those responsibilities. Each iteration increases the data likelihood, so
//! the loop converges to a local maximum-likelihood estimate.
//!
//! **Assumptions**:
//! - Per-dimension (axis-aligned) covariance is adequate
//! - You know the number of mixtures in advance
//! - Every mixture keeps a viable share of the data (degenerate collapses
//!   are reported as errors, not papered over)
//!
//! ## Usage
//!
//! ```rust
//! use gmix::{GaussianMixture, SoftClustering};
//!
//! let data = vec![
//!     vec![0.0_f32, 0.0],
//!     vec![0.2, 0.1],
//!     vec![0.1, 0.2],
//!     vec![10.0, 10.0],
//!     vec![10.2, 10.1],
//!     vec![10.1, 10.2],
//! ];
//!
//! let fit = GaussianMixture::new(2).with_min_samples(2).fit(&data).unwrap();
//! assert_eq!(fit.model.n_components(), 2);
//!
//! // Weights sum to 1.
//! let total: f32 = fit.model.components().iter().map(|c| c.weight).sum();
//! assert!((total - 1.0).abs() < 1e-5);
//!
//! // Soft assignments: one probability row per sample.
//! let resp = GaussianMixture::new(2).fit_predict_proba(&data).unwrap();
//! assert!((resp[0].iter().sum::<f32>() - 1.0).abs() < 1e-5);
//! ```

mod dataset;
mod em;
mod gmm;
mod kmeans;
mod model;
mod traits;
mod util;

pub use gmm::{Convergence, FitReport, GaussianMixture, GmmFit, GmmParams, Init, PhaseReport};
pub use model::{Component, DiagGmm};
pub use traits::{Clustering, SoftClustering};
