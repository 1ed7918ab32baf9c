//! The fit pipeline: k-means initialization followed by EM refinement.

use tracing::debug;

use super::dataset::FeatureSet;
use super::model::DiagGmm;
use super::traits::{Clustering, SoftClustering};
use super::{em, kmeans};
use crate::error::{Error, Result};

/// Mean-seeding policy for the k-means phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Init {
    /// Mixture `i` starts at sample `i`'s feature vector.
    #[default]
    FirstK,
    /// Mixtures start at distinct samples drawn uniformly at random; a fixed
    /// seed makes the draw (and hence the whole fit) reproducible.
    Random {
        /// Optional RNG seed.
        seed: Option<u64>,
    },
}

/// Tuning parameters for both fitting phases.
#[derive(Clone, Debug)]
pub struct GmmParams {
    /// Minimum member count below which a k-means cell is repaired.
    pub min_samples: usize,
    /// Weight floor applied after the k-means phase.
    pub min_weight: f32,
    /// Iteration cap for the k-means loop.
    pub max_iter: usize,
    /// K-means stops once the summed squared mean movement falls below this.
    pub threshold: f32,
    /// Offset added to every dimension of a repaired cell's replanted mean.
    pub perturb: f32,
    /// EM stops once the summed absolute parameter movement falls below this.
    pub em_threshold: f32,
    /// Iteration cap for the EM loop.
    pub em_max_iter: usize,
    /// Mean-seeding policy.
    pub init: Init,
}

impl Default for GmmParams {
    fn default() -> Self {
        Self {
            min_samples: 2,
            min_weight: 0.02,
            max_iter: 1000,
            threshold: 1e-4,
            perturb: 1e-3,
            em_threshold: 1e-4,
            em_max_iter: 1000,
            init: Init::FirstK,
        }
    }
}

/// How an iterative phase stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// The phase's change measure fell below its threshold.
    Converged,
    /// The iteration cap elapsed first. For k-means this is an ordinary way
    /// to stop; for EM it means the refinement did not converge and the
    /// returned parameters are the estimate at the cap.
    IterationLimit,
}

/// Iteration statistics for one phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseReport {
    /// Number of completed iterations.
    pub iterations: usize,
    /// The change measure after the last completed iteration.
    pub delta: f32,
    /// How the phase stopped.
    pub convergence: Convergence,
}

/// Diagnostics for a whole fit.
#[derive(Clone, Copy, Debug)]
pub struct FitReport {
    /// K-means phase statistics.
    pub kmeans: PhaseReport,
    /// EM phase statistics.
    pub em: PhaseReport,
    /// Number of bad-cell repairs performed during k-means.
    pub repairs: usize,
}

/// A fitted model together with its fit diagnostics.
#[derive(Clone, Debug)]
pub struct GmmFit {
    /// The fitted mixture model.
    pub model: DiagGmm,
    /// Iteration and repair statistics.
    pub report: FitReport,
}

/// Diagonal-covariance Gaussian mixture estimator.
///
/// Configure with the builder methods, then call [`fit`](Self::fit).
///
/// ```rust
/// use gmix::GaussianMixture;
///
/// let data = vec![
///     vec![0.0_f32, 0.0],
///     vec![0.1, 0.1],
///     vec![0.2, 0.0],
///     vec![6.0, 6.0],
///     vec![6.1, 6.1],
///     vec![5.9, 6.2],
/// ];
/// let fit = GaussianMixture::new(2).fit(&data).unwrap();
/// assert_eq!(fit.model.n_components(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct GaussianMixture {
    n_components: usize,
    params: GmmParams,
}

impl GaussianMixture {
    /// Create an estimator with `n_components` mixtures and default
    /// parameters.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            params: GmmParams::default(),
        }
    }

    /// Replace the whole parameter set.
    pub fn with_params(mut self, params: GmmParams) -> Self {
        self.params = params;
        self
    }

    /// Set the minimum member count below which a k-means cell is repaired.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.params.min_samples = min_samples;
        self
    }

    /// Set the post-k-means weight floor.
    pub fn with_min_weight(mut self, min_weight: f32) -> Self {
        self.params.min_weight = min_weight;
        self
    }

    /// Set the k-means iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.params.max_iter = max_iter;
        self
    }

    /// Set the k-means convergence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.params.threshold = threshold;
        self
    }

    /// Set the perturbation added when replanting a repaired cell's mean.
    pub fn with_perturb(mut self, perturb: f32) -> Self {
        self.params.perturb = perturb;
        self
    }

    /// Set the EM convergence threshold.
    pub fn with_em_threshold(mut self, em_threshold: f32) -> Self {
        self.params.em_threshold = em_threshold;
        self
    }

    /// Set the EM iteration cap.
    pub fn with_em_max_iter(mut self, em_max_iter: usize) -> Self {
        self.params.em_max_iter = em_max_iter;
        self
    }

    /// Set the mean-seeding policy.
    pub fn with_init(mut self, init: Init) -> Self {
        self.params.init = init;
        self
    }

    /// Current parameters.
    pub fn params(&self) -> &GmmParams {
        &self.params
    }

    /// Fit the mixture to `data`.
    ///
    /// Runs k-means initialization, then EM refinement, and returns the
    /// final model with per-phase diagnostics. All validation failures and
    /// in-fit degeneracies abort with an error; iteration caps do not (see
    /// [`Convergence`]).
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<GmmFit> {
        let features = FeatureSet::new(data)?;
        self.validate(&features)?;
        debug!(
            n_samples = features.len(),
            dim = features.dim(),
            n_components = self.n_components,
            "fitting gaussian mixture"
        );

        let initialized = kmeans::initialize(&features, self.n_components, &self.params)?;
        let (model, em_report) = em::refine(&features, initialized.model, &self.params)?;

        Ok(GmmFit {
            model,
            report: FitReport {
                kmeans: initialized.report,
                em: em_report,
                repairs: initialized.repairs,
            },
        })
    }

    fn validate(&self, features: &FeatureSet<'_>) -> Result<()> {
        if self.n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if features.len() < self.n_components {
            return Err(Error::InvalidClusterCount {
                requested: self.n_components,
                n_samples: features.len(),
            });
        }
        if self.params.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.params.em_max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "em_max_iter",
                message: "must be at least 1",
            });
        }
        if self.params.min_weight < 0.0 || !self.params.min_weight.is_finite() {
            return Err(Error::InvalidParameter {
                name: "min_weight",
                message: "must be finite and non-negative",
            });
        }
        if self.params.min_weight * self.n_components as f32 > 1.0 {
            return Err(Error::InvalidParameter {
                name: "min_weight",
                message: "must not exceed 1 / n_components, or weights cannot sum to 1",
            });
        }
        Ok(())
    }
}

impl Clustering for GaussianMixture {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let fit = self.fit(data)?;
        data.iter().map(|x| fit.model.predict(x)).collect()
    }

    fn n_clusters(&self) -> usize {
        self.n_components
    }
}

impl SoftClustering for GaussianMixture {
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let fit = self.fit(data)?;
        data.iter().map(|x| fit.model.responsibilities(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Blobs interleaved so first-k seeding starts one mean per blob;
    // sample `i` belongs to blob `i % 3`.
    fn three_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0_f32, 0.0],
            vec![8.0, 8.0],
            vec![16.0, 0.0],
            vec![0.2, 0.1],
            vec![8.2, 8.1],
            vec![16.2, 0.1],
            vec![0.1, 0.2],
            vec![7.9, 8.2],
            vec![15.9, -0.1],
            vec![-0.1, 0.1],
            vec![8.1, 7.9],
            vec![16.1, 0.2],
        ]
    }

    #[test]
    fn fit_recovers_three_blobs() {
        let fit = GaussianMixture::new(3).fit(&three_blobs()).unwrap();

        assert_eq!(fit.report.kmeans.convergence, Convergence::Converged);
        assert_eq!(fit.report.em.convergence, Convergence::Converged);

        let weights: f32 = fit.model.components().iter().map(|c| c.weight).sum();
        assert!((weights - 1.0).abs() < 1e-5);

        // One component per blob, each holding a third of the mass.
        for c in fit.model.components() {
            assert!((c.weight - 1.0 / 3.0).abs() < 0.05);
            for &v in &c.variance {
                assert!(v > 0.0);
            }
        }
    }

    #[test]
    fn fit_predict_separates_blobs() {
        let data = three_blobs();
        let model = GaussianMixture::new(3);
        let labels = model.fit_predict(&data).unwrap();

        assert_eq!(labels.len(), data.len());
        assert!(labels.iter().all(|&l| l < 3));
        for (i, &label) in labels.iter().enumerate() {
            assert_eq!(label, labels[i % 3], "each blob must map to one component");
        }
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn fit_predict_proba_rows_normalize() {
        let data = three_blobs();
        let rows = GaussianMixture::new(3).fit_predict_proba(&data).unwrap();

        assert_eq!(rows.len(), data.len());
        for row in &rows {
            assert_eq!(row.len(), 3);
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn n_clusters_reports_configuration() {
        assert_eq!(GaussianMixture::new(5).n_clusters(), 5);
    }

    #[test]
    fn rejects_empty_input() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            GaussianMixture::new(2).fit(&data),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn rejects_zero_components() {
        let data = vec![vec![0.0_f32, 0.0]];
        assert!(matches!(
            GaussianMixture::new(0).fit(&data),
            Err(Error::InvalidParameter {
                name: "n_components",
                ..
            })
        ));
    }

    #[test]
    fn rejects_more_components_than_samples() {
        let data = vec![vec![0.0_f32, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            GaussianMixture::new(3).fit(&data),
            Err(Error::InvalidClusterCount {
                requested: 3,
                n_samples: 2
            })
        ));
    }

    #[test]
    fn rejects_unsatisfiable_weight_floor() {
        let data = three_blobs();
        let result = GaussianMixture::new(3).with_min_weight(0.5).fit(&data);
        assert!(matches!(
            result,
            Err(Error::InvalidParameter {
                name: "min_weight",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_iteration_caps() {
        let data = three_blobs();
        assert!(GaussianMixture::new(3).with_max_iter(0).fit(&data).is_err());
        assert!(GaussianMixture::new(3)
            .with_em_max_iter(0)
            .fit(&data)
            .is_err());
    }

    #[test]
    fn seeded_random_init_is_deterministic() {
        let data = three_blobs();
        let estimator = GaussianMixture::new(3).with_init(Init::Random { seed: Some(11) });

        let a = estimator.fit(&data).unwrap();
        let b = estimator.fit(&data).unwrap();
        for (ca, cb) in a.model.components().iter().zip(b.model.components()) {
            assert_eq!(ca.mean, cb.mean);
            assert_eq!(ca.variance, cb.variance);
            assert_eq!(ca.weight, cb.weight);
        }
    }
}
