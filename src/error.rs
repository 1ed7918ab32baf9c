use thiserror::Error;

/// Errors returned by the fitting pipeline in this crate.
///
/// Every variant is fatal: the fit aborts immediately and no partial model is
/// returned. Hitting an iteration cap is *not* an error — both phases report
/// that through [`Convergence`](crate::mixture::Convergence) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested mixture count is incompatible with the dataset.
    ///
    /// Seeding assigns one sample per mixture, so the dataset must contain at
    /// least as many samples as mixtures.
    #[error("invalid mixture count: requested {requested}, but dataset has {n_samples} samples")]
    InvalidClusterCount {
        /// Requested number of mixtures.
        requested: usize,
        /// Number of samples in the dataset.
        n_samples: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Bad-cell repair failed: even the most populous cluster has fewer than
    /// `min_samples` members, so there is no viable donor for the repair.
    #[error(
        "unrecoverable partition: largest cluster has {largest} members, \
         need at least {min_samples}"
    )]
    UnrecoverablePartition {
        /// Minimum members required per cluster.
        min_samples: usize,
        /// Member count of the most populous cluster.
        largest: usize,
    },

    /// Every mixture's k-means weight fell below the weight floor; the
    /// partition is too degenerate to normalize.
    #[error("degenerate weights: maximum weight {max_weight} is below the floor {min_weight}")]
    DegenerateWeights {
        /// Largest weight observed across all mixtures.
        max_weight: f32,
        /// Configured weight floor.
        min_weight: f32,
    },

    /// A numeric quantity the update rules divide by collapsed to zero (or
    /// went non-finite): a zero variance dimension, a sample whose total
    /// density mass underflowed in the E-step, or a mixture whose effective
    /// sample count vanished in the M-step.
    #[error("numeric degeneracy: {context}")]
    NumericDegeneracy {
        /// Which quantity degenerated.
        context: &'static str,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
