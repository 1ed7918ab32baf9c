//! Diagonal-covariance Gaussian mixture fitting.
//!
//! `gmix` fits a Gaussian Mixture Model with per-dimension (diagonal)
//! covariance to dense feature vectors, in two phases: hard-assignment
//! k-means initialization (with automatic repair of under-populated
//! clusters), then soft-assignment EM refinement.
//!
//! The primary public API is under [`mixture`], which provides:
//! - [`GaussianMixture`]: the fit pipeline (k-means → EM)
//! - [`DiagGmm`]: the fitted model (means, variances, weights)

#![forbid(unsafe_code)]

pub mod error;
pub mod mixture;

pub use error::{Error, Result};
pub use mixture::{
    Clustering, Component, Convergence, DiagGmm, FitReport, GaussianMixture, GmmFit, GmmParams,
    Init, PhaseReport, SoftClustering,
};
