use crate::error::{Error, Result};

/// One Gaussian component of a diagonal-covariance mixture.
#[derive(Clone, Debug)]
pub struct Component {
    /// Mean vector (length = model dimensionality).
    pub mean: Vec<f32>,
    /// Per-dimension variance (diagonal covariance), strictly positive.
    pub variance: Vec<f32>,
    /// Mixing weight in `(0, 1]`; weights sum to 1 across the model.
    pub weight: f32,
}

impl Component {
    /// Evaluate the diagonal Gaussian density at `x`.
    ///
    /// ```text
    /// N(x) = (2π)^(-D/2) · Π_d σ_d⁻¹ · exp(-½ Σ_d (x_d - μ_d)² / σ²_d)
    /// ```
    ///
    /// Callers guarantee strictly positive variances; a zero variance would
    /// divide by zero here.
    pub fn density(&self, x: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), self.mean.len());

        let mut exponent = 0.0_f32;
        let mut sigma_product = 1.0_f32;
        for ((&xd, &mean), &variance) in x.iter().zip(&self.mean).zip(&self.variance) {
            let d = xd - mean;
            exponent += d * d / variance;
            sigma_product *= variance.sqrt();
        }

        let dim = self.mean.len() as f32;
        let norm = std::f32::consts::TAU.powf(-dim / 2.0) / sigma_product;
        norm * (-0.5 * exponent).exp()
    }
}

/// A fitted diagonal-covariance Gaussian mixture model.
///
/// Holds one [`Component`] per mixture. Produced by
/// [`GaussianMixture::fit`](super::GaussianMixture::fit); both fitting phases
/// pass values of this type between them rather than mutating shared state.
#[derive(Clone, Debug)]
pub struct DiagGmm {
    dim: usize,
    components: Vec<Component>,
}

impl DiagGmm {
    pub(crate) fn new(dim: usize, components: Vec<Component>) -> Self {
        Self { dim, components }
    }

    /// Number of mixture components.
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Dimensionality of the fitted space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// All components, in index order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub(crate) fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }

    /// Weighted density of `x` under component `i`: `w_i · N(x; μ_i, σ²_i)`.
    pub fn weighted_density(&self, i: usize, x: &[f32]) -> f32 {
        let c = &self.components[i];
        c.weight * c.density(x)
    }

    /// Responsibilities of each component for `x`: a probability
    /// distribution over components (sums to 1).
    ///
    /// Fails with [`Error::NumericDegeneracy`] if every component's density
    /// underflows to zero at `x`, and with [`Error::DimensionMismatch`] if
    /// `x` has the wrong length.
    pub fn responsibilities(&self, x: &[f32]) -> Result<Vec<f32>> {
        self.check_dim(x)?;

        let mut resp: Vec<f32> = (0..self.components.len())
            .map(|i| self.weighted_density(i, x))
            .collect();
        let mass: f32 = resp.iter().sum();
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(Error::NumericDegeneracy {
                context: "total density mass for a sample is zero or non-finite",
            });
        }
        for r in &mut resp {
            *r /= mass;
        }
        Ok(resp)
    }

    /// Hard label for `x`: the component with the largest weighted density.
    ///
    /// Components are scanned in index order and only a strictly larger
    /// value replaces the incumbent, so the lowest index wins exact ties.
    pub fn predict(&self, x: &[f32]) -> Result<usize> {
        self.check_dim(x)?;

        let mut best = 0;
        let mut best_mass = self.weighted_density(0, x);
        for i in 1..self.components.len() {
            let mass = self.weighted_density(i, x);
            if mass > best_mass {
                best_mass = mass;
                best = i;
            }
        }
        Ok(best)
    }

    fn check_dim(&self, x: &[f32]) -> Result<()> {
        if x.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                found: x.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_model() -> DiagGmm {
        DiagGmm::new(
            2,
            vec![
                Component {
                    mean: vec![0.0, 0.0],
                    variance: vec![1.0, 1.0],
                    weight: 0.5,
                },
                Component {
                    mean: vec![4.0, 4.0],
                    variance: vec![1.0, 1.0],
                    weight: 0.5,
                },
            ],
        )
    }

    #[test]
    fn density_peaks_at_mean() {
        let model = unit_model();
        let c = &model.components()[0];
        // Standard 2D unit Gaussian at its mean: 1 / 2π.
        let at_mean = c.density(&[0.0, 0.0]);
        assert!((at_mean - 1.0 / std::f32::consts::TAU).abs() < 1e-6);
        assert!(c.density(&[1.0, 1.0]) < at_mean);
    }

    #[test]
    fn responsibilities_normalize() {
        let model = unit_model();
        let resp = model.responsibilities(&[1.0, 1.0]).unwrap();
        assert_eq!(resp.len(), 2);
        assert!((resp.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        // Closer to component 0 than 1.
        assert!(resp[0] > resp[1]);
    }

    #[test]
    fn predict_picks_nearest_component() {
        let model = unit_model();
        assert_eq!(model.predict(&[0.5, 0.5]).unwrap(), 0);
        assert_eq!(model.predict(&[3.5, 3.5]).unwrap(), 1);
    }

    #[test]
    fn predict_breaks_ties_by_lowest_index() {
        let model = unit_model();
        // Exactly halfway between two identical-shape components.
        assert_eq!(model.predict(&[2.0, 2.0]).unwrap(), 0);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let model = unit_model();
        assert!(matches!(
            model.predict(&[0.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn zero_mass_is_an_error() {
        let model = unit_model();
        // Far enough away that both f32 densities underflow to zero.
        let err = model.responsibilities(&[1e6, 1e6]).unwrap_err();
        assert!(matches!(err, Error::NumericDegeneracy { .. }));
    }
}
