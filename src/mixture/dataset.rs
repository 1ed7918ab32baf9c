use crate::error::{Error, Result};

/// A validated, immutable view over a dense feature matrix.
///
/// Construction checks the whole matrix once: non-empty, dimension at least
/// 1, every row the same length. Both fitting phases then index rows without
/// re-validating.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FeatureSet<'a> {
    data: &'a [Vec<f32>],
    dim: usize,
}

impl<'a> FeatureSet<'a> {
    pub(crate) fn new(data: &'a [Vec<f32>]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let dim = data[0].len();
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        for row in data.iter().skip(1) {
            if row.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: row.len(),
                });
            }
        }

        Ok(Self { data, dim })
    }

    /// Number of samples.
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Dimensionality of each sample.
    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    /// The `i`-th sample.
    #[inline]
    pub(crate) fn row(&self, i: usize) -> &'a [f32] {
        &self.data[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(FeatureSet::new(&data), Err(Error::EmptyInput)));
    }

    #[test]
    fn rejects_zero_dimension() {
        let data = vec![vec![]];
        assert!(matches!(
            FeatureSet::new(&data),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let data = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            FeatureSet::new(&data),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn exposes_rows() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let features = FeatureSet::new(&data).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.dim(), 2);
        assert_eq!(features.row(1), &[3.0, 4.0]);
    }
}
