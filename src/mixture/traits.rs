use crate::error::Result;

/// Common interface for hard clustering: one label per input point.
pub trait Clustering {
    /// Fit the model and return one cluster label per input point.
    ///
    /// For mixture models the label is the component with the largest
    /// responsibility (lowest index wins exact ties).
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}

/// Interface for soft clustering: a probability distribution per point.
pub trait SoftClustering {
    /// Fit the model and return each point's responsibilities, one row per
    /// point, each row summing to 1 across clusters.
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;
}
