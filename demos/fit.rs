//! Fit a diagonal-covariance GMM to a simple 2D dataset.

use gmix::{Clustering, GaussianMixture};

fn main() {
    // Three well-separated blobs in 2D, interleaved so first-k seeding
    // starts one mean per blob.
    let data: Vec<Vec<f32>> = vec![
        vec![0.0, 0.0],
        vec![5.0, 5.0],
        vec![10.0, 0.0],
        vec![0.1, 0.2],
        vec![5.1, 4.9],
        vec![10.1, 0.1],
        vec![0.2, 0.1],
        vec![4.9, 5.1],
        vec![9.9, -0.1],
        vec![-0.1, 0.1],
        vec![5.2, 5.2],
        vec![10.2, 0.2],
    ];

    let estimator = GaussianMixture::new(3).with_min_samples(2);
    let fit = estimator.fit(&data).unwrap();

    println!("=== Fit report ===");
    println!(
        "  k-means: {} iterations, delta {:.6}, {:?}, {} repairs",
        fit.report.kmeans.iterations,
        fit.report.kmeans.delta,
        fit.report.kmeans.convergence,
        fit.report.repairs
    );
    println!(
        "  EM:      {} iterations, delta {:.6}, {:?}",
        fit.report.em.iterations, fit.report.em.delta, fit.report.em.convergence
    );

    println!("\n=== Components ===");
    for (i, c) in fit.model.components().iter().enumerate() {
        println!(
            "  component {}: weight {:.3}, mean ({:.2}, {:.2}), variance ({:.4}, {:.4})",
            i, c.weight, c.mean[0], c.mean[1], c.variance[0], c.variance[1]
        );
    }

    println!("\n=== Hard assignments ===");
    let labels = estimator.fit_predict(&data).unwrap();
    for (i, label) in labels.iter().enumerate() {
        println!(
            "  point {:2} ({:5.1}, {:5.1}) => component {}",
            i, data[i][0], data[i][1], label
        );
    }

    println!("\n=== Soft assignment of a novel point ===");
    let x = vec![0.5, 0.5];
    let resp = fit.model.responsibilities(&x).unwrap();
    for (i, r) in resp.iter().enumerate() {
        println!("  p(component {} | ({:.1}, {:.1})) = {:.3}", i, x[0], x[1], r);
    }
}
