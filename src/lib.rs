//! Lloyd-style k-means clustering with caller-supplied initial centroids.
//!
//! Given n points in d-dimensional euclidean space, k initial centroids, an iteration budget and
//! a tolerance epsilon, the main loop repeatedly assigns every point to its closest centroid and
//! moves every centroid to the mean of its points, until no centroid moves by more than epsilon
//! or the budget is used up.
//!
//! ```rust
//! let points = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
//! let initial = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
//! let centroids = k_means_kernel::run_kmeans(&points, &initial, 10, 1e-4).unwrap();
//! assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
//! ```

mod types;
pub use types::{Coordinate, Dimension, DurationInSec, IterationCount, PointCount};

mod error;
pub use error::{KMeansError, Parameter, Result};

mod space;
pub use space::{dist, PointSet};

mod clustering;
pub use clustering::{Centroids, Clustering, RunState};

mod assertions;
use assertions::{assert_clustering_problem, assert_problem_parameters};

mod phase1;
use phase1::assign_clusters;

mod phase2;
use phase2::update_centroids;

mod phase3;
use phase3::{has_converged, max_shift};

#[cfg(feature = "python")]
mod python_interface;

use std::collections::HashSet;

/// The parameters of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringProblem {
    /// number of clusters; 1 < k < n
    pub k: PointCount,
    /// maximal number of assignment/update passes; at least 1
    pub max_iter: IterationCount,
    /// convergence tolerance: largest centroid movement still counted as no change
    pub epsilon: f64,
}

impl ClusteringProblem {
    /// Creates a problem with k clusters, max_iter = 300 and epsilon = 0.001.
    pub fn new(k: PointCount) -> ClusteringProblem {
        ClusteringProblem {
            k,
            max_iter: 300,
            epsilon: 1e-3,
        }
    }

    pub fn with_max_iter(mut self, max_iter: IterationCount) -> ClusteringProblem {
        self.max_iter = max_iter;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> ClusteringProblem {
        self.epsilon = epsilon;
        self
    }
}

/// Who supplies the initial centroids of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Initialization {
    /// The first k points of the point set are copied.
    FirstPoints,
    /// The caller hands over exactly k centroids, which are copied.
    Centroids(Vec<Vec<Coordinate>>),
}

impl Initialization {
    fn centroids(&self, space: &PointSet, k: PointCount) -> Result<Centroids> {
        match self {
            Initialization::FirstPoints => Centroids::from_first_points(space, k.min(space.n())),
            Initialization::Centroids(given) => Centroids::new(given),
        }
    }
}

/// Computes a k-means clustering of space.
///
/// # Inputs
/// * a [PointSet];
/// * a [ClusteringProblem];
/// * the [Initialization] that supplies the k initial centroids.
///
/// # Output
/// The resulting [Clustering] and the running time of the main loop in seconds.
///
/// # Errors
/// Fails with InvalidParameters if the problem is not valid for the given points; no iteration
/// is performed in this case.
/// Fails with ResourceExhaustion if working storage cannot be allocated.
pub fn compute_k_means(space: &PointSet, prob: &ClusteringProblem, init: &Initialization) -> Result<(Clustering, DurationInSec)> {
    assert_problem_parameters(prob)?;
    let mut current = init.centroids(space, prob.k)?;
    assert_clustering_problem(space, prob, &current)?;
    warn_about_duplicates(&current);

    log::info!("** Start k-means: n = {}, d = {}, k = {}, max_iter = {}, epsilon = {}", space.n(), space.dim(), prob.k, prob.max_iter, prob.epsilon);
    let start = std::time::Instant::now();

    let mut iterations = 0;
    let mut state = RunState::Exhausted;
    while iterations < prob.max_iter {
        iterations += 1;

        let assignment = assign_clusters(space, &current)?;
        let candidate = update_centroids(space, &current, &assignment)?;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("iteration {}: largest centroid shift {}", iterations, max_shift(&current, &candidate));
        }

        let converged = has_converged(&current, &candidate, prob.epsilon);
        current = candidate;
        if converged {
            state = RunState::Converged;
            break;
        }
    }

    let total_time = start.elapsed().as_secs_f64();
    log::info!("** {:?} after {} iteration(s) in {:.4} sec", state, iterations, total_time);

    Ok((Clustering::new(current, iterations, state), total_time))
}

/// Runs k-means on points, starting from initial_centroids; k is the number of initial centroids.
/// Returns the final centroids in cluster order.
///
/// # Errors
/// Fails with InvalidParameters unless 1 < k < n, max_iter >= 1, epsilon >= 0 and all vectors
/// share one dimension.
pub fn run_kmeans(points: &[Vec<Coordinate>], initial_centroids: &[Vec<Coordinate>], max_iter: IterationCount, epsilon: f64) -> Result<Vec<Vec<Coordinate>>> {
    let space = PointSet::by_slices(points)?;
    let prob = ClusteringProblem {
        k: initial_centroids.len(),
        max_iter,
        epsilon,
    };
    let (clustering, _) = compute_k_means(&space, &prob, &Initialization::Centroids(initial_centroids.to_vec()))?;
    Ok(clustering.into_centroids().into_vecs())
}

fn warn_about_duplicates(centroids: &Centroids) {
    let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(centroids.k());
    for (j, c) in centroids.iter().enumerate() {
        if !seen.insert(c.iter().map(|x| x.to_bits()).collect()) {
            log::warn!("initial centroid {} duplicates an earlier one; its cluster will stay empty", j);
        }
    }
}
