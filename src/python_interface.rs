use pyo3::create_exception;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::clustering::Clustering;
use crate::error::KMeansError;
use crate::space::PointSet;
use crate::types::{Coordinate, DurationInSec, IterationCount, PointCount};
use crate::{compute_k_means, run_kmeans, ClusteringProblem, Initialization};

create_exception!(k_means_kernel, InvalidParametersError, pyo3::exceptions::PyException);
create_exception!(k_means_kernel, ResourceExhaustionError, pyo3::exceptions::PyException);
create_exception!(k_means_kernel, MalformedInputError, pyo3::exceptions::PyException);
create_exception!(k_means_kernel, ClusteringMissingError, pyo3::exceptions::PyException);

const NOCLUSTERING: &str = "No clustering computed yet. Run fit(data, initial_centroids)";

impl From<KMeansError> for PyErr {
    fn from(err: KMeansError) -> PyErr {
        match err {
            KMeansError::InvalidParameters { .. } => InvalidParametersError::new_err(err.to_string()),
            KMeansError::ResourceExhaustion { .. } => ResourceExhaustionError::new_err(err.to_string()),
            KMeansError::MalformedInput { .. } => MalformedInputError::new_err(err.to_string()),
            KMeansError::Io(io) => pyo3::exceptions::PyIOError::new_err(io.to_string()),
        }
    }
}

/// fit(points, initial_centroids, max_iter, epsilon)
/// --
///
/// Runs k-means on points (list of n lists of d floats), starting from initial_centroids
/// (list of k lists of d floats). Returns the k final centroids.
#[pyfunction]
fn fit(points: Vec<Vec<Coordinate>>, initial_centroids: Vec<Vec<Coordinate>>, max_iter: IterationCount, epsilon: f64) -> PyResult<Vec<Vec<Coordinate>>> {
    Ok(run_kmeans(&points, &initial_centroids, max_iter, epsilon)?)
}

#[pyclass]
pub(crate) struct KMeans {
    // parameters
    prob: ClusteringProblem,

    // attributes
    clustering: Option<Clustering>,

    // information
    running_time: Option<DurationInSec>,
}

impl KMeans {
    fn get_clustering(&self) -> PyResult<&Clustering> {
        self.clustering.as_ref().ok_or_else(|| ClusteringMissingError::new_err(NOCLUSTERING))
    }

    fn delete_result(&mut self) {
        self.clustering = None;
        self.running_time = None;
    }
}

#[pymethods]
impl KMeans {
    #[new]
    #[args(k, max_iter = "300", epsilon = "0.001")]
    fn new(k: PointCount, max_iter: IterationCount, epsilon: f64) -> PyResult<KMeans> {
        let prob = ClusteringProblem { k, max_iter, epsilon };
        crate::assertions::assert_problem_parameters(&prob)?;
        Ok(KMeans {
            prob,
            clustering: None,
            running_time: None,
        })
    }

    #[getter]
    fn get_k(&self) -> PointCount {
        self.prob.k
    }

    #[getter]
    fn get_max_iter(&self) -> IterationCount {
        self.prob.max_iter
    }

    #[getter]
    fn get_epsilon(&self) -> f64 {
        self.prob.epsilon
    }

    /// Executes the algorithm.
    ///
    /// # Input:
    /// * 2d-Array. An array of n datapoints, each an array of d floats.
    /// * 2d-Array. The k initial centroids, each an array of d floats.
    ///
    /// The result can be accessed via model.centroids, model.iterations and model.converged.
    fn fit(&mut self, data: Vec<Vec<Coordinate>>, initial_centroids: Vec<Vec<Coordinate>>) -> PyResult<()> {
        self.delete_result();
        let space = PointSet::by_ndpoints(data)?;
        let (clustering, total_time) = compute_k_means(&space, &self.prob, &Initialization::Centroids(initial_centroids))?;
        self.clustering = Some(clustering);
        self.running_time = Some(total_time);
        Ok(())
    }

    /// Returns the k final centroids.
    #[getter]
    fn get_centroids(&self) -> PyResult<Vec<Vec<Coordinate>>> {
        Ok(self.get_clustering()?.get_centroids().clone().into_vecs())
    }

    /// Returns the number of assignment/update passes of the last run.
    #[getter]
    fn get_iterations(&self) -> PyResult<IterationCount> {
        Ok(self.get_clustering()?.get_iterations())
    }

    /// Returns True if the last run converged, False if it stopped at max_iter.
    #[getter]
    fn get_converged(&self) -> PyResult<bool> {
        Ok(self.get_clustering()?.has_converged())
    }

    /// Return as float specifying the running time of the computation in sec.
    #[getter]
    fn get_running_time(&self) -> PyResult<DurationInSec> {
        self.running_time.ok_or_else(|| ClusteringMissingError::new_err(NOCLUSTERING))
    }

    /// Saves the centroids in a txt-file. One line for each centroid, four decimals per coordinate.
    fn save_centroids_to_file(&self, file_path: &str) -> PyResult<()> {
        self.get_clustering()?.get_centroids().save_to_file(file_path)?;
        Ok(())
    }
}

#[pymodule]
fn k_means_kernel(py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<KMeans>()?;
    m.add_function(wrap_pyfunction!(fit, m)?)?;
    m.add("InvalidParametersError", py.get_type::<InvalidParametersError>())?;
    m.add("ResourceExhaustionError", py.get_type::<ResourceExhaustionError>())?;
    m.add("MalformedInputError", py.get_type::<MalformedInputError>())?;
    m.add("ClusteringMissingError", py.get_type::<ClusteringMissingError>())?;
    Ok(())
}
