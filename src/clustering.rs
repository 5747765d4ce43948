//////////////////////////////////////////////////////////////
//////////////////// module: clustering //////////////////////
//////////////////////////////////////////////////////////////

/// Contains the centroid set a run works on and the result of a run.
///
/// centroids: an ordered list of K centroid vectors; index j identifies cluster j
/// clustering: final centroids, number of iterations performed and the state the run ended in
///
use crate::error::{reserve_vec, KMeansError, Parameter, Result};
use crate::space::PointSet;
use crate::types::{CenterIdx, Coordinate, Dimension, IterationCount, PointCount};

use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

/// An ordered list of centroids, all of the same dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroids {
    centroids: Vec<Vec<Coordinate>>,
}

impl Centroids {
    /// Creates a centroid set by copying the given vectors.
    ///
    /// # Errors
    ///
    /// Fails with InvalidParameters if no vector is given, if the vectors have no coordinates,
    /// differ in dimension, or contain a non-finite coordinate.
    pub fn new(centroids: &[Vec<Coordinate>]) -> Result<Centroids> {
        let dim = match centroids.first() {
            Some(first) => first.len(),
            None => return Err(KMeansError::invalid(Parameter::InitialCentroids, "no centroids given")),
        };
        if dim == 0 {
            return Err(KMeansError::invalid(Parameter::Dimension, "centroids must have at least one coordinate"));
        }
        let mut copy = reserve_vec(centroids.len(), "centroids")?;
        for (j, c) in centroids.iter().enumerate() {
            if c.len() != dim {
                return Err(KMeansError::invalid(
                    Parameter::Dimension,
                    format!("centroid {} has {} coordinates, but centroid 0 has {}", j, c.len(), dim),
                ));
            }
            if c.iter().any(|x| !x.is_finite()) {
                return Err(KMeansError::invalid(Parameter::InitialCentroids, format!("centroid {} has a non-finite coordinate", j)));
            }
            let mut row = reserve_vec(dim, "centroids")?;
            row.extend_from_slice(c);
            copy.push(row);
        }
        Ok(Centroids { centroids: copy })
    }

    /// Creates a centroid set as a copy of the first k points of space.
    pub fn from_first_points(space: &PointSet, k: PointCount) -> Result<Centroids> {
        if k > space.n() {
            return Err(KMeansError::invalid(
                Parameter::NumberOfClusters,
                format!("cannot take the first {} of {} points as centroids", k, space.n()),
            ));
        }
        let mut copy = reserve_vec(k, "centroids")?;
        for p in space.point_iter().take(k) {
            let mut row = reserve_vec(p.len(), "centroids")?;
            row.extend_from_slice(p);
            copy.push(row);
        }
        Ok(Centroids { centroids: copy })
    }

    /// Wraps already validated rows. Used by the update step.
    pub(crate) fn from_rows(centroids: Vec<Vec<Coordinate>>) -> Centroids {
        Centroids { centroids }
    }

    /// Returns the number of centroids k.
    pub fn k(&self) -> PointCount {
        self.centroids.len()
    }

    /// Returns the dimension of the centroids (0 if there are none).
    pub fn dim(&self) -> Dimension {
        self.centroids.first().map_or(0, |c| c.len())
    }

    /// Returns the centroid of cluster j (from 0 to k-1).
    pub fn get(&self, j: CenterIdx) -> &[Coordinate] {
        &self.centroids[j]
    }

    /// Provides an iterator of the centroids in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[Coordinate]> {
        self.centroids.iter().map(|c| c.as_slice())
    }

    /// Consumes the centroid set and returns the raw vectors.
    pub fn into_vecs(self) -> Vec<Vec<Coordinate>> {
        self.centroids
    }

    /// Saves the centroids to a file specified by file_path, in the format of the [fmt::Display]
    /// implementation.
    ///
    /// Example:
    ///
    /// ```txt
    /// 0.0000,0.5000
    /// 10.0000,0.5000
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let mut f = File::create(file_path)?;
        writeln!(f, "{}", self)?;
        Ok(())
    }
}

/// One line per centroid; coordinates with four decimals, separated by a comma.
impl fmt::Display for Centroids {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (j, c) in self.centroids.iter().enumerate() {
            if j > 0 {
                writeln!(f)?;
            }
            let mut iter = c.iter();
            if let Some(x) = iter.next() {
                write!(f, "{:.4}", x)?;
            }
            for x in iter {
                write!(f, ",{:.4}", x)?;
            }
        }
        Ok(())
    }
}

/// The state in which a run of the main loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No centroid moved by more than epsilon in the last iteration.
    Converged,
    /// The iteration budget was used up before convergence.
    Exhausted,
}

/// The result of a k-means run.
#[derive(Debug, Clone)]
pub struct Clustering {
    centroids: Centroids,
    iterations: IterationCount,
    state: RunState,
}

impl Clustering {
    pub(crate) fn new(centroids: Centroids, iterations: IterationCount, state: RunState) -> Clustering {
        Clustering {
            centroids,
            iterations,
            state,
        }
    }

    /// Returns the final centroids.
    pub fn get_centroids(&self) -> &Centroids {
        &self.centroids
    }

    /// Returns the number of assignment/update passes that were performed.
    pub fn get_iterations(&self) -> IterationCount {
        self.iterations
    }

    pub fn get_state(&self) -> RunState {
        self.state
    }

    pub fn has_converged(&self) -> bool {
        self.state == RunState::Converged
    }

    /// Consumes the clustering and returns the final centroids.
    pub fn into_centroids(self) -> Centroids {
        self.centroids
    }
}
