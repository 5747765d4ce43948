use crate::clustering::Centroids;
use crate::error::{reserve_vec, KMeansError, Parameter, Result};
use crate::space::{dist, PointSet};
use crate::types::{CenterIdx, Distance};

/// Assigns each point to its closest centroid and returns the centroid index for each point.
///
/// Centroids are scanned in index order and the running minimum is only replaced on a strictly
/// smaller distance, so a point at equal distance to several centroids goes to the one with the
/// smallest index.
///
/// # Errors
/// Fails with InvalidParameters if there are no centroids, and with ResourceExhaustion if the
/// assignment cannot be allocated.
pub(crate) fn assign_clusters(space: &PointSet, centroids: &Centroids) -> Result<Vec<CenterIdx>> {
    if centroids.k() == 0 {
        return Err(KMeansError::invalid(Parameter::NumberOfClusters, "cannot assign points to an empty set of centroids"));
    }

    let mut assignment: Vec<CenterIdx> = reserve_vec(space.n(), "the assignment")?;
    for p in space.point_iter() {
        let mut min_dist: Distance = Distance::INFINITY;
        let mut min_index: CenterIdx = 0;
        for (j, c) in centroids.iter().enumerate() {
            let d = dist(p, c);
            if d < min_dist {
                min_dist = d;
                min_index = j;
            }
        }
        assignment.push(min_index);
    }
    Ok(assignment)
}
