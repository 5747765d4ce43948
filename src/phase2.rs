use crate::clustering::Centroids;
use crate::error::{reserve_vec, Result};
use crate::space::PointSet;
use crate::types::{CenterIdx, Coordinate, PointCount};

/// Computes the new centroids as the coordinate-wise mean of the points assigned to each cluster.
///
/// The current centroids determine k and the dimension. A cluster without any point keeps its
/// current centroid, so the result always has exactly k centroids.
///
/// # Errors
/// Fails with ResourceExhaustion if the accumulators or the new centroids cannot be allocated.
pub(crate) fn update_centroids(space: &PointSet, centroids: &Centroids, assignment: &[CenterIdx]) -> Result<Centroids> {
    debug_assert_eq!(assignment.len(), space.n(), "the assignment must contain one index per point");
    let k = centroids.k();
    let dim = centroids.dim();

    // accumulators: running sum and number of points for each cluster
    let mut sums: Vec<Vec<Coordinate>> = reserve_vec(k, "the cluster sums")?;
    for _ in 0..k {
        let mut sum = reserve_vec(dim, "the cluster sums")?;
        sum.resize(dim, 0.0);
        sums.push(sum);
    }
    let mut counts: Vec<PointCount> = reserve_vec(k, "the cluster sizes")?;
    counts.resize(k, 0);

    for (p, &j) in space.point_iter().zip(assignment.iter()) {
        counts[j] += 1;
        for (s, x) in sums[j].iter_mut().zip(p.iter()) {
            *s += x;
        }
    }

    for (j, (sum, &count)) in sums.iter_mut().zip(counts.iter()).enumerate() {
        if count == 0 {
            log::warn!("cluster {} has no points; keeping its centroid", j);
            sum.copy_from_slice(centroids.get(j));
            continue;
        }
        for s in sum.iter_mut() {
            *s /= count as Coordinate;
        }
    }

    Ok(Centroids::from_rows(sums))
}
