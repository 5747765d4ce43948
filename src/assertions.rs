use crate::clustering::Centroids;
use crate::error::{KMeansError, Parameter, Result};
use crate::space::PointSet;
use crate::ClusteringProblem;

/// Checks the parameters of a clustering problem that do not depend on the data:
/// * k must be bigger than 1.
/// * max_iter must be at least 1.
/// * epsilon must be a finite, non-negative number.
pub fn assert_problem_parameters(prob: &ClusteringProblem) -> Result<()> {
    if prob.k <= 1 {
        return Err(KMeansError::invalid(
            Parameter::NumberOfClusters,
            format!("we have k = {}, but there should be at least two clusters", prob.k),
        ));
    }
    if prob.max_iter == 0 {
        return Err(KMeansError::invalid(Parameter::MaximumIteration, "at least one iteration is needed"));
    }
    if !prob.epsilon.is_finite() || prob.epsilon < 0.0 {
        return Err(KMeansError::invalid(
            Parameter::Epsilon,
            format!("we have epsilon = {}, but it must be a finite non-negative number", prob.epsilon),
        ));
    }
    Ok(())
}

/// Checks a clustering problem together with the data it is run on.
/// If this check passes, the main loop runs without further validation.
///
/// # Inputs
/// * the [PointSet];
/// * a [ClusteringProblem];
/// * the initial [Centroids].
///
/// # Errors
/// Fails with InvalidParameters if one of the following does not hold:
/// * the conditions of [assert_problem_parameters].
/// * n must be bigger than k.
/// * there are exactly k initial centroids.
/// * the initial centroids have the dimension of the points.
pub fn assert_clustering_problem(space: &PointSet, prob: &ClusteringProblem, initial: &Centroids) -> Result<()> {
    assert_problem_parameters(prob)?;
    if space.n() <= prob.k {
        return Err(KMeansError::invalid(
            Parameter::NumberOfClusters,
            format!("we have n <= k ({} <= {}), but we need more points than clusters", space.n(), prob.k),
        ));
    }
    if initial.k() != prob.k {
        return Err(KMeansError::invalid(
            Parameter::InitialCentroids,
            format!("{} initial centroids given for k = {} clusters", initial.k(), prob.k),
        ));
    }
    if initial.dim() != space.dim() {
        return Err(KMeansError::invalid(
            Parameter::Dimension,
            format!("the initial centroids have dimension {}, but the points have dimension {}", initial.dim(), space.dim()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PointSet {
        PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap()
    }

    #[test]
    fn accepts_valid_problem() {
        let prob = ClusteringProblem::new(2).with_max_iter(10).with_epsilon(0.0);
        let initial = Centroids::new(&[vec![0.0, 0.0], vec![10.0, 0.0]]).unwrap();
        assert!(assert_clustering_problem(&square(), &prob, &initial).is_ok());
    }

    #[test]
    fn rejects_bad_problem_parameters() {
        let cases = [
            (ClusteringProblem::new(1), Parameter::NumberOfClusters),
            (ClusteringProblem::new(0), Parameter::NumberOfClusters),
            (ClusteringProblem::new(2).with_max_iter(0), Parameter::MaximumIteration),
            (ClusteringProblem::new(2).with_epsilon(-0.1), Parameter::Epsilon),
            (ClusteringProblem::new(2).with_epsilon(f64::NAN), Parameter::Epsilon),
        ];
        for (prob, parameter) in cases.iter() {
            assert_eq!(assert_problem_parameters(prob).unwrap_err().parameter(), Some(*parameter));
        }
    }

    #[test]
    fn rejects_k_not_smaller_than_n() {
        let space = square();
        for k in [4, 5] {
            let prob = ClusteringProblem::new(k);
            let initial = Centroids::from_first_points(&space, 4).unwrap();
            let err = assert_clustering_problem(&space, &prob, &initial).unwrap_err();
            assert_eq!(err.parameter(), Some(Parameter::NumberOfClusters));
        }
    }

    #[test]
    fn rejects_mismatching_initial_centroids() {
        let prob = ClusteringProblem::new(2);
        let three = Centroids::new(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]]).unwrap();
        let err = assert_clustering_problem(&square(), &prob, &three).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::InitialCentroids));

        let flat = Centroids::new(&[vec![0.0], vec![1.0]]).unwrap();
        let err = assert_clustering_problem(&square(), &prob, &flat).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Dimension));
    }
}
