use crate::clustering::Centroids;
use crate::space::dist;
use crate::types::Distance;

/// Returns true iff no centroid moved by more than epsilon between old and new.
pub(crate) fn has_converged(old: &Centroids, new: &Centroids, epsilon: Distance) -> bool {
    debug_assert_eq!(old.k(), new.k(), "cannot compare centroid sets of different size");
    old.iter().zip(new.iter()).all(|(o, n)| dist(o, n) <= epsilon)
}

/// Returns the largest distance a centroid moved between old and new.
pub(crate) fn max_shift(old: &Centroids, new: &Centroids) -> Distance {
    old.iter()
        .zip(new.iter())
        .map(|(o, n)| dist(o, n))
        .fold(0.0, Distance::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converged_iff_every_shift_within_epsilon() {
        let old = Centroids::new(&[vec![0.0, 0.0], vec![10.0, 0.0]]).unwrap();
        let new = Centroids::new(&[vec![0.0, 0.5], vec![10.0, 0.0]]).unwrap();
        assert!(has_converged(&old, &new, 0.5));
        assert!(has_converged(&old, &new, 1.0));
        assert!(!has_converged(&old, &new, 0.4999));
        assert!(has_converged(&old, &old, 0.0));
        assert_eq!(max_shift(&old, &new), 0.5);
    }
}
