use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// The input a [KMeansError::InvalidParameters] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    NumberOfClusters,
    MaximumIteration,
    Epsilon,
    Dimension,
    Points,
    InitialCentroids,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Parameter::NumberOfClusters => "number of clusters",
            Parameter::MaximumIteration => "maximum iteration",
            Parameter::Epsilon => "epsilon",
            Parameter::Dimension => "dimension",
            Parameter::Points => "points",
            Parameter::InitialCentroids => "initial centroids",
        };
        write!(f, "{}", name)
    }
}

/// Error type of all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum KMeansError {
    /// The parameters do not describe a valid clustering run. Detected before any computation.
    #[error("invalid {parameter}: {reason}")]
    InvalidParameters { parameter: Parameter, reason: String },

    /// Working storage for points, centroids or accumulators could not be reserved.
    #[error("cannot allocate storage for {what}")]
    ResourceExhaustion {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// A line of a text input could not be turned into a point.
    #[error("malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KMeansError {
    pub(crate) fn invalid(parameter: Parameter, reason: impl Into<String>) -> KMeansError {
        KMeansError::InvalidParameters {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> KMeansError {
        KMeansError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    /// Returns the offending parameter if this is an [KMeansError::InvalidParameters].
    pub fn parameter(&self) -> Option<Parameter> {
        match self {
            KMeansError::InvalidParameters { parameter, .. } => Some(*parameter),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KMeansError>;

/// Creates an empty vector that can hold `capacity` elements without reallocating.
/// A failed reservation is reported as [KMeansError::ResourceExhaustion] instead of aborting.
pub(crate) fn reserve_vec<T>(capacity: usize, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|source| KMeansError::ResourceExhaustion { what, source })?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameters_message_names_parameter() {
        let err = KMeansError::invalid(Parameter::NumberOfClusters, "k = 1, but we need 1 < k < n = 4");
        assert_eq!(err.to_string(), "invalid number of clusters: k = 1, but we need 1 < k < n = 4");
        assert_eq!(err.parameter(), Some(Parameter::NumberOfClusters));
    }

    #[test]
    fn oversized_reservation_is_resource_exhaustion() {
        let res: Result<Vec<u64>> = reserve_vec(usize::MAX, "test buffer");
        match res {
            Err(KMeansError::ResourceExhaustion { what, .. }) => assert_eq!(what, "test buffer"),
            other => panic!("expected ResourceExhaustion, got {:?}", other),
        }
    }

    #[test]
    fn reserved_vec_is_empty_with_capacity() {
        let v: Vec<f64> = reserve_vec(16, "test buffer").unwrap();
        assert!(v.is_empty());
        assert!(v.capacity() >= 16);
    }
}
