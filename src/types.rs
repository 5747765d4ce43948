/// Type of the number of points in a point set.
pub type PointCount = usize;
/// Type of the dimension of the points (number of coordinates).
pub type Dimension = usize;
/// Type of a single coordinate of a point or centroid.
pub type Coordinate = f64;
/// Type of the number of iterations of the main loop.
pub type IterationCount = usize;
/// Type of the running time (in seconds).
pub type DurationInSec = f64;

pub(crate) type PointIdx = usize;
pub(crate) type Distance = f64;
pub(crate) type CenterIdx = usize;
