///////////////////////////////////////////////////////////////
///////////////////// module: space ///////////////////////////
///////////////////////////////////////////////////////////////

/// Module space maintains the point set a clustering run works on.
///
/// - Distances are obtained by the free function dist(p : &[Coordinate], q : &[Coordinate]) -> Distance
/// - The number of points is n(), their dimension dim()
/// - Points can be accessed via point_iter() or get(idx)
///
/// Point sets can be built from nested vectors (by_ndpoints), from a text stream or file
/// (by_reader, by_file), by joining two id-keyed files (by_joined_files), or randomly (new_random).
///
use crate::error::{reserve_vec, KMeansError, Parameter, Result};
use crate::types::{Coordinate, Dimension, Distance, PointCount, PointIdx};

use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Returns the euclidean distance between two points of the same dimension.
pub fn dist(p: &[Coordinate], q: &[Coordinate]) -> Distance {
    debug_assert_eq!(p.len(), q.len(), "Cannot measure the distance between points of dimension {} and {}", p.len(), q.len());
    let mut sum: Distance = 0.0;
    for (x, y) in p.iter().zip(q.iter()) {
        let diff = x - y;
        sum += diff * diff;
    }
    sum.sqrt()
}

/// A finite set of n points in d-dimensional euclidean space (d >= 1).
/// Every point has exactly dim() coordinates; this is checked on construction.
/// A point set is never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    positions: Vec<Vec<Coordinate>>,
    dim: Dimension,
}

impl PointSet {
    /// Creates a new [PointSet] from a vector of positions.
    ///
    /// # Errors
    ///
    /// Fails with InvalidParameters if there are no points, if the first point has no
    /// coordinates, if two points differ in dimension, or if a coordinate is not finite.
    ///
    /// # Example
    ///
    /// ```rust
    /// use k_means_kernel::PointSet;
    /// let space = PointSet::by_ndpoints(vec!(vec!(0.0,0.0), vec!(3.0,4.0))).unwrap();
    /// assert_eq!(space.n(), 2);
    /// assert_eq!(space.dim(), 2);
    /// assert_eq!(k_means_kernel::dist(space.get(0), space.get(1)), 5.0);
    /// ```
    pub fn by_ndpoints(positions: Vec<Vec<Coordinate>>) -> Result<PointSet> {
        let dim = match positions.first() {
            Some(first) => first.len(),
            None => return Err(KMeansError::invalid(Parameter::Points, "the point set is empty")),
        };
        if dim == 0 {
            return Err(KMeansError::invalid(Parameter::Dimension, "points must have at least one coordinate"));
        }
        for (i, p) in positions.iter().enumerate() {
            if p.len() != dim {
                return Err(KMeansError::invalid(
                    Parameter::Dimension,
                    format!("point {} has {} coordinates, but point 0 has {}", i, p.len(), dim),
                ));
            }
            if p.iter().any(|x| !x.is_finite()) {
                return Err(KMeansError::invalid(Parameter::Points, format!("point {} has a non-finite coordinate", i)));
            }
        }
        Ok(PointSet { positions, dim })
    }

    /// Creates a new [PointSet] from slices by copying all coordinates into owned storage.
    pub fn by_slices(positions: &[Vec<Coordinate>]) -> Result<PointSet> {
        let mut owned = reserve_vec(positions.len(), "points")?;
        for p in positions {
            let mut row = reserve_vec(p.len(), "points")?;
            row.extend_from_slice(p);
            owned.push(row);
        }
        PointSet::by_ndpoints(owned)
    }

    /// Creates a new [PointSet] with n random points in the [-100,100]^dim box.
    pub fn new_random(n: PointCount, dim: Dimension) -> Result<PointSet> {
        let mut rng = rand::thread_rng();
        let positions = (0..n)
            .map(|_| (0..dim).map(|_| rng.gen_range(-100.0..100.0)).collect())
            .collect();
        PointSet::by_ndpoints(positions)
    }

    /// Loads a new [PointSet] from a text stream.
    /// Each non-blank line contains one point with its coordinates separated by a comma.
    /// The dimension is fixed by the first line.
    ///
    /// Example:
    /// ```txt
    /// -8.19,-7.88
    /// -8.06,-6.58
    /// -7.3,-6.9
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with MalformedInput if a line has a different number of fields than the first one,
    /// if a field cannot be parsed, or if the stream contains no points.
    pub fn by_reader<R: BufRead>(reader: R, expected_number_of_points: PointCount) -> Result<PointSet> {
        let mut positions: Vec<Vec<Coordinate>> = reserve_vec(expected_number_of_points, "points")?;
        let mut dim: Option<Dimension> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let point = parse_row(&line, line_number)?;
            match dim {
                None => dim = Some(point.len()),
                Some(d) if d != point.len() => {
                    return Err(KMeansError::malformed(
                        line_number,
                        format!("expected {} fields, found {}", d, point.len()),
                    ));
                }
                _ => {}
            }
            positions.push(point);
        }

        if positions.is_empty() {
            return Err(KMeansError::malformed(0, "no points found"));
        }
        log::debug!("loaded {} points of dimension {}", positions.len(), dim.unwrap_or(0));
        PointSet::by_ndpoints(positions)
    }

    /// Loads a new [PointSet] from a text file in the format of [PointSet::by_reader].
    /// The expected_number_of_points is used to allocate enough storage.
    pub fn by_file<P: AsRef<Path>>(file_path: P, expected_number_of_points: PointCount) -> Result<PointSet> {
        let f = BufReader::new(File::open(file_path.as_ref())?);
        let space = PointSet::by_reader(f, expected_number_of_points)?;
        log::info!("loaded {} points from '{}'", space.n(), file_path.as_ref().display());
        Ok(space)
    }

    /// Loads two text files whose lines have the form `id,x_1,...,x_m` and joins them on the id.
    /// Only ids present in both files are kept. The result is sorted by ascending id and each
    /// point consists of the coordinates of the first file followed by those of the second file.
    ///
    /// Returns the sorted ids together with the joined point set.
    ///
    /// # Errors
    ///
    /// Fails with MalformedInput if a file is not well formed, if a line has no coordinates
    /// besides the id, or if an id appears twice in one file.
    /// Fails with InvalidParameters if the files have no id in common.
    pub fn by_joined_files<P: AsRef<Path>, Q: AsRef<Path>>(file_path_1: P, file_path_2: Q) -> Result<(Vec<Coordinate>, PointSet)> {
        let first = read_keyed_rows(BufReader::new(File::open(file_path_1)?))?;
        let second = read_keyed_rows(BufReader::new(File::open(file_path_2)?))?;
        join_keyed_rows(first, second)
    }

    /// Returns the number of points.
    pub fn n(&self) -> PointCount {
        self.positions.len()
    }

    /// Returns the dimension of the points.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Returns the coordinates of the point with index idx.
    pub fn get(&self, idx: PointIdx) -> &[Coordinate] {
        &self.positions[idx]
    }

    /// Provides an iterator over the coordinates of all points.
    pub fn point_iter(&self) -> impl Iterator<Item = &[Coordinate]> {
        self.positions.iter().map(|p| p.as_slice())
    }
}

fn parse_row(line: &str, line_number: usize) -> Result<Vec<Coordinate>> {
    line.split(',')
        .map(|field| {
            field.trim().parse::<Coordinate>().map_err(|_| {
                KMeansError::malformed(line_number, format!("cannot parse '{}' as a number", field.trim()))
            })
        })
        .collect()
}

/// One parsed line of an id-keyed file.
struct KeyedRow {
    line: usize,
    id: Coordinate,
    coords: Vec<Coordinate>,
}

fn read_keyed_rows<R: BufRead>(reader: R) -> Result<Vec<KeyedRow>> {
    let mut rows = Vec::new();
    let mut width: Option<usize> = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut row = parse_row(&line, line_number)?;
        if row.len() < 2 {
            return Err(KMeansError::malformed(line_number, "expected an id followed by at least one coordinate"));
        }
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(KMeansError::malformed(line_number, format!("expected {} fields, found {}", w, row.len())));
            }
            _ => {}
        }
        let id = row.remove(0);
        rows.push(KeyedRow { line: line_number, id, coords: row });
    }
    Ok(rows)
}

fn join_keyed_rows(first: Vec<KeyedRow>, second: Vec<KeyedRow>) -> Result<(Vec<Coordinate>, PointSet)> {
    // ids are compared by their bit pattern; -0.0 is folded into 0.0
    let key = |id: Coordinate| if id == 0.0 { 0.0f64.to_bits() } else { id.to_bits() };

    let mut second_by_id: HashMap<u64, Vec<Coordinate>> = HashMap::with_capacity(second.len());
    for KeyedRow { line, id, coords } in second {
        if second_by_id.insert(key(id), coords).is_some() {
            return Err(KMeansError::malformed(line, format!("id {} appears twice in the second file", id)));
        }
    }

    let mut seen: HashSet<u64> = HashSet::with_capacity(first.len());
    let mut joined: Vec<(Coordinate, Vec<Coordinate>)> = Vec::new();
    for KeyedRow { line, id, mut coords } in first {
        if !seen.insert(key(id)) {
            return Err(KMeansError::malformed(line, format!("id {} appears twice in the first file", id)));
        }
        if let Some(other) = second_by_id.get(&key(id)) {
            coords.extend_from_slice(other);
            joined.push((id, coords));
        }
    }

    if joined.is_empty() {
        return Err(KMeansError::invalid(Parameter::Points, "the two inputs have no id in common"));
    }
    joined.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (ids, positions): (Vec<Coordinate>, Vec<Vec<Coordinate>>) = joined.into_iter().unzip();
    Ok((ids, PointSet::by_ndpoints(positions)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn dist_is_euclidean() {
        assert_relative_eq!(dist(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_relative_eq!(dist(&[1.5, -2.0, 7.0], &[1.5, -2.0, 7.0]), 0.0);
        assert_relative_eq!(dist(&[1.0], &[-1.0]), 2.0);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let err = PointSet::by_ndpoints(vec![vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Dimension));
    }

    #[test]
    fn rejects_empty_and_zero_dimensional_sets() {
        let err = PointSet::by_ndpoints(vec![]).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Points));
        let err = PointSet::by_ndpoints(vec![vec![], vec![]]).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Dimension));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let err = PointSet::by_ndpoints(vec![vec![0.0, 1.0], vec![f64::NAN, 2.0]]).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Points));
    }

    #[test]
    fn reads_comma_separated_points() {
        let input = "1.0,2.0\n-3.5,4\n\n0,0\n";
        let space = PointSet::by_reader(Cursor::new(input), 4).unwrap();
        assert_eq!(space.n(), 3);
        assert_eq!(space.dim(), 2);
        assert_eq!(space.get(1), &[-3.5, 4.0]);
    }

    #[test]
    fn reader_rejects_inconsistent_field_count() {
        let input = "1.0,2.0\n3.0,4.0,5.0\n";
        match PointSet::by_reader(Cursor::new(input), 2) {
            Err(KMeansError::MalformedInput { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn reader_rejects_unparsable_fields_and_empty_input() {
        assert!(matches!(
            PointSet::by_reader(Cursor::new("1.0,abc\n"), 1),
            Err(KMeansError::MalformedInput { line: 1, .. })
        ));
        assert!(matches!(
            PointSet::by_reader(Cursor::new("\n\n"), 1),
            Err(KMeansError::MalformedInput { .. })
        ));
    }

    #[test]
    fn joins_on_common_ids_sorted() {
        let first = read_keyed_rows(Cursor::new("3,30.0\n1,10.0\n2,20.0\n7,70.0\n")).unwrap();
        let second = read_keyed_rows(Cursor::new("2,0.2,0.22\n1,0.1,0.11\n3,0.3,0.33\n9,0.9,0.99\n")).unwrap();
        let (ids, space) = join_keyed_rows(first, second).unwrap();
        assert_eq!(ids, vec![1.0, 2.0, 3.0]);
        assert_eq!(space.dim(), 3);
        assert_eq!(space.get(0), &[10.0, 0.1, 0.11]);
        assert_eq!(space.get(2), &[30.0, 0.3, 0.33]);
    }

    #[test]
    fn join_rejects_duplicate_ids() {
        let first = read_keyed_rows(Cursor::new("1,1.0\n1,2.0\n")).unwrap();
        let second = read_keyed_rows(Cursor::new("1,3.0\n")).unwrap();
        assert!(matches!(join_keyed_rows(first, second), Err(KMeansError::MalformedInput { line: 2, .. })));
    }

    #[test]
    fn duplicate_id_reports_file_line_after_blank_lines() {
        let first = read_keyed_rows(Cursor::new("1,1.0\n\n1,2.0\n")).unwrap();
        let second = read_keyed_rows(Cursor::new("1,3.0\n")).unwrap();
        assert!(matches!(join_keyed_rows(first, second), Err(KMeansError::MalformedInput { line: 3, .. })));

        let first = read_keyed_rows(Cursor::new("1,1.0\n")).unwrap();
        let second = read_keyed_rows(Cursor::new("\n2,3.0\n\n2,4.0\n")).unwrap();
        assert!(matches!(join_keyed_rows(first, second), Err(KMeansError::MalformedInput { line: 4, .. })));
    }

    #[test]
    fn join_without_common_ids_fails() {
        let first = read_keyed_rows(Cursor::new("1,1.0\n")).unwrap();
        let second = read_keyed_rows(Cursor::new("2,3.0\n")).unwrap();
        let err = join_keyed_rows(first, second).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Points));
    }

    #[test]
    fn random_points_are_in_box() {
        let space = PointSet::new_random(50, 3).unwrap();
        assert_eq!(space.n(), 50);
        assert_eq!(space.dim(), 3);
        for p in space.point_iter() {
            assert!(p.iter().all(|x| (-100.0..100.0).contains(x)));
        }
    }
}
