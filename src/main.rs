extern crate k_means_kernel;

use std::io;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use env_logger::Env;

use k_means_kernel::{compute_k_means, ClusteringProblem, Initialization, KMeansError, Parameter, PointSet};

const EXPECTED_NUMBER_OF_POINTS: usize = 1000;

/// Clusters the points of a comma-separated input into K clusters, starting from the first K
/// points, and prints the final centroids.
///
/// K, MAX_ITER and EPSILON are taken as text and checked in [problem_from], so that a bad value
/// ends in the same one-line message as every other failure.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Number of clusters (1 < K < number of points)
    #[arg(allow_negative_numbers = true)]
    k: String,

    /// Maximal number of iterations (1 < MAX_ITER < 1000)
    #[arg(default_value = "300", allow_negative_numbers = true)]
    max_iter: String,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001", allow_negative_numbers = true)]
    epsilon: String,

    /// Read the points from this file instead of stdin
    #[arg(short, long, conflicts_with = "join")]
    input: Option<PathBuf>,

    /// Read two files of the form `id,x_1,...` and cluster the rows joined on their id
    #[arg(long, num_args = 2, value_names = ["FILE1", "FILE2"])]
    join: Option<Vec<PathBuf>>,

    /// Write the centroids to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Accepts whole numbers, also when written as a float such as "3.0".
fn parse_whole_number(s: &str) -> Result<usize, String> {
    let val: f64 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if val.fract() != 0.0 || val < 0.0 || val > usize::MAX as f64 {
        return Err(format!("'{}' is not a whole number", s));
    }
    Ok(val as usize)
}

fn invalid(parameter: Parameter, reason: String) -> KMeansError {
    KMeansError::InvalidParameters { parameter, reason }
}

/// Turns the textual arguments into a [ClusteringProblem]. K is checked first, then MAX_ITER,
/// then EPSILON. The command line is stricter than the library on MAX_ITER (1 < MAX_ITER < 1000).
fn problem_from(opts: &Opts) -> Result<ClusteringProblem, KMeansError> {
    let k = parse_whole_number(&opts.k).map_err(|reason| invalid(Parameter::NumberOfClusters, reason))?;
    if k <= 1 {
        return Err(invalid(Parameter::NumberOfClusters, format!("we need k > 1, but have {}", k)));
    }

    let max_iter = parse_whole_number(&opts.max_iter).map_err(|reason| invalid(Parameter::MaximumIteration, reason))?;
    if !(1 < max_iter && max_iter < 1000) {
        return Err(invalid(Parameter::MaximumIteration, format!("we need 1 < max_iter < 1000, but have {}", max_iter)));
    }

    let epsilon: f64 = opts.epsilon.trim().parse()
        .map_err(|_| invalid(Parameter::Epsilon, format!("'{}' is not a number", opts.epsilon)))?;
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(invalid(Parameter::Epsilon, format!("we need a finite epsilon >= 0, but have {}", epsilon)));
    }

    Ok(ClusteringProblem::new(k).with_max_iter(max_iter).with_epsilon(epsilon))
}

fn load_points(opts: &Opts) -> anyhow::Result<PointSet> {
    let space = match (&opts.input, &opts.join) {
        (Some(path), _) => PointSet::by_file(path, EXPECTED_NUMBER_OF_POINTS)
            .with_context(|| format!("cannot load points from '{}'", path.display()))?,
        (None, Some(files)) => {
            let (ids, space) = PointSet::by_joined_files(&files[0], &files[1])
                .with_context(|| format!("cannot join '{}' and '{}'", files[0].display(), files[1].display()))?;
            log::info!("joined {} rows with ids from {} to {}", ids.len(), ids[0], ids[ids.len() - 1]);
            space
        }
        (None, None) => PointSet::by_reader(io::stdin().lock(), EXPECTED_NUMBER_OF_POINTS)
            .context("cannot load points from stdin")?,
    };
    Ok(space)
}

fn run(opts: &Opts) -> anyhow::Result<()> {
    let prob = problem_from(opts)?;
    let space = load_points(opts)?;

    let (clustering, total_time) = compute_k_means(&space, &prob, &Initialization::FirstPoints)?;
    log::info!("{:?} after {} iteration(s) in {:.4} sec", clustering.get_state(), clustering.get_iterations(), total_time);

    match &opts.output {
        Some(path) => clustering.get_centroids().save_to_file(path)?,
        None => println!("{}", clustering.get_centroids()),
    }
    Ok(())
}

/// The one-line message printed for a failed run.
fn describe(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<KMeansError>().and_then(KMeansError::parameter) {
        Some(Parameter::NumberOfClusters) => "Invalid number of clusters!",
        Some(Parameter::MaximumIteration) => "Invalid maximum iteration!",
        Some(Parameter::Epsilon) => "Invalid epsilon!",
        _ => "An Error Has Occurred",
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(err) => {
            log::error!("{}", err);
            println!("An Error Has Occurred");
            exit(1);
        }
    };
    if let Err(err) = run(&opts) {
        log::error!("{:#}", err);
        println!("{}", describe(&err));
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_may_be_written_as_floats() {
        assert_eq!(parse_whole_number("3"), Ok(3));
        assert_eq!(parse_whole_number("3.0"), Ok(3));
        assert_eq!(parse_whole_number("03"), Ok(3));
        assert!(parse_whole_number("3.5").is_err());
        assert!(parse_whole_number("-2").is_err());
        assert!(parse_whole_number("three").is_err());
    }

    fn message_for(args: &[&str]) -> &'static str {
        let mut argv = vec!["k_means_bin"];
        argv.extend_from_slice(args);
        let opts = Opts::try_parse_from(argv).unwrap();
        describe(&anyhow::Error::from(problem_from(&opts).unwrap_err()))
    }

    #[test]
    fn parses_positional_and_optional_arguments() {
        let opts = Opts::try_parse_from(["k_means_bin", "3", "100", "--epsilon", "0.01", "--input", "points.txt"]).unwrap();
        assert_eq!(opts.input, Some(PathBuf::from("points.txt")));
        let prob = problem_from(&opts).unwrap();
        assert_eq!(prob.k, 3);
        assert_eq!(prob.max_iter, 100);
        assert_eq!(prob.epsilon, 0.01);

        let opts = Opts::try_parse_from(["k_means_bin", "2.0", "--join", "a.txt", "b.txt"]).unwrap();
        assert_eq!(opts.join, Some(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]));
        let prob = problem_from(&opts).unwrap();
        assert_eq!(prob.k, 2);
        assert_eq!(prob.max_iter, 300);
        assert_eq!(prob.epsilon, 0.001);
    }

    #[test]
    fn bad_numbers_map_to_one_line_messages() {
        assert_eq!(message_for(&["3.5"]), "Invalid number of clusters!");
        assert_eq!(message_for(&["three"]), "Invalid number of clusters!");
        assert_eq!(message_for(&["-2"]), "Invalid number of clusters!");
        assert_eq!(message_for(&["3", "12.5"]), "Invalid maximum iteration!");
        assert_eq!(message_for(&["3", "100", "--epsilon", "abc"]), "Invalid epsilon!");
        assert_eq!(message_for(&["3", "100", "--epsilon", "-0.5"]), "Invalid epsilon!");
    }

    #[test]
    fn clusters_are_checked_before_max_iter() {
        assert_eq!(message_for(&["1", "1"]), "Invalid number of clusters!");
        assert_eq!(message_for(&["1.5", "5000"]), "Invalid number of clusters!");
    }

    #[test]
    fn max_iter_bounds_are_enforced() {
        for max_iter in ["1", "1000"] {
            assert_eq!(message_for(&["3", max_iter]), "Invalid maximum iteration!");
        }
    }

    #[test]
    fn errors_map_to_messages() {
        let space = PointSet::by_ndpoints(vec![vec![0.0], vec![1.0]]).unwrap();
        let prob = ClusteringProblem::new(2);
        let err = anyhow::Error::from(compute_k_means(&space, &prob, &Initialization::FirstPoints).unwrap_err());
        assert_eq!(describe(&err), "Invalid number of clusters!");

        let prob = ClusteringProblem::new(2).with_epsilon(-1.0);
        let err = anyhow::Error::from(compute_k_means(&space, &prob, &Initialization::FirstPoints).unwrap_err());
        assert_eq!(describe(&err), "Invalid epsilon!");

        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(describe(&err), "An Error Has Occurred");
    }
}
