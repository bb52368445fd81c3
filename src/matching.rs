//! Matching functions and main interface.

use std::num::NonZero;

use itertools::Itertools;
use log::debug;
use ndarray::{Array2, ArrayView2, Axis};
use num_traits::float::FloatCore;

use crate::Float;
use crate::catalog::{CatalogId, CatalogIndex, IndexFloat};
use crate::constellations::{ConstellationLines, Segment};
use crate::error::Error;
use crate::ndarray_utils::IntoNdarray2;
use crate::report::{LogEntry, Report};
use crate::resolve::{Assignment, Ballot, resolve_all};
use crate::triangles::Triangle;

/// Number of nearest catalog triangles consulted per query unless configured otherwise.
pub const DEFAULT_NEIGHBOURS: NonZero<usize> = NonZero::new(2).unwrap();

/// Collect the ballots of `point`.
///
/// Every unordered pair of other points forms a triangle with `point`; the `neighbours`
/// nearest catalog triangles of its fingerprint each cast one ballot per vertex star.
///
/// # Arguments
/// - `catalog`: The catalog index.
/// - `points`: Detected points, shape `(n_points, 2)`.
/// - `point`: Row of the point to collect ballots for.
/// - `neighbours`: Number of nearest catalog triangles per query.
///
/// A `point` outside of `points` has no ballots.
pub fn collect_ballots<F: IndexFloat>(
    catalog: &CatalogIndex<F>,
    points: ArrayView2<F>,
    point: usize,
    neighbours: NonZero<usize>,
) -> Vec<Ballot<F>> {
    let n_points = points.len_of(Axis(0));
    let mut ballots = Vec::new();
    if point >= n_points {
        return ballots;
    }

    for (j, k) in (0..n_points).filter(|&p| p != point).tuple_combinations() {
        let fingerprint = Triangle::from_rows(points, point, j, k).fingerprint();
        for neighbour in catalog.nearest(&fingerprint, neighbours) {
            ballots.extend(neighbour.triangle.ids.iter().map(|&id| Ballot {
                point,
                id,
                distance: neighbour.distance,
            }));
        }
    }

    ballots
}

/// Result of a matching run.
#[derive(Clone, Debug, PartialEq)]
pub struct Identification<F: Float> {
    /// Short name of the identified constellation, `None` if no line was recognized.
    pub constellation: Option<String>,
    /// Display name of the identified constellation.
    pub name: Option<String>,
    /// Number of votes the constellation received.
    pub votes: usize,
    /// Lines of the identified constellation between detected points.
    pub segments: Vec<Segment<F>>,
    /// Catalog identity of every matched point.
    pub assignment: Assignment,
    /// Matched points whose identity is not part of the identified constellation.
    pub spurious: Vec<(usize, CatalogId)>,
    /// Diagnostics of the run, in the order they were recorded.
    pub log: Vec<LogEntry>,
}

/// The central struct of this library.
///
/// Holds references to the process-wide catalog index and constellation table together with
/// the matching options. Both tables are only read, so one instance of each can serve any
/// number of concurrent runs.
///
/// Example:
/// ```rust,ignore
/// let catalog = CatalogIndex::from_path("triangles.json")?;
/// let lines = ConstellationLines::from_path("lines.json")?;
/// let found = Starlines::new(&catalog, &lines)
///     .with_neighbours(NonZero::new(3).unwrap())
///     .identify(vec![[120., 80.], [300., 95.], [410., 260.]])?;
/// ```
#[derive(Clone, Debug)]
pub struct Starlines<'a, F: IndexFloat> {
    /// Catalog triangle index.
    catalog: &'a CatalogIndex<F>,
    /// Constellation line table.
    lines: &'a ConstellationLines,
    /// Nearest catalog triangles per query.
    neighbours: NonZero<usize>,
    /// Maximum number of detected points accepted.
    max_points: Option<usize>,
}

impl<'a, F: IndexFloat> Starlines<'a, F> {
    /// Create a new instance using default options.
    /// Use `with_` functions to set parameters.
    pub fn new(catalog: &'a CatalogIndex<F>, lines: &'a ConstellationLines) -> Self {
        Self {
            catalog,
            lines,
            neighbours: DEFAULT_NEIGHBOURS,
            max_points: None,
        }
    }

    /// Set the number of nearest catalog triangles consulted per query.
    ///
    /// More neighbours find the correct star more often but add noise to the votes.
    pub fn with_neighbours(mut self, neighbours: NonZero<usize>) -> Self {
        self.neighbours = neighbours;
        self
    }

    /// Reject inputs with more than `max_points` points.
    ///
    /// The run time grows with the cube of the number of points.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = Some(max_points);
        self
    }

    fn validate(&self, points: ArrayView2<F>) -> Result<(), Error> {
        let (n_points, columns) = points.dim();
        if n_points > 0 && columns != 2 {
            return Err(Error::InvalidShape { columns });
        }
        if let Some(max) = self.max_points {
            if n_points > max {
                return Err(Error::TooManyPoints {
                    count: n_points,
                    max,
                });
            }
        }
        if let Some(point) = points
            .rows()
            .into_iter()
            .position(|r| !r.iter().all(|&c| FloatCore::is_finite(c)))
        {
            return Err(Error::NonFiniteCoordinate { point });
        }
        Ok(())
    }

    /// Identify the constellation formed by `points`.
    ///
    /// # Arguments
    /// - `points`: Detected star positions in pixels, shape `(n_points, 2)`.
    ///   The row order defines the point indices and the order of resolution.
    ///
    /// # Returns
    /// An [`Identification`], which has no constellation if no pair of matched points
    /// forms a known line. Fails only on invalid input.
    pub fn identify<N>(&self, points: N) -> Result<Identification<F>, Error>
    where
        N: IntoNdarray2<Out = Array2<F>>,
    {
        let points = points.into_ndarray2();
        self.validate(points.view())?;

        let mut report = Report::default();
        let n_points = points.len_of(Axis(0));
        report.info(format!("Detected {n_points} stars."));

        debug!("Collecting ballots for {n_points} points.");
        let ballots = (0..n_points)
            .map(|point| collect_ballots(self.catalog, points.view(), point, self.neighbours))
            .collect_vec();

        Ok(self.finish(points.view(), &ballots, report))
    }

    fn finish(
        &self,
        points: ArrayView2<F>,
        ballots: &[Vec<Ballot<F>>],
        mut report: Report,
    ) -> Identification<F> {
        let assignment = resolve_all(ballots, &mut report);
        let vote = self.lines.vote(&assignment, points, &mut report);

        match vote {
            Some(vote) => Identification {
                constellation: Some(vote.short_name),
                name: Some(vote.name),
                votes: vote.votes,
                segments: vote.segments,
                assignment,
                spurious: vote.spurious,
                log: report.into_entries(),
            },
            None => Identification {
                constellation: None,
                name: None,
                votes: 0,
                segments: Vec::new(),
                assignment,
                spurious: Vec::new(),
                log: report.into_entries(),
            },
        }
    }
}

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use rayon::prelude::*;

    impl<F: IndexFloat> Starlines<'_, F> {
        /// Identify the constellation formed by `points`, collecting ballots in parallel.
        ///
        /// The result is identical to [`identify`](Starlines::identify()).
        pub fn identify_par<N>(&self, points: N) -> Result<Identification<F>, Error>
        where
            N: IntoNdarray2<Out = Array2<F>>,
        {
            let points = points.into_ndarray2();
            self.validate(points.view())?;

            let mut report = Report::default();
            let n_points = points.len_of(Axis(0));
            report.info(format!("Detected {n_points} stars."));

            debug!("Collecting ballots for {n_points} points in parallel.");
            let view = points.view();
            let ballots: Vec<Vec<Ballot<F>>> = (0..n_points)
                .into_par_iter()
                .map(|point| collect_ballots(self.catalog, view, point, self.neighbours))
                .collect();

            Ok(self.finish(view, &ballots, report))
        }
    }
}
