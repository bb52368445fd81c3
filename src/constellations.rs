//! Constellation line art and voting for the constellation seen in an image.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use nalgebra::Vector2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::Float;
use crate::catalog::CatalogId;
use crate::error::Error;
use crate::report::Report;
use crate::resolve::Assignment;

/// The traditional connecting lines of one constellation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constellation {
    /// Display name, e.g. `Orion`.
    pub name: String,
    /// Pairs of catalog stars connected by a line.
    #[serde(rename = "lines")]
    pub edges: Vec<(CatalogId, CatalogId)>,
}

impl Constellation {
    /// All stars that are the endpoint of at least one line.
    pub fn vertices(&self) -> HashSet<CatalogId> {
        self.edges.iter().flat_map(|&(a, b)| [a, b]).collect()
    }

    fn connects(&self, id1: CatalogId, id2: CatalogId) -> usize {
        self.edges
            .iter()
            .filter(|&&(a, b)| (a == id1 && b == id2) || (a == id2 && b == id1))
            .count()
    }
}

/// All known constellations, keyed by short name (e.g. `Ori`).
///
/// Iteration follows insertion order, which also decides ties between constellations
/// with the same number of votes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstellationLines(IndexMap<String, Constellation>);

impl ConstellationLines {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constellation. An existing entry with the same short name is replaced in place.
    pub fn with_constellation(
        mut self,
        short_name: impl Into<String>,
        name: impl Into<String>,
        edges: Vec<(CatalogId, CatalogId)>,
    ) -> Self {
        self.0.insert(
            short_name.into(),
            Constellation {
                name: name.into(),
                edges,
            },
        );
        self
    }

    /// Read a JSON object of the form `{"Ori": {"name": "Orion", "lines": [[a, b], ...]}, ...}`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read the table from a JSON file, see [`from_reader`](ConstellationLines::from_reader()).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Look up a constellation by short name.
    pub fn get(&self, short_name: &str) -> Option<&Constellation> {
        self.0.get(short_name)
    }

    /// Display name of a constellation, falling back to the short name if it is unknown.
    pub fn display_name<'a>(&'a self, short_name: &'a str) -> &'a str {
        self.get(short_name).map_or(short_name, |c| c.name.as_str())
    }

    /// Iterate over `(short name, constellation)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constellation)> {
        self.0.iter().map(|(short, c)| (short.as_str(), c))
    }

    /// Number of constellations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vote for the constellation best supported by `assignment`.
    ///
    /// Every pair of matched points whose identities form a line of a constellation
    /// counts as one vote for it and contributes the segment between the two points.
    /// Returns `None` if no pair forms any line.
    pub(crate) fn vote<F: Float>(
        &self,
        assignment: &Assignment,
        points: ArrayView2<F>,
        report: &mut Report,
    ) -> Option<Vote<F>> {
        let point = |i: usize| Vector2::new(points[[i, 0]], points[[i, 1]]);

        let mut tallies: IndexMap<&str, (usize, Vec<Segment<F>>)> = IndexMap::new();
        for ((i, id_i), (j, id_j)) in assignment.iter().tuple_combinations() {
            if id_i == id_j {
                continue;
            }
            for (short_name, constellation) in self.iter() {
                for _ in 0..constellation.connects(id_i, id_j) {
                    let (votes, segments) = tallies.entry(short_name).or_default();
                    *votes += 1;
                    segments.push(Segment::new(point(i), point(j)));
                }
            }
        }

        // ties go to the constellation whose first vote came earliest
        let Some((short_name, (votes, segments))) = tallies
            .into_iter()
            .min_by_key(|(_, (votes, _))| Reverse(*votes))
        else {
            report.info("No constellation identified.".to_string());
            return None;
        };

        let constellation = &self.0[short_name];
        let vertices = constellation.vertices();
        let spurious = assignment
            .iter()
            .filter(|(_, id)| !vertices.contains(id))
            .collect_vec();

        if !spurious.is_empty() {
            report.warn(format!(
                "Suspected spurious stars (index, identity): [{}]",
                spurious
                    .iter()
                    .map(|(point, id)| format!("({point}, {id})"))
                    .join(", ")
            ));
        }
        report.info(format!(
            "Identified constellation: {short_name} with {} line pairs.",
            segments.len()
        ));

        Some(Vote {
            short_name: short_name.to_string(),
            name: constellation.name.clone(),
            votes,
            segments,
            spurious,
        })
    }
}

/// A line between two detected points, in pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<F: Float> {
    /// First endpoint.
    pub start: Vector2<F>,
    /// Second endpoint.
    pub end: Vector2<F>,
}

impl<F: Float> Segment<F> {
    /// Create a new segment.
    pub fn new(start: Vector2<F>, end: Vector2<F>) -> Self {
        Self { start, end }
    }
}

/// Outcome of a successful constellation vote.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Vote<F: Float> {
    pub(crate) short_name: String,
    pub(crate) name: String,
    pub(crate) votes: usize,
    pub(crate) segments: Vec<Segment<F>>,
    pub(crate) spurious: Vec<(usize, CatalogId)>,
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::resolve::{Ballot, resolve_all};

    fn id(n: u32) -> CatalogId {
        CatalogId(n)
    }

    /// Assign `ids[i]` to point `i`, skipping `None`s.
    fn assignment(ids: &[Option<u32>]) -> Assignment {
        let ballots = ids
            .iter()
            .enumerate()
            .map(|(point, id)| {
                id.map(|id| Ballot {
                    point,
                    id: CatalogId(id),
                    distance: 0.,
                })
                .into_iter()
                .collect_vec()
            })
            .collect_vec();
        resolve_all(&ballots, &mut Report::default())
    }

    fn lines() -> ConstellationLines {
        ConstellationLines::new()
            .with_constellation("Tri", "Triangulum", vec![(id(1), id(2)), (id(2), id(3))])
            .with_constellation("Sge", "Sagitta", vec![(id(3), id(4)), (id(4), id(5))])
    }

    #[test]
    fn winner_and_segments() {
        let points = array![[0., 0.], [10., 0.], [10., 10.], [50., 50.]];
        let assignment = assignment(&[Some(1), Some(2), Some(3), None]);

        let mut report = Report::default();
        let vote = lines().vote(&assignment, points.view(), &mut report).unwrap();

        assert_eq!(vote.short_name, "Tri");
        assert_eq!(vote.name, "Triangulum");
        assert_eq!(vote.votes, 2);
        assert_eq!(
            vote.segments,
            vec![
                Segment::new(Vector2::new(0., 0.), Vector2::new(10., 0.)),
                Segment::new(Vector2::new(10., 0.), Vector2::new(10., 10.)),
            ]
        );
        assert!(vote.spurious.is_empty());
    }

    #[test]
    fn edges_match_in_either_direction() {
        let points = array![[0., 0.], [3., 4.]];
        let assignment = assignment(&[Some(2), Some(1)]);

        let vote = lines()
            .vote(&assignment, points.view(), &mut Report::default())
            .unwrap();

        assert_eq!(vote.short_name, "Tri");
        assert_eq!(vote.segments.len(), 1);
    }

    #[test]
    fn ties_go_to_first_voted() {
        // 4-5 (Sge) is seen before 1-2 (Tri) in pair order
        let points = array![[0., 0.], [1., 0.], [2., 0.], [3., 0.]];
        let assignment = assignment(&[Some(4), Some(5), Some(1), Some(2)]);

        let vote = lines()
            .vote(&assignment, points.view(), &mut Report::default())
            .unwrap();

        assert_eq!(vote.short_name, "Sge");
        assert_eq!(vote.votes, 1);
        assert_eq!(vote.spurious, vec![(2, id(1)), (3, id(2))]);
    }

    #[test]
    fn spurious_points_are_flagged() {
        let points = array![[0., 0.], [10., 0.], [10., 10.], [5., 5.]];
        let assignment = assignment(&[Some(1), Some(2), Some(3), Some(99)]);

        let mut report = Report::default();
        let vote = lines().vote(&assignment, points.view(), &mut report).unwrap();

        assert_eq!(vote.short_name, "Tri");
        assert_eq!(vote.spurious, vec![(3, id(99))]);

        let messages = report
            .into_entries()
            .into_iter()
            .map(|e| e.message)
            .collect_vec();
        assert!(messages.contains(&"Suspected spurious stars (index, identity): [(3, 99)]".to_string()));
    }

    #[test]
    fn no_votes() {
        let points = array![[0., 0.], [10., 0.]];
        let assignment = assignment(&[Some(1), Some(5)]);

        let mut report = Report::default();
        let vote = lines().vote(&assignment, points.view(), &mut report);

        assert!(vote.is_none());
        let entries = report.into_entries();
        assert_eq!(entries.last().unwrap().message, "No constellation identified.");
    }

    #[test]
    fn from_reader_keeps_order() {
        let json = r#"{
            "UMi": {"name": "Ursa Minor", "lines": [[11767, 85822], [85822, 82080]]},
            "Cas": {"name": "Cassiopeia", "lines": [[8886, 6686]]}
        }"#;
        let lines = ConstellationLines::from_reader(json.as_bytes()).unwrap();

        assert_eq!(lines.iter().map(|(short, _)| short).collect_vec(), ["UMi", "Cas"]);
        assert_eq!(lines.display_name("Cas"), "Cassiopeia");
        assert_eq!(lines.display_name("Ori"), "Ori");
        assert_eq!(
            lines.get("UMi").unwrap().vertices(),
            HashSet::from([id(11767), id(85822), id(82080)])
        );
    }
}
