//! Turning per-point ballots into a one-to-one assignment of catalog identities.
//!
//! Points are resolved greedily in ascending index order. Once an identity is claimed
//! it is excluded for every later point of the same run, so the result is injective
//! but depends on point order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::Float;
use crate::catalog::CatalogId;
use crate::report::Report;

/// One occurrence of a catalog identity among the nearest catalog triangles
/// of a triangle built from `point`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ballot<F> {
    /// Index of the detected point the ballot was cast for.
    pub point: usize,
    /// The candidate identity.
    pub id: CatalogId,
    /// Angle-space distance of the catalog triangle the identity came from.
    pub distance: F,
}

/// Catalog identities already claimed by earlier points of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsedIdentities(HashSet<CatalogId>);

impl UsedIdentities {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has been claimed.
    pub fn contains(&self, id: CatalogId) -> bool {
        self.0.contains(&id)
    }

    /// Claim `id`.
    pub fn insert(&mut self, id: CatalogId) {
        self.0.insert(id);
    }

    /// Number of claimed identities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of resolving a single point.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<F> {
    /// No unclaimed identity received a ballot with the maximal vote count.
    Unmatched,
    /// A single identity had the most votes.
    Unique(CatalogId),
    /// Several identities shared the most votes; the lowest mean distance won.
    TieBroken {
        /// The winner.
        chosen: CatalogId,
        /// All identities sharing the maximal vote count, in first-seen order.
        candidates: Vec<CatalogId>,
        /// Mean ballot distance of the winner.
        mean_distance: F,
    },
}

impl<F> Resolution<F> {
    /// The resolved identity, if any.
    pub fn chosen(&self) -> Option<CatalogId> {
        match self {
            Resolution::Unmatched => None,
            Resolution::Unique(id) => Some(*id),
            Resolution::TieBroken { chosen, .. } => Some(*chosen),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally<F> {
    votes: usize,
    distance_sum: F,
}

impl<F: Float> Tally<F> {
    fn mean_distance(&self) -> F {
        self.distance_sum / F::from_usize(self.votes).unwrap()
    }
}

/// Resolve the identity of one point from its ballots.
///
/// Ballots for identities in `used` are discarded. Among the rest, the identity with the
/// most votes wins; ties go to the lowest mean ballot distance, and if that ties as well,
/// to the identity seen first. The winner is added to the returned set.
pub fn resolve<F: Float>(
    ballots: &[Ballot<F>],
    mut used: UsedIdentities,
) -> (Resolution<F>, UsedIdentities) {
    let mut tallies: IndexMap<CatalogId, Tally<F>> = IndexMap::new();
    for ballot in ballots.iter().filter(|b| !used.contains(b.id)) {
        let tally = tallies.entry(ballot.id).or_default();
        tally.votes += 1;
        tally.distance_sum = tally.distance_sum + ballot.distance;
    }

    let Some(max_votes) = tallies.values().map(|t| t.votes).max() else {
        return (Resolution::Unmatched, used);
    };

    let candidates = tallies
        .iter()
        .filter(|(id, tally)| tally.votes == max_votes && !used.contains(**id))
        .collect_vec();

    let resolution = match candidates.as_slice() {
        [] => Resolution::Unmatched,
        [(id, _)] => Resolution::Unique(**id),
        _ => {
            let (chosen, tally) = candidates
                .iter()
                .min_by(|(_, t1), (_, t2)| {
                    t1.mean_distance()
                        .partial_cmp(&t2.mean_distance())
                        .unwrap_or(Ordering::Equal)
                })
                .copied()
                .unwrap();
            Resolution::TieBroken {
                chosen: *chosen,
                candidates: candidates.iter().map(|(id, _)| **id).collect(),
                mean_distance: tally.mean_distance(),
            }
        }
    };

    if let Some(id) = resolution.chosen() {
        used.insert(id);
    }
    (resolution, used)
}

/// Mapping from detected point index to catalog identity.
///
/// Partial (points may stay unmatched) and injective (no identity appears twice).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment(BTreeMap<usize, CatalogId>);

impl Assignment {
    /// Identity assigned to `point`.
    pub fn get(&self, point: usize) -> Option<CatalogId> {
        self.0.get(&point).copied()
    }

    /// All `(point, identity)` pairs in ascending point order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, CatalogId)> + Clone + '_ {
        self.0.iter().map(|(point, id)| (*point, *id))
    }

    /// Number of matched points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no point was matched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve all points in ascending index order.
///
/// `ballots[i]` holds the ballots of point `i`.
pub(crate) fn resolve_all<F: Float>(ballots: &[Vec<Ballot<F>>], report: &mut Report) -> Assignment {
    let mut assignment = BTreeMap::new();
    let mut used = UsedIdentities::new();

    for (point, point_ballots) in ballots.iter().enumerate() {
        let (resolution, claimed) = resolve(point_ballots, used);
        used = claimed;

        if let Resolution::TieBroken {
            chosen,
            candidates,
            mean_distance,
        } = &resolution
        {
            report.info(format!(
                "Resolved tie for star {point} among identities [{}] by choosing {chosen} with min mean distance {mean_distance:.4}",
                candidates.iter().join(", ")
            ));
        }
        if let Some(id) = resolution.chosen() {
            assignment.insert(point, id);
        }
    }

    report.info(format!(
        "Matched {} stars to catalog identities.",
        assignment.len()
    ));
    Assignment(assignment)
}
