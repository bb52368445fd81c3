//! Catalog of star triangles and the nearest-neighbor index over their angles.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::fs::File;
use std::io::{BufReader, Read};
use std::num::NonZero;
use std::path::Path;

use kiddo::float::{distance::SquaredEuclidean, kdtree::Axis};
use kiddo::float_leaf_slice::leaf_slice::{LeafSliceFloat, LeafSliceFloatChunk};
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use log::info;
use num_traits::float::FloatCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Float;
use crate::error::Error;

/// Float types the catalog index can be built over (`f32` and `f64`).
pub trait IndexFloat: Float + Axis + LeafSliceFloat<u32> + LeafSliceFloatChunk<u32, 3> {}

impl<F> IndexFloat for F where F: Float + Axis + LeafSliceFloat<u32> + LeafSliceFloatChunk<u32, 3> {}

/// Key of a star in the reference catalog, e.g. its Hipparcos number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub u32);

impl Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three catalog stars and the interior angles of the triangle they span, in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogTriangle<F> {
    /// The stars at the vertices.
    pub ids: [CatalogId; 3],
    /// The interior angles.
    pub angles: [F; 3],
}

impl<F> CatalogTriangle<F> {
    /// Create a new catalog triangle.
    pub fn new(ids: [CatalogId; 3], angles: [F; 3]) -> Self {
        Self { ids, angles }
    }
}

/// A catalog triangle returned by a query, together with its distance to the query in angle space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour<'a, F> {
    /// The matching catalog row.
    pub triangle: &'a CatalogTriangle<F>,
    /// Euclidean distance between the query angles and the row's angles.
    pub distance: F,
}

/// Immutable k-d tree over the angle triples of all catalog triangles.
///
/// Build it once at startup and share it by reference; queries never mutate it.
/// Any number of rows may share the same angles.
pub struct CatalogIndex<F: IndexFloat> {
    triangles: Vec<CatalogTriangle<F>>,
    tree: ImmutableKdTree<F, u32, 3, 32>,
}

impl<F: IndexFloat> CatalogIndex<F> {
    /// Build the index.
    ///
    /// The angles of every row are sorted ascending so that they are comparable with
    /// [`Triangle::fingerprint`](crate::Triangle::fingerprint).
    ///
    /// # Errors
    /// [`Error::EmptyCatalog`] if `triangles` is empty,
    /// [`Error::InvalidCatalogRow`] if any angle is NaN or infinite.
    pub fn new(mut triangles: Vec<CatalogTriangle<F>>) -> Result<Self, Error> {
        if triangles.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        for (row, triangle) in triangles.iter_mut().enumerate() {
            if !triangle.angles.iter().all(|&a| FloatCore::is_finite(a)) {
                return Err(Error::InvalidCatalogRow { row });
            }
            triangle
                .angles
                .sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        }

        let angles = triangles.iter().map(|t| t.angles).collect::<Vec<_>>();
        let tree = ImmutableKdTree::new_from_slice(angles.as_slice());

        info!("Built catalog index over {} triangles.", triangles.len());
        Ok(Self { triangles, tree })
    }

    /// Read a JSON array of `{"ids": [a, b, c], "angles": [x, y, z]}` rows and build the index.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error>
    where
        F: DeserializeOwned,
    {
        let triangles: Vec<CatalogTriangle<F>> = serde_json::from_reader(reader)?;
        Self::new(triangles)
    }

    /// Read the catalog from a JSON file, see [`from_reader`](CatalogIndex::from_reader()).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        F: DeserializeOwned,
    {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// The `k` catalog rows whose angles are closest to `angles`, nearest first.
    ///
    /// Fewer rows are returned if the catalog is smaller than `k`.
    pub fn nearest(&self, angles: &[F; 3], k: NonZero<usize>) -> Vec<Neighbour<'_, F>> {
        self.tree
            .nearest_n::<SquaredEuclidean>(angles, k)
            .into_iter()
            .map(|n| Neighbour {
                triangle: &self.triangles[n.item as usize],
                distance: n.distance.sqrt(),
            })
            .collect()
    }

    /// Number of catalog triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the catalog is empty. Never true for a successfully built index.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All catalog rows, in the order they were given.
    pub fn triangles(&self) -> &[CatalogTriangle<F>] {
        &self.triangles
    }
}

impl<F: IndexFloat> Debug for CatalogIndex<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogIndex")
            .field("triangles", &self.triangles.len())
            .finish_non_exhaustive()
    }
}
