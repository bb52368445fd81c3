//! Error type of this crate.

use thiserror::Error;

/// Everything that can go wrong while loading tables, detecting stars or matching.
///
/// Unmatched points and images without a recognizable constellation are not errors;
/// they are reported in the [`Identification`](crate::Identification).
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a catalog or line table failed.
    #[error("could not read table: {0}")]
    Io(#[from] std::io::Error),
    /// A catalog or line table is not valid JSON of the expected shape.
    #[error("could not parse table: {0}")]
    Json(#[from] serde_json::Error),
    /// The catalog contains no triangles.
    #[error("catalog contains no triangles")]
    EmptyCatalog,
    /// A catalog triangle has an angle that is NaN or infinite.
    #[error("catalog row {row} has a non-finite angle")]
    InvalidCatalogRow {
        /// Row of the offending triangle.
        row: usize,
    },
    /// The detected points are not given as a matrix of shape `(n_points, 2)`.
    #[error("expected 2 coordinates per point, got {columns}")]
    InvalidShape {
        /// Number of columns given.
        columns: usize,
    },
    /// A detected point has a NaN or infinite coordinate.
    #[error("detected point {point} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        point: usize,
    },
    /// More points were given than the matcher is configured to accept.
    #[error("{count} points given, but at most {max} are accepted")]
    TooManyPoints {
        /// Number of points given.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The image handed to a detector has no pixels.
    #[error("image has no pixels")]
    EmptyImage,
}
