#![warn(missing_docs)]

//! Identify the constellation in a photograph of the night sky from the positions of its stars. \
//! No astrometric solution is computed; the image is treated as a flat projection, and stars are
//! recognized by the shape of the triangles they form with each other.
//!
//! ## Interface
//! The central struct of this library is [`Starlines`]. It borrows the two process-wide tables,
//! a [`CatalogIndex`] of catalog star triangles and a [`ConstellationLines`] table of
//! constellation line art, both built once at startup and only read afterwards.
//! Matching parameters are set via `Starlines::with_*()` functions.
//!
//! Example:
//! ```rust,ignore
//! let catalog = CatalogIndex::<f64>::from_path("triangles.json")?;
//! let lines = ConstellationLines::from_path("lines.json")?;
//!
//! let stars = ThresholdDetector::default().detect(image.view())?;
//! let found = Starlines::new(&catalog, &lines).identify(stars)?;
//! for entry in &found.log {
//!     println!("{entry}");
//! }
//! ```
//!
//! ## Algorithm
//! 1. Every detected point forms a triangle with every pair of other points.
//!    The sorted interior angles of such a triangle are its fingerprint, which does not change
//!    under translation, rotation and uniform scaling.
//! 2. The nearest catalog triangles of each fingerprint are looked up in a k-d tree, and each of
//!    their stars receives a ballot for the point, weighted by the distance in angle space.
//! 3. Points are resolved in ascending index order: the star with the most ballots wins, ties
//!    going to the lowest mean distance. A star claimed by one point is unavailable for all later
//!    points.
//! 4. Every pair of resolved points whose stars are connected in some constellation's line art
//!    votes for that constellation. The constellation with the most votes wins, and its lines are
//!    returned in pixel coordinates. Resolved points outside the winning constellation are
//!    reported as suspected spurious detections.
//!
//! The triangle enumeration is cubic in the number of points, so inputs should stay at a few
//! dozen stars. See [`Starlines::with_max_points()`].
//!
//! ## Parameters
//! - `neighbours`: Number of nearest catalog triangles consulted per triangle, 2 by default.
//!     More neighbours find the correct star more often but add noise to the ballots.
//! - `max_points`: Maximum number of detected points accepted, unlimited by default.

pub(crate) mod catalog;
pub(crate) mod constellations;
pub(crate) mod detect;
pub(crate) mod error;
pub(crate) mod geometry;
pub(crate) mod matching;
pub(crate) mod ndarray_utils;
pub(crate) mod report;
pub(crate) mod resolve;
pub(crate) mod triangles;

pub use catalog::{CatalogId, CatalogIndex, CatalogTriangle, IndexFloat, Neighbour};
pub use constellations::{Constellation, ConstellationLines, Segment};
pub use detect::{StarDetector, ThresholdDetector};
pub use error::Error;
pub use matching::{DEFAULT_NEIGHBOURS, Identification, Starlines, collect_ballots};
pub use ndarray_utils::IntoNdarray2;
pub use report::LogEntry;
pub use resolve::{Assignment, Ballot, Resolution, UsedIdentities, resolve};
pub use triangles::Triangle;

/// A generic float trait such that the matching is generic over `f32`/`f64`.
///
/// This trait is automatically implemented for all types implementing the supertraits.
/// Particularly, this includes `f32` and `f64`.
/// [`num_traits::Float`] is not a supertrait as the need to specify the provider of the redundant definitions of the basic math functions would clutter the code.
pub trait Float: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}

impl<F> Float for F where F: Copy + Default + nalgebra::RealField + num_traits::FromPrimitive {}
