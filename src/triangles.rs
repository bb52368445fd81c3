//! Triangles of detected stars and their angle fingerprints.

use std::ops::Index;

use nalgebra::Vector2;
use ndarray::ArrayView2;

use crate::Float;
use crate::geometry::{angles_from_sides, distance};

/// Three pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle<F: Float> {
    vertices: [Vector2<F>; 3],
}

impl<F: Float> Triangle<F> {
    /// Create a triangle from its vertices.
    pub fn new(vertex1: Vector2<F>, vertex2: Vector2<F>, vertex3: Vector2<F>) -> Self {
        Self {
            vertices: [vertex1, vertex2, vertex3],
        }
    }

    /// Build the triangle of rows `i`, `j` and `k` of a `(n_points, 2)` matrix.
    pub(crate) fn from_rows(points: ArrayView2<F>, i: usize, j: usize, k: usize) -> Self {
        Triangle::new(
            Vector2::new(points[[i, 0]], points[[i, 1]]),
            Vector2::new(points[[j, 0]], points[[j, 1]]),
            Vector2::new(points[[k, 0]], points[[k, 1]]),
        )
    }

    /// Side lengths `|AB|`, `|BC|` and `|AC|`.
    pub fn sides(&self) -> [F; 3] {
        [
            distance(&self[0], &self[1]),
            distance(&self[1], &self[2]),
            distance(&self[0], &self[2]),
        ]
    }

    /// Interior angles in degrees, sorted ascending.
    ///
    /// This is invariant under translation, rotation and uniform scaling of the vertices.
    pub fn fingerprint(&self) -> [F; 3] {
        let [ab, bc, ac] = self.sides();
        angles_from_sides(ab, bc, ac)
    }
}

impl<F: Float> Index<usize> for Triangle<F> {
    type Output = Vector2<F>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::Rotation2;
    use ndarray::array;
    use rand::prelude::*;

    use super::*;

    #[test]
    fn from_rows() {
        let points = array![[0., 0.], [1., 2.], [3., 4.], [5., 6.]];
        let triangle = Triangle::from_rows(points.view(), 3, 0, 2);

        assert_eq!(triangle[0], Vector2::new(5., 6.));
        assert_eq!(triangle[1], Vector2::new(0., 0.));
        assert_eq!(triangle[2], Vector2::new(3., 4.));
        assert_abs_diff_eq!(triangle.sides()[1], 5., epsilon = 1e-12);
    }

    #[test]
    fn fingerprint_is_similarity_invariant() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let triangle = Triangle::<f64>::new(
                Vector2::new(rng.random(), rng.random()),
                Vector2::new(rng.random(), rng.random()),
                Vector2::new(rng.random(), rng.random()),
            );

            let rotation = Rotation2::new(rng.random_range(0. ..std::f64::consts::TAU));
            let scale: f64 = rng.random_range(0.1..100.);
            let offset = Vector2::new(rng.random_range(-50. ..50.), rng.random_range(-50. ..50.));
            let moved = Triangle::new(
                rotation * triangle[0] * scale + offset,
                rotation * triangle[1] * scale + offset,
                rotation * triangle[2] * scale + offset,
            );

            let original = triangle.fingerprint();
            let transformed = moved.fingerprint();
            for (a, b) in original.into_iter().zip(transformed) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn vertex_order_does_not_matter() {
        let a = Vector2::new(10., 3.);
        let b = Vector2::new(-4., 7.);
        let c = Vector2::new(2., -8.);

        let abc = Triangle::new(a, b, c).fingerprint();
        let cab = Triangle::new(c, a, b).fingerprint();
        let bac = Triangle::new(b, a, c).fingerprint();

        for i in 0..3 {
            assert_abs_diff_eq!(abc[i], cab[i], epsilon = 1e-9);
            assert_abs_diff_eq!(abc[i], bac[i], epsilon = 1e-9);
        }
    }
}
