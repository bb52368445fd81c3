//! Conversions of point lists into the `(n_points, 2)` matrix used by the matcher,
//! inspired by [`nshare`](https://github.com/rust-cv/nshare).

use itertools::Itertools;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, Matrix, Scalar, Storage};
use ndarray::{Array2, ShapeBuilder};

/// Conversion into a 2D [`ndarray`] matrix.
pub trait IntoNdarray2 {
    /// The resulting matrix type.
    type Out;

    /// Convert.
    fn into_ndarray2(self) -> Self::Out;
}

impl<N: Scalar> IntoNdarray2 for Array2<N> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        self
    }
}

impl<N: Scalar, C: Dim, R: Dim, S: Storage<N, R, C>> IntoNdarray2 for Matrix<N, R, C, S>
where
    DefaultAllocator: Allocator<R, C, Buffer<N> = S>,
{
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        Array2::from_shape_vec(
            self.shape().strides(self.strides()),
            self.into_iter().cloned().collect(),
        )
        .unwrap()
    }
}

impl<N: Scalar> IntoNdarray2 for Vec<[N; 2]> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        let n_points = self.len();
        Array2::from_shape_vec((n_points, 2), self.into_iter().flatten().collect_vec()).unwrap()
    }
}

impl<N: Scalar> IntoNdarray2 for Vec<(N, N)> {
    type Out = Array2<N>;

    fn into_ndarray2(self) -> Self::Out {
        let n_points = self.len();
        Array2::from_shape_vec(
            (n_points, 2),
            self.into_iter().flat_map(|(x, y)| [x, y]).collect_vec(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{MatrixXx2, RowVector2, matrix};
    use ndarray::array;

    use super::*;

    #[test]
    fn matrix_to_array2() {
        let matrix = matrix![1., 2., 3.; 4., 5., 6.; 7., 8., 9.];
        let arr = matrix.into_ndarray2();

        assert_eq!(arr, array![[1., 2., 3.], [4., 5., 6.], [7., 8., 9.]]);
    }

    #[test]
    fn dynamic_matrix_to_array2() {
        let matrix = MatrixXx2::from_rows(&[
            RowVector2::new(1., 2.),
            RowVector2::new(3., 4.),
            RowVector2::new(5., 6.),
        ]);
        let arr = matrix.into_ndarray2();

        assert_eq!(arr, array![[1., 2.], [3., 4.], [5., 6.]]);
    }

    #[test]
    fn vec_to_array2() {
        let arrays = vec![[1., 2.], [3., 4.]].into_ndarray2();
        let tuples = vec![(1., 2.), (3., 4.)].into_ndarray2();

        assert_eq!(arrays, array![[1., 2.], [3., 4.]]);
        assert_eq!(tuples, arrays);
    }

    #[test]
    fn empty_vec_to_array2() {
        let points: Vec<[f64; 2]> = Vec::new();

        assert_eq!(points.into_ndarray2().shape(), &[0, 2]);
    }
}
