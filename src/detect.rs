//! Finding star-like blobs in a grayscale image.
//!
//! Only the [`StarDetector`] interface is needed by the matcher; [`ThresholdDetector`]
//! is a simple implementation for dark-sky photographs with few, well separated stars.

use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::error::Error;

/// Extracts the pixel coordinates of stars from an image.
pub trait StarDetector {
    /// Detect stars in a grayscale image indexed as `[row, column]`.
    ///
    /// Returns `[x, y]` coordinates, `x` being the column. The order of the list
    /// defines the point indices of the subsequent matching run.
    fn detect(&self, image: ArrayView2<u8>) -> Result<Vec<[f64; 2]>, Error>;
}

/// Median blur, binary threshold and 8-connected components.
///
/// Each component with at least `min_pixels` pixels becomes one star at its mean pixel position.
/// Stars are ordered by the first pixel of their component in row-major order.
#[derive(Clone, Debug)]
pub struct ThresholdDetector {
    /// Pixels brighter than this belong to a star.
    pub threshold: u8,
    /// Apply a 3x3 median filter before thresholding.
    pub median_blur: bool,
    /// Components smaller than this are discarded as noise.
    pub min_pixels: usize,
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self {
            threshold: 10,
            median_blur: true,
            min_pixels: 2,
        }
    }
}

impl ThresholdDetector {
    /// Set the brightness threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable the median filter.
    pub fn with_median_blur(mut self, median_blur: bool) -> Self {
        self.median_blur = median_blur;
        self
    }

    /// Set the minimum component size.
    pub fn with_min_pixels(mut self, min_pixels: usize) -> Self {
        self.min_pixels = min_pixels;
        self
    }
}

/// 3x3 median filter, replicating the border.
fn median_blur(image: ArrayView2<u8>) -> Array2<u8> {
    let (rows, cols) = image.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mut window = [0u8; 9];
        let mut n = 0;
        for dr in [-1, 0, 1] {
            for dc in [-1, 0, 1] {
                let rr = r.saturating_add_signed(dr).min(rows - 1);
                let cc = c.saturating_add_signed(dc).min(cols - 1);
                window[n] = image[[rr, cc]];
                n += 1;
            }
        }
        window.sort_unstable();
        window[4]
    })
}

impl StarDetector for ThresholdDetector {
    fn detect(&self, image: ArrayView2<u8>) -> Result<Vec<[f64; 2]>, Error> {
        if image.is_empty() {
            return Err(Error::EmptyImage);
        }

        let image = if self.median_blur {
            median_blur(image)
        } else {
            image.to_owned()
        };

        let (rows, cols) = image.dim();
        let foreground = image.map(|&p| p > self.threshold);
        let mut visited = Array2::from_elem((rows, cols), false);
        let mut stars = Vec::new();
        let mut stack = Vec::new();

        for ((r, c), &lit) in foreground.indexed_iter() {
            if !lit || visited[[r, c]] {
                continue;
            }

            visited[[r, c]] = true;
            stack.push((r, c));
            let (mut sum_x, mut sum_y, mut count) = (0usize, 0usize, 0usize);

            while let Some((r, c)) = stack.pop() {
                sum_x += c;
                sum_y += r;
                count += 1;

                for dr in [-1, 0, 1] {
                    for dc in [-1, 0, 1] {
                        let (Some(nr), Some(nc)) =
                            (r.checked_add_signed(dr), c.checked_add_signed(dc))
                        else {
                            continue;
                        };
                        if nr < rows && nc < cols && foreground[[nr, nc]] && !visited[[nr, nc]] {
                            visited[[nr, nc]] = true;
                            stack.push((nr, nc));
                        }
                    }
                }
            }

            if count >= self.min_pixels {
                stars.push([sum_x as f64 / count as f64, sum_y as f64 / count as f64]);
            }
        }

        debug!("Detected {} stars in a {}x{} image.", stars.len(), cols, rows);
        Ok(stars)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn sky() -> Array2<u8> {
        let mut image = Array2::zeros((40, 60));
        // 3x3 star centered at (x = 10, y = 5)
        for r in 4..=6 {
            for c in 9..=11 {
                image[[r, c]] = 200;
            }
        }
        // 2x2 star with center (x = 40.5, y = 30.5)
        for r in 30..=31 {
            for c in 40..=41 {
                image[[r, c]] = 120;
            }
        }
        // hot pixel
        image[[20, 20]] = 255;
        image
    }

    #[test]
    fn finds_blobs_in_raster_order() {
        let detector = ThresholdDetector::default().with_median_blur(false);
        let stars = detector.detect(sky().view()).unwrap();

        assert_eq!(stars.len(), 2);
        assert_abs_diff_eq!(stars[0][0], 10., epsilon = 1e-12);
        assert_abs_diff_eq!(stars[0][1], 5., epsilon = 1e-12);
        assert_abs_diff_eq!(stars[1][0], 40.5, epsilon = 1e-12);
        assert_abs_diff_eq!(stars[1][1], 30.5, epsilon = 1e-12);
    }

    #[test]
    fn single_pixels_survive_with_lower_minimum() {
        let detector = ThresholdDetector::default()
            .with_median_blur(false)
            .with_min_pixels(1);
        let stars = detector.detect(sky().view()).unwrap();

        assert_eq!(stars.len(), 3);
        assert_eq!(stars[1], [20., 20.]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let detector = ThresholdDetector::default()
            .with_median_blur(false)
            .with_threshold(120);
        let stars = detector.detect(sky().view()).unwrap();

        assert_eq!(stars.len(), 1);
    }

    #[test]
    fn median_blur_removes_hot_pixels() {
        let blurred = median_blur(sky().view());

        assert_eq!(blurred[[20, 20]], 0);
        assert_eq!(blurred[[5, 10]], 200);
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let mut image = Array2::zeros((5, 5));
        image[[1, 1]] = 50;
        image[[2, 2]] = 50;
        image[[3, 3]] = 50;

        let stars = ThresholdDetector::default()
            .with_median_blur(false)
            .detect(image.view())
            .unwrap();

        assert_eq!(stars, vec![[2., 2.]]);
    }

    #[test]
    fn empty_image() {
        let image = Array2::<u8>::zeros((0, 0));
        let result = ThresholdDetector::default().detect(image.view());

        assert!(matches!(result, Err(Error::EmptyImage)));
    }
}
