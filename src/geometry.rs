use std::cmp::Ordering;

use nalgebra::Vector2;

use crate::Float;

/// Clamp a cosine into `[-1, 1]`.
///
/// Undefined cosines (division by a vanishing side) are taken as `0`.
fn clamp_cosine<F: Float>(cos: F) -> F {
    let one = F::one();
    if !cos.is_finite() {
        F::zero()
    } else if cos > one {
        one
    } else if cos < -one {
        -one
    } else {
        cos
    }
}

fn degrees<F: Float>(radians: F) -> F {
    radians * F::from_f64(180.).unwrap() / F::pi()
}

/// Interior angles of a triangle from its side lengths, in degrees and sorted ascending.
///
/// `ab`, `bc` and `ac` are the distances between the vertices `A`, `B` and `C`.
/// Near-collinear triangles are absorbed by clamping each cosine before inversion,
/// so the result always lies in `[0°, 180°]`.
/// Three coincident vertices give `[0°, 0°, 180°]`.
pub(crate) fn angles_from_sides<F: Float>(ab: F, bc: F, ac: F) -> [F; 3] {
    let zero = F::zero();
    if ab == zero && bc == zero && ac == zero {
        return [zero, zero, F::from_f64(180.).unwrap()];
    }

    let two = F::from_f64(2.).unwrap();
    let cos_a = (bc * bc + ac * ac - ab * ab) / (two * bc * ac);
    let cos_b = (ab * ab + ac * ac - bc * bc) / (two * ab * ac);
    let cos_c = (ab * ab + bc * bc - ac * ac) / (two * ab * bc);

    let mut angles = [
        degrees(clamp_cosine(cos_a).acos()),
        degrees(clamp_cosine(cos_b).acos()),
        degrees(clamp_cosine(cos_c).acos()),
    ];
    angles.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    angles
}

/// Euclidean distance between two pixel coordinates.
pub(crate) fn distance<F: Float>(a: &Vector2<F>, b: &Vector2<F>) -> F {
    (a - b).norm()
}
