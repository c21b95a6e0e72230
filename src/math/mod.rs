//! Numeric kernels shared by the prediction and residual engines.
mod histogram;
mod lagrange;
mod polynomial;

pub use histogram::{histogram_counts, HistogramBin};
pub use lagrange::{lagrange_interpolation, LagrangeOutput};
pub use polynomial::{polynomial_eval, polynomial_fit};

// Vector3 is nalgebra's Vector3 with a 64-bit floating point representation.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Returns a rotation matrix for a rotation about the X axis.
///
/// # Arguments
///
/// * `angle_rad` - The angle of rotation in radians.
///
pub fn r1(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Returns a rotation matrix for a rotation about the Y axis.
///
/// # Arguments
///
/// * `angle_rad` - The angle of rotation in radians.
///
pub fn r2(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Returns a rotation matrix for a rotation about the Z axis.
///
/// # Arguments
///
/// * `angle_rad` - The angle of rotation in radians.
///
pub fn r3(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn axis_rotations_are_orthonormal() {
        for rot in [r1(0.3), r2(-1.2), r3(2.9)] {
            let should_be_identity = rot * rot.transpose();
            assert_abs_diff_eq!(should_be_identity, Matrix3::identity(), epsilon = 1e-14);
            assert_abs_diff_eq!(rot.determinant(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn r3_quarter_turn() {
        // +x expressed in a frame rotated by +90° about z becomes -y
        let rotated = r3(FRAC_PI_2) * Vector3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(rotated, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-14);
    }
}
