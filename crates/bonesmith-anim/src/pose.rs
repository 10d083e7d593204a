//! Strategies for blending two poses during a cross-fade

use glam::{Mat4, Vec3};

/// Blends two joint matrices; `weight` is the share of `b` in `[0, 1]`
pub trait BlendPose {
    fn blend(&self, a: &Mat4, b: &Mat4, weight: f32) -> Mat4;

    /// Blend `b` into `a` joint by joint
    fn blend_into(&self, a: &mut [Mat4], b: &[Mat4], weight: f32) {
        for (a, b) in a.iter_mut().zip(b) {
            *a = self.blend(a, b, weight);
        }
    }
}

/// Weighted sum of matrix cells.
///
/// Cheap and order independent, but blending two rotations this way shrinks
/// and shears the result; the output is generally not orthonormal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellwiseBlend;

impl BlendPose for CellwiseBlend {
    fn blend(&self, a: &Mat4, b: &Mat4, weight: f32) -> Mat4 {
        *a * (1.0 - weight) + *b * weight
    }
}

/// Decomposes both matrices into scale, rotation and translation, lerps
/// scale and translation and slerps rotation.
///
/// Matrices with shear do not survive the decomposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecomposedBlend;

impl BlendPose for DecomposedBlend {
    fn blend(&self, a: &Mat4, b: &Mat4, weight: f32) -> Mat4 {
        let (scale_a, rotation_a, translation_a) = a.to_scale_rotation_translation();
        let (scale_b, rotation_b, translation_b) = b.to_scale_rotation_translation();

        Mat4::from_scale_rotation_translation(
            scale_a.lerp(scale_b, weight),
            rotation_a.slerp(rotation_b, weight),
            translation_a.lerp(translation_b, weight),
        )
    }
}

/// Whether the upper 3x3 of `m` is orthonormal within `epsilon`
pub fn is_orthonormal(m: &Mat4, epsilon: f32) -> bool {
    let x = m.x_axis.truncate();
    let y = m.y_axis.truncate();
    let z = m.z_axis.truncate();

    let unit = |v: Vec3| (v.length_squared() - 1.0).abs() <= epsilon;
    unit(x)
        && unit(y)
        && unit(z)
        && x.dot(y).abs() <= epsilon
        && y.dot(z).abs() <= epsilon
        && z.dot(x).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_cellwise_endpoints() {
        let a = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Mat4::from_rotation_y(1.0);
        assert!(CellwiseBlend.blend(&a, &b, 0.0).abs_diff_eq(a, 1e-6));
        assert!(CellwiseBlend.blend(&a, &b, 1.0).abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn test_cellwise_translation_midpoint() {
        let a = Mat4::from_translation(Vec3::ZERO);
        let b = Mat4::from_translation(Vec3::new(4.0, 2.0, 0.0));
        let mid = CellwiseBlend.blend(&a, &b, 0.5);
        assert!(
            mid.transform_point3(Vec3::ZERO)
                .abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-6)
        );
    }

    #[test]
    fn test_cellwise_rotation_is_not_orthonormal() {
        let a = Mat4::IDENTITY;
        let b = Mat4::from_rotation_z(FRAC_PI_2);
        let mid = CellwiseBlend.blend(&a, &b, 0.5);
        assert!(!is_orthonormal(&mid, 1e-3));
    }

    #[test]
    fn test_decomposed_rotation_stays_orthonormal() {
        let a = Mat4::IDENTITY;
        let b = Mat4::from_rotation_z(FRAC_PI_2);
        let mid = DecomposedBlend.blend(&a, &b, 0.5);
        assert!(is_orthonormal(&mid, 1e-4));
        assert!(mid.abs_diff_eq(Mat4::from_rotation_z(FRAC_PI_2 / 2.0), 1e-5));
    }

    #[test]
    fn test_blend_into() {
        let mut a = vec![Mat4::IDENTITY; 2];
        let b = vec![Mat4::from_translation(Vec3::X * 2.0); 2];
        CellwiseBlend.blend_into(&mut a, &b, 0.25);
        for m in a {
            assert!(
                m.transform_point3(Vec3::ZERO)
                    .abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6)
            );
        }
    }
}
