//! Math utilities and types
//!
//! Single-precision aliases over `nalgebra`, matching the frame conventions
//! used by models and shapes: a [`Pose`] maps a local frame into its parent.

pub use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Rigid transform (rotation followed by translation)
pub type Pose = Isometry3<f32>;

/// Build a pose from a translation and a rotation.
pub fn pose(translation: Vec3, rotation: Quat) -> Pose {
    Pose::from_parts(Translation3::from(translation), rotation)
}

/// Build a pure translation pose.
pub fn translation(translation: Vec3) -> Pose {
    Pose::translation(translation.x, translation.y, translation.z)
}

/// Transform a point (as opposed to a direction) by a pose.
pub fn transform_point(pose: &Pose, point: &Vec3) -> Vec3 {
    pose.transform_point(&Point3::from(*point)).coords
}

/// Transform a point by the inverse of a pose.
pub fn inverse_transform_point(pose: &Pose, point: &Vec3) -> Vec3 {
    pose.inverse_transform_point(&Point3::from(*point)).coords
}

/// Component-wise comparison `a <= b` on every axis.
pub fn componentwise_le(a: &Vec3, b: &Vec3) -> bool {
    a.x <= b.x && a.y <= b.y && a.z <= b.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_point_roundtrip() {
        let p = pose(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
        );
        let local = Vec3::new(0.5, -1.0, 4.0);
        let world = transform_point(&p, &local);
        assert_relative_eq!(inverse_transform_point(&p, &world), local, epsilon = 1e-5);
    }

    #[test]
    fn test_componentwise_le() {
        assert!(componentwise_le(&Vec3::zeros(), &Vec3::new(0.0, 1.0, 2.0)));
        assert!(!componentwise_le(&Vec3::new(0.0, 2.0, 0.0), &Vec3::new(1.0, 1.0, 1.0)));
        // NaN never compares as ordered
        assert!(!componentwise_le(&Vec3::new(f32::NAN, 0.0, 0.0), &Vec3::zeros()));
    }
}
