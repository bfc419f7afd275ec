//! Axis-aligned bounding box

use super::BoundingVolume;
use crate::foundation::math::{self, Pose, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for point in rest {
            aabb.min = aabb.min.inf(point);
            aabb.max = aabb.max.sup(point);
        }
        Some(aabb)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box volume; negative when an odd number of axes is inverted
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Whether `min <= max` on every axis
    pub fn is_valid(&self) -> bool {
        math::componentwise_le(&self.min, &self.max)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        math::componentwise_le(&self.min, &point) && math::componentwise_le(&point, &self.max)
    }

    /// Check if this AABB intersects another AABB (touching faces count)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Overlapping region of two boxes, `None` when they are disjoint
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self::new(self.min.sup(&other.min), self.max.inf(&other.max)))
    }

    /// Box enclosing both boxes
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Box enclosing this box after it is moved by `pose`.
    ///
    /// Rotating a box and re-boxing it grows the extents by the absolute
    /// rotation matrix; the result stays conservative for any rotation.
    #[must_use]
    pub fn transformed(&self, pose: &Pose) -> Self {
        let center = math::transform_point(pose, &self.center());
        let abs_rotation = pose.rotation.to_rotation_matrix().into_inner().abs();
        let extents = abs_rotation * self.extents();
        Self::from_center_extents(center, extents)
    }
}

impl BoundingVolume for Aabb {
    fn overlaps(&self, other: &Self) -> bool {
        self.intersects(other)
    }

    fn from_aabb(aabb: &Aabb) -> Self {
        *aabb
    }

    fn aabb(&self) -> Aabb {
        *self
    }

    fn merged(&self, other: &Self) -> Self {
        self.union(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{pose, Quat};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_touching_faces_overlap() {
        let a = unit_box();
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));

        let c = Aabb::new(Vec3::new(1.01, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_intersection_region() {
        let a = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let region = a.intersection(&b).unwrap();
        assert_eq!(region, Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)));
        assert_relative_eq!(region.volume(), 1.0);

        let far = Aabb::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(6.0, 6.0, 6.0));
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_rotated_box_stays_conservative() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let rotated = aabb.transformed(&pose(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_4),
        ));

        let half_diagonal = 2.0_f32.sqrt();
        assert_relative_eq!(rotated.center(), Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(rotated.extents().x, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(rotated.extents().y, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(rotated.extents().z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_validity_and_volume() {
        assert!(unit_box().is_valid());
        let inverted = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        assert!(!inverted.is_valid());
        assert!(inverted.volume() < 0.0);
    }
}
