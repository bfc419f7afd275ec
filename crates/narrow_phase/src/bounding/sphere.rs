//! Bounding sphere volume

use super::{Aabb, BoundingVolume};
use crate::foundation::math::Vec3;

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Whether `other` lies entirely inside this sphere
    pub fn contains(&self, other: &Self) -> bool {
        (self.center - other.center).magnitude() + other.radius <= self.radius
    }
}

impl BoundingVolume for BoundingSphere {
    fn overlaps(&self, other: &Self) -> bool {
        self.intersects(other)
    }

    /// Circumscribed sphere of the box (center plus half diagonal).
    fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.extents().magnitude())
    }

    fn aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    fn merged(&self, other: &Self) -> Self {
        if self.contains(other) {
            return *self;
        }
        if other.contains(self) {
            return *other;
        }

        let offset = other.center - self.center;
        let distance = offset.magnitude();
        let radius = (distance + self.radius + other.radius) * 0.5;
        // Neither contains the other, so distance > 0 here
        let center = self.center + offset * ((radius - self.radius) / distance);
        Self::new(center, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_overlap_includes_touching() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_from_aabb_encloses_corners() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let sphere = BoundingSphere::from_aabb(&aabb);
        assert_relative_eq!(sphere.radius, 14.0_f32.sqrt(), epsilon = 1e-6);
        assert!(sphere.aabb().contains_point(aabb.max));
        assert!(sphere.aabb().contains_point(aabb.min));
    }

    #[test]
    fn test_merged_encloses_both() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0);
        let merged = a.merged(&b);
        assert_relative_eq!(merged.center, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(merged.radius, 3.0, epsilon = 1e-6);

        let inner = BoundingSphere::new(Vec3::new(0.1, 0.0, 0.0), 0.2);
        assert_eq!(a.merged(&inner), a);
        assert_eq!(inner.merged(&a), a);
    }
}
