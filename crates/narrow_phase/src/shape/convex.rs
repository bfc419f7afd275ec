//! Reference convex shapes and their exact triangle tests
//!
//! Every shape is defined in its own local frame, centred on the origin.
//! The leaf routine receives the shape's pose relative to the model and a
//! triangle in model space, and returns a witness point on the triangle
//! when the two intersect.

use super::triangle::{closest_points_on_segments, Triangle};
use super::{ConvexShape, ShapeKind};
use crate::bounding::Aabb;
use crate::foundation::math::{self, Pose, Vec3};

/// Axes shorter than this (squared) are skipped by the separating-axis test
const AXIS_EPSILON: f32 = 1.0e-10;

/// Solid sphere centred on the local origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Sphere radius
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere with the given radius
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl ConvexShape for Sphere {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Sphere
    }

    fn local_aabb(&self) -> Aabb {
        Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(self.radius))
    }

    fn intersect_triangle(&self, pose: &Pose, triangle: &Triangle) -> Option<Vec3> {
        let center = pose.translation.vector;
        let closest = triangle.closest_point(center);
        ((closest - center).magnitude_squared() <= self.radius * self.radius).then_some(closest)
    }
}

/// Solid box with the given half extents along its local axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    /// Half edge lengths along local x, y, z
    pub half_extents: Vec3,
}

impl Cuboid {
    /// Creates a box from its half extents
    pub const fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

impl ConvexShape for Cuboid {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cuboid
    }

    fn local_aabb(&self) -> Aabb {
        Aabb::from_center_extents(Vec3::zeros(), self.half_extents)
    }

    /// Separating-axis test in the box's local frame over the 13 candidate
    /// axes: 3 box faces, the triangle normal and 9 edge cross products.
    fn intersect_triangle(&self, pose: &Pose, triangle: &Triangle) -> Option<Vec3> {
        let local = Triangle::new(
            math::inverse_transform_point(pose, &triangle.v0),
            math::inverse_transform_point(pose, &triangle.v1),
            math::inverse_transform_point(pose, &triangle.v2),
        );

        let box_axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        let edges = local.edges().map(|(start, end)| end - start);

        let separated = box_axes
            .iter()
            .copied()
            .chain(std::iter::once(local.scaled_normal()))
            .chain(
                box_axes
                    .iter()
                    .flat_map(|axis| edges.iter().map(move |edge| axis.cross(edge))),
            )
            .any(|axis| self.separates(&local, &axis));

        if separated {
            return None;
        }
        Some(triangle.closest_point(pose.translation.vector))
    }
}

impl Cuboid {
    /// Whether `axis` separates the box (centred at the origin) from `triangle`
    fn separates(&self, triangle: &Triangle, axis: &Vec3) -> bool {
        if axis.magnitude_squared() < AXIS_EPSILON {
            return false; // degenerate axis proves nothing
        }
        let projections = triangle.vertices().map(|v| v.dot(axis));
        let min = projections[0].min(projections[1]).min(projections[2]);
        let max = projections[0].max(projections[1]).max(projections[2]);
        let radius = self.half_extents.x * axis.x.abs()
            + self.half_extents.y * axis.y.abs()
            + self.half_extents.z * axis.z.abs();
        min > radius || max < -radius
    }
}

/// Capsule aligned with its local y axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Radius of the swept sphere
    pub radius: f32,
    /// Half length of the inner segment
    pub half_height: f32,
}

impl Capsule {
    /// Creates a y-aligned capsule
    pub const fn new(radius: f32, half_height: f32) -> Self {
        Self { radius, half_height }
    }

    /// Inner segment endpoints under `pose`
    pub fn segment(&self, pose: &Pose) -> (Vec3, Vec3) {
        let offset = Vec3::new(0.0, self.half_height, 0.0);
        (
            math::transform_point(pose, &-offset),
            math::transform_point(pose, &offset),
        )
    }
}

impl ConvexShape for Capsule {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Capsule
    }

    fn local_aabb(&self) -> Aabb {
        Aabb::from_center_extents(
            Vec3::zeros(),
            Vec3::new(self.radius, self.half_height + self.radius, self.radius),
        )
    }

    fn intersect_triangle(&self, pose: &Pose, triangle: &Triangle) -> Option<Vec3> {
        let (start, end) = self.segment(pose);
        if let Some(crossing) = triangle.intersect_segment(start, end) {
            return Some(crossing);
        }

        // Segment misses the face: closest approach is at an endpoint or
        // between the segment and a triangle edge
        let endpoint_candidates = [start, end].map(|p| (triangle.closest_point(p), p));
        let edge_candidates = triangle
            .edges()
            .map(|(a, b)| {
                let (on_segment, on_edge) = closest_points_on_segments(start, end, a, b);
                (on_edge, on_segment)
            });

        let radius_sq = self.radius * self.radius;
        endpoint_candidates
            .into_iter()
            .chain(edge_candidates)
            .map(|(on_triangle, on_segment)| {
                (on_triangle, (on_triangle - on_segment).magnitude_squared())
            })
            .filter(|(_, distance_sq)| *distance_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(on_triangle, _)| on_triangle)
    }
}
