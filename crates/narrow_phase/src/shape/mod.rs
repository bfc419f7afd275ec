//! Convex query shapes and their model-frame bounds
//!
//! Shapes are stored in their local frame and carry a pose. Before a
//! traversal the shape's bound is expressed once in the model's frame
//! ([`TransformedBound`]); the traversal never recomputes it.
//!
//! # Key Types
//!
//! - [`ConvexShape`] - the leaf-intersection capability a shape must supply
//! - [`PosedShape`] - a shape plus pose, with a revision bumped on every move
//! - [`TransformedBound`] - the cached model-frame bound of a posed shape

pub mod convex;
pub mod triangle;

pub use convex::{Capsule, Cuboid, Sphere};
pub use triangle::Triangle;

use crate::bounding::{Aabb, BoundingVolume};
use crate::foundation::math::{Pose, Vec3};
use std::fmt;

/// Kind tag for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// [`Sphere`]
    Sphere,
    /// [`Cuboid`]
    Cuboid,
    /// [`Capsule`]
    Capsule,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sphere => "sphere",
            Self::Cuboid => "cuboid",
            Self::Capsule => "capsule",
        };
        f.write_str(name)
    }
}

/// A convex primitive that can be tested against model triangles.
pub trait ConvexShape: fmt::Debug {
    /// Kind tag
    fn kind(&self) -> ShapeKind;

    /// Bounding box in the shape's local frame
    fn local_aabb(&self) -> Aabb;

    /// Exact leaf test.
    ///
    /// `pose` places the shape in the triangle's frame. Returns a point on
    /// the triangle inside or closest to the shape when they intersect.
    fn intersect_triangle(&self, pose: &Pose, triangle: &Triangle) -> Option<Vec3>;
}

/// A shape placed in the world.
#[derive(Debug, Clone)]
pub struct PosedShape<S> {
    shape: S,
    pose: Pose,
    revision: u64,
    cost_density: f32,
}

impl<S: ConvexShape> PosedShape<S> {
    /// Place `shape` at `pose` with unit cost density
    pub const fn new(shape: S, pose: Pose) -> Self {
        Self {
            shape,
            pose,
            revision: 0,
            cost_density: 1.0,
        }
    }

    /// Set the cost density used by cost-accumulating queries
    #[must_use]
    pub fn with_cost_density(mut self, cost_density: f32) -> Self {
        self.cost_density = cost_density;
        self
    }

    /// The underlying shape
    pub const fn shape(&self) -> &S {
        &self.shape
    }

    /// World pose
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Pose revision; changes whenever the pose is set
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Cost density
    pub const fn cost_density(&self) -> f32 {
        self.cost_density
    }

    /// Move the shape. Invalidates every bound computed before the move.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Compute this shape's bound in the frame of a model placed at `model_pose`.
    pub fn transformed_bound<BV: BoundingVolume>(&self, model_pose: &Pose) -> TransformedBound<BV> {
        let relative_pose = model_pose.inv_mul(&self.pose);
        let aabb = self.shape.local_aabb().transformed(&relative_pose);
        TransformedBound {
            bv: BV::from_aabb(&aabb),
            aabb,
            relative_pose,
            revision: self.revision,
        }
    }
}

/// A shape's bound expressed in a model's frame, tagged with the shape
/// revision it was computed at.
#[derive(Debug, Clone)]
pub struct TransformedBound<BV> {
    bv: BV,
    aabb: Aabb,
    relative_pose: Pose,
    revision: u64,
}

impl<BV> TransformedBound<BV> {
    /// Bound in the model's bounding-volume representation
    pub const fn bv(&self) -> &BV {
        &self.bv
    }

    /// Axis-aligned box the bound was derived from
    pub const fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Shape pose relative to the model frame
    pub const fn relative_pose(&self) -> &Pose {
        &self.relative_pose
    }

    /// Shape revision at computation time
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::BoundingSphere;
    use crate::foundation::math::translation;
    use approx::assert_relative_eq;

    #[test]
    fn test_bound_is_expressed_in_model_frame() {
        let shape = PosedShape::new(Sphere::new(1.0), translation(Vec3::new(5.0, 0.0, 0.0)));
        let model_pose = translation(Vec3::new(2.0, 0.0, 0.0));

        let bound: TransformedBound<Aabb> = shape.transformed_bound(&model_pose);
        assert_relative_eq!(bound.aabb().center(), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(
            bound.relative_pose().translation.vector,
            Vec3::new(3.0, 0.0, 0.0),
            epsilon = 1e-6
        );

        let sphere_bound: TransformedBound<BoundingSphere> = shape.transformed_bound(&model_pose);
        assert_relative_eq!(sphere_bound.bv().center, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_set_pose_bumps_revision() {
        let mut shape = PosedShape::new(Cuboid::new(Vec3::repeat(0.5)), Pose::identity());
        let before: TransformedBound<Aabb> = shape.transformed_bound(&Pose::identity());
        shape.set_pose(translation(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(before.revision(), 0);
        assert_eq!(shape.revision(), 1);
        assert_eq!(shape.shape().kind().to_string(), "cuboid");
    }
}
