//! Bounding-volume overlap protocol
//!
//! The traversal only ever asks a bound one question: "could you overlap
//! that other bound?". Implementations must be conservative: a `false`
//! answer is a proof of separation, a `true` answer is only a maybe.
//!
//! Two reference representations ship with the crate:
//! - [`Aabb`] - axis-aligned box, tight for axis-aligned geometry
//! - [`BoundingSphere`] - rotation invariant, cheapest overlap test

pub mod aabb;
pub mod sphere;

pub use aabb::Aabb;
pub use sphere::BoundingSphere;

/// A conservative spatial bound usable as a BVH node volume.
///
/// Both operands of [`overlaps`](Self::overlaps) must be expressed in the
/// same reference frame.
pub trait BoundingVolume: Clone + std::fmt::Debug {
    /// Whether this bound may overlap `other`. Never a false negative.
    fn overlaps(&self, other: &Self) -> bool;

    /// Smallest bound of this kind (up to the kind's precision) that
    /// encloses `aabb`.
    fn from_aabb(aabb: &Aabb) -> Self;

    /// Axis-aligned box enclosing this bound.
    fn aabb(&self) -> Aabb;

    /// Bound enclosing both `self` and `other`.
    #[must_use]
    fn merged(&self, other: &Self) -> Self;
}
