//! Cost-weighted regions
//!
//! A [`CostSource`] is an axis-aligned box with a cost density. Its total
//! cost (`density × volume`) is computed once when the region is built and
//! never recomputed; regions have no mutators.
//!
//! Regions rank by [`CostSource::priority_cmp`], which puts the *most*
//! expensive region first. Cost-aware queries rely on that descending order
//! to visit or keep the heaviest regions before the light ones.

use crate::bounding::Aabb;
use crate::error::{CollisionError, Result};
use crate::foundation::math::Vec3;
use std::cmp::Ordering;

/// An axis-aligned region with a cost density
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostSource {
    aabb_min: Vec3,
    aabb_max: Vec3,
    cost_density: f32,
    total_cost: f32,
}

impl CostSource {
    /// Region spanning `aabb_min..aabb_max` with the given density.
    ///
    /// Fails with [`CollisionError::MalformedCostRegion`] when any component
    /// of `aabb_min` exceeds `aabb_max`, or when any input is not finite.
    pub fn new(aabb_min: Vec3, aabb_max: Vec3, cost_density: f32) -> Result<Self> {
        let finite = aabb_min.iter().chain(aabb_max.iter()).all(|c| c.is_finite())
            && cost_density.is_finite();
        if !finite || !Aabb::new(aabb_min, aabb_max).is_valid() {
            return Err(CollisionError::MalformedCostRegion {
                min: aabb_min,
                max: aabb_max,
                density: cost_density,
            });
        }

        let size = aabb_max - aabb_min;
        Ok(Self {
            aabb_min,
            aabb_max,
            cost_density,
            total_cost: cost_density * size.x * size.y * size.z,
        })
    }

    /// Region covering `aabb` with the given density
    pub fn from_aabb(aabb: &Aabb, cost_density: f32) -> Result<Self> {
        Self::new(aabb.min, aabb.max, cost_density)
    }

    /// Lower corner
    pub const fn aabb_min(&self) -> Vec3 {
        self.aabb_min
    }

    /// Upper corner
    pub const fn aabb_max(&self) -> Vec3 {
        self.aabb_max
    }

    /// Region as a box
    pub const fn aabb(&self) -> Aabb {
        Aabb::new(self.aabb_min, self.aabb_max)
    }

    /// Cost per unit volume
    pub const fn cost_density(&self) -> f32 {
        self.cost_density
    }

    /// Cached `cost_density × volume`, as measured at construction
    pub const fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// Priority order; `Less` means `self` comes first.
    ///
    /// Higher total cost first, then higher density, then the
    /// lexicographically smaller lower corner (x, y, z). Regions equal on
    /// all three keys are equivalent in rank.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        descending(self.total_cost, other.total_cost)
            .then_with(|| descending(self.cost_density, other.cost_density))
            .then_with(|| {
                self.aabb_min
                    .iter()
                    .zip(other.aabb_min.iter())
                    .map(|(a, b)| ascending(*a, *b))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }

    /// Whether `self` ranks strictly before `other`
    pub fn ranks_before(&self, other: &Self) -> bool {
        self.priority_cmp(other) == Ordering::Less
    }
}

/// Numeric order where `-0.0` and `0.0` tie. Fields are finite by
/// construction, so the fallback never triggers.
fn ascending(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn descending(a: f32, b: f32) -> Ordering {
    ascending(b, a)
}

/// Stable sort into priority order; equal-rank regions keep their input order.
pub fn sort_by_priority(sources: &mut [CostSource]) {
    sources.sort_by(CostSource::priority_cmp);
}
