//! Traversal node binding one BVH model to one posed shape

use super::contact::{Contact, ContactSink};
use crate::bounding::BoundingVolume;
use crate::cost::CostSource;
use crate::error::{CollisionError, Result};
use crate::foundation::math;
use crate::model::BvhModel;
use crate::shape::{ConvexShape, PosedShape, TransformedBound};

/// Snapshot of a node's counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraversalStatistics {
    /// Bound overlap tests performed (calls, not successes)
    pub bv_tests: u64,
    /// Leaf tests performed
    pub leaf_tests: u64,
    /// Accumulated query time in seconds
    pub query_seconds: f64,
}

struct Binding<'a, BV, S> {
    model: &'a BvhModel<BV>,
    shape: &'a PosedShape<S>,
    bound: TransformedBound<BV>,
}

/// Stateful binding between one [`BvhModel`] and one [`PosedShape`].
///
/// The node borrows both; the borrow checker keeps the model and the shape
/// frozen for as long as the node is alive. Counters only move when
/// statistics collection was requested at initialization.
pub struct ShapeCollisionNode<'a, BV, S> {
    binding: Option<Binding<'a, BV, S>>,
    enable_statistics: bool,
    num_bv_tests: u64,
    num_leaf_tests: u64,
    query_time_seconds: f64,
}

impl<BV, S> Default for ShapeCollisionNode<'_, BV, S> {
    fn default() -> Self {
        Self {
            binding: None,
            enable_statistics: false,
            num_bv_tests: 0,
            num_leaf_tests: 0,
            query_time_seconds: 0.0,
        }
    }
}

impl<'a, BV: BoundingVolume, S: ConvexShape> ShapeCollisionNode<'a, BV, S> {
    /// Unbound node; every query fails with `UnboundModel` until initialized
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the shape's bound in the model frame and initialize a node.
    pub fn bind(
        model: &'a BvhModel<BV>,
        shape: &'a PosedShape<S>,
        collect_statistics: bool,
    ) -> Result<Self> {
        let bound = shape.transformed_bound(model.pose());
        let mut node = Self::new();
        node.initialize(model, shape, bound, collect_statistics)?;
        Ok(node)
    }

    /// Bind `model` and `shape`, adopting `bound` as the cached shape bound.
    ///
    /// Nothing is recomputed. Counters and query time reset to zero. Fails
    /// with [`CollisionError::StaleShapeBound`] (leaving the node unbound)
    /// when the shape has moved since `bound` was computed.
    pub fn initialize(
        &mut self,
        model: &'a BvhModel<BV>,
        shape: &'a PosedShape<S>,
        bound: TransformedBound<BV>,
        collect_statistics: bool,
    ) -> Result<()> {
        *self = Self::default();
        if bound.revision() != shape.revision() {
            log::warn!(
                "Rejecting stale {} bound (revision {}, shape at {})",
                shape.shape().kind(),
                bound.revision(),
                shape.revision()
            );
            return Err(CollisionError::StaleShapeBound {
                bound_revision: bound.revision(),
                shape_revision: shape.revision(),
            });
        }

        self.enable_statistics = collect_statistics;
        self.binding = Some(Binding { model, shape, bound });
        Ok(())
    }

    fn binding(&self) -> Result<&Binding<'a, BV, S>> {
        self.binding.as_ref().ok_or(CollisionError::UnboundModel)
    }

    /// Whether the node has been initialized
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Whether counters are being collected
    pub const fn statistics_enabled(&self) -> bool {
        self.enable_statistics
    }

    /// Bound model
    pub fn model(&self) -> Result<&'a BvhModel<BV>> {
        Ok(self.binding()?.model)
    }

    /// Bound shape
    pub fn shape(&self) -> Result<&'a PosedShape<S>> {
        Ok(self.binding()?.shape)
    }

    /// Cached shape bound in the model frame
    pub fn transformed_bound(&self) -> Result<&TransformedBound<BV>> {
        Ok(&self.binding()?.bound)
    }

    /// True iff the model node at `index` has no children
    pub fn is_leaf(&self, index: usize) -> Result<bool> {
        self.binding()?.model.is_leaf(index)
    }

    /// Left child of the internal node at `index`
    pub fn left_child(&self, index: usize) -> Result<usize> {
        Ok(self.binding()?.model.children(index)?.0)
    }

    /// Right child of the internal node at `index`
    pub fn right_child(&self, index: usize) -> Result<usize> {
        Ok(self.binding()?.model.children(index)?.1)
    }

    /// Test the model node's bound against the cached shape bound.
    pub fn bounds_overlap(&mut self, index: usize) -> Result<bool> {
        let binding = self.binding()?;
        let overlaps = binding.model.node(index)?.bv().overlaps(binding.bound.bv());
        if self.enable_statistics {
            self.num_bv_tests += 1;
        }
        log::trace!("BV test node {index}: {}", if overlaps { "overlap" } else { "pruned" });
        Ok(overlaps)
    }

    /// Run the exact shape test against every primitive of the leaf at
    /// `index`, appending one contact per intersecting primitive.
    pub fn leaf_test<K: ContactSink + ?Sized>(&mut self, index: usize, sink: &mut K) -> Result<()> {
        let binding = self.binding()?;
        let (model, shape) = (binding.model, binding.shape);
        let relative_pose = *binding.bound.relative_pose();

        let mut hits = 0_usize;
        for (primitive, triangle) in model.leaf_primitives(index)? {
            if let Some(point) = shape.shape().intersect_triangle(&relative_pose, triangle) {
                sink.push_contact(Contact {
                    node: index,
                    primitive,
                    point: math::transform_point(model.pose(), &point),
                });
                hits += 1;
            }
        }

        if self.enable_statistics {
            self.num_leaf_tests += 1;
        }
        log::trace!("Leaf test node {index}: {hits} contact(s)");
        Ok(())
    }

    /// Cost region where the node's box meets the shape's box, weighted by
    /// `model density × shape density`. A leaf contributes the box around its
    /// triangles; an internal node the box of its bound. `None` when the
    /// boxes are disjoint. Does not touch the counters.
    pub fn region_cost(&self, index: usize) -> Result<Option<CostSource>> {
        let binding = self.binding()?;
        let model = binding.model;
        let node_box = if model.is_leaf(index)? {
            model.leaf_aabb(index)?
        } else {
            Some(model.node(index)?.bv().aabb())
        };
        let density = model.cost_density() * binding.shape.cost_density();
        node_box
            .and_then(|node_box| node_box.intersection(binding.bound.aabb()))
            .map(|region| CostSource::from_aabb(&region, density))
            .transpose()
    }

    /// Leaf counterpart of [`region_cost`](Self::region_cost), counted as a
    /// leaf test. With `approximate` unset the region only counts when the
    /// exact test also hits one of the leaf's primitives.
    pub fn leaf_cost(&mut self, index: usize, approximate: bool) -> Result<Option<CostSource>> {
        let binding = self.binding()?;
        let (model, shape) = (binding.model, binding.shape);
        let relative_pose = *binding.bound.relative_pose();

        let mut primitives = model.leaf_primitives(index)?;
        let counts = approximate
            || primitives.any(|(_, triangle)| {
                shape.shape().intersect_triangle(&relative_pose, triangle).is_some()
            });

        if self.enable_statistics {
            self.num_leaf_tests += 1;
        }
        if counts {
            self.region_cost(index)
        } else {
            Ok(None)
        }
    }

    /// Read-only snapshot of the counters
    pub const fn statistics(&self) -> TraversalStatistics {
        TraversalStatistics {
            bv_tests: self.num_bv_tests,
            leaf_tests: self.num_leaf_tests,
            query_seconds: self.query_time_seconds,
        }
    }

    pub(crate) fn record_query_time(&mut self, seconds: f64) {
        if self.enable_statistics {
            self.query_time_seconds += seconds;
        }
    }
}
