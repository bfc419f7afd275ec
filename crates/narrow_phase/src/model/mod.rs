//! Hierarchical bounding-volume models
//!
//! A [`BvhModel`] is a flat arena of [`BvNode`]s addressed by index, root
//! at 0. Internal nodes hold two child indices; leaves hold a range into the
//! model's primitive index list, which in turn points at triangles.
//!
//! Models are immutable once built, so any number of traversals (on any
//! number of threads) may read one model at the same time.

pub mod builder;

pub use builder::BvhBuilder;

use crate::bounding::{Aabb, BoundingVolume};
use crate::error::{CollisionError, Result};
use crate::foundation::math::Pose;
use crate::shape::Triangle;
use std::ops::Range;

/// One node of the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct BvNode<BV> {
    bv: BV,
    children: Option<[usize; 2]>,
    first_primitive: usize,
    primitive_count: usize,
}

impl<BV> BvNode<BV> {
    /// Internal node with two children
    pub fn internal(bv: BV, left: usize, right: usize) -> Self {
        Self {
            bv,
            children: Some([left, right]),
            first_primitive: 0,
            primitive_count: 0,
        }
    }

    /// Leaf referencing `primitive_count` entries of the primitive index
    /// list starting at `first_primitive`
    pub fn leaf(bv: BV, first_primitive: usize, primitive_count: usize) -> Self {
        Self {
            bv,
            children: None,
            first_primitive,
            primitive_count,
        }
    }

    /// Node bound, in the model frame
    pub const fn bv(&self) -> &BV {
        &self.bv
    }

    /// True when the node has no children
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// `(left, right)` child indices of an internal node
    pub const fn children(&self) -> Option<(usize, usize)> {
        match self.children {
            Some([left, right]) => Some((left, right)),
            None => None,
        }
    }

    /// Range into the primitive index list (empty for internal nodes)
    pub const fn primitive_range(&self) -> Range<usize> {
        self.first_primitive..self.first_primitive.saturating_add(self.primitive_count)
    }
}

/// Bounding-volume hierarchy over a triangle soup
#[derive(Debug, Clone)]
pub struct BvhModel<BV> {
    nodes: Vec<BvNode<BV>>,
    triangles: Vec<Triangle>,
    primitive_indices: Vec<usize>,
    pose: Pose,
    cost_density: f32,
}

impl<BV: BoundingVolume> BvhModel<BV> {
    /// Build a hierarchy over `triangles` with the default builder settings
    pub fn build(triangles: Vec<Triangle>) -> Result<Self> {
        BvhBuilder::default().build(triangles)
    }

    /// Assemble a model from a prebuilt arena.
    ///
    /// Fails with [`CollisionError::MalformedModel`] unless the arena is a
    /// tree rooted at index 0 whose every node is reachable exactly once
    /// and whose leaf ranges point at existing triangles.
    pub fn from_parts(
        nodes: Vec<BvNode<BV>>,
        triangles: Vec<Triangle>,
        primitive_indices: Vec<usize>,
    ) -> Result<Self> {
        let model = Self::new_unchecked(nodes, triangles, primitive_indices);
        model.validate()?;
        Ok(model)
    }

    pub(crate) fn new_unchecked(
        nodes: Vec<BvNode<BV>>,
        triangles: Vec<Triangle>,
        primitive_indices: Vec<usize>,
    ) -> Self {
        Self {
            nodes,
            triangles,
            primitive_indices,
            pose: Pose::identity(),
            cost_density: 1.0,
        }
    }

    fn validate(&self) -> Result<()> {
        let node_count = self.nodes.len();
        if node_count == 0 {
            return Err(CollisionError::MalformedModel("model has no nodes".into()));
        }
        if let Some(bad) = self.primitive_indices.iter().find(|&&i| i >= self.triangles.len()) {
            return Err(CollisionError::MalformedModel(format!(
                "primitive index {bad} is outside the model's {} triangles",
                self.triangles.len()
            )));
        }

        let mut visited = vec![false; node_count];
        let mut stack = vec![0_usize];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                return Err(CollisionError::MalformedModel(format!(
                    "node {index} is reachable more than once"
                )));
            }

            let node = &self.nodes[index];
            match node.children() {
                Some((left, right)) => {
                    for child in [right, left] {
                        if child >= node_count {
                            return Err(CollisionError::MalformedModel(format!(
                                "node {index} references child {child} outside {node_count} nodes"
                            )));
                        }
                        stack.push(child);
                    }
                }
                None => {
                    let end = node.first_primitive.checked_add(node.primitive_count);
                    if !end.is_some_and(|end| end <= self.primitive_indices.len()) {
                        return Err(CollisionError::MalformedModel(format!(
                            "leaf {index} references {} primitives from {} outside {} entries",
                            node.primitive_count,
                            node.first_primitive,
                            self.primitive_indices.len()
                        )));
                    }
                }
            }
        }

        if let Some(orphan) = visited.iter().position(|seen| !seen) {
            return Err(CollisionError::MalformedModel(format!(
                "node {orphan} is not reachable from the root"
            )));
        }
        Ok(())
    }

    /// Place the model in the world
    #[must_use]
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Set the cost density used by cost-accumulating queries
    #[must_use]
    pub fn with_cost_density(mut self, cost_density: f32) -> Self {
        self.cost_density = cost_density;
        self
    }

    /// Model-to-world pose
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Cost density
    pub const fn cost_density(&self) -> f32 {
        self.cost_density
    }

    /// Number of nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[BvNode<BV>] {
        &self.nodes
    }

    /// All triangles, in model space
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Node at `index`
    pub fn node(&self, index: usize) -> Result<&BvNode<BV>> {
        self.nodes.get(index).ok_or(CollisionError::InvalidNodeIndex {
            index,
            node_count: self.nodes.len(),
        })
    }

    /// Whether the node at `index` is a leaf
    pub fn is_leaf(&self, index: usize) -> Result<bool> {
        Ok(self.node(index)?.is_leaf())
    }

    /// Child indices of the internal node at `index`
    pub fn children(&self, index: usize) -> Result<(usize, usize)> {
        self.node(index)?
            .children()
            .ok_or(CollisionError::NotInternalNode(index))
    }

    /// `(primitive id, triangle)` pairs referenced by the leaf at `index`
    pub fn leaf_primitives(&self, index: usize) -> Result<impl Iterator<Item = (usize, &Triangle)>> {
        let node = self.node(index)?;
        if !node.is_leaf() {
            return Err(CollisionError::NotLeafNode(index));
        }
        Ok(self.primitive_indices[node.primitive_range()]
            .iter()
            .map(|&primitive| (primitive, &self.triangles[primitive])))
    }

    /// Box around the triangles of the leaf at `index`, `None` for an
    /// empty leaf. Tighter than the leaf's bound for non-box volumes.
    pub fn leaf_aabb(&self, index: usize) -> Result<Option<Aabb>> {
        Ok(self
            .leaf_primitives(index)?
            .map(|(_, triangle)| triangle.aabb())
            .reduce(|a, b| a.union(&b)))
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(0_usize, 1_usize)];
        while let Some((index, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some((left, right)) = self.nodes[index].children() {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        height
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::Aabb;
    use crate::foundation::math::Vec3;

    fn tri(x: f32) -> Triangle {
        Triangle::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + 1.0, 0.0, 0.0),
            Vec3::new(x, 0.0, 1.0),
        )
    }

    fn leaf(first: usize) -> BvNode<Aabb> {
        BvNode::leaf(tri(first as f32).aabb(), first, 1)
    }

    fn root_box() -> Aabb {
        Aabb::new(Vec3::zeros(), Vec3::new(3.0, 0.0, 1.0))
    }

    #[test]
    fn test_from_parts_accepts_a_tree() {
        let model = BvhModel::from_parts(
            vec![BvNode::internal(root_box(), 1, 2), leaf(0), leaf(1)],
            vec![tri(0.0), tri(1.0)],
            vec![0, 1],
        )
        .unwrap();

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.height(), 2);
        assert_eq!(model.leaf_count(), 2);
        assert_eq!(model.children(0).unwrap(), (1, 2));
        let prims: Vec<usize> = model.leaf_primitives(2).unwrap().map(|(id, _)| id).collect();
        assert_eq!(prims, vec![1]);
    }

    #[test]
    fn test_from_parts_rejects_cycles_and_orphans() {
        let cyclic = BvhModel::from_parts(
            vec![BvNode::internal(root_box(), 1, 2), BvNode::internal(root_box(), 0, 2), leaf(0)],
            vec![tri(0.0)],
            vec![0],
        );
        assert!(matches!(cyclic, Err(CollisionError::MalformedModel(_))));

        let orphan = BvhModel::from_parts(vec![leaf(0), leaf(0)], vec![tri(0.0)], vec![0]);
        assert!(matches!(orphan, Err(CollisionError::MalformedModel(_))));

        let empty = BvhModel::<Aabb>::from_parts(Vec::new(), Vec::new(), Vec::new());
        assert!(matches!(empty, Err(CollisionError::MalformedModel(_))));
    }

    #[test]
    fn test_from_parts_rejects_out_of_range_references() {
        let bad_child = BvhModel::from_parts(
            vec![BvNode::internal(root_box(), 1, 7), leaf(0)],
            vec![tri(0.0)],
            vec![0],
        );
        assert!(matches!(bad_child, Err(CollisionError::MalformedModel(_))));

        let bad_primitive = BvhModel::from_parts(vec![leaf(0)], vec![tri(0.0)], vec![3]);
        assert!(matches!(bad_primitive, Err(CollisionError::MalformedModel(_))));

        let bad_range = BvhModel::from_parts(vec![BvNode::leaf(root_box(), 0, 4)], vec![tri(0.0)], vec![0]);
        assert!(matches!(bad_range, Err(CollisionError::MalformedModel(_))));

        let overflowing = BvhModel::from_parts(vec![BvNode::leaf(root_box(), usize::MAX, 2)], vec![tri(0.0)], vec![0]);
        assert!(matches!(overflowing, Err(CollisionError::MalformedModel(_))));
    }

    #[test]
    fn test_accessors_report_index_errors() {
        let model = BvhModel::from_parts(vec![leaf(0)], vec![tri(0.0)], vec![0]).unwrap();
        assert_eq!(
            model.is_leaf(1),
            Err(CollisionError::InvalidNodeIndex { index: 1, node_count: 1 })
        );
        assert_eq!(model.children(0), Err(CollisionError::NotInternalNode(0)));
    }
}
