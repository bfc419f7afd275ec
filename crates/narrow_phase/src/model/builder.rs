//! Top-down median-split BVH construction

use super::{BvNode, BvhModel};
use crate::bounding::{Aabb, BoundingVolume};
use crate::error::{CollisionError, Result};
use crate::foundation::math::Vec3;
use crate::shape::Triangle;

/// Builds a [`BvhModel`] by recursively splitting triangles at the median
/// centroid along the longest axis of the centroid bounds.
#[derive(Debug, Clone)]
pub struct BvhBuilder {
    max_leaf_primitives: usize,
}

impl Default for BvhBuilder {
    fn default() -> Self {
        Self { max_leaf_primitives: 1 }
    }
}

impl BvhBuilder {
    /// Builder with one triangle per leaf
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow up to `count` triangles per leaf (at least one)
    #[must_use]
    pub fn with_max_leaf_primitives(mut self, count: usize) -> Self {
        self.max_leaf_primitives = count.max(1);
        self
    }

    /// Build the hierarchy. Fails on an empty triangle list.
    pub fn build<BV: BoundingVolume>(&self, triangles: Vec<Triangle>) -> Result<BvhModel<BV>> {
        if triangles.is_empty() {
            return Err(CollisionError::MalformedModel(
                "cannot build a hierarchy without triangles".into(),
            ));
        }

        let centroids: Vec<_> = triangles.iter().map(Triangle::centroid).collect();
        let mut state = BuildState {
            triangles: &triangles,
            centroids: &centroids,
            primitive_indices: (0..triangles.len()).collect(),
            nodes: Vec::with_capacity(2 * triangles.len() - 1),
            max_leaf_primitives: self.max_leaf_primitives,
        };
        state.build_node(0, triangles.len());

        let BuildState { nodes, primitive_indices, .. } = state;
        log::debug!(
            "Built BVH: {} triangles, {} nodes, leaf size <= {}",
            triangles.len(),
            nodes.len(),
            self.max_leaf_primitives
        );
        Ok(BvhModel::new_unchecked(nodes, triangles, primitive_indices))
    }
}

struct BuildState<'a, BV> {
    triangles: &'a [Triangle],
    centroids: &'a [Vec3],
    primitive_indices: Vec<usize>,
    nodes: Vec<BvNode<BV>>,
    max_leaf_primitives: usize,
}

impl<BV: BoundingVolume> BuildState<'_, BV> {
    /// Build the subtree over `primitive_indices[start..end]`, returning its node index
    fn build_node(&mut self, start: usize, end: usize) -> usize {
        let index = self.nodes.len();
        let count = end - start;
        let bounds = self.leaf_bounds(start, end);
        self.nodes.push(BvNode::leaf(BV::from_aabb(&bounds), start, count));
        if count <= self.max_leaf_primitives {
            return index;
        }

        let axis = self.split_axis(start, end);
        let centroids = self.centroids;
        self.primitive_indices[start..end]
            .sort_by(|&a, &b| centroids[a][axis].total_cmp(&centroids[b][axis]));

        let mid = start + count / 2;
        let left = self.build_node(start, mid);
        let right = self.build_node(mid, end);

        // Internal bounds enclose the children's bounds, not the raw triangles
        let bv = self.nodes[left].bv().merged(self.nodes[right].bv());
        let node = &mut self.nodes[index];
        node.bv = bv;
        node.children = Some([left, right]);
        node.primitive_count = 0;
        index
    }

    /// Box around the triangles of the range
    fn leaf_bounds(&self, start: usize, end: usize) -> Aabb {
        self.primitive_indices[start..end]
            .iter()
            .map(|&i| self.triangles[i].aabb())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Aabb::new(self.centroids[0], self.centroids[0]))
    }

    /// Longest axis of the centroid bounds of the range
    fn split_axis(&self, start: usize, end: usize) -> usize {
        let points: Vec<_> = self.primitive_indices[start..end]
            .iter()
            .map(|&i| self.centroids[i])
            .collect();
        let spread = Aabb::from_points(&points).map_or_else(Default::default, |aabb| aabb.size());
        spread.imax()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::BoundingSphere;

    fn strip(count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|i| {
                let x = i as f32;
                Triangle::new(
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 1.0, 0.0, 0.0),
                    Vec3::new(x, 0.0, 1.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_build_produces_a_valid_balanced_tree() {
        let model: BvhModel<Aabb> = BvhBuilder::new().build(strip(8)).unwrap();
        assert_eq!(model.node_count(), 15);
        assert_eq!(model.leaf_count(), 8);
        assert_eq!(model.height(), 4);

        // Round-trips through the validating constructor
        let rebuilt = BvhModel::from_parts(
            model.nodes().to_vec(),
            model.triangles().to_vec(),
            model.primitive_indices.clone(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_parent_bounds_enclose_children() {
        let model: BvhModel<Aabb> = BvhModel::build(strip(13)).unwrap();
        for node in model.nodes() {
            if let Some((left, right)) = node.children() {
                let parent = node.bv();
                for child in [left, right] {
                    let child_bv = model.node(child).unwrap().bv();
                    assert!(parent.contains_point(child_bv.min));
                    assert!(parent.contains_point(child_bv.max));
                }
            }
        }
    }

    #[test]
    fn test_sphere_parents_enclose_children() {
        let model: BvhModel<BoundingSphere> = BvhModel::build(strip(11)).unwrap();
        for node in model.nodes() {
            if let Some((left, right)) = node.children() {
                let parent = node.bv();
                for child in [left, right] {
                    let child_bv = model.node(child).unwrap().bv();
                    let reach = (child_bv.center - parent.center).magnitude() + child_bv.radius;
                    assert!(reach <= parent.radius + 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_leaf_size_limit_and_every_triangle_referenced_once() {
        let model: BvhModel<BoundingSphere> = BvhBuilder::new()
            .with_max_leaf_primitives(3)
            .build(strip(10))
            .unwrap();

        let mut seen = vec![0_u32; 10];
        for (index, node) in model.nodes().iter().enumerate() {
            if node.is_leaf() {
                assert!(node.primitive_range().len() <= 3);
                for (primitive, _) in model.leaf_primitives(index).unwrap() {
                    seen[primitive] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result: Result<BvhModel<Aabb>> = BvhBuilder::new().build(Vec::new());
        assert!(matches!(result, Err(CollisionError::MalformedModel(_))));
    }
}
