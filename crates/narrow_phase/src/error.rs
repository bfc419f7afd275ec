//! Error types for traversal, models and cost regions

use crate::foundation::math::Vec3;
use thiserror::Error;

/// Errors reported by the collision kernel.
///
/// Every variant is a local, recoverable condition; the traversal stops at
/// the first one and hands it back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Node index outside the model's node range
    #[error("node index {index} is outside the model's {node_count} nodes")]
    InvalidNodeIndex {
        /// Offending index
        index: usize,
        /// Number of nodes in the model
        node_count: usize,
    },

    /// Child accessor called on a leaf
    #[error("node {0} is a leaf and has no children")]
    NotInternalNode(usize),

    /// Leaf test requested on an internal node
    #[error("node {0} is an internal node, not a leaf")]
    NotLeafNode(usize),

    /// Traversal attempted before the node was initialized
    #[error("traversal node is not bound to a model and shape")]
    UnboundModel,

    /// The shape moved after its transformed bound was computed
    #[error(
        "shape bound was computed at pose revision {bound_revision} \
         but the shape is at revision {shape_revision}"
    )]
    StaleShapeBound {
        /// Revision recorded in the bound
        bound_revision: u64,
        /// Current revision of the shape
        shape_revision: u64,
    },

    /// Cost region with inverted or non-finite bounds, or a non-finite density
    #[error("malformed cost region: min {min:?}, max {max:?}, density {density}")]
    MalformedCostRegion {
        /// Lower corner as given
        min: Vec3,
        /// Upper corner as given
        max: Vec3,
        /// Density as given
        density: f32,
    },

    /// Model arena that does not describe a tree rooted at index 0
    #[error("malformed model: {0}")]
    MalformedModel(String),

    /// The caller's cancellation check fired mid-traversal
    #[error("traversal cancelled after {visited} node visits")]
    Cancelled {
        /// Nodes visited before cancellation was observed
        visited: usize,
    },
}

/// Result alias for collision operations
pub type Result<T> = std::result::Result<T, CollisionError>;
