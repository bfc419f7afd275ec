//! # Narrow Phase
//!
//! Collision kernel that tests one bounding-volume hierarchy against one
//! convex shape.
//!
//! ## Features
//!
//! - **Pruned traversal**: depth-first descent that skips every subtree whose
//!   bound misses the shape, without ever missing a real contact
//! - **Generic bounds and shapes**: any [`BoundingVolume`] for the hierarchy,
//!   any [`ConvexShape`] for the query
//! - **Query modes**: exhaustive, first contact, or up to N contacts
//! - **Cost regions**: [`CostSource`] boxes ranked heaviest first, summed by
//!   a cost-accumulating traversal with an optional budget
//! - **Statistics**: per-node BV-test and leaf-test counters plus query time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use narrow_phase::prelude::*;
//!
//! fn main() -> Result<(), CollisionError> {
//!     let floor = vec![Triangle::new(
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 0.0, 1.0),
//!     )];
//!     let model: BvhModel<Aabb> = BvhModel::build(floor)?;
//!     let ball = PosedShape::new(Sphere::new(0.5), math::translation(Vec3::new(0.2, 0.3, 0.2)));
//!
//!     let mut node = ShapeCollisionNode::bind(&model, &ball, true)?;
//!     let mut contacts: Vec<Contact> = Vec::new();
//!     let outcome = collide(&mut node, &CollisionQuery::new(QueryMode::FirstContact), &mut contacts)?;
//!     println!("collided: {}, stats: {:?}", outcome.collided(), node.statistics());
//!     Ok(())
//! }
//! ```

pub mod foundation;

pub mod bounding;
pub mod config;
pub mod cost;
pub mod error;
pub mod model;
pub mod shape;
pub mod traversal;

pub use bounding::{Aabb, BoundingSphere, BoundingVolume};
pub use cost::CostSource;
pub use error::{CollisionError, Result};
pub use model::{BvNode, BvhBuilder, BvhModel};
pub use shape::{ConvexShape, PosedShape, TransformedBound};

/// Common imports for kernel users
pub mod prelude {
    pub use crate::{
        Aabb, BoundingSphere, BoundingVolume,
        BvNode, BvhBuilder, BvhModel,
        CollisionError, CostSource,
        ConvexShape, PosedShape, TransformedBound,
        config::{Config, CostConfig, TraversalConfig},
        foundation::{
            math::{self, Pose, Quat, Vec3},
            time::Stopwatch,
        },
        shape::{Capsule, Cuboid, ShapeKind, Sphere, Triangle},
        traversal::{
            accumulate_cost, collide, CancellationCheck, CollisionOutcome, CollisionQuery,
            Contact, ContactSink, CostQuery, CostReport, QueryMode, ShapeCollisionNode,
            TraversalStatistics,
        },
    };
}
