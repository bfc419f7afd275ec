//! BVH-versus-shape traversal
//!
//! A [`ShapeCollisionNode`] binds one model to one posed shape and exposes
//! the navigation and test primitives. The drivers walk a node from the
//! root:
//!
//! - [`collide`] - depth-first, pruned descent reporting contacts to a sink
//! - [`accumulate_cost`] - same descent, summing leaf [`CostSource`] regions;
//!   best-first by region priority when a cost budget is set
//!
//! [`CostSource`]: crate::cost::CostSource

pub mod contact;
pub mod cost;
pub mod node;
pub mod recurse;


pub use contact::{Contact, ContactSink, QueryMode};
pub use cost::{accumulate_cost, CostQuery, CostReport};
pub use node::{ShapeCollisionNode, TraversalStatistics};
pub use recurse::{collide, CollisionOutcome, CollisionQuery};

use crate::error::{CollisionError, Result};
use std::fmt;

/// Caller-supplied cancellation predicate, polled once per visited node.
#[derive(Clone, Copy, Default)]
pub struct CancellationCheck<'c> {
    check: Option<&'c dyn Fn() -> bool>,
}

impl<'c> CancellationCheck<'c> {
    /// Never cancels
    pub const fn none() -> Self {
        Self { check: None }
    }

    /// Cancels as soon as `check` returns true
    pub const fn new(check: &'c dyn Fn() -> bool) -> Self {
        Self { check: Some(check) }
    }

    /// Fail with [`CollisionError::Cancelled`] if the predicate fires
    pub(crate) fn poll(&self, visited: usize) -> Result<()> {
        match self.check {
            Some(check) if check() => {
                log::warn!("Traversal cancelled after {visited} node visits");
                Err(CollisionError::Cancelled { visited })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for CancellationCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationCheck")
            .field("armed", &self.check.is_some())
            .finish()
    }
}
