//! Depth-first collision descent

use super::contact::{ContactSink, QueryMode};
use super::node::ShapeCollisionNode;
use super::CancellationCheck;
use crate::bounding::BoundingVolume;
use crate::config::TraversalConfig;
use crate::error::{CollisionError, Result};
use crate::foundation::time::Stopwatch;
use crate::shape::ConvexShape;
use std::ops::ControlFlow;

/// Caller-side options for one [`collide`] call
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionQuery<'c> {
    mode: QueryMode,
    cancellation: CancellationCheck<'c>,
}

impl<'c> CollisionQuery<'c> {
    /// Query in the given mode, never cancelled
    pub const fn new(mode: QueryMode) -> Self {
        Self {
            mode,
            cancellation: CancellationCheck::none(),
        }
    }

    /// Query in the mode described by `config`
    pub fn from_config(config: &TraversalConfig) -> Self {
        Self::new(config.query_mode())
    }

    /// Poll `check` once per visited node and abort when it returns true
    #[must_use]
    pub fn with_cancellation(mut self, check: &'c dyn Fn() -> bool) -> Self {
        self.cancellation = CancellationCheck::new(check);
        self
    }

    /// Requested mode
    pub const fn mode(&self) -> QueryMode {
        self.mode
    }
}

/// Summary of one [`collide`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionOutcome {
    /// Contacts appended to the sink by this call
    pub contacts_added: usize,
    /// Whether the query mode was satisfied before the tree was exhausted
    pub stopped_early: bool,
    /// Nodes whose bound was examined
    pub nodes_visited: usize,
}

impl CollisionOutcome {
    /// Whether any contact was found
    pub const fn collided(&self) -> bool {
        self.contacts_added > 0
    }
}

struct Descent<'q, 'c, K: ?Sized> {
    query: &'q CollisionQuery<'c>,
    sink: &'q mut K,
    base_count: usize,
    visited: usize,
}

impl<K: ContactSink + ?Sized> Descent<'_, '_, K> {
    fn contacts_added(&self) -> usize {
        self.sink.contact_count().saturating_sub(self.base_count)
    }

    fn visit<BV, S>(&mut self, node: &mut ShapeCollisionNode<'_, BV, S>, index: usize) -> Result<ControlFlow<()>>
    where
        BV: BoundingVolume,
        S: ConvexShape,
    {
        self.visited += 1;
        self.query.cancellation.poll(self.visited)?;

        if !node.bounds_overlap(index)? {
            return Ok(ControlFlow::Continue(()));
        }

        if node.is_leaf(index)? {
            node.leaf_test(index, &mut *self.sink)?;
            return Ok(if self.query.mode.is_satisfied(self.contacts_added()) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            });
        }

        let left = node.left_child(index)?;
        let right = node.right_child(index)?;
        if self.visit(node, left)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
        self.visit(node, right)
    }
}

/// Walk `node` from the root, reporting every shape/primitive contact to
/// `sink` until the query mode is satisfied.
///
/// Subtrees whose bound misses the shape's bound are pruned; overlapping
/// leaves run the exact leaf test. Children are visited left before right,
/// so contacts arrive in a deterministic order.
pub fn collide<BV, S, K>(
    node: &mut ShapeCollisionNode<'_, BV, S>,
    query: &CollisionQuery<'_>,
    sink: &mut K,
) -> Result<CollisionOutcome>
where
    BV: BoundingVolume,
    S: ConvexShape,
    K: ContactSink + ?Sized,
{
    if !node.is_bound() {
        return Err(CollisionError::UnboundModel);
    }

    let base_count = sink.contact_count();

    let mut stopwatch = Stopwatch::start_new();
    let mut descent = Descent { query, sink, base_count, visited: 0 };
    let flow = descent.visit(node, 0);
    stopwatch.stop();
    node.record_query_time(stopwatch.elapsed_seconds());

    let outcome = CollisionOutcome {
        contacts_added: descent.contacts_added(),
        stopped_early: flow?.is_break(),
        nodes_visited: descent.visited,
    };
    log::debug!(
        "Collision query ({:?}): {} contact(s), {} node(s) visited{}",
        query.mode,
        outcome.contacts_added,
        outcome.nodes_visited,
        if outcome.stopped_early { ", stopped early" } else { "" }
    );
    Ok(outcome)
}
