//! Cost-accumulating descent
//!
//! Sums the [`CostSource`] regions of every overlapping leaf. Without a
//! budget the tree is walked depth-first like [`collide`](super::collide).
//! With a budget, pending subtrees sit in a max-heap keyed by their region
//! priority so the heaviest regions are counted first, and the walk stops
//! as soon as the running total reaches the budget.

use super::node::ShapeCollisionNode;
use super::CancellationCheck;
use crate::bounding::BoundingVolume;
use crate::config::CostConfig;
use crate::cost::{self, CostSource};
use crate::error::{CollisionError, Result};
use crate::foundation::time::Stopwatch;
use crate::shape::ConvexShape;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Default number of regions kept in a [`CostReport`]
pub const DEFAULT_MAX_COST_SOURCES: usize = 16;

/// Caller-side options for one [`accumulate_cost`] call
#[derive(Debug, Clone, Copy)]
pub struct CostQuery<'c> {
    budget: Option<f32>,
    max_cost_sources: usize,
    approximate: bool,
    cancellation: CancellationCheck<'c>,
}

impl Default for CostQuery<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> CostQuery<'c> {
    /// Unbudgeted query keeping the default number of regions
    pub const fn new() -> Self {
        Self {
            budget: None,
            max_cost_sources: DEFAULT_MAX_COST_SOURCES,
            approximate: true,
            cancellation: CancellationCheck::none(),
        }
    }

    /// Query described by `config`
    pub fn from_config(config: &CostConfig) -> Self {
        Self {
            budget: config.budget,
            max_cost_sources: config.max_cost_sources,
            approximate: config.approximate,
            cancellation: CancellationCheck::none(),
        }
    }

    /// Stop once the accumulated cost reaches `budget`
    #[must_use]
    pub fn with_budget(mut self, budget: f32) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Keep at most `count` regions in the report
    #[must_use]
    pub fn with_max_cost_sources(mut self, count: usize) -> Self {
        self.max_cost_sources = count;
        self
    }

    /// When false, a leaf only counts if the exact test hits a primitive
    #[must_use]
    pub fn with_approximate(mut self, approximate: bool) -> Self {
        self.approximate = approximate;
        self
    }

    /// Poll `check` once per visited node and abort when it returns true
    #[must_use]
    pub fn with_cancellation(mut self, check: &'c dyn Fn() -> bool) -> Self {
        self.cancellation = CancellationCheck::new(check);
        self
    }

    /// Cost budget, if any
    pub const fn budget(&self) -> Option<f32> {
        self.budget
    }

    /// Region cap for the report
    pub const fn max_cost_sources(&self) -> usize {
        self.max_cost_sources
    }

    /// Whether leaf regions count on bound overlap alone
    pub const fn approximate(&self) -> bool {
        self.approximate
    }
}

/// Result of an [`accumulate_cost`] call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostReport {
    /// Sum of `total_cost` over every counted leaf region
    pub total_cost: f32,
    /// Heaviest counted regions, in priority order
    pub sources: Vec<CostSource>,
    /// Number of leaf regions that were counted
    pub regions_counted: usize,
    /// Whether the walk stopped because the budget was reached
    pub budget_reached: bool,
}

impl CostReport {
    fn count(&mut self, region: CostSource) {
        self.total_cost += region.total_cost();
        self.regions_counted += 1;
        self.sources.push(region);
    }

    fn finish(&mut self, max_cost_sources: usize) {
        cost::sort_by_priority(&mut self.sources);
        self.sources.truncate(max_cost_sources);
    }
}

/// Subtree waiting in the best-first frontier
#[derive(Debug, Clone, Copy)]
struct Pending {
    region: CostSource,
    index: usize,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: the region that ranks first must compare greatest
        other
            .region
            .priority_cmp(&self.region)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

struct CostWalk<'q, 'c> {
    query: &'q CostQuery<'c>,
    report: CostReport,
    visited: usize,
}

impl CostWalk<'_, '_> {
    /// Poll for cancellation and test the node's bound
    fn enter<BV, S>(&mut self, node: &mut ShapeCollisionNode<'_, BV, S>, index: usize) -> Result<bool>
    where
        BV: BoundingVolume,
        S: ConvexShape,
    {
        self.visited += 1;
        self.query.cancellation.poll(self.visited)?;
        node.bounds_overlap(index)
    }

    fn depth_first<BV, S>(&mut self, node: &mut ShapeCollisionNode<'_, BV, S>, index: usize) -> Result<()>
    where
        BV: BoundingVolume,
        S: ConvexShape,
    {
        if !self.enter(node, index)? {
            return Ok(());
        }

        if node.is_leaf(index)? {
            if let Some(region) = node.leaf_cost(index, self.query.approximate)? {
                self.report.count(region);
            }
            return Ok(());
        }

        let left = node.left_child(index)?;
        let right = node.right_child(index)?;
        self.depth_first(node, left)?;
        self.depth_first(node, right)
    }

    fn best_first<BV, S>(&mut self, node: &mut ShapeCollisionNode<'_, BV, S>, budget: f32) -> Result<()>
    where
        BV: BoundingVolume,
        S: ConvexShape,
    {
        let mut frontier = BinaryHeap::new();
        if self.enter(node, 0)? {
            let region = node.region_cost(0)?.unwrap_or_default();
            frontier.push(Pending { region, index: 0 });
        }

        while let Some(Pending { index, .. }) = frontier.pop() {
            if node.is_leaf(index)? {
                if let Some(region) = node.leaf_cost(index, self.query.approximate)? {
                    self.report.count(region);
                    if self.report.total_cost >= budget {
                        self.report.budget_reached = true;
                        break;
                    }
                }
                continue;
            }

            for child in [node.left_child(index)?, node.right_child(index)?] {
                if self.enter(node, child)? {
                    let region = node.region_cost(child)?.unwrap_or_default();
                    frontier.push(Pending { region, index: child });
                }
            }
        }
        Ok(())
    }
}

/// Sum the cost of every leaf region overlapping the node's shape bound.
///
/// Each region is the overlap of the leaf's box and the shape's box, with
/// density `model density × shape density`.
pub fn accumulate_cost<BV, S>(node: &mut ShapeCollisionNode<'_, BV, S>, query: &CostQuery<'_>) -> Result<CostReport>
where
    BV: BoundingVolume,
    S: ConvexShape,
{
    if !node.is_bound() {
        return Err(CollisionError::UnboundModel);
    }

    let mut walk = CostWalk { query, report: CostReport::default(), visited: 0 };
    let mut stopwatch = Stopwatch::start_new();
    let result = match query.budget {
        Some(budget) => walk.best_first(node, budget),
        None => walk.depth_first(node, 0),
    };
    stopwatch.stop();
    node.record_query_time(stopwatch.elapsed_seconds());
    result?;

    let mut report = walk.report;
    report.finish(query.max_cost_sources);
    log::debug!(
        "Cost query: total {:.4} over {} region(s), {} node(s) visited{}",
        report.total_cost,
        report.regions_counted,
        walk.visited,
        if report.budget_reached { ", budget reached" } else { "" }
    );
    Ok(report)
}
