#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure reachability system that computes minimum movement costs on the grid.
//!
//! The search is a breadth-first flood over the eight king-move neighbours of
//! each cell. Orthogonal and diagonal steps may cost different amounts, so a
//! cell is re-queued whenever a strictly cheaper cost is discovered; the
//! resulting costs are optimal regardless of queue order.

use std::collections::{BTreeMap, VecDeque};

use log::{trace, warn};
use tactics_grid_core::{CellView, GridCoord, MovementCosts, ReachableSet};

/// Optional bounds on the amount of work a single search may perform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReachabilityLimits {
    max_expansions: Option<usize>,
}

impl ReachabilityLimits {
    /// No limit; searches always run to completion.
    pub const UNBOUNDED: Self = Self {
        max_expansions: None,
    };

    /// Stops a search after `max_expansions` cells have been expanded.
    #[must_use]
    pub const fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }

    /// Maximum number of expansions per search, if bounded.
    #[must_use]
    pub const fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }
}

/// Reachability engine configured with a movement cost model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reachability {
    costs: MovementCosts,
    limits: ReachabilityLimits,
}

impl Reachability {
    /// Creates an engine with the provided cost model and limits.
    #[must_use]
    pub const fn new(costs: MovementCosts, limits: ReachabilityLimits) -> Self {
        Self { costs, limits }
    }

    /// Cost model charged per step.
    #[must_use]
    pub const fn costs(&self) -> MovementCosts {
        self.costs
    }

    /// Work limits applied to each search.
    #[must_use]
    pub const fn limits(&self) -> ReachabilityLimits {
        self.limits
    }

    /// Computes the minimum cost of every cell reachable from `start` within `budget`.
    ///
    /// `self_cell` names the cell occupied by the moving actor itself, which
    /// never blocks its own traversal. The start is always included at cost
    /// zero unless it is missing or unwalkable, in which case the result is
    /// empty.
    #[must_use]
    pub fn reachable(
        &self,
        cells: CellView<'_>,
        start: GridCoord,
        budget: u32,
        self_cell: Option<GridCoord>,
    ) -> ReachableSet {
        match cells.cell(start) {
            None => {
                warn!("reachability start {start} does not exist");
                return ReachableSet::empty(start, budget);
            }
            Some(cell) if !cell.walkable => {
                warn!("reachability start {start} is not walkable");
                return ReachableSet::empty(start, budget);
            }
            Some(_) => {}
        }

        let mut costs: BTreeMap<GridCoord, u32> = BTreeMap::new();
        let mut queue = VecDeque::new();
        let _ = costs.insert(start, 0);
        queue.push_back(start);

        let mut expansions = 0usize;
        while let Some(current) = queue.pop_front() {
            if self
                .limits
                .max_expansions
                .is_some_and(|limit| expansions >= limit)
            {
                warn!(
                    "reachability from {start} stopped after {expansions} expansions; result may be partial"
                );
                break;
            }
            expansions += 1;

            let Some(&current_cost) = costs.get(&current) else {
                continue;
            };

            for step in NEIGHBOUR_STEPS {
                let Some(next_cost) = current_cost.checked_add(step.cost(self.costs)) else {
                    continue;
                };
                if next_cost > budget {
                    continue;
                }

                let Some(neighbor) = current.offset(step.dx, step.dy) else {
                    continue;
                };
                if !is_passable(&cells, neighbor, self_cell) {
                    continue;
                }

                if costs
                    .get(&neighbor)
                    .is_some_and(|recorded| *recorded <= next_cost)
                {
                    continue;
                }

                let _ = costs.insert(neighbor, next_cost);
                queue.push_back(neighbor);
            }
        }

        trace!(
            "reachability from {start} with budget {budget}: {} cells after {expansions} expansions",
            costs.len()
        );
        ReachableSet::from_costs(start, budget, costs)
    }
}

/// Computes reachability with uniform step costs and no work limit.
#[must_use]
pub fn reachable(
    cells: CellView<'_>,
    start: GridCoord,
    budget: u32,
    self_cell: Option<GridCoord>,
) -> ReachableSet {
    Reachability::default().reachable(cells, start, budget, self_cell)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepKind {
    Orthogonal,
    Diagonal,
}

#[derive(Clone, Copy, Debug)]
struct Step {
    dx: i32,
    dy: i32,
    kind: StepKind,
}

impl Step {
    const fn new(dx: i32, dy: i32, kind: StepKind) -> Self {
        Self { dx, dy, kind }
    }

    fn cost(self, costs: MovementCosts) -> u32 {
        match self.kind {
            StepKind::Orthogonal => costs.orthogonal(),
            StepKind::Diagonal => costs.diagonal(),
        }
    }
}

const NEIGHBOUR_STEPS: [Step; 8] = [
    Step::new(0, 1, StepKind::Orthogonal),
    Step::new(1, 0, StepKind::Orthogonal),
    Step::new(0, -1, StepKind::Orthogonal),
    Step::new(-1, 0, StepKind::Orthogonal),
    Step::new(1, 1, StepKind::Diagonal),
    Step::new(1, -1, StepKind::Diagonal),
    Step::new(-1, -1, StepKind::Diagonal),
    Step::new(-1, 1, StepKind::Diagonal),
];

fn is_passable(cells: &CellView<'_>, coord: GridCoord, self_cell: Option<GridCoord>) -> bool {
    match cells.cell(coord) {
        None => false,
        Some(cell) if !cell.walkable => false,
        Some(cell) => !cell.occupied || self_cell == Some(coord),
    }
}
