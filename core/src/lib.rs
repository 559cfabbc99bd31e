#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactics grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values.
//! Systems read the world exclusively through immutable views such as
//! [`CellView`] and [`ActorView`].

use std::{collections::BTreeMap, fmt};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer location of a single grid cell.
///
/// The `z` axis exists for parity with three-axis world partitions and is
/// conventionally zero; neighbour expansion only ever walks the `x`/`y` plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate on the `z = 0` plane.
    #[must_use]
    pub const fn planar(x: i32, y: i32) -> Self {
        Self::new(x, y, 0)
    }

    /// Column component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Layer component of the coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the coordinate shifted within its plane, or `None` on overflow.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z,
        })
    }

    /// Computes the king-move distance between two coordinates on the same plane.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Placed cell description supplied once by the level data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    /// Coordinate the cell occupies.
    pub coord: GridCoord,
    /// Whether actors may stand on or traverse the cell.
    pub walkable: bool,
    /// Elevation of the cell surface in world units.
    pub world_height: f32,
}

impl CellDefinition {
    /// Creates a new cell definition.
    #[must_use]
    pub const fn new(coord: GridCoord, walkable: bool, world_height: f32) -> Self {
        Self {
            coord,
            walkable,
            world_height,
        }
    }
}

/// Immutable representation of a single cell's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Coordinate identifying the cell. Never changes after creation.
    pub coord: GridCoord,
    /// Whether actors may stand on or traverse the cell.
    pub walkable: bool,
    /// Whether an actor currently stands on the cell.
    pub occupied: bool,
    /// Elevation of the cell surface in world units.
    pub world_height: f32,
}

impl Cell {
    /// Creates an unoccupied cell from its placement definition.
    #[must_use]
    pub const fn from_definition(definition: CellDefinition) -> Self {
        Self {
            coord: definition.coord,
            walkable: definition.walkable,
            occupied: false,
            world_height: definition.world_height,
        }
    }
}

/// Read-only view into the sparse cell store.
///
/// A coordinate missing from the view does not exist. Missing cells and cells
/// flagged as unwalkable block movement alike, but only the latter are
/// returned by [`CellView::cell`].
#[derive(Clone, Copy, Debug)]
pub struct CellView<'a> {
    cells: &'a BTreeMap<GridCoord, Cell>,
}

impl<'a> CellView<'a> {
    /// Captures a new cell view backed by the provided map.
    #[must_use]
    pub fn new(cells: &'a BTreeMap<GridCoord, Cell>) -> Self {
        Self { cells }
    }

    /// Returns the cell at the provided coordinate, if one was placed there.
    #[must_use]
    pub fn cell(&self, coord: GridCoord) -> Option<Cell> {
        self.cells.get(&coord).copied()
    }

    /// Reports whether a cell was placed at the provided coordinate.
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Reports whether the coordinate exists and is walkable, ignoring occupancy.
    #[must_use]
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.cells.get(&coord).is_some_and(|cell| cell.walkable)
    }

    /// Number of cells held by the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the store holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over every cell in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + 'a {
        self.cells.values().copied()
    }

    /// Smallest and largest `x`/`y` components among the placed cells.
    #[must_use]
    pub fn bounds(&self) -> Option<(GridCoord, GridCoord)> {
        let mut cells = self.cells.keys();
        let first = *cells.next()?;
        let (min, max) = cells.fold((first, first), |(min, max), coord| {
            (
                GridCoord::new(min.x.min(coord.x), min.y.min(coord.y), min.z.min(coord.z)),
                GridCoord::new(max.x.max(coord.x), max.y.max(coord.y), max.z.max(coord.z)),
            )
        });
        Some((min, max))
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Grid cell currently occupied by the actor.
    pub cell: GridCoord,
    /// World-space position, snapped to the centre of `cell`.
    pub position: Vec3,
    /// Maximum movement cost the actor may spend per selection.
    pub budget: u32,
    /// Whether the actor is the current selection.
    pub selected: bool,
}

/// Read-only snapshot describing all registered actors.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the snapshot of the actor standing on the provided cell, if any.
    #[must_use]
    pub fn at(&self, cell: GridCoord) -> Option<&ActorSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Integer costs charged for a single step in each direction class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementCosts {
    orthogonal: u32,
    diagonal: u32,
}

impl MovementCosts {
    /// Every step costs one, diagonal or not.
    pub const UNIFORM: Self = Self::new(1, 1);

    /// Orthogonal steps cost one and diagonal steps cost two.
    pub const CHEBYSHEV_DOUBLE_DIAGONAL: Self = Self::new(1, 2);

    /// Creates a cost model from explicit per-step costs.
    #[must_use]
    pub const fn new(orthogonal: u32, diagonal: u32) -> Self {
        Self {
            orthogonal,
            diagonal,
        }
    }

    /// Cost of a step along one axis.
    #[must_use]
    pub const fn orthogonal(&self) -> u32 {
        self.orthogonal
    }

    /// Cost of a step along both axes at once.
    #[must_use]
    pub const fn diagonal(&self) -> u32 {
        self.diagonal
    }
}

impl Default for MovementCosts {
    fn default() -> Self {
        Self::UNIFORM
    }
}

/// Minimum movement cost to every cell reachable from a start within a budget.
///
/// Sets are produced by the reachability system and handed out by reference;
/// they expose no mutating accessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachableSet {
    start: GridCoord,
    budget: u32,
    costs: BTreeMap<GridCoord, u32>,
}

impl ReachableSet {
    /// Creates a set that contains nothing, used when the start cell is unusable.
    #[must_use]
    pub fn empty(start: GridCoord, budget: u32) -> Self {
        Self {
            start,
            budget,
            costs: BTreeMap::new(),
        }
    }

    /// Wraps a completed cost map.
    #[must_use]
    pub fn from_costs(start: GridCoord, budget: u32, costs: BTreeMap<GridCoord, u32>) -> Self {
        Self {
            start,
            budget,
            costs,
        }
    }

    /// Cell the computation started from.
    #[must_use]
    pub const fn start(&self) -> GridCoord {
        self.start
    }

    /// Budget the computation was bounded by.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Minimum cost recorded for the coordinate, if it is reachable.
    #[must_use]
    pub fn cost(&self, coord: GridCoord) -> Option<u32> {
        self.costs.get(&coord).copied()
    }

    /// Reports whether the coordinate is reachable.
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.costs.contains_key(&coord)
    }

    /// Number of reachable coordinates, including the start.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Reports whether nothing is reachable, not even the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Iterator over `(coordinate, cost)` pairs in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, u32)> + '_ {
        self.costs.iter().map(|(coord, cost)| (*coord, *cost))
    }

    /// Iterator over the entries whose cost does not exceed `max_cost`.
    pub fn within(&self, max_cost: u32) -> impl Iterator<Item = (GridCoord, u32)> + '_ {
        self.iter().filter(move |(_, cost)| *cost <= max_cost)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds the cell store from placement data. Accepted once per world.
    LoadCells {
        /// Cell descriptions in placement order; earlier duplicates win.
        definitions: Vec<CellDefinition>,
    },
    /// Places an actor for the first time, snapping it to its cell centre.
    RegisterActor {
        /// Identifier chosen by the caller for the actor.
        actor: ActorId,
        /// World-space position the actor was authored at.
        position: Vec3,
        /// Maximum movement cost the actor may spend per selection.
        budget: u32,
    },
    /// Sets or clears an actor's selection flag.
    SetSelected {
        /// Actor whose flag changes.
        actor: ActorId,
        /// New value of the flag.
        selected: bool,
    },
    /// Moves an actor and its occupancy to another cell in one step.
    RelocateActor {
        /// Actor being moved.
        actor: ActorId,
        /// Destination cell.
        to: GridCoord,
    },
}

/// Events reported by the world and controller after processing requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the cell store was built.
    CellsLoaded {
        /// Number of cells created.
        accepted: usize,
        /// Number of definitions dropped because their coordinate was taken.
        duplicates: usize,
    },
    /// Confirms that an actor was placed.
    ActorRegistered {
        /// Identifier of the placed actor.
        actor: ActorId,
        /// Cell the actor occupies.
        cell: GridCoord,
        /// Snapped world-space position.
        position: Vec3,
    },
    /// Reports a change of an actor's selection flag.
    SelectionChanged {
        /// Actor whose flag changed.
        actor: ActorId,
        /// New value of the flag.
        selected: bool,
    },
    /// Confirms that an actor moved between two cells.
    ActorRelocated {
        /// Identifier of the moved actor.
        actor: ActorId,
        /// Cell the actor occupied before moving.
        from: GridCoord,
        /// Cell the actor occupies after moving.
        to: GridCoord,
        /// Snapped world-space position at the destination.
        position: Vec3,
    },
    /// Reports that the world refused a command.
    CommandRejected {
        /// Specific reason the command failed.
        reason: CommandError,
    },
    /// Reports that the controller refused a move request.
    MoveRejected {
        /// Actor that was asked to move.
        actor: ActorId,
        /// Requested destination.
        target: GridCoord,
        /// Specific reason the move failed.
        reason: ControlError,
    },
}

/// Reasons the world may reject a command.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum CommandError {
    /// Cells can only be loaded once per world.
    #[error("cells were already loaded for this world")]
    AlreadyInitialised,
    /// Actors cannot be placed before the cells exist.
    #[error("cells have not been loaded yet")]
    NotInitialised,
    /// The actor identifier is already in use.
    #[error("{0} is already registered")]
    DuplicateActor(ActorId),
    /// No actor with the identifier exists.
    #[error("{0} is not registered")]
    UnknownActor(ActorId),
    /// No cell was placed at the coordinate.
    #[error("no cell exists at {0}")]
    MissingCell(GridCoord),
    /// The cell exists but cannot be stood on.
    #[error("cell {0} is not walkable")]
    UnwalkableCell(GridCoord),
    /// Another actor already stands on the cell.
    #[error("cell {0} is occupied by another actor")]
    OccupiedCell(GridCoord),
}

/// Reasons the selection controller may refuse a request.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum ControlError {
    /// The controller was created against a world without cells.
    #[error("controller is disabled")]
    Disabled,
    /// The requested destination is not in the cached reachable set.
    #[error("cell {0} is not reachable by the selected actor")]
    Unreachable(GridCoord),
    /// The world refused the underlying command.
    #[error(transparent)]
    Rejected(#[from] CommandError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn grid_coord_round_trips_through_bincode() {
        assert_round_trip(&GridCoord::new(-3, 7, 0));
    }

    #[test]
    fn control_error_round_trips_through_bincode() {
        assert_round_trip(&ControlError::Rejected(CommandError::OccupiedCell(
            GridCoord::planar(1, 2),
        )));
    }

    #[test]
    fn offset_stays_on_plane_and_detects_overflow() {
        let coord = GridCoord::new(2, 3, 4);
        assert_eq!(coord.offset(-1, 1), Some(GridCoord::new(1, 4, 4)));
        assert_eq!(GridCoord::planar(i32::MAX, 0).offset(1, 0), None);
    }

    #[test]
    fn chebyshev_distance_counts_diagonals_once() {
        let origin = GridCoord::planar(0, 0);
        assert_eq!(origin.chebyshev_distance(GridCoord::planar(3, -2)), 3);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    #[test]
    fn cell_view_reports_bounds_of_sparse_cells() {
        let mut cells = BTreeMap::new();
        for coord in [GridCoord::planar(-2, 5), GridCoord::planar(4, -1)] {
            let _ = cells.insert(
                coord,
                Cell::from_definition(CellDefinition::new(coord, true, 0.0)),
            );
        }
        let view = CellView::new(&cells);

        assert_eq!(
            view.bounds(),
            Some((GridCoord::planar(-2, -1), GridCoord::planar(4, 5)))
        );
        assert!(view.contains(GridCoord::planar(4, -1)));
        assert!(view.cell(GridCoord::planar(0, 0)).is_none());
    }

    #[test]
    fn reachable_set_filters_by_cost() {
        let start = GridCoord::planar(0, 0);
        let costs = BTreeMap::from([
            (start, 0),
            (GridCoord::planar(1, 0), 1),
            (GridCoord::planar(2, 0), 2),
        ]);
        let set = ReachableSet::from_costs(start, 2, costs);

        let cheap: Vec<_> = set.within(1).map(|(coord, _)| coord).collect();
        assert_eq!(cheap, vec![start, GridCoord::planar(1, 0)]);
        assert_eq!(set.cost(GridCoord::planar(2, 0)), Some(2));
        assert!(!set.contains(GridCoord::planar(3, 0)));
    }

    #[test]
    fn actor_view_is_sorted_and_finds_actor_by_cell() {
        let snapshot = |id: u32, x: i32| ActorSnapshot {
            id: ActorId::new(id),
            cell: GridCoord::planar(x, 0),
            position: Vec3::new(x as f32 + 0.5, 0.5, 0.0),
            budget: 1,
            selected: id == 2,
        };
        let view = ActorView::from_snapshots(vec![snapshot(2, 3), snapshot(1, 0)]);

        let ids: Vec<u32> = view.iter().map(|actor| actor.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(view
            .at(GridCoord::planar(3, 0))
            .is_some_and(|actor| actor.selected));
        assert!(view.at(GridCoord::planar(1, 0)).is_none());
    }

    #[test]
    fn default_costs_are_uniform() {
        let costs = MovementCosts::default();
        assert_eq!(costs.orthogonal(), costs.diagonal());
    }
}
