#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tactics grid.
//!
//! The world owns the sparse cell store, the registered actors and the
//! coordinate mapper. Every mutation arrives as a [`Command`] through [`apply`],
//! which keeps each actor's location and its cell's occupancy flag in step.

mod cells;
mod mapper;

use std::collections::BTreeMap;

use glam::Vec3;
use log::{debug, warn};
use tactics_grid_core::{
    ActorId, ActorSnapshot, CellDefinition, Command, CommandError, Event, GridCoord,
};

use crate::cells::CellStore;
pub use crate::mapper::{CoordinateMapper, RectangularLayout, WorldPartition};

/// Represents the authoritative tactics grid state.
#[derive(Debug)]
pub struct World {
    cells: CellStore,
    actors: BTreeMap<ActorId, Actor>,
    mapper: CoordinateMapper,
    initialised: bool,
}

impl World {
    /// Creates an empty world that maps coordinates with the provided mapper.
    #[must_use]
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self {
            cells: CellStore::default(),
            actors: BTreeMap::new(),
            mapper,
            initialised: false,
        }
    }

    fn load_cells(&mut self, definitions: &[CellDefinition]) -> Result<Event, CommandError> {
        if self.initialised {
            return Err(CommandError::AlreadyInitialised);
        }

        let (cells, duplicates) = CellStore::from_definitions(definitions);
        self.cells = cells;
        self.initialised = true;
        debug!(
            "loaded {} cells ({duplicates} duplicate definitions dropped)",
            self.cells.len()
        );

        Ok(Event::CellsLoaded {
            accepted: self.cells.len(),
            duplicates,
        })
    }

    fn register_actor(
        &mut self,
        actor: ActorId,
        position: Vec3,
        budget: u32,
    ) -> Result<Event, CommandError> {
        if !self.initialised {
            return Err(CommandError::NotInitialised);
        }
        if self.actors.contains_key(&actor) {
            return Err(CommandError::DuplicateActor(actor));
        }

        let cell = self.mapper.world_to_grid(position);
        if self.cells.get(cell).is_some_and(|existing| !existing.walkable) {
            return Err(CommandError::UnwalkableCell(cell));
        }
        if self.cells.get(cell).is_some_and(|existing| existing.occupied)
            || self.actors.values().any(|other| other.cell == cell)
        {
            return Err(CommandError::OccupiedCell(cell));
        }

        self.cells.set_occupied(cell, true);
        let position = self.mapper.grid_to_world(cell);
        let _ = self.actors.insert(
            actor,
            Actor {
                cell,
                position,
                budget,
                selected: false,
            },
        );
        debug!("registered {actor} at {cell}");

        Ok(Event::ActorRegistered {
            actor,
            cell,
            position,
        })
    }

    fn set_selected(
        &mut self,
        actor: ActorId,
        selected: bool,
    ) -> Result<Option<Event>, CommandError> {
        let entry = self
            .actors
            .get_mut(&actor)
            .ok_or(CommandError::UnknownActor(actor))?;

        if entry.selected == selected {
            return Ok(None);
        }

        entry.selected = selected;
        Ok(Some(Event::SelectionChanged { actor, selected }))
    }

    fn relocate_actor(&mut self, actor: ActorId, to: GridCoord) -> Result<Event, CommandError> {
        let from = self
            .actors
            .get(&actor)
            .map(|entry| entry.cell)
            .ok_or(CommandError::UnknownActor(actor))?;

        let destination = self.cells.get(to).ok_or(CommandError::MissingCell(to))?;
        if !destination.walkable {
            return Err(CommandError::UnwalkableCell(to));
        }
        if destination.occupied && to != from {
            return Err(CommandError::OccupiedCell(to));
        }

        let position = self.mapper.grid_to_world(to);
        self.cells.set_occupied(from, false);
        self.cells.set_occupied(to, true);
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.cell = to;
            entry.position = position;
        }
        debug!("relocated {actor} from {from} to {to}");

        Ok(Event::ActorRelocated {
            actor,
            from,
            to,
            position,
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and report
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::LoadCells { definitions } => world.load_cells(&definitions).map(Some),
        Command::RegisterActor {
            actor,
            position,
            budget,
        } => world.register_actor(actor, position, budget).map(Some),
        Command::SetSelected { actor, selected } => world.set_selected(actor, selected),
        Command::RelocateActor { actor, to } => world.relocate_actor(actor, to).map(Some),
    };

    match outcome {
        Ok(Some(event)) => out_events.push(event),
        Ok(None) => {}
        Err(reason) => {
            warn!("world rejected command: {reason}");
            out_events.push(Event::CommandRejected { reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{CoordinateMapper, World};
    use tactics_grid_core::{ActorId, ActorSnapshot, ActorView, Cell, CellView, GridCoord};

    /// Reports whether the cell store has been built.
    #[must_use]
    pub fn is_initialised(world: &World) -> bool {
        world.initialised
    }

    /// Returns the cell at the provided coordinate, if one was placed there.
    #[must_use]
    pub fn cell(world: &World, coord: GridCoord) -> Option<Cell> {
        world.cells.get(coord)
    }

    /// Exposes a read-only view of the sparse cell store.
    #[must_use]
    pub fn cell_view(world: &World) -> CellView<'_> {
        world.cells.view()
    }

    /// Captures the state of a single actor.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world
            .actors
            .get(&actor)
            .map(|entry| entry.snapshot(actor))
    }

    /// Captures a read-only view of every registered actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|(id, entry)| entry.snapshot(*id))
                .collect(),
        )
    }

    /// Identifies the actor standing on the provided cell, if any.
    #[must_use]
    pub fn actor_at(world: &World, coord: GridCoord) -> Option<ActorId> {
        world
            .actors
            .iter()
            .find(|(_, entry)| entry.cell == coord)
            .map(|(id, _)| *id)
    }

    /// Provides the mapper used to translate between world and grid space.
    #[must_use]
    pub fn mapper(world: &World) -> &CoordinateMapper {
        &world.mapper
    }
}

#[derive(Clone, Copy, Debug)]
struct Actor {
    cell: GridCoord,
    position: Vec3,
    budget: u32,
    selected: bool,
}

impl Actor {
    fn snapshot(&self, id: ActorId) -> ActorSnapshot {
        ActorSnapshot {
            id,
            cell: self.cell,
            position: self.position,
            budget: self.budget,
            selected: self.selected,
        }
    }
}
