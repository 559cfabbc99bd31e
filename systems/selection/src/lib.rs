#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection and movement controller for grid actors.
//!
//! The controller owns the "currently selected actor" state and the reachable
//! set cached for it. Selecting an actor computes its reachable set; moving
//! commits a relocation through the world and always ends the selection.
//! World mutations are issued as [`Command`] values through
//! [`tactics_grid_world::apply`].

use glam::Vec3;
use log::{debug, info, warn};
use tactics_grid_core::{
    ActorId, Command, CommandError, ControlError, Event, GridCoord, ReachableSet,
};
use tactics_grid_system_reachability::Reachability;
use tactics_grid_world::{self as world, query, World};

/// Discrete pointer input delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Click {
    /// The pointer hit an actor.
    Actor(ActorId),
    /// The pointer hit the ground at a known grid coordinate.
    Ground(GridCoord),
    /// The pointer hit the ground at a world-space position.
    GroundAt(Vec3),
    /// The pointer hit nothing selectable.
    Empty,
}

/// Result of a successful move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing was selected, so nothing moved.
    Idle,
    /// The selected actor moved and was deselected.
    Moved {
        /// Actor that moved.
        actor: ActorId,
        /// Cell the actor left.
        from: GridCoord,
        /// Cell the actor now occupies.
        to: GridCoord,
    },
}

/// Stateful controller that ties selection input to reachability and movement.
#[derive(Debug)]
pub struct Controller {
    engine: Reachability,
    state: SelectionState,
    enabled: bool,
}

#[derive(Debug)]
enum SelectionState {
    Idle,
    Selected {
        actor: ActorId,
        reachable: ReachableSet,
    },
}

impl Controller {
    /// Creates a controller for the provided world.
    ///
    /// A world whose cells have not been loaded leaves the controller
    /// permanently disabled; every later request is a logged no-op.
    #[must_use]
    pub fn new(world: &World, engine: Reachability) -> Self {
        let enabled = query::is_initialised(world);
        if !enabled {
            warn!("selection controller created before the grid was loaded; disabling it");
        }

        Self {
            engine,
            state: SelectionState::Idle,
            enabled,
        }
    }

    /// Reports whether the controller accepts requests.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Actor currently selected, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ActorId> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected { actor, .. } => Some(*actor),
        }
    }

    /// Reachable set cached for the current selection.
    #[must_use]
    pub fn reachable_set(&self) -> Option<&ReachableSet> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected { reachable, .. } => Some(reachable),
        }
    }

    /// Selects an actor and caches its reachable set.
    ///
    /// Any previous selection is cleared first, including a reselection of the
    /// same actor.
    pub fn select_actor(
        &mut self,
        world: &mut World,
        actor: ActorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControlError> {
        self.ensure_enabled()?;

        let Some(snapshot) = query::actor(world, actor) else {
            warn!("cannot select {actor}: not registered");
            return Err(CommandError::UnknownActor(actor).into());
        };

        self.deselect(world, out_events);

        world::apply(
            world,
            Command::SetSelected {
                actor,
                selected: true,
            },
            out_events,
        );
        let reachable = self.engine.reachable(
            query::cell_view(world),
            snapshot.cell,
            snapshot.budget,
            Some(snapshot.cell),
        );
        debug!(
            "selected {actor} at {}: {} reachable cells",
            snapshot.cell,
            reachable.len()
        );
        self.state = SelectionState::Selected { actor, reachable };

        Ok(())
    }

    /// Clears the current selection, if any.
    pub fn deselect(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if !self.enabled {
            debug!("ignoring deselect on disabled controller");
            return;
        }

        let previous = std::mem::replace(&mut self.state, SelectionState::Idle);
        if let SelectionState::Selected { actor, .. } = previous {
            world::apply(
                world,
                Command::SetSelected {
                    actor,
                    selected: false,
                },
                out_events,
            );
            debug!("deselected {actor}");
        }
    }

    /// Moves the selected actor to `target` and ends the selection.
    ///
    /// Does nothing when idle. A target outside the cached reachable set, or
    /// one the world refuses, leaves every piece of state untouched.
    pub fn move_selected_to(
        &mut self,
        world: &mut World,
        target: GridCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<MoveOutcome, ControlError> {
        self.ensure_enabled()?;

        let SelectionState::Selected { actor, reachable } = &self.state else {
            debug!("move to {target} ignored: nothing selected");
            return Ok(MoveOutcome::Idle);
        };
        let actor = *actor;

        if !reachable.contains(target) {
            let reason = ControlError::Unreachable(target);
            return Err(reject(actor, target, reason, out_events));
        }

        let mut events = Vec::new();
        world::apply(world, Command::RelocateActor { actor, to: target }, &mut events);
        let relocated = events.iter().find_map(|event| match event {
            Event::ActorRelocated { from, to, .. } => Some((*from, *to)),
            _ => None,
        });
        let rejection = events.iter().find_map(|event| match event {
            Event::CommandRejected { reason } => Some(*reason),
            _ => None,
        });
        out_events.append(&mut events);

        match relocated {
            Some((from, to)) => {
                info!("{actor} moved from {from} to {to}");
                self.deselect(world, out_events);
                Ok(MoveOutcome::Moved { actor, from, to })
            }
            None => {
                let reason = rejection.map_or(ControlError::Unreachable(target), ControlError::from);
                Err(reject(actor, target, reason, out_events))
            }
        }
    }

    /// Dispatches a click to the matching selection operation.
    ///
    /// Actor clicks select, ground clicks move the selection (and are ignored
    /// when idle), and empty clicks deselect.
    pub fn handle_click(
        &mut self,
        world: &mut World,
        click: Click,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControlError> {
        match click {
            Click::Actor(actor) => self.select_actor(world, actor, out_events),
            Click::Ground(target) => self
                .move_selected_to(world, target, out_events)
                .map(|_| ()),
            Click::GroundAt(position) => {
                let target = query::mapper(world).world_to_grid(position);
                self.move_selected_to(world, target, out_events).map(|_| ())
            }
            Click::Empty => {
                self.ensure_enabled()?;
                self.deselect(world, out_events);
                Ok(())
            }
        }
    }

    fn ensure_enabled(&self) -> Result<(), ControlError> {
        if self.enabled {
            Ok(())
        } else {
            warn!("selection controller is disabled; request ignored");
            Err(ControlError::Disabled)
        }
    }
}

fn reject(
    actor: ActorId,
    target: GridCoord,
    reason: ControlError,
    out_events: &mut Vec<Event>,
) -> ControlError {
    warn!("{actor} cannot move to {target}: {reason}");
    out_events.push(Event::MoveRejected {
        actor,
        target,
        reason,
    });
    reason
}
