use std::fmt::Write as _;

use tactics_grid_core::{ActorView, GridCoord, ReachableSet};
use tactics_grid_system_selection::Controller;
use tactics_grid_world::{query, World};

/// Renders every layer of the known cells as ASCII rows, highest `y` first.
///
/// `#` marks unwalkable cells, `@` the selected actor, `A` any other actor,
/// digits the cost of reachable cells (`+` above nine), `.` the remaining
/// walkable cells and a space absent coordinates.
#[must_use]
pub(crate) fn render_board(world: &World, controller: &Controller) -> String {
    let cells = query::cell_view(world);
    let Some((min, max)) = cells.bounds() else {
        return String::from("(no cells)\n");
    };
    let actors = query::actor_view(world);
    let reachable = controller.reachable_set();

    let mut board = String::new();
    for z in min.z()..=max.z() {
        if min.z() != max.z() {
            let _ = writeln!(board, "z = {z}");
        }
        for y in (min.y()..=max.y()).rev() {
            let row: String = (min.x()..=max.x())
                .map(|x| symbol_at(world, &actors, GridCoord::new(x, y, z), reachable))
                .collect();
            board.push_str(row.trim_end());
            board.push('\n');
        }
    }
    board
}

fn symbol_at(
    world: &World,
    actors: &ActorView,
    coord: GridCoord,
    reachable: Option<&ReachableSet>,
) -> char {
    let Some(cell) = query::cell(world, coord) else {
        return ' ';
    };
    if let Some(actor) = actors.at(coord) {
        return if actor.selected { '@' } else { 'A' };
    }
    if !cell.walkable {
        return '#';
    }
    match reachable.and_then(|set| set.cost(coord)) {
        Some(cost) => char::from_digit(cost, 10).unwrap_or('+'),
        None => '.',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tactics_grid_core::{ActorId, CellDefinition, Command};
    use tactics_grid_system_reachability::Reachability;
    use tactics_grid_world::{self as world, CoordinateMapper};

    fn world_from(rows: &[&str]) -> World {
        let mut world = World::new(CoordinateMapper::fixed_cell_size(1.0));
        let top = rows.len() as i32 - 1;
        let mut definitions = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (x, symbol) in line.chars().enumerate() {
                if symbol == ' ' {
                    continue;
                }
                definitions.push(CellDefinition::new(
                    GridCoord::planar(x as i32, top - row as i32),
                    symbol != '#',
                    0.0,
                ));
            }
        }
        let mut events = Vec::new();
        world::apply(&mut world, Command::LoadCells { definitions }, &mut events);
        world
    }

    #[test]
    fn renders_terrain_without_selection() {
        let world = world_from(&["..#", ". .", "..."]);
        let controller = Controller::new(&world, Reachability::default());

        assert_eq!(render_board(&world, &controller), "..#\n. .\n...\n");
    }

    #[test]
    fn renders_actors_and_reachable_costs() {
        let mut world = world_from(&["....", "....", "...."]);
        let mut events = Vec::new();
        for (id, x) in [(1, 0.5), (2, 3.5)] {
            world::apply(
                &mut world,
                Command::RegisterActor {
                    actor: ActorId::new(id),
                    position: Vec3::new(x, 0.5, 0.0),
                    budget: 1,
                },
                &mut events,
            );
        }
        let mut controller = Controller::new(&world, Reachability::default());
        controller
            .select_actor(&mut world, ActorId::new(1), &mut events)
            .expect("actor registered");

        assert_eq!(
            render_board(&world, &controller),
            "....\n11..\n@1.A\n"
        );
    }

    #[test]
    fn empty_world_renders_placeholder() {
        let world = World::new(CoordinateMapper::fixed_cell_size(1.0));
        let controller = Controller::new(&world, Reachability::default());

        assert_eq!(render_board(&world, &controller), "(no cells)\n");
    }
}
