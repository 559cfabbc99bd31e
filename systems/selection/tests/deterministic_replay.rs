use glam::Vec3;
use tactics_grid_core::{
    ActorId, ActorSnapshot, CellDefinition, Command, Event, GridCoord, MovementCosts,
};
use tactics_grid_system_reachability::{Reachability, ReachabilityLimits};
use tactics_grid_system_selection::{Click, Controller};
use tactics_grid_world::{self as world, query, CoordinateMapper, RectangularLayout, World};

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    actors: Vec<ActorSnapshot>,
    occupied: Vec<GridCoord>,
    selected: Option<ActorId>,
}

#[test]
fn replaying_a_script_is_deterministic() {
    let script = click_script();

    let first = replay(&script);
    let second = replay(&script);

    assert_eq!(first, second);
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::ActorRelocated { .. })),
        "script should move at least one actor"
    );
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::MoveRejected { .. })),
        "script should include a rejected move"
    );
}

#[test]
fn replay_ends_with_expected_positions() {
    let outcome = replay(&click_script());

    let cells: Vec<(ActorId, GridCoord)> = outcome
        .actors
        .iter()
        .map(|actor| (actor.id, actor.cell))
        .collect();
    assert_eq!(
        cells,
        vec![
            (ActorId::new(1), GridCoord::planar(2, 0)),
            (ActorId::new(2), GridCoord::planar(3, 5)),
        ]
    );
    assert_eq!(
        outcome.occupied,
        vec![GridCoord::planar(2, 0), GridCoord::planar(3, 5)]
    );
    assert_eq!(outcome.selected, Some(ActorId::new(2)));
}

fn click_script() -> Vec<Click> {
    vec![
        Click::Actor(ActorId::new(1)),
        Click::Ground(GridCoord::planar(5, 5)),
        Click::Ground(GridCoord::planar(1, 1)),
        Click::Actor(ActorId::new(2)),
        Click::Empty,
        Click::Actor(ActorId::new(1)),
        Click::GroundAt(Vec3::new(2.9, 0.1, 0.0)),
        Click::Actor(ActorId::new(2)),
        Click::Ground(GridCoord::planar(3, 5)),
        Click::Actor(ActorId::new(2)),
        Click::Ground(GridCoord::planar(2, 1)),
    ]
}

fn replay(script: &[Click]) -> ReplayOutcome {
    let mut world = World::new(CoordinateMapper::partitioned(RectangularLayout::new(
        Vec3::ZERO,
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::ZERO,
    )));
    let mut events = Vec::new();

    let mut definitions = Vec::new();
    for y in 0..6 {
        for x in 0..6 {
            definitions.push(CellDefinition::new(
                GridCoord::planar(x, y),
                x != 2 || y == 0 || y == 5,
                0.0,
            ));
        }
    }
    world::apply(&mut world, Command::LoadCells { definitions }, &mut events);
    for (id, x, y, budget) in [(1, 0, 0, 2), (2, 4, 4, 2)] {
        world::apply(
            &mut world,
            Command::RegisterActor {
                actor: ActorId::new(id),
                position: Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0),
                budget,
            },
            &mut events,
        );
    }

    let engine = Reachability::new(
        MovementCosts::CHEBYSHEV_DOUBLE_DIAGONAL,
        ReachabilityLimits::UNBOUNDED,
    );
    let mut controller = Controller::new(&world, engine);
    for click in script {
        let _ = controller.handle_click(&mut world, *click, &mut events);
    }

    ReplayOutcome {
        events,
        actors: query::actor_view(&world).into_vec(),
        occupied: query::cell_view(&world)
            .iter()
            .filter(|cell| cell.occupied)
            .map(|cell| cell.coord)
            .collect(),
        selected: controller.selected(),
    }
}
