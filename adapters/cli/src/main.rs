#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a tactics grid level and replays clicks.

mod board;
mod clicks;
mod level;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use tactics_grid_core::{Command, Event};
use tactics_grid_system_selection::Controller;
use tactics_grid_world::{self as world, World};

use crate::{board::render_board, clicks::parse_click, level::Level};

/// Loads a level manifest and replays scripted clicks against it.
#[derive(Debug, Parser)]
#[command(name = "tactics-grid", version)]
struct CliArgs {
    /// Path to the TOML level manifest.
    #[arg(long, value_name = "PATH")]
    level: PathBuf,
    /// Click to replay, in order: `actor:N`, `cell:X,Y[,Z]`, `at:X,Y[,Z]` or `empty`.
    #[arg(long = "click", value_name = "CLICK")]
    clicks: Vec<String>,
    /// Skips printing the board after each click.
    #[arg(long)]
    quiet: bool,
}

/// Entry point for the tactics grid command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let level = Level::from_path(&args.level)?;
    let clicks = args
        .clicks
        .iter()
        .map(|value| parse_click(value).with_context(|| format!("invalid --click `{value}`")))
        .collect::<Result<Vec<_>>>()?;

    let mut world = World::new(level.build_mapper());
    seed_world(&mut world, &level)?;
    let engine = level.engine();
    info!(
        "movement costs: orthogonal {}, diagonal {}; expansion limit {:?}",
        engine.costs().orthogonal(),
        engine.costs().diagonal(),
        engine.limits().max_expansions()
    );
    let mut controller = Controller::new(&world, engine);

    if !args.quiet {
        print!("{}", render_board(&world, &controller));
    }
    for click in clicks {
        let mut events = Vec::new();
        if let Err(error) = controller.handle_click(&mut world, click, &mut events) {
            info!("{click:?} refused: {error}");
        }
        for event in &events {
            println!("{event:?}");
        }
        if !args.quiet {
            print!("{}", render_board(&world, &controller));
        }
    }

    Ok(())
}

fn seed_world(world: &mut World, level: &Level) -> Result<()> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::LoadCells {
            definitions: level.definitions.clone(),
        },
        &mut events,
    );
    for placement in &level.actors {
        world::apply(
            world,
            Command::RegisterActor {
                actor: placement.id,
                position: placement.position,
                budget: placement.budget,
            },
            &mut events,
        );
    }

    for event in &events {
        match event {
            Event::CellsLoaded {
                accepted,
                duplicates,
            } => info!("loaded {accepted} cells ({duplicates} duplicates dropped)"),
            Event::ActorRegistered { actor, cell, .. } => info!("{actor} placed at {cell}"),
            Event::CommandRejected { reason } => bail!("level could not be loaded: {reason}"),
            _ => {}
        }
    }
    Ok(())
}
