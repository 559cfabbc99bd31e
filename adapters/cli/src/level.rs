use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Deserialize;
use tactics_grid_core::{ActorId, CellDefinition, GridCoord, MovementCosts};
use tactics_grid_system_reachability::{Reachability, ReachabilityLimits};
use tactics_grid_world::{CoordinateMapper, RectangularLayout};

const SUPPORTED_LEVEL_VERSION: u32 = 1;

/// Level contents resolved from a manifest, ready to seed a world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Level {
    /// How world positions are partitioned into cells.
    pub(crate) mapper: MapperSettings,
    /// Step costs charged by the reachability engine.
    pub(crate) costs: MovementCosts,
    /// Work limits for a single reachability search.
    pub(crate) limits: ReachabilityLimits,
    /// Cell definitions in placement order; explicit cells precede map cells.
    pub(crate) definitions: Vec<CellDefinition>,
    /// Actors to register, in manifest order.
    pub(crate) actors: Vec<ActorPlacement>,
}

impl Level {
    /// Loads and validates the manifest stored at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level manifest at {}", path.display()))?;
        parse_level(&contents)
            .with_context(|| format!("invalid level manifest at {}", path.display()))
    }

    /// Builds the coordinate mapper described by the manifest.
    #[must_use]
    pub(crate) fn build_mapper(&self) -> CoordinateMapper {
        match self.mapper {
            MapperSettings::Layout {
                origin,
                cell_size,
                cell_gap,
            } => CoordinateMapper::partitioned(RectangularLayout::new(origin, cell_size, cell_gap)),
            MapperSettings::Fixed { cell_size } => CoordinateMapper::fixed_cell_size(cell_size),
        }
    }

    /// Builds the reachability engine described by the manifest.
    #[must_use]
    pub(crate) fn engine(&self) -> Reachability {
        Reachability::new(self.costs, self.limits)
    }
}

/// Coordinate mapping mode selected by a manifest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MapperSettings {
    /// Precise rectangular partition.
    Layout {
        /// World position of the corner of cell `(0, 0, 0)`.
        origin: Vec3,
        /// Extent of a single cell along each axis.
        cell_size: Vec3,
        /// Spacing between neighbouring cells along each axis.
        cell_gap: Vec3,
    },
    /// Degraded fixed-size fallback.
    Fixed {
        /// Edge length of a square cell.
        cell_size: f32,
    },
}

/// Actor placement declared by a manifest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ActorPlacement {
    /// Identifier the actor is registered under.
    pub(crate) id: ActorId,
    /// Authored world-space position.
    pub(crate) position: Vec3,
    /// Movement budget per selection.
    pub(crate) budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    map: Vec<String>,
    #[serde(default)]
    mapper: MapperSection,
    #[serde(default)]
    movement: MovementSection,
    #[serde(default)]
    cells: Vec<CellEntry>,
    #[serde(default)]
    actors: Vec<ActorEntry>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum MapperMode {
    Layout,
    Fixed,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MapperSection {
    mode: MapperMode,
    origin: [f32; 3],
    cell_size: [f32; 3],
    cell_gap: [f32; 3],
}

impl Default for MapperSection {
    fn default() -> Self {
        Self {
            mode: MapperMode::Layout,
            origin: [0.0; 3],
            cell_size: [1.0, 1.0, 0.0],
            cell_gap: [0.0; 3],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MovementSection {
    orthogonal_cost: u32,
    diagonal_cost: u32,
    max_expansions: Option<usize>,
}

impl Default for MovementSection {
    fn default() -> Self {
        let costs = MovementCosts::default();
        Self {
            orthogonal_cost: costs.orthogonal(),
            diagonal_cost: costs.diagonal(),
            max_expansions: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CellEntry {
    coord: [i32; 3],
    #[serde(default = "walkable_by_default")]
    walkable: bool,
    #[serde(default)]
    height: f32,
}

fn walkable_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActorEntry {
    id: u32,
    position: [f32; 3],
    budget: u32,
}

fn parse_level(contents: &str) -> Result<Level> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse level manifest toml contents")?;
    if manifest.version != SUPPORTED_LEVEL_VERSION {
        bail!(
            "unsupported level manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_LEVEL_VERSION
        );
    }

    let movement = manifest.movement;
    if movement.orthogonal_cost == 0 || movement.diagonal_cost == 0 {
        bail!("movement costs must be at least 1");
    }

    let mapper = match manifest.mapper.mode {
        MapperMode::Layout => MapperSettings::Layout {
            origin: Vec3::from_array(manifest.mapper.origin),
            cell_size: Vec3::from_array(manifest.mapper.cell_size),
            cell_gap: Vec3::from_array(manifest.mapper.cell_gap),
        },
        MapperMode::Fixed => fixed_mapper(&manifest.mapper)?,
    };

    let mut definitions: Vec<CellDefinition> = manifest
        .cells
        .iter()
        .map(|entry| {
            let [x, y, z] = entry.coord;
            CellDefinition::new(GridCoord::new(x, y, z), entry.walkable, entry.height)
        })
        .collect();
    definitions.extend(parse_map(&manifest.map)?);

    let mut actors: Vec<ActorPlacement> = Vec::with_capacity(manifest.actors.len());
    for entry in &manifest.actors {
        let id = ActorId::new(entry.id);
        if actors.iter().any(|placed| placed.id == id) {
            bail!("level manifest declares {id} more than once");
        }
        actors.push(ActorPlacement {
            id,
            position: Vec3::from_array(entry.position),
            budget: entry.budget,
        });
    }

    Ok(Level {
        mapper,
        costs: MovementCosts::new(movement.orthogonal_cost, movement.diagonal_cost),
        limits: movement
            .max_expansions
            .map_or(ReachabilityLimits::UNBOUNDED, ReachabilityLimits::with_max_expansions),
        definitions,
        actors,
    })
}

/// Fixed mode maps square cells from the world origin, so only a single
/// edge length is meaningful.
fn fixed_mapper(section: &MapperSection) -> Result<MapperSettings> {
    if section.origin != [0.0; 3] || section.cell_gap != [0.0; 3] {
        bail!("fixed mapper mode does not support `origin` or `cell_gap`");
    }
    let [x, y, z] = section.cell_size;
    if x != y || (z != 0.0 && z != x) {
        bail!("fixed mapper mode needs square cells, got cell_size = [{x}, {y}, {z}]");
    }
    Ok(MapperSettings::Fixed { cell_size: x })
}

/// Expands ASCII map rows into cell definitions. The first row holds the
/// highest `y`.
fn parse_map(rows: &[String]) -> Result<Vec<CellDefinition>> {
    let mut definitions = Vec::new();
    let top = rows.len();
    for (row_index, row) in rows.iter().enumerate() {
        let y = i32::try_from(top - 1 - row_index).context("map has too many rows")?;
        for (column, symbol) in row.chars().enumerate() {
            let x = i32::try_from(column).context("map row is too wide")?;
            let walkable = match symbol {
                '.' => true,
                '#' => false,
                ' ' => continue,
                other => bail!("unknown map symbol `{other}` at row {row_index}, column {column}"),
            };
            definitions.push(CellDefinition::new(GridCoord::planar(x, y), walkable, 0.0));
        }
    }
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_rejects_unsupported_version() {
        let manifest = r##"
            version = 2
        "##;

        let result = parse_level(manifest);
        assert!(result.is_err(), "version 2 manifests must be rejected");
    }

    #[test]
    fn manifest_rejects_unknown_fields() {
        let manifest = r##"
            version = 1

            [movement]
            teleport_cost = 3
        "##;

        assert!(parse_level(manifest).is_err());
    }

    #[test]
    fn manifest_rejects_zero_step_costs() {
        let manifest = r##"
            version = 1

            [movement]
            diagonal_cost = 0
        "##;

        assert!(parse_level(manifest).is_err());
    }

    #[test]
    fn defaults_use_uniform_costs_and_unit_layout() {
        let level = parse_level("version = 1").expect("minimal manifest parses");

        assert_eq!(level.costs, MovementCosts::UNIFORM);
        assert_eq!(level.limits, ReachabilityLimits::UNBOUNDED);
        assert_eq!(
            level.mapper,
            MapperSettings::Layout {
                origin: Vec3::ZERO,
                cell_size: Vec3::new(1.0, 1.0, 0.0),
                cell_gap: Vec3::ZERO,
            }
        );
        assert!(level.definitions.is_empty());
        assert!(level.actors.is_empty());
    }

    #[test]
    fn map_rows_place_highest_row_first_and_skip_spaces() {
        let manifest = r##"
            version = 1
            map = [
                "#. ",
                "..",
            ]
        "##;

        let level = parse_level(manifest).expect("manifest parses");

        assert_eq!(
            level.definitions,
            vec![
                CellDefinition::new(GridCoord::planar(0, 1), false, 0.0),
                CellDefinition::new(GridCoord::planar(1, 1), true, 0.0),
                CellDefinition::new(GridCoord::planar(0, 0), true, 0.0),
                CellDefinition::new(GridCoord::planar(1, 0), true, 0.0),
            ]
        );
    }

    #[test]
    fn map_rejects_unknown_symbols() {
        let manifest = r##"
            version = 1
            map = [".x."]
        "##;

        assert!(parse_level(manifest).is_err());
    }

    #[test]
    fn explicit_cells_precede_map_cells() {
        let manifest = r##"
            version = 1
            map = ["."]

            [[cells]]
            coord = [0, 0, 0]
            walkable = false
            height = 1.5
        "##;

        let level = parse_level(manifest).expect("manifest parses");

        assert_eq!(
            level.definitions.first(),
            Some(&CellDefinition::new(GridCoord::planar(0, 0), false, 1.5))
        );
        assert_eq!(level.definitions.len(), 2);
    }

    #[test]
    fn fixed_mapper_and_movement_settings_are_read() {
        let manifest = r##"
            version = 1

            [mapper]
            mode = "fixed"
            cell_size = [2.0, 2.0, 2.0]

            [movement]
            orthogonal_cost = 1
            diagonal_cost = 2
            max_expansions = 64

            [[actors]]
            id = 4
            position = [1.0, 3.0, 0.0]
            budget = 5
        "##;

        let level = parse_level(manifest).expect("manifest parses");

        assert_eq!(level.mapper, MapperSettings::Fixed { cell_size: 2.0 });
        assert_eq!(level.costs, MovementCosts::CHEBYSHEV_DOUBLE_DIAGONAL);
        assert_eq!(level.limits, ReachabilityLimits::with_max_expansions(64));
        assert_eq!(
            level.actors,
            vec![ActorPlacement {
                id: ActorId::new(4),
                position: Vec3::new(1.0, 3.0, 0.0),
                budget: 5,
            }]
        );
        assert!(level.build_mapper().is_degraded());
        let engine = level.engine();
        assert_eq!(engine.costs(), MovementCosts::CHEBYSHEV_DOUBLE_DIAGONAL);
        assert_eq!(engine.limits().max_expansions(), Some(64));
    }

    #[test]
    fn fixed_mapper_rejects_layout_only_settings() {
        for mapper in [
            "mode = \"fixed\"\norigin = [1.0, 0.0, 0.0]",
            "mode = \"fixed\"\ncell_gap = [0.0, 0.5, 0.0]",
            "mode = \"fixed\"\ncell_size = [1.0, 2.0, 0.0]",
            "mode = \"fixed\"\ncell_size = [2.0, 2.0, 3.0]",
        ] {
            let manifest = format!("version = 1\n\n[mapper]\n{mapper}\n");
            assert!(
                parse_level(&manifest).is_err(),
                "fixed mapper settings should be rejected:\n{mapper}"
            );
        }
    }

    #[test]
    fn fixed_mapper_accepts_square_cells() {
        let manifest = r##"
            version = 1

            [mapper]
            mode = "fixed"
            cell_size = [0.5, 0.5, 0.0]
        "##;

        let level = parse_level(manifest).expect("manifest parses");

        assert_eq!(level.mapper, MapperSettings::Fixed { cell_size: 0.5 });
    }

    #[test]
    fn duplicate_actor_ids_are_rejected() {
        let manifest = r##"
            version = 1

            [[actors]]
            id = 1
            position = [0.0, 0.0, 0.0]
            budget = 1

            [[actors]]
            id = 1
            position = [1.0, 0.0, 0.0]
            budget = 1
        "##;

        assert!(parse_level(manifest).is_err());
    }
}
