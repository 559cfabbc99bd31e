//! Conversion between world-space positions and grid coordinates.

use std::fmt;

use glam::Vec3;
use log::warn;
use tactics_grid_core::GridCoord;

/// Host-supplied partition of world space into grid cells.
///
/// Implementations must agree with themselves: the centre returned for a cell
/// has to map back to that same cell.
pub trait WorldPartition: fmt::Debug + Send + Sync {
    /// Returns the cell containing the provided world-space position.
    fn world_to_cell(&self, position: Vec3) -> GridCoord;

    /// Returns the canonical world-space centre of the provided cell.
    fn cell_center(&self, cell: GridCoord) -> Vec3;
}

/// Axis-aligned box partition with per-axis cell size and spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangularLayout {
    origin: Vec3,
    cell_size: Vec3,
    cell_gap: Vec3,
}

impl RectangularLayout {
    /// Creates a layout whose cell `(0, 0, 0)` starts at `origin`.
    ///
    /// Axes whose size plus gap is not positive collapse to index zero.
    #[must_use]
    pub const fn new(origin: Vec3, cell_size: Vec3, cell_gap: Vec3) -> Self {
        Self {
            origin,
            cell_size,
            cell_gap,
        }
    }
}

impl WorldPartition for RectangularLayout {
    fn world_to_cell(&self, position: Vec3) -> GridCoord {
        let stride = self.cell_size + self.cell_gap;
        GridCoord::new(
            axis_index(position.x, self.origin.x, stride.x),
            axis_index(position.y, self.origin.y, stride.y),
            axis_index(position.z, self.origin.z, stride.z),
        )
    }

    fn cell_center(&self, cell: GridCoord) -> Vec3 {
        let stride = self.cell_size + self.cell_gap;
        Vec3::new(
            axis_center(cell.x(), self.origin.x, stride.x, self.cell_size.x),
            axis_center(cell.y(), self.origin.y, stride.y, self.cell_size.y),
            axis_center(cell.z(), self.origin.z, stride.z, self.cell_size.z),
        )
    }
}

/// Translates between world space and grid space for every layer.
#[derive(Debug)]
pub struct CoordinateMapper {
    mode: MapperMode,
}

#[derive(Debug)]
enum MapperMode {
    Partitioned(Box<dyn WorldPartition>),
    FixedCellSize(f32),
}

impl CoordinateMapper {
    /// Creates a mapper backed by a host-supplied partition.
    #[must_use]
    pub fn partitioned(partition: impl WorldPartition + 'static) -> Self {
        Self {
            mode: MapperMode::Partitioned(Box::new(partition)),
        }
    }

    /// Creates a degraded mapper that assumes square cells on the `z = 0` plane.
    ///
    /// Non-positive or non-finite sizes are replaced with `1.0`.
    #[must_use]
    pub fn fixed_cell_size(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            warn!("invalid fallback cell size {cell_size}; using 1.0");
            1.0
        };
        warn!(
            "no world partition supplied; mapping coordinates with fixed cell size {cell_size}"
        );
        Self {
            mode: MapperMode::FixedCellSize(cell_size),
        }
    }

    /// Reports whether the mapper runs on the fixed cell size fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, MapperMode::FixedCellSize(_))
    }

    /// Returns the cell containing the provided world-space position.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> GridCoord {
        match &self.mode {
            MapperMode::Partitioned(partition) => partition.world_to_cell(position),
            MapperMode::FixedCellSize(size) => GridCoord::planar(
                axis_index(position.x, 0.0, *size),
                axis_index(position.y, 0.0, *size),
            ),
        }
    }

    /// Returns the canonical world-space centre of the provided cell.
    #[must_use]
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec3 {
        match &self.mode {
            MapperMode::Partitioned(partition) => partition.cell_center(coord),
            MapperMode::FixedCellSize(size) => Vec3::new(
                axis_center(coord.x(), 0.0, *size, *size),
                axis_center(coord.y(), 0.0, *size, *size),
                0.0,
            ),
        }
    }
}

fn axis_index(value: f32, origin: f32, stride: f32) -> i32 {
    if stride <= 0.0 {
        return 0;
    }

    ((value - origin) / stride).floor() as i32
}

fn axis_center(index: i32, origin: f32, stride: f32, size: f32) -> f32 {
    if stride <= 0.0 {
        return origin + size.max(0.0) * 0.5;
    }

    origin + index as f32 * stride + size * 0.5
}
