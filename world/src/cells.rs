//! Sparse cell storage keyed by grid coordinate.

use std::collections::BTreeMap;

use log::warn;
use tactics_grid_core::{Cell, CellDefinition, CellView, GridCoord};

/// Authoritative store of every placed cell.
///
/// Cells are created once from placement data and never removed; occupancy is
/// the only state expected to change during a session.
#[derive(Clone, Debug, Default)]
pub(crate) struct CellStore {
    cells: BTreeMap<GridCoord, Cell>,
}

impl CellStore {
    /// Builds the store, keeping the first definition seen for each coordinate.
    ///
    /// Returns the store together with the number of dropped duplicates.
    pub(crate) fn from_definitions(definitions: &[CellDefinition]) -> (Self, usize) {
        let mut cells = BTreeMap::new();
        let mut duplicates = 0;

        for definition in definitions {
            if cells.contains_key(&definition.coord) {
                duplicates += 1;
                warn!(
                    "duplicate cell definition at {}; keeping the first one",
                    definition.coord
                );
                continue;
            }

            let _ = cells.insert(definition.coord, Cell::from_definition(*definition));
        }

        (Self { cells }, duplicates)
    }

    pub(crate) fn get(&self, coord: GridCoord) -> Option<Cell> {
        self.cells.get(&coord).copied()
    }

    /// Updates the occupancy flag. Absent coordinates are left untouched.
    pub(crate) fn set_occupied(&mut self, coord: GridCoord, occupied: bool) {
        match self.cells.get_mut(&coord) {
            Some(cell) => cell.occupied = occupied,
            None => warn!("cannot set occupancy of {coord}: no cell exists there"),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn view(&self) -> CellView<'_> {
        CellView::new(&self.cells)
    }
}
