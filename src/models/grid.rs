//! Fixed-size week grids.
//!
//! A [`Grid`] stores one value per (day, period) cell in a flat,
//! row-major `Vec`. Dimensions never change after construction.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::ops::Index;

use super::{Assignment, GridDims, Slot};

/// A section or batch grid: each cell is empty or holds one assignment.
pub type AssignmentGrid = Grid<Option<Assignment>>;

/// A `days × periods` array indexed by [`Slot`].
///
/// `get` returns `None` for out-of-range slots; indexing panics.
/// Deserialization rejects a cell count that does not match `dims`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid<T> {
    dims: GridDims,
    cells: Vec<T>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Grid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            dims: GridDims,
            cells: Vec<T>,
        }

        let Raw { dims, cells } = Raw::deserialize(deserializer)?;
        if cells.len() != dims.cell_count() {
            return Err(de::Error::custom(format!(
                "grid {}x{} needs {} cells, got {}",
                dims.days,
                dims.periods,
                dims.cell_count(),
                cells.len()
            )));
        }
        Ok(Self { dims, cells })
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a grid with every cell set to `T::default()`.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![T::default(); dims.cell_count()],
        }
    }
}

impl<T> Grid<T> {
    /// Grid dimensions.
    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// The cell at `slot`, or `None` when out of range.
    #[inline]
    pub fn get(&self, slot: Slot) -> Option<&T> {
        self.dims.index_of(slot).map(|i| &self.cells[i])
    }

    /// Replaces the cell at `slot`, returning the previous value.
    ///
    /// # Panics
    /// If `slot` is outside the grid.
    pub(crate) fn replace(&mut self, slot: Slot, value: T) -> T {
        let idx = self.checked_index(slot);
        std::mem::replace(&mut self.cells[idx], value)
    }

    /// Cells of one day, in period order.
    pub fn day(&self, day: usize) -> &[T] {
        let start = day * self.dims.periods;
        &self.cells[start..start + self.dims.periods]
    }

    /// Iterates `(slot, cell)` pairs in day-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> + '_ {
        self.dims.slots().zip(self.cells.iter())
    }

    fn checked_index(&self, slot: Slot) -> usize {
        match self.dims.index_of(slot) {
            Some(i) => i,
            None => panic!(
                "slot ({}, {}) outside {}x{} grid",
                slot.day, slot.period, self.dims.days, self.dims.periods
            ),
        }
    }
}

impl<T> Index<Slot> for Grid<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        &self.cells[self.checked_index(slot)]
    }
}

impl Grid<Option<Assignment>> {
    /// Whether the cell at `slot` holds an assignment.
    ///
    /// Out-of-range slots read as empty.
    #[inline]
    pub fn is_occupied(&self, slot: Slot) -> bool {
        matches!(self.get(slot), Some(Some(_)))
    }

    /// Subject at `slot`, if any.
    pub fn subject_at(&self, slot: Slot) -> Option<&str> {
        self.get(slot)
            .and_then(|c| c.as_ref())
            .map(|a| a.subject.as_str())
    }

    /// Whether `subject` occurs anywhere on `day`.
    pub fn day_has_subject(&self, day: usize, subject: &str) -> bool {
        self.day(day)
            .iter()
            .flatten()
            .any(|a| a.subject == subject)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of cells holding `subject`.
    pub fn count_subject(&self, subject: &str) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|a| a.subject == subject)
            .count()
    }

    /// Iterates occupied cells only.
    pub fn assignments(&self) -> impl Iterator<Item = (Slot, &Assignment)> + '_ {
        self.iter().filter_map(|(s, c)| c.as_ref().map(|a| (s, a)))
    }
}

impl Grid<bool> {
    /// Number of `true` cells.
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_empty() {
        let g: AssignmentGrid = Grid::new(GridDims::new(2, 3));
        assert_eq!(g.occupied_count(), 0);
        assert!(!g.is_occupied(Slot::new(1, 2)));
        assert_eq!(g.iter().count(), 6);
    }

    #[test]
    fn test_replace_and_query() {
        let mut g: AssignmentGrid = Grid::new(GridDims::new(2, 3));
        let prev = g.replace(Slot::new(1, 1), Some(Assignment::new("Math", "X")));
        assert!(prev.is_none());
        assert!(g.is_occupied(Slot::new(1, 1)));
        assert_eq!(g.subject_at(Slot::new(1, 1)), Some("Math"));
        assert!(g.day_has_subject(1, "Math"));
        assert!(!g.day_has_subject(0, "Math"));
        assert_eq!(g.count_subject("Math"), 1);
        assert_eq!(g.assignments().count(), 1);
    }

    #[test]
    fn test_deserialize_checks_cell_count() {
        let ok: Grid<bool> =
            serde_json::from_str(r#"{"dims":{"days":1,"periods":2},"cells":[true,false]}"#)
                .unwrap();
        assert_eq!(ok.count_set(), 1);

        let err = serde_json::from_str::<Grid<bool>>(
            r#"{"dims":{"days":1,"periods":2},"cells":[true]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs 2 cells"), "{err}");
    }

    #[test]
    fn test_out_of_range_get() {
        let g: Grid<bool> = Grid::new(GridDims::new(1, 1));
        assert!(g.get(Slot::new(0, 1)).is_none());
        assert!(g.get(Slot::new(1, 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_index_panics() {
        let g: Grid<bool> = Grid::new(GridDims::new(1, 1));
        let _ = g[Slot::new(3, 3)];
    }

    #[test]
    fn test_day_slice() {
        let mut g: Grid<bool> = Grid::new(GridDims::new(2, 3));
        g.replace(Slot::new(1, 0), true);
        assert_eq!(g.day(0), &[false, false, false]);
        assert_eq!(g.day(1), &[true, false, false]);
        assert_eq!(g.count_set(), 1);
    }
}
