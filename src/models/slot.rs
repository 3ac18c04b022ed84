//! Slot coordinates and grid dimensions.
//!
//! A week is a fixed `days × periods` lattice. Every scheduler addresses
//! cells through [`Slot`] and enumerates candidates through [`GridDims`].

use serde::{Deserialize, Serialize};

/// Default number of teaching days per week.
pub const DEFAULT_DAYS: usize = 5;
/// Default number of periods per day.
pub const DEFAULT_PERIODS: usize = 6;

/// A (day, period) coordinate.
///
/// Ordering is day-major: all periods of day 0 precede day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Day index (0-based).
    pub day: usize,
    /// Period index within the day (0-based).
    pub period: usize,
}

impl Slot {
    /// Creates a slot.
    pub fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }

    /// The period immediately before this one on the same day.
    pub fn previous(&self) -> Option<Slot> {
        self.period.checked_sub(1).map(|p| Slot::new(self.day, p))
    }

    /// The period immediately after this one on the same day.
    ///
    /// Not bounds-checked against the grid; callers go through
    /// [`GridDims::contains`] or [`Grid::get`](super::Grid::get).
    pub fn next(&self) -> Slot {
        Slot::new(self.day, self.period + 1)
    }
}

impl From<(usize, usize)> for Slot {
    fn from((day, period): (usize, usize)) -> Self {
        Self::new(day, period)
    }
}

/// Grid dimensions: days per week × periods per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of days (D).
    pub days: usize,
    /// Number of periods per day (P).
    pub periods: usize,
}

impl GridDims {
    /// Creates dimensions.
    pub fn new(days: usize, periods: usize) -> Self {
        Self { days, periods }
    }

    /// Total cell count (D × P).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.days * self.periods
    }

    /// Whether `slot` lies inside the grid.
    #[inline]
    pub fn contains(&self, slot: Slot) -> bool {
        slot.day < self.days && slot.period < self.periods
    }

    /// All slots in day-major order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.days).flat_map(move |d| (0..self.periods).map(move |p| Slot::new(d, p)))
    }

    /// All slots of one day.
    pub fn day_slots(&self, day: usize) -> impl Iterator<Item = Slot> + '_ {
        (0..self.periods).map(move |p| Slot::new(day, p))
    }

    /// Valid two-period lab block starts: even periods with room for the
    /// second period, on every day.
    pub fn lab_block_starts(&self) -> Vec<Slot> {
        let mut starts = Vec::new();
        if self.periods < 2 {
            return starts;
        }
        for day in 0..self.days {
            for period in (0..=self.periods - 2).step_by(2) {
                starts.push(Slot::new(day, period));
            }
        }
        starts
    }

    /// Whether `start` is a legal lab block start.
    pub fn is_lab_block_start(&self, start: Slot) -> bool {
        start.period % 2 == 0 && start.day < self.days && start.period + 1 < self.periods
    }

    /// Row-major index of a slot, or `None` when out of range.
    #[inline]
    pub(crate) fn index_of(&self, slot: Slot) -> Option<usize> {
        if self.contains(slot) {
            Some(slot.day * self.periods + slot.period)
        } else {
            None
        }
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(DEFAULT_DAYS, DEFAULT_PERIODS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_day_major() {
        let dims = GridDims::new(2, 3);
        let slots: Vec<Slot> = dims.slots().collect();
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0], Slot::new(0, 0));
        assert_eq!(slots[3], Slot::new(1, 0));
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lab_block_starts_even_only() {
        let dims = GridDims::default();
        let starts = dims.lab_block_starts();
        // 5 days × {0, 2, 4}
        assert_eq!(starts.len(), 15);
        assert!(starts.iter().all(|s| s.period % 2 == 0 && s.period + 1 < 6));
    }

    #[test]
    fn test_lab_block_starts_odd_periods() {
        // P = 5 → starts 0 and 2; a block at 4 would overrun the day
        let dims = GridDims::new(1, 5);
        let starts = dims.lab_block_starts();
        assert_eq!(starts, vec![Slot::new(0, 0), Slot::new(0, 2)]);
        assert!(!dims.is_lab_block_start(Slot::new(0, 4)));
        assert!(!dims.is_lab_block_start(Slot::new(0, 1)));
    }

    #[test]
    fn test_lab_block_starts_too_short() {
        assert!(GridDims::new(3, 1).lab_block_starts().is_empty());
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(Slot::new(1, 0).previous(), None);
        assert_eq!(Slot::new(1, 2).previous(), Some(Slot::new(1, 1)));
        assert_eq!(Slot::new(1, 2).next(), Slot::new(1, 3));
    }

    #[test]
    fn test_index_of_bounds() {
        let dims = GridDims::new(2, 3);
        assert_eq!(dims.index_of(Slot::new(1, 2)), Some(5));
        assert_eq!(dims.index_of(Slot::new(2, 0)), None);
        assert_eq!(dims.index_of(Slot::new(0, 3)), None);
    }
}
