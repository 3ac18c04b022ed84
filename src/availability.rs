//! Teacher availability tracking.
//!
//! Each teacher owns a busy grid shared by every section and batch: a
//! teacher can be in at most one place per slot. Pre-blocked slots are
//! external input and never change during a run.
//!
//! Busy state is only written through the placement primitives on
//! [`Timetable`](crate::models::Timetable). The release path is
//! crate-private and exists for the repair pass's transactional
//! relocation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Grid, GridDims, Slot};

/// Per-teacher busy grids plus immutable pre-blocked slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherAvailability {
    dims: GridDims,
    busy: BTreeMap<String, Grid<bool>>,
    preblocked: BTreeMap<String, BTreeSet<Slot>>,
}

impl TeacherAvailability {
    /// Creates a tracker with no teacher busy anywhere.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            busy: BTreeMap::new(),
            preblocked: BTreeMap::new(),
        }
    }

    /// Sets the pre-blocked slots.
    pub fn with_preblocked(mut self, preblocked: &BTreeMap<String, Vec<Slot>>) -> Self {
        self.preblocked = preblocked
            .iter()
            .map(|(t, slots)| (t.clone(), slots.iter().copied().collect()))
            .collect();
        self
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Whether `teacher` has nothing committed at `slot`.
    ///
    /// Teachers with no commitments yet are free everywhere.
    pub fn is_free(&self, teacher: &str, slot: Slot) -> bool {
        self.busy
            .get(teacher)
            .and_then(|g| g.get(slot))
            .map_or(true, |&busy| !busy)
    }

    /// Whether `slot` is externally blocked for `teacher`.
    pub fn is_preblocked(&self, teacher: &str, slot: Slot) -> bool {
        self.preblocked
            .get(teacher)
            .is_some_and(|s| s.contains(&slot))
    }

    /// Free and not pre-blocked.
    pub fn is_available(&self, teacher: &str, slot: Slot) -> bool {
        self.is_free(teacher, slot) && !self.is_preblocked(teacher, slot)
    }

    /// Marks `teacher` busy at `slot`.
    ///
    /// # Panics
    /// If the teacher is already busy there: a double booking means a
    /// placement skipped its feasibility check.
    pub(crate) fn mark_busy(&mut self, teacher: &str, slot: Slot) {
        let dims = self.dims;
        let grid = self
            .busy
            .entry(teacher.to_string())
            .or_insert_with(|| Grid::new(dims));
        let was_busy = grid.replace(slot, true);
        assert!(
            !was_busy,
            "teacher {teacher} double-booked at day {} period {}",
            slot.day, slot.period
        );
    }

    /// Clears `teacher`'s commitment at `slot`. A teacher left with no
    /// commitments is dropped, so a mark/release pair leaves no trace.
    ///
    /// # Panics
    /// If the teacher was not busy there.
    pub(crate) fn release(&mut self, teacher: &str, slot: Slot) {
        let (was_busy, now_idle) = match self.busy.get_mut(teacher) {
            Some(grid) => (grid.replace(slot, false), grid.count_set() == 0),
            None => (false, false),
        };
        assert!(
            was_busy,
            "released teacher {teacher} at day {} period {} without a commitment",
            slot.day, slot.period
        );
        if now_idle {
            self.busy.remove(teacher);
        }
    }

    /// Busy grid snapshot for one teacher, if the teacher has any commitment.
    pub fn busy_grid(&self, teacher: &str) -> Option<&Grid<bool>> {
        self.busy.get(teacher)
    }

    /// Number of busy periods for `teacher`.
    pub fn busy_count(&self, teacher: &str) -> usize {
        self.busy.get(teacher).map_or(0, |g| g.count_set())
    }

    /// Teachers with at least one commitment, in name order.
    pub fn teachers(&self) -> impl Iterator<Item = &str> + '_ {
        self.busy.keys().map(String::as_str)
    }

    /// Gap score used by gap-aware slot selection: one point for each
    /// neighbouring period (or day edge) where the teacher stays free.
    pub fn gap_score(&self, teacher: &str, slot: Slot) -> u8 {
        let mut score = 0;
        match slot.previous() {
            None => score += 1,
            Some(prev) if self.is_free(teacher, prev) => score += 1,
            _ => {}
        }
        let next = slot.next();
        if !self.dims.contains(next) || self.is_free(teacher, next) {
            score += 1;
        }
        score
    }
}
