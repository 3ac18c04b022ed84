//! Timetable state (the solution being built).
//!
//! Holds every section's theory grid, the per-batch lab grids and the
//! shared teacher tracker. All writes funnel through the crate-private
//! placement primitives below, which check their preconditions and keep
//! grids and teacher busy state in step.
//!
//! Read access is public: once a run finishes the caller receives the
//! timetable as a read-only snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Assignment, AssignmentGrid, Batch, Grid, GridDims, LabSubject, Slot};
use crate::availability::TeacherAvailability;

/// The two batch grids of one lab section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabGrids {
    /// Batch 1 grid.
    pub b1: AssignmentGrid,
    /// Batch 2 grid.
    pub b2: AssignmentGrid,
}

impl LabGrids {
    fn new(dims: GridDims) -> Self {
        Self {
            b1: Grid::new(dims),
            b2: Grid::new(dims),
        }
    }

    /// Grid of one batch.
    pub fn batch(&self, batch: Batch) -> &AssignmentGrid {
        match batch {
            Batch::B1 => &self.b1,
            Batch::B2 => &self.b2,
        }
    }

    /// Whether either batch holds a lab at `slot`.
    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.b1.is_occupied(slot) || self.b2.is_occupied(slot)
    }

    /// Number of lab blocks on `day`.
    ///
    /// Blocks always start on even periods and fill both batches, so
    /// counting occupied even starts counts blocks.
    pub fn blocks_on(&self, day: usize) -> usize {
        let periods = self.b1.dims().periods;
        (0..periods)
            .step_by(2)
            .filter(|&p| self.is_occupied(Slot::new(day, p)))
            .count()
    }

    /// Total lab blocks in the week.
    pub fn block_count(&self) -> usize {
        (0..self.b1.dims().days).map(|d| self.blocks_on(d)).sum()
    }
}

/// What a section is doing in one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionCell {
    /// Nothing scheduled.
    #[default]
    Free,
    /// A theory class.
    Theory(Assignment),
    /// Both batches in labs.
    Lab {
        b1: Option<Assignment>,
        b2: Option<Assignment>,
    },
}

/// Where a teacher is in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherCell {
    /// Section key.
    pub section: String,
    /// Lab batch, or `None` for a theory class.
    pub batch: Option<Batch>,
    /// Subject taught.
    pub subject: String,
}

/// Theory grids, lab grids and teacher availability for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    dims: GridDims,
    theory: BTreeMap<String, AssignmentGrid>,
    labs: BTreeMap<String, LabGrids>,
    availability: TeacherAvailability,
}

impl Timetable {
    /// Creates an empty timetable.
    ///
    /// `theory_sections` get a theory grid, `lab_sections` get two batch
    /// grids. A key may appear in both.
    pub fn new<I, J, S, L>(
        availability: TeacherAvailability,
        theory_sections: I,
        lab_sections: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = L>,
        S: Into<String>,
        L: Into<String>,
    {
        let dims = availability.dims();
        Self {
            dims,
            theory: theory_sections
                .into_iter()
                .map(|s| (s.into(), Grid::new(dims)))
                .collect(),
            labs: lab_sections
                .into_iter()
                .map(|s| (s.into(), LabGrids::new(dims)))
                .collect(),
            availability,
        }
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Teacher availability snapshot.
    pub fn availability(&self) -> &TeacherAvailability {
        &self.availability
    }

    /// Theory section keys in order.
    pub fn sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.theory.keys().map(String::as_str)
    }

    /// Lab section keys in order.
    pub fn lab_sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.labs.keys().map(String::as_str)
    }

    /// Theory grid of a section.
    pub fn theory(&self, section: &str) -> Option<&AssignmentGrid> {
        self.theory.get(section)
    }

    /// Lab grids of a section.
    pub fn labs(&self, section: &str) -> Option<&LabGrids> {
        self.labs.get(section)
    }

    /// Whether either batch of `section` is in a lab at `slot`.
    pub fn has_lab_at(&self, section: &str, slot: Slot) -> bool {
        self.labs.get(section).is_some_and(|l| l.is_occupied(slot))
    }

    /// Lab blocks `section` already holds on `day`.
    pub fn lab_blocks_on(&self, section: &str, day: usize) -> usize {
        self.labs.get(section).map_or(0, |l| l.blocks_on(day))
    }

    /// Committed theory instances of `subject` in `section`.
    pub fn theory_count(&self, section: &str, subject: &str) -> usize {
        self.theory
            .get(section)
            .map_or(0, |g| g.count_subject(subject))
    }

    /// Commits a lab pair: `first` runs in B1 and `second` in B2 for
    /// periods `start` and `start + 1`.
    ///
    /// All four cells are written and both teachers marked, or the call
    /// panics before touching anything.
    ///
    /// # Panics
    /// If the block shape is illegal, a target cell is taken, or either
    /// teacher is already busy.
    pub(crate) fn place_lab_pair(
        &mut self,
        section: &str,
        start: Slot,
        first: &LabSubject,
        second: &LabSubject,
    ) {
        assert!(
            self.dims.is_lab_block_start(start),
            "illegal lab block start ({}, {})",
            start.day,
            start.period
        );
        assert_ne!(
            first.teacher, second.teacher,
            "lab pair for {section} uses one teacher for both batches"
        );
        let block = [start, start.next()];
        {
            let grids = self
                .labs
                .get(section)
                .unwrap_or_else(|| panic!("no lab grids for section {section}"));
            for &slot in &block {
                assert!(
                    !grids.b1.is_occupied(slot) && !grids.b2.is_occupied(slot),
                    "lab cell taken for {section} at ({}, {})",
                    slot.day,
                    slot.period
                );
                assert!(
                    self.availability.is_free(&first.teacher, slot)
                        && self.availability.is_free(&second.teacher, slot),
                    "lab teacher busy for {section} at ({}, {})",
                    slot.day,
                    slot.period
                );
            }
        }

        for &slot in &block {
            self.availability.mark_busy(&first.teacher, slot);
            self.availability.mark_busy(&second.teacher, slot);
        }
        if let Some(grids) = self.labs.get_mut(section) {
            for &slot in &block {
                grids.b1.replace(slot, Some(first.assignment()));
                grids.b2.replace(slot, Some(second.assignment()));
            }
        }
    }

    /// Commits a theory class into an empty cell and marks its teacher.
    ///
    /// # Panics
    /// If the section is unknown, the cell is taken, or the teacher is busy.
    pub(crate) fn place_theory(&mut self, section: &str, slot: Slot, assignment: Assignment) {
        let grid = self
            .theory
            .get_mut(section)
            .unwrap_or_else(|| panic!("no theory grid for section {section}"));
        assert!(
            !grid.is_occupied(slot),
            "theory cell taken for {section} at ({}, {})",
            slot.day,
            slot.period
        );
        self.availability.mark_busy(&assignment.teacher, slot);
        grid.replace(slot, Some(assignment));
    }

    /// Clears a theory cell and releases its teacher, returning what was
    /// there.
    pub(crate) fn lift_theory(&mut self, section: &str, slot: Slot) -> Option<Assignment> {
        let grid = self.theory.get_mut(section)?;
        let lifted = grid.replace(slot, None)?;
        self.availability.release(&lifted.teacher, slot);
        Some(lifted)
    }

    /// Combined view of a section: theory classes and lab blocks.
    pub fn section_view(&self, section: &str) -> Option<Grid<SectionCell>> {
        let theory = self.theory.get(section);
        let labs = self.labs.get(section);
        if theory.is_none() && labs.is_none() {
            return None;
        }
        let mut view = Grid::new(self.dims);
        for slot in self.dims.slots() {
            let cell = match (labs, theory) {
                (Some(l), _) if l.is_occupied(slot) => SectionCell::Lab {
                    b1: l.b1[slot].clone(),
                    b2: l.b2[slot].clone(),
                },
                (_, Some(t)) => match &t[slot] {
                    Some(a) => SectionCell::Theory(a.clone()),
                    None => SectionCell::Free,
                },
                _ => SectionCell::Free,
            };
            view.replace(slot, cell);
        }
        Some(view)
    }

    /// Where `teacher` is at every slot.
    pub fn teacher_view(&self, teacher: &str) -> Grid<Option<TeacherCell>> {
        let mut view: Grid<Option<TeacherCell>> = Grid::new(self.dims);
        for (section, grid) in &self.theory {
            for (slot, a) in grid.assignments() {
                if a.teacher == teacher {
                    view.replace(
                        slot,
                        Some(TeacherCell {
                            section: section.clone(),
                            batch: None,
                            subject: a.subject.clone(),
                        }),
                    );
                }
            }
        }
        for (section, grids) in &self.labs {
            for batch in Batch::ALL {
                for (slot, a) in grids.batch(batch).assignments() {
                    if a.teacher == teacher {
                        view.replace(
                            slot,
                            Some(TeacherCell {
                                section: section.clone(),
                                batch: Some(batch),
                                subject: a.subject.clone(),
                            }),
                        );
                    }
                }
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Timetable {
        let availability = TeacherAvailability::new(GridDims::new(2, 4));
        Timetable::new(availability, ["3A", "3B"], ["3A"])
    }

    #[test]
    fn test_new_layout() {
        let tt = empty();
        assert_eq!(tt.sections().collect::<Vec<_>>(), vec!["3A", "3B"]);
        assert_eq!(tt.lab_sections().collect::<Vec<_>>(), vec!["3A"]);
        assert!(tt.labs("3B").is_none());
        assert_eq!(tt.theory("3A").map(|g| g.occupied_count()), Some(0));
    }

    #[test]
    fn test_place_lab_pair_writes_block() {
        let mut tt = empty();
        let l1 = LabSubject::new("DSA-LAB", "T1");
        let l2 = LabSubject::new("OS-LAB", "T2");
        tt.place_lab_pair("3A", Slot::new(1, 2), &l1, &l2);

        let labs = tt.labs("3A").unwrap();
        assert_eq!(labs.b1.subject_at(Slot::new(1, 2)), Some("DSA-LAB"));
        assert_eq!(labs.b1.subject_at(Slot::new(1, 3)), Some("DSA-LAB"));
        assert_eq!(labs.b2.subject_at(Slot::new(1, 2)), Some("OS-LAB"));
        assert_eq!(labs.b2.subject_at(Slot::new(1, 3)), Some("OS-LAB"));
        assert!(!tt.availability().is_free("T1", Slot::new(1, 3)));
        assert!(!tt.availability().is_free("T2", Slot::new(1, 2)));
        assert_eq!(tt.lab_blocks_on("3A", 1), 1);
        assert_eq!(labs.block_count(), 1);
        assert!(tt.has_lab_at("3A", Slot::new(1, 3)));
        assert!(!tt.has_lab_at("3B", Slot::new(1, 3)));
    }

    #[test]
    #[should_panic(expected = "illegal lab block start")]
    fn test_place_lab_pair_odd_start_panics() {
        let mut tt = empty();
        let l1 = LabSubject::new("A", "T1");
        let l2 = LabSubject::new("B", "T2");
        tt.place_lab_pair("3A", Slot::new(0, 1), &l1, &l2);
    }

    #[test]
    #[should_panic(expected = "one teacher for both batches")]
    fn test_place_lab_pair_same_teacher_panics() {
        let mut tt = empty();
        let l1 = LabSubject::new("A", "T1");
        let l2 = LabSubject::new("B", "T1");
        tt.place_lab_pair("3A", Slot::new(0, 0), &l1, &l2);
    }

    #[test]
    fn test_place_and_lift_theory() {
        let mut tt = empty();
        tt.place_theory("3B", Slot::new(0, 1), Assignment::new("OS", "X"));
        assert_eq!(tt.theory_count("3B", "OS"), 1);
        assert!(!tt.availability().is_free("X", Slot::new(0, 1)));

        let lifted = tt.lift_theory("3B", Slot::new(0, 1));
        assert_eq!(lifted, Some(Assignment::new("OS", "X")));
        assert!(tt.availability().is_free("X", Slot::new(0, 1)));
        assert_eq!(tt.theory_count("3B", "OS"), 0);
        assert_eq!(tt.lift_theory("3B", Slot::new(0, 1)), None);
    }

    #[test]
    #[should_panic(expected = "double-booked")]
    fn test_place_theory_double_booking_panics() {
        let mut tt = empty();
        tt.place_theory("3A", Slot::new(0, 0), Assignment::new("OS", "X"));
        tt.place_theory("3B", Slot::new(0, 0), Assignment::new("DSA", "X"));
    }

    #[test]
    fn test_section_view_marks_labs() {
        let mut tt = empty();
        tt.place_lab_pair(
            "3A",
            Slot::new(0, 0),
            &LabSubject::new("L1", "T1"),
            &LabSubject::new("L2", "T2"),
        );
        tt.place_theory("3A", Slot::new(0, 2), Assignment::new("OS", "X"));

        let view = tt.section_view("3A").unwrap();
        assert!(matches!(view[Slot::new(0, 0)], SectionCell::Lab { .. }));
        assert_eq!(
            view[Slot::new(0, 2)],
            SectionCell::Theory(Assignment::new("OS", "X"))
        );
        assert_eq!(view[Slot::new(0, 3)], SectionCell::Free);
        assert!(tt.section_view("9Z").is_none());
    }

    #[test]
    fn test_teacher_view() {
        let mut tt = empty();
        tt.place_lab_pair(
            "3A",
            Slot::new(1, 0),
            &LabSubject::new("L1", "T1"),
            &LabSubject::new("L2", "X"),
        );
        tt.place_theory("3B", Slot::new(0, 3), Assignment::new("OS", "X"));

        let view = tt.teacher_view("X");
        let theory = view[Slot::new(0, 3)].as_ref().unwrap();
        assert_eq!(theory.section, "3B");
        assert_eq!(theory.batch, None);
        let lab = view[Slot::new(1, 1)].as_ref().unwrap();
        assert_eq!(lab.batch, Some(Batch::B2));
        assert_eq!(lab.subject, "L2");
        assert!(view[Slot::new(0, 0)].is_none());
    }
}
