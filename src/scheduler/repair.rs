//! Repair pass over the theory residue.
//!
//! One sweep, sections in key order, slots in day-major order. For each
//! leftover instance:
//!
//! 1. **Direct**: take the first slot that passes [`can_schedule`].
//! 2. **Swap**: otherwise, at each slot, try every section holding a
//!    theory class there. Lift the occupant, place the candidate, and
//!    relocate the occupant elsewhere in its own section. If any step
//!    fails, the occupant is restored exactly where it was.
//!
//! A swap never loses an occupant: either both classes end up placed or
//! the timetable is unchanged. Instances the sweep cannot place stay in
//! the residue.

use tracing::debug;

use super::feasibility::{can_schedule, theory_rejections, Rejection};
use super::report::{remove_one, Residue};
use super::theory::commit_theory;
use crate::models::{Assignment, Slot, TeacherDirectory, Timetable};

/// Counters from one repair sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Instances placed into a free feasible slot.
    pub direct: usize,
    /// Instances placed by displacing and relocating another class.
    pub swapped: usize,
}

/// Single-sweep residue repair.
#[derive(Debug, Clone)]
pub struct RepairPass {
    relaxed: bool,
}

impl RepairPass {
    /// Creates a repair pass. `relaxed` waives the spacing rules for both
    /// direct placements and relocations.
    pub fn new(relaxed: bool) -> Self {
        Self { relaxed }
    }

    /// Sweeps `residue` once, removing every instance it places.
    pub fn run(
        &self,
        timetable: &mut Timetable,
        directory: &TeacherDirectory,
        residue: &mut Residue,
    ) -> RepairOutcome {
        let mut outcome = RepairOutcome::default();
        let sections: Vec<String> = residue.keys().cloned().collect();

        for section in &sections {
            let snapshot = match residue.get(section) {
                Some(list) if !list.is_empty() => list.clone(),
                _ => continue,
            };

            for subject in &snapshot {
                if directory.teacher_for(section, subject).is_none() {
                    continue;
                }
                let placed = if self.place_direct(timetable, directory, section, subject) {
                    outcome.direct += 1;
                    true
                } else {
                    self.place_by_swap(timetable, directory, section, subject, &mut outcome)
                };
                if placed {
                    if let Some(list) = residue.get_mut(section) {
                        remove_one(list, subject);
                    }
                }
            }
        }

        debug!(
            direct = outcome.direct,
            swapped = outcome.swapped,
            "repair pass complete"
        );
        outcome
    }

    fn place_direct(
        &self,
        timetable: &mut Timetable,
        directory: &TeacherDirectory,
        section: &str,
        subject: &str,
    ) -> bool {
        let slot = timetable
            .dims()
            .slots()
            .find(|&s| can_schedule(timetable, directory, section, subject, s, self.relaxed));
        match slot {
            Some(slot) => commit_theory(timetable, directory, section, subject, slot),
            None => false,
        }
    }

    fn place_by_swap(
        &self,
        timetable: &mut Timetable,
        directory: &TeacherDirectory,
        section: &str,
        subject: &str,
        outcome: &mut RepairOutcome,
    ) -> bool {
        let dims = timetable.dims();
        let sections: Vec<String> = timetable.sections().map(str::to_string).collect();

        for slot in dims.slots() {
            if !swap_may_help(&theory_rejections(
                timetable,
                directory,
                section,
                subject,
                slot,
                self.relaxed,
            )) {
                continue;
            }
            for other in &sections {
                if self.try_swap(timetable, directory, section, subject, other, slot) {
                    outcome.swapped += 1;
                    return true;
                }
            }
        }
        false
    }

    /// Lifts `other`'s class at `slot`, places `subject` for `section`
    /// there, and relocates the lifted class. Restores the timetable and
    /// returns `false` if any step fails.
    fn try_swap(
        &self,
        timetable: &mut Timetable,
        directory: &TeacherDirectory,
        section: &str,
        subject: &str,
        other: &str,
        slot: Slot,
    ) -> bool {
        let occupant = match timetable.theory(other).and_then(|g| g.get(slot)) {
            Some(Some(a)) if !(other == section && a.subject == subject) => a.clone(),
            _ => return false,
        };
        timetable.lift_theory(other, slot);

        if !can_schedule(timetable, directory, section, subject, slot, self.relaxed) {
            timetable.place_theory(other, slot, occupant);
            return false;
        }
        commit_theory(timetable, directory, section, subject, slot);

        match self.relocation_slot(timetable, directory, other, &occupant, slot) {
            Some(target) => {
                debug!(
                    section,
                    subject,
                    displaced_section = other,
                    displaced_subject = %occupant.subject,
                    from_day = slot.day,
                    from_period = slot.period,
                    to_day = target.day,
                    to_period = target.period,
                    "repair swap"
                );
                timetable.place_theory(other, target, occupant);
                true
            }
            None => {
                timetable.lift_theory(section, slot);
                timetable.place_theory(other, slot, occupant);
                false
            }
        }
    }

    fn relocation_slot(
        &self,
        timetable: &Timetable,
        directory: &TeacherDirectory,
        section: &str,
        occupant: &Assignment,
        vacated: Slot,
    ) -> Option<Slot> {
        timetable.dims().slots().find(|&s| {
            s != vacated
                && can_schedule(
                    timetable,
                    directory,
                    section,
                    &occupant.subject,
                    s,
                    self.relaxed,
                )
        })
    }
}

/// Whether lifting a theory class could clear every reason in `reasons`.
/// Labs, pre-blocks, and unknown keys never move.
fn swap_may_help(reasons: &[Rejection]) -> bool {
    reasons.iter().all(|r| {
        matches!(
            r,
            Rejection::CellOccupied { .. }
                | Rejection::TeacherBusy { .. }
                | Rejection::RepeatedToday
                | Rejection::AdjacentRepeat
        )
    })
}
