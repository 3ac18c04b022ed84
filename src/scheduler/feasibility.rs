//! Placement feasibility predicates.
//!
//! Each predicate has two faces over one implementation: a boolean
//! check that stops at the first failing rule (the hot path used while
//! scheduling) and an explain query that reports every failing rule.
//! Both are pure reads of the timetable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Batch, LabSubject, Slot, TeacherDirectory, Timetable};

/// Why a placement was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// No teacher claims this (section, subject).
    NoTeacher,
    /// The section has no grid of the needed kind.
    UnknownSection,
    /// The slot lies outside the grid.
    OutOfRange,
    /// A lab block cannot start here (odd period or overruns the day).
    IllegalBlockStart,
    /// One of the section's batches is in a lab.
    LabInSection,
    /// The theory cell already holds a class.
    CellOccupied { subject: String },
    /// A batch cell of the block is taken.
    BatchOccupied { batch: Batch, slot: Slot },
    /// The teacher is teaching elsewhere.
    TeacherBusy { teacher: String, slot: Slot },
    /// The slot is pre-blocked for the teacher.
    TeacherPreblocked { teacher: String, slot: Slot },
    /// Both batches of a lab pair name the same teacher.
    SameTeacherBothBatches { teacher: String },
    /// The section already has its daily quota of lab blocks.
    DailyLabCap { blocks: usize },
    /// The subject already occurs that day (strict mode).
    RepeatedToday,
    /// The subject sits in a neighbouring period (strict mode).
    AdjacentRepeat,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoTeacher => f.write_str("no teacher assigned"),
            Rejection::UnknownSection => f.write_str("unknown section"),
            Rejection::OutOfRange => f.write_str("slot outside the grid"),
            Rejection::IllegalBlockStart => f.write_str("illegal lab block start"),
            Rejection::LabInSection => f.write_str("lab conflict"),
            Rejection::CellOccupied { subject } => write!(f, "class occupied by {subject}"),
            Rejection::BatchOccupied { batch, slot } => {
                write!(f, "{batch} occupied at ({}, {})", slot.day, slot.period)
            }
            Rejection::TeacherBusy { teacher, slot } => {
                write!(f, "{teacher} busy at ({}, {})", slot.day, slot.period)
            }
            Rejection::TeacherPreblocked { teacher, slot } => {
                write!(f, "{teacher} pre-blocked at ({}, {})", slot.day, slot.period)
            }
            Rejection::SameTeacherBothBatches { teacher } => {
                write!(f, "{teacher} would run both batches")
            }
            Rejection::DailyLabCap { blocks } => write!(f, "{blocks} lab blocks already that day"),
            Rejection::RepeatedToday => f.write_str("subject already scheduled that day"),
            Rejection::AdjacentRepeat => f.write_str("subject in adjacent period"),
        }
    }
}

/// Records `rejection`; returns `true` when the caller should stop.
fn stop(out: &mut Vec<Rejection>, rejection: Rejection, first_only: bool) -> bool {
    out.push(rejection);
    first_only
}

/// Whether `subject` can be placed for `section` at `slot`.
pub fn can_schedule(
    timetable: &Timetable,
    directory: &TeacherDirectory,
    section: &str,
    subject: &str,
    slot: Slot,
    relaxed: bool,
) -> bool {
    check_theory(timetable, directory, section, subject, slot, relaxed, true).is_empty()
}

/// Every reason `subject` cannot be placed for `section` at `slot`.
///
/// Empty when the placement is feasible.
pub fn theory_rejections(
    timetable: &Timetable,
    directory: &TeacherDirectory,
    section: &str,
    subject: &str,
    slot: Slot,
    relaxed: bool,
) -> Vec<Rejection> {
    check_theory(timetable, directory, section, subject, slot, relaxed, false)
}

fn check_theory(
    timetable: &Timetable,
    directory: &TeacherDirectory,
    section: &str,
    subject: &str,
    slot: Slot,
    relaxed: bool,
    first_only: bool,
) -> Vec<Rejection> {
    let mut out = Vec::new();
    let Some(teacher) = directory.teacher_for(section, subject) else {
        out.push(Rejection::NoTeacher);
        return out;
    };
    let Some(grid) = timetable.theory(section) else {
        out.push(Rejection::UnknownSection);
        return out;
    };
    let Some(cell) = grid.get(slot) else {
        out.push(Rejection::OutOfRange);
        return out;
    };

    if timetable.has_lab_at(section, slot) && stop(&mut out, Rejection::LabInSection, first_only) {
        return out;
    }
    if let Some(existing) = cell {
        let rejection = Rejection::CellOccupied {
            subject: existing.subject.clone(),
        };
        if stop(&mut out, rejection, first_only) {
            return out;
        }
    }

    let availability = timetable.availability();
    if !availability.is_free(teacher, slot) {
        let rejection = Rejection::TeacherBusy {
            teacher: teacher.to_string(),
            slot,
        };
        if stop(&mut out, rejection, first_only) {
            return out;
        }
    }
    if availability.is_preblocked(teacher, slot) {
        let rejection = Rejection::TeacherPreblocked {
            teacher: teacher.to_string(),
            slot,
        };
        if stop(&mut out, rejection, first_only) {
            return out;
        }
    }

    if !relaxed {
        if grid.day_has_subject(slot.day, subject)
            && stop(&mut out, Rejection::RepeatedToday, first_only)
        {
            return out;
        }
        let before = slot.previous().and_then(|p| grid.subject_at(p));
        let after = grid.subject_at(slot.next());
        if (before == Some(subject) || after == Some(subject))
            && stop(&mut out, Rejection::AdjacentRepeat, first_only)
        {
            return out;
        }
    }

    out
}

/// Whether the pair (`first` in B1, `second` in B2) fits the two-period
/// block starting at `start`.
pub fn can_schedule_pair(
    timetable: &Timetable,
    section: &str,
    first: &LabSubject,
    second: &LabSubject,
    start: Slot,
    max_blocks_per_day: usize,
) -> bool {
    check_pair(
        timetable,
        section,
        first,
        second,
        start,
        max_blocks_per_day,
        true,
    )
    .is_empty()
}

/// Every reason the pair cannot take the block starting at `start`.
pub fn lab_pair_rejections(
    timetable: &Timetable,
    section: &str,
    first: &LabSubject,
    second: &LabSubject,
    start: Slot,
    max_blocks_per_day: usize,
) -> Vec<Rejection> {
    check_pair(
        timetable,
        section,
        first,
        second,
        start,
        max_blocks_per_day,
        false,
    )
}

fn check_pair(
    timetable: &Timetable,
    section: &str,
    first: &LabSubject,
    second: &LabSubject,
    start: Slot,
    max_blocks_per_day: usize,
    first_only: bool,
) -> Vec<Rejection> {
    let mut out = Vec::new();
    let Some(labs) = timetable.labs(section) else {
        out.push(Rejection::UnknownSection);
        return out;
    };
    if !timetable.dims().is_lab_block_start(start) {
        out.push(Rejection::IllegalBlockStart);
        return out;
    }
    if first.teacher == second.teacher {
        let rejection = Rejection::SameTeacherBothBatches {
            teacher: first.teacher.clone(),
        };
        if stop(&mut out, rejection, first_only) {
            return out;
        }
    }
    let blocks = labs.blocks_on(start.day);
    if blocks >= max_blocks_per_day
        && stop(&mut out, Rejection::DailyLabCap { blocks }, first_only)
    {
        return out;
    }

    let availability = timetable.availability();
    for slot in [start, start.next()] {
        for batch in Batch::ALL {
            if labs.batch(batch).is_occupied(slot)
                && stop(&mut out, Rejection::BatchOccupied { batch, slot }, first_only)
            {
                return out;
            }
        }
        for teacher in [&first.teacher, &second.teacher] {
            if !availability.is_free(teacher, slot) {
                let rejection = Rejection::TeacherBusy {
                    teacher: teacher.clone(),
                    slot,
                };
                if stop(&mut out, rejection, first_only) {
                    return out;
                }
            }
            if availability.is_preblocked(teacher, slot) {
                let rejection = Rejection::TeacherPreblocked {
                    teacher: teacher.clone(),
                    slot,
                };
                if stop(&mut out, rejection, first_only) {
                    return out;
                }
            }
        }
    }

    out
}
