//! Input validation and timetable auditing.
//!
//! [`validate_input`] checks the static configuration before any
//! scheduling and builds the [`TeacherDirectory`]. It detects:
//! - Zero grid dimensions
//! - Duplicate section keys
//! - Rostered years with no subject table
//! - The same (section, subject) claimed twice
//! - Demanded subjects with no teacher
//! - Pre-blocked slots outside the grid
//!
//! [`audit`] recomputes every timetable invariant from the grids alone.
//! A hard violation in a finished timetable is an engine bug, not a data
//! problem.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Batch, Slot, TeacherDirectory, Timetable, TimetableInput};

/// Validation result.
pub type ValidationResult<T = ()> = Result<T, Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Days or periods is zero.
    InvalidDimensions,
    /// Two roster entries produce the same section key.
    DuplicateSection,
    /// A rostered year has no subject frequency table.
    MissingSubjectTable,
    /// Two claims for the same (section, subject).
    DuplicateTeacherClaim,
    /// A demanded (section, subject) has no teacher.
    MissingTeacher,
    /// A pre-blocked slot lies outside the grid.
    SlotOutOfRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the timetable input and builds the teacher directory.
///
/// # Returns
/// The directory if all checks pass, `Err(errors)` with every detected
/// issue otherwise.
pub fn validate_input(input: &TimetableInput) -> ValidationResult<TeacherDirectory> {
    let mut errors = Vec::new();

    let dims = input.dims;
    if dims.days == 0 || dims.periods == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDimensions,
            format!(
                "Grid must have at least one day and period, got {}x{}",
                dims.days, dims.periods
            ),
        ));
    }

    // Section keys
    let mut seen_sections = BTreeSet::new();
    for (year, key) in input.sections_with_year() {
        if !seen_sections.insert(key.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSection,
                format!("Duplicate section: {key}"),
            ));
        }
        if !input.subjects.contains_key(year) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingSubjectTable,
                format!("Section '{key}' belongs to year '{year}' which has no subject table"),
            ));
        }
    }

    // Teacher claims
    let mut directory = TeacherDirectory::new();
    for (teacher, claims) in &input.teachers {
        for (section, subject) in claims {
            if let Some(existing) = directory.claim(section, subject, teacher) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateTeacherClaim,
                    format!(
                        "Duplicate teacher assignment for {section} - {subject}: '{existing}' and '{teacher}'"
                    ),
                ));
            }
        }
    }

    // Every demanded subject must resolve
    for (year, key) in input.sections_with_year() {
        let Some(table) = input.subjects.get(year) else {
            continue;
        };
        for (subject, &freq) in table {
            if freq > 0 && directory.teacher_for(&key, subject).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingTeacher,
                    format!("No teacher assigned for {key} - {subject}"),
                ));
            }
        }
    }

    for (teacher, slots) in &input.preblocked {
        for slot in slots {
            if !dims.contains(*slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutOfRange,
                    format!(
                        "Pre-blocked slot ({}, {}) for '{teacher}' is outside the {}x{} grid",
                        slot.day, slot.period, dims.days, dims.periods
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(directory)
    } else {
        Err(errors)
    }
}

/// A timetable invariant violation found by [`audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Section or teacher the violation concerns.
    pub entity_id: String,
    /// Where it happened.
    pub slot: Slot,
    /// Human-readable description.
    pub message: String,
}

/// Classification of timetable violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A teacher is referenced by two assignments in one slot.
    TeacherDoubleBooked,
    /// Teacher busy state disagrees with the grids.
    BusyStateMismatch,
    /// A section has a theory class during its own lab.
    SectionOverlap,
    /// A lab cell is not part of a well-formed two-period block.
    LabBlockShape,
    /// A section exceeds its daily lab block cap.
    LabDailyCap,
    /// A teacher is scheduled in a pre-blocked slot.
    PreblockedSlotUsed,
    /// A subject appears twice on one day (soft).
    SameDayRepeat,
    /// A subject occupies two adjacent periods (soft).
    AdjacentRepeat,
}

impl ViolationType {
    /// Whether the violation breaks a hard invariant.
    ///
    /// Spacing violations are expected after relaxed passes.
    pub fn is_hard(&self) -> bool {
        !matches!(self, ViolationType::SameDayRepeat | ViolationType::AdjacentRepeat)
    }
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        slot: Slot,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            slot,
            message: message.into(),
        }
    }
}

/// Recomputes every invariant of `timetable` from its grids.
///
/// Reports hard violations (double booking, overlap, block shape, lab
/// cap, pre-blocked use, busy-state drift) and soft spacing violations.
pub fn audit(timetable: &Timetable, max_lab_blocks_per_day: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    let dims = timetable.dims();
    let availability = timetable.availability();

    // (teacher, slot) → number of references across all grids
    let mut references: BTreeMap<(&str, Slot), usize> = BTreeMap::new();

    for section in timetable.sections() {
        let Some(grid) = timetable.theory(section) else {
            continue;
        };
        for (slot, a) in grid.assignments() {
            *references.entry((a.teacher.as_str(), slot)).or_insert(0) += 1;
            if timetable.has_lab_at(section, slot) {
                violations.push(Violation::new(
                    ViolationType::SectionOverlap,
                    section,
                    slot,
                    format!("{section} has theory '{}' during a lab", a.subject),
                ));
            }
        }
        audit_spacing(section, grid, &mut violations);
    }

    for section in timetable.lab_sections() {
        let Some(labs) = timetable.labs(section) else {
            continue;
        };
        for batch in Batch::ALL {
            let grid = labs.batch(batch);
            for (slot, a) in grid.assignments() {
                *references.entry((a.teacher.as_str(), slot)).or_insert(0) += 1;
                let partner = if slot.period % 2 == 0 {
                    Some(slot.next())
                } else {
                    slot.previous()
                };
                let well_formed = partner
                    .and_then(|p| grid.get(p))
                    .is_some_and(|cell| cell.as_ref() == Some(a));
                if !well_formed {
                    violations.push(Violation::new(
                        ViolationType::LabBlockShape,
                        section,
                        slot,
                        format!("{section}-{batch} lab '{}' is not a two-period block", a.subject),
                    ));
                }
            }
        }
        for slot in dims.slots() {
            if labs.b1.is_occupied(slot) != labs.b2.is_occupied(slot) {
                violations.push(Violation::new(
                    ViolationType::LabBlockShape,
                    section,
                    slot,
                    format!("{section} has a lab in only one batch"),
                ));
            }
        }
        for day in 0..dims.days {
            let blocks = labs.blocks_on(day);
            if blocks > max_lab_blocks_per_day {
                violations.push(Violation::new(
                    ViolationType::LabDailyCap,
                    section,
                    Slot::new(day, 0),
                    format!("{section} has {blocks} lab blocks on day {day}"),
                ));
            }
        }
    }

    for (&(teacher, slot), &count) in &references {
        if count > 1 {
            violations.push(Violation::new(
                ViolationType::TeacherDoubleBooked,
                teacher,
                slot,
                format!("{teacher} is in {count} places"),
            ));
        }
        if availability.is_free(teacher, slot) {
            violations.push(Violation::new(
                ViolationType::BusyStateMismatch,
                teacher,
                slot,
                format!("{teacher} teaches but is not marked busy"),
            ));
        }
        if availability.is_preblocked(teacher, slot) {
            violations.push(Violation::new(
                ViolationType::PreblockedSlotUsed,
                teacher,
                slot,
                format!("{teacher} scheduled in a pre-blocked slot"),
            ));
        }
    }

    for teacher in availability.teachers() {
        for slot in dims.slots() {
            if !availability.is_free(teacher, slot) && !references.contains_key(&(teacher, slot)) {
                violations.push(Violation::new(
                    ViolationType::BusyStateMismatch,
                    teacher,
                    slot,
                    format!("{teacher} marked busy with nothing scheduled"),
                ));
            }
        }
    }

    violations
}

fn audit_spacing(
    section: &str,
    grid: &crate::models::AssignmentGrid,
    violations: &mut Vec<Violation>,
) {
    let dims = grid.dims();
    for day in 0..dims.days {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for slot in dims.day_slots(day) {
            let Some(subject) = grid.subject_at(slot) else {
                continue;
            };
            if !seen.insert(subject) {
                violations.push(Violation::new(
                    ViolationType::SameDayRepeat,
                    section,
                    slot,
                    format!("{section} has '{subject}' twice on day {day}"),
                ));
            }
            if slot.previous().and_then(|p| grid.subject_at(p)) == Some(subject) {
                violations.push(Violation::new(
                    ViolationType::AdjacentRepeat,
                    section,
                    slot,
                    format!("{section} has '{subject}' in back-to-back periods"),
                ));
            }
        }
    }
}
