//! Timetabling domain models.
//!
//! Provides the coordinate space, grids and input/solution types shared
//! by every scheduler.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | Slot | (day, period) of the teaching week |
//! | Section | Class group, e.g. "3A" (year + letter) |
//! | Batch | One of two lab sub-groups of a section |
//! | Assignment | (subject, teacher) in one grid cell |
//! | Timetable | All section, batch and teacher grids |

mod assignment;
mod directory;
mod grid;
mod input;
mod slot;
mod timetable;

pub use assignment::{lab_rotation, Assignment, Batch, LabSubject};
pub use directory::TeacherDirectory;
pub use grid::{AssignmentGrid, Grid};
pub use input::TimetableInput;
pub use slot::{GridDims, Slot, DEFAULT_DAYS, DEFAULT_PERIODS};
pub use timetable::{LabGrids, SectionCell, TeacherCell, Timetable};
