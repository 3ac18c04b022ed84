//! Timetable generation and KPI evaluation.
//!
//! # Pipeline
//!
//! [`TimetableEngine::generate`] runs three phases over one shared
//! [`Timetable`](crate::models::Timetable):
//!
//! 1. [`LabScheduler`]: synchronized two-batch lab blocks, placed first
//!    since they are the most constrained.
//! 2. [`TheoryScheduler`]: randomized greedy passes over theory demand,
//!    the trailing passes relaxed.
//! 3. [`RepairPass`]: one sweep over the residue with direct placement
//!    and transactional swaps.
//!
//! Every phase consults [`feasibility`] before committing. What remains
//! unplaced is reported in [`PlacementReport`], never raised as an error.
//!
//! # KPI
//!
//! [`TimetableKpi`] computes fill rate, spacing cost, and teacher load.

mod config;
mod engine;
pub mod feasibility;
mod kpi;
mod lab;
mod repair;
mod report;
mod theory;

pub use config::{EngineConfig, ScanOrder, DEFAULT_MAX_LAB_BLOCKS_PER_DAY, DEFAULT_THEORY_PASSES};
pub use engine::{TimetableEngine, TimetableOutcome};
pub use feasibility::{can_schedule, can_schedule_pair, Rejection};
pub use kpi::TimetableKpi;
pub use lab::{LabOutcome, LabScheduler};
pub use repair::{RepairOutcome, RepairPass};
pub use report::{PlacementReport, Residue, ResidueItem, SlotRejections, UnplacedLab};
pub use theory::{TheoryOutcome, TheoryScheduler};
