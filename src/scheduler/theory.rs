//! Multi-pass theory scheduler.
//!
//! # Algorithm
//!
//! Each pass visits sections in shuffled order, and within a section the
//! remaining subject instances in shuffled order. An instance takes the
//! first slot (per [`ScanOrder`]) passing [`can_schedule`]. Passes stop
//! early once demand is empty or a pass places nothing. The trailing
//! passes run relaxed, which drops the same-day and adjacency rules but
//! never a hard constraint.
//!
//! # Complexity
//! O(k * n * s) per run where k=passes, n=instances, s=slots.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::config::{EngineConfig, ScanOrder, DEFAULT_THEORY_PASSES};
use super::feasibility::can_schedule;
use super::report::{remove_one, Residue};
use crate::models::{Assignment, Slot, TeacherDirectory, Timetable};

/// Counters from one theory phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TheoryOutcome {
    /// Passes actually run.
    pub passes_run: usize,
    /// Of those, how many were relaxed.
    pub relaxed_passes_run: usize,
    /// Instances placed.
    pub placed: usize,
}

/// Places theory demand into the slots the labs left free.
#[derive(Debug, Clone)]
pub struct TheoryScheduler {
    config: EngineConfig,
}

impl TheoryScheduler {
    /// Creates a scheduler with `passes` passes, the back half relaxed.
    pub fn new(passes: usize) -> Self {
        Self {
            config: EngineConfig::default().with_theory_passes(passes),
        }
    }

    /// Takes pass budget, relaxation, and scan order from `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Sets the number of trailing relaxed passes.
    pub fn with_relaxed_passes(mut self, passes: usize) -> Self {
        self.config.relaxed_passes = Some(passes);
        self
    }

    /// Sets the slot scan order.
    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.config.scan_order = order;
        self
    }

    /// Runs the passes, removing each placed instance from `demand`.
    ///
    /// Whatever is left in `demand` afterwards is the residue.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        timetable: &mut Timetable,
        directory: &TeacherDirectory,
        demand: &mut Residue,
        rng: &mut R,
    ) -> TheoryOutcome {
        let mut outcome = TheoryOutcome::default();

        for pass in 1..=self.config.theory_passes {
            if demand.values().all(Vec::is_empty) {
                break;
            }
            let relaxed = self.config.is_relaxed_pass(pass);
            let mut placed_this_pass = 0;

            let mut sections: Vec<String> = demand.keys().cloned().collect();
            sections.shuffle(rng);

            for section in &sections {
                let Some(remaining) = demand.get_mut(section) else {
                    continue;
                };
                remaining.shuffle(rng);
                let snapshot = remaining.clone();

                for subject in &snapshot {
                    let Some(slot) =
                        self.find_slot(timetable, directory, section, subject, relaxed, rng)
                    else {
                        continue;
                    };
                    if commit_theory(timetable, directory, section, subject, slot) {
                        remove_one(remaining, subject);
                        placed_this_pass += 1;
                    }
                }
            }

            outcome.passes_run = pass;
            if relaxed {
                outcome.relaxed_passes_run += 1;
            }
            outcome.placed += placed_this_pass;
            debug!(pass, relaxed, placed = placed_this_pass, "theory pass complete");

            if placed_this_pass == 0 {
                break;
            }
        }

        outcome
    }

    fn find_slot<R: Rng + ?Sized>(
        &self,
        timetable: &Timetable,
        directory: &TeacherDirectory,
        section: &str,
        subject: &str,
        relaxed: bool,
        rng: &mut R,
    ) -> Option<Slot> {
        let dims = timetable.dims();
        let feasible =
            |slot: Slot| can_schedule(timetable, directory, section, subject, slot, relaxed);

        match self.config.scan_order {
            ScanOrder::Sequential => dims.slots().find(|&s| feasible(s)),
            ScanOrder::Shuffled => {
                let mut slots: Vec<Slot> = dims.slots().collect();
                slots.shuffle(rng);
                slots.into_iter().find(|&s| feasible(s))
            }
            ScanOrder::TeacherGaps => {
                let teacher = directory.teacher_for(section, subject)?;
                if dims.days == 0 || dims.periods == 0 {
                    return None;
                }
                let start_day = rng.random_range(0..dims.days);
                let start_period = rng.random_range(0..dims.periods);

                let mut best: Option<(u8, Slot)> = None;
                for di in 0..dims.days {
                    for pi in 0..dims.periods {
                        let slot = Slot::new(
                            (start_day + di) % dims.days,
                            (start_period + pi) % dims.periods,
                        );
                        if !feasible(slot) {
                            continue;
                        }
                        let score = timetable.availability().gap_score(teacher, slot);
                        match best {
                            Some((b, _)) if b >= score => {}
                            _ => best = Some((score, slot)),
                        }
                        if score == 2 {
                            return Some(slot);
                        }
                    }
                }
                best.map(|(_, slot)| slot)
            }
        }
    }
}

impl Default for TheoryScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_THEORY_PASSES)
    }
}

/// Commits `subject` for `section` at `slot` with its claimed teacher.
/// Returns `false` when no teacher is claimed.
pub(crate) fn commit_theory(
    timetable: &mut Timetable,
    directory: &TeacherDirectory,
    section: &str,
    subject: &str,
    slot: Slot,
) -> bool {
    match directory.teacher_for(section, subject) {
        Some(teacher) => {
            timetable.place_theory(section, slot, Assignment::new(subject, teacher));
            true
        }
        None => false,
    }
}
