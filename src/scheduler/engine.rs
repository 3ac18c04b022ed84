//! Timetable engine: labs, then theory passes, then repair.
//!
//! # Example
//!
//! ```
//! use u_timetable::models::TimetableInput;
//! use u_timetable::scheduler::{EngineConfig, TimetableEngine};
//!
//! let input = TimetableInput::new()
//!     .with_year("3", ["A"])
//!     .with_subject("3", "OS", 3)
//!     .with_subject("3", "DSA", 2)
//!     .with_teacher("T1", [("3A", "OS")])
//!     .with_teacher("T2", [("3A", "DSA")])
//!     .with_labs("3A", [("OS-LAB", "T1"), ("DSA-LAB", "T2")]);
//!
//! let engine = TimetableEngine::new(input, EngineConfig::default()).unwrap();
//! let outcome = engine.generate_with_seed(42);
//!
//! assert!(outcome.report.is_complete());
//! assert_eq!(outcome.timetable.theory_count("3A", "OS"), 3);
//! ```

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::EngineConfig;
use super::feasibility::{theory_rejections, Rejection};
use super::lab::LabScheduler;
use super::repair::RepairPass;
use super::report::{PlacementReport, Residue, ResidueItem, SlotRejections};
use super::theory::TheoryScheduler;
use crate::availability::TeacherAvailability;
use crate::error::TimetableResult;
use crate::models::{Slot, TeacherDirectory, Timetable, TimetableInput};
use crate::validation::{audit, validate_input, Violation};

/// A finished run: the timetable and what could not be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableOutcome {
    /// Committed theory and lab grids with the teacher tracker.
    pub timetable: Timetable,
    /// Counters and residue.
    pub report: PlacementReport,
}

impl TimetableOutcome {
    /// Recomputes every invariant from the grids.
    pub fn violations(&self, max_lab_blocks_per_day: usize) -> Vec<Violation> {
        audit(&self.timetable, max_lab_blocks_per_day)
    }
}

/// Validated input plus configuration, ready to generate timetables.
#[derive(Debug, Clone)]
pub struct TimetableEngine {
    input: TimetableInput,
    directory: TeacherDirectory,
    config: EngineConfig,
}

impl TimetableEngine {
    /// Validates `input` and resolves teacher claims.
    ///
    /// # Errors
    /// [`TimetableError::InvalidConfig`](crate::error::TimetableError::InvalidConfig)
    /// listing every problem found.
    pub fn new(input: TimetableInput, config: EngineConfig) -> TimetableResult<Self> {
        let directory = validate_input(&input)?;
        Ok(Self {
            input,
            directory,
            config,
        })
    }

    /// The validated input.
    pub fn input(&self) -> &TimetableInput {
        &self.input
    }

    /// Resolved (section, subject) → teacher claims.
    pub fn directory(&self) -> &TeacherDirectory {
        &self.directory
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one generation with a seeded [`SmallRng`].
    pub fn generate_with_seed(&self, seed: u64) -> TimetableOutcome {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Runs one generation drawing randomness from `rng`.
    ///
    /// Never fails: anything left unplaced is reported in
    /// [`PlacementReport`].
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TimetableOutcome {
        let config = &self.config;
        let availability =
            TeacherAvailability::new(self.input.dims).with_preblocked(&self.input.preblocked);
        let mut timetable = Timetable::new(
            availability,
            self.input.section_keys(),
            self.input.labs.keys().cloned(),
        );
        let mut report = PlacementReport::default();

        let labs = LabScheduler::new()
            .with_max_blocks_per_day(config.max_lab_blocks_per_day)
            .schedule(&mut timetable, &self.input.labs, rng);
        info!(
            placed = labs.placed,
            unplaced = labs.unplaced.len(),
            "lab phase complete"
        );
        report.lab_blocks_placed = labs.placed;
        report.unplaced_labs = labs.unplaced;

        let mut residue = self.initial_demand();
        let demand_total: usize = residue.values().map(Vec::len).sum();
        let theory = TheoryScheduler::from_config(config).schedule(
            &mut timetable,
            &self.directory,
            &mut residue,
            rng,
        );
        info!(
            demand = demand_total,
            placed = theory.placed,
            passes = theory.passes_run,
            relaxed_passes = theory.relaxed_passes_run,
            "theory phase complete"
        );
        report.theory_passes_run = theory.passes_run;
        report.relaxed_passes_run = theory.relaxed_passes_run;
        report.theory_placed = theory.placed;

        if config.repair && residue.values().any(|list| !list.is_empty()) {
            let repair = RepairPass::new(config.relaxation_enabled()).run(
                &mut timetable,
                &self.directory,
                &mut residue,
            );
            info!(
                direct = repair.direct,
                swapped = repair.swapped,
                "repair phase complete"
            );
            report.repaired_direct = repair.direct;
            report.repaired_by_swap = repair.swapped;
        }

        residue.retain(|_, list| !list.is_empty());
        report.diagnostics = self.diagnose(&timetable, &residue);
        report.residue = residue;

        debug_assert!(
            audit(&timetable, config.max_lab_blocks_per_day)
                .iter()
                .all(|v| !v.violation_type.is_hard()),
            "hard invariant broken after generation"
        );

        TimetableOutcome { timetable, report }
    }

    /// Every reason `subject` cannot go to `section` at `slot` in
    /// `timetable`. Empty when the placement is feasible.
    pub fn explain_theory(
        &self,
        timetable: &Timetable,
        section: &str,
        subject: &str,
        slot: Slot,
        relaxed: bool,
    ) -> Vec<Rejection> {
        theory_rejections(timetable, &self.directory, section, subject, slot, relaxed)
    }

    /// Per-section theory demand, each subject repeated by its frequency.
    fn initial_demand(&self) -> Residue {
        self.input
            .sections_with_year()
            .into_iter()
            .map(|(year, key)| (key, self.input.demand_for_year(year)))
            .collect()
    }

    fn diagnose(&self, timetable: &Timetable, residue: &Residue) -> Vec<ResidueItem> {
        // Explain in the mode the last placement attempt used
        let relaxed = self.config.relaxation_enabled();
        let mut items = Vec::new();
        for (section, subjects) in residue {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for subject in subjects {
                *counts.entry(subject.as_str()).or_default() += 1;
            }
            for (subject, missing) in counts {
                warn!(section = %section, subject, missing, "subject left unplaced");
                let blocked = if self.config.explain_residue {
                    timetable
                        .dims()
                        .slots()
                        .map(|slot| SlotRejections {
                            slot,
                            reasons: self.explain_theory(timetable, section, subject, slot, relaxed),
                        })
                        .filter(|r| !r.reasons.is_empty())
                        .collect()
                } else {
                    Vec::new()
                };
                items.push(ResidueItem {
                    section: section.clone(),
                    subject: subject.to_string(),
                    missing,
                    blocked,
                });
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimetableError;
    use crate::models::{Batch, GridDims};
    use crate::scheduler::ScanOrder;
    use crate::validation::{ValidationErrorKind, ViolationType};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("u_timetable=debug")
            .with_test_writer()
            .try_init();
    }

    fn department() -> TimetableInput {
        TimetableInput::new()
            .with_year("2", ["A", "B"])
            .with_year("3", ["A"])
            .with_subject("2", "MATHS", 4)
            .with_subject("2", "PHYSICS", 3)
            .with_subject("2", "CHEM", 2)
            .with_subject("3", "OS", 3)
            .with_subject("3", "DSA", 3)
            .with_subject("3", "DBMS", 2)
            .with_teacher("T_MATHS", [("2A", "MATHS"), ("2B", "MATHS")])
            .with_teacher("T_PHY", [("2A", "PHYSICS"), ("2B", "PHYSICS")])
            .with_teacher("T_CHEM", [("2A", "CHEM"), ("2B", "CHEM")])
            .with_teacher("T_OS", [("3A", "OS")])
            .with_teacher("T_DSA", [("3A", "DSA")])
            .with_teacher("T_DBMS", [("3A", "DBMS")])
            .with_labs(
                "3A",
                [("OS-LAB", "T_OS"), ("DSA-LAB", "T_DSA"), ("DBMS-LAB", "T_DBMS")],
            )
            .with_labs("2A", [("PHY-LAB", "T_PHY"), ("CHEM-LAB", "T_CHEM")])
            .with_preblocked("T_MATHS", [Slot::new(0, 0), Slot::new(4, 5)])
    }

    fn engine(config: EngineConfig) -> TimetableEngine {
        TimetableEngine::new(department(), config).unwrap()
    }

    #[test]
    fn test_department_run_is_clean() {
        init_tracing();
        let outcome = engine(EngineConfig::default()).generate_with_seed(42);
        let hard: Vec<_> = outcome
            .violations(2)
            .into_iter()
            .filter(|v| v.violation_type.is_hard())
            .collect();
        assert!(hard.is_empty(), "{hard:?}");
    }

    #[test]
    fn test_demand_conservation() {
        let engine = engine(EngineConfig::default());
        for seed in 0..8 {
            let outcome = engine.generate_with_seed(seed);
            for (year, section) in engine.input().sections_with_year() {
                for (subject, &freq) in &engine.input().subjects[year] {
                    let placed = outcome.timetable.theory_count(&section, subject);
                    let left = outcome.report.residue_for(&section, subject);
                    assert_eq!(placed + left, freq as usize, "{section}/{subject} seed {seed}");
                }
            }
            assert_eq!(
                outcome.report.total_theory_placed() + outcome.report.residue_count(),
                engine.input().total_theory_demand()
            );
        }
    }

    #[test]
    fn test_lab_block_shape() {
        let outcome = engine(EngineConfig::default()).generate_with_seed(3);
        let grids = outcome.timetable.labs("3A").unwrap();
        assert_eq!(outcome.report.lab_blocks_placed, 5);
        assert_eq!(grids.block_count(), 3);
        for batch in Batch::ALL {
            for (slot, a) in grids.batch(batch).assignments() {
                let partner = if slot.period % 2 == 0 {
                    slot.next()
                } else {
                    Slot::new(slot.day, slot.period - 1)
                };
                assert_eq!(grids.batch(batch)[partner].as_ref(), Some(a));
            }
        }
        assert!((0..5).all(|d| grids.blocks_on(d) <= 2));
    }

    #[test]
    fn test_same_seed_same_timetable() {
        let engine = engine(EngineConfig::default().with_scan_order(ScanOrder::TeacherGaps));
        assert_eq!(engine.generate_with_seed(99), engine.generate_with_seed(99));
    }

    #[test]
    fn test_no_same_day_repeat_without_relaxation() {
        let engine = engine(EngineConfig::default().with_relaxed_passes(0));
        for seed in 0..5 {
            let outcome = engine.generate_with_seed(seed);
            let spacing: Vec<_> = outcome
                .violations(2)
                .into_iter()
                .filter(|v| {
                    matches!(
                        v.violation_type,
                        ViolationType::SameDayRepeat | ViolationType::AdjacentRepeat
                    )
                })
                .collect();
            assert!(spacing.is_empty(), "seed {seed}: {spacing:?}");
        }
    }

    #[test]
    fn test_shared_teacher_single_day() {
        init_tracing();
        // Two sections want 3 classes each from one teacher with 3 periods
        let input = TimetableInput::new()
            .with_dims(GridDims::new(1, 3))
            .with_year("1", ["A", "B"])
            .with_subject("1", "MATHS", 3)
            .with_teacher("T1", [("1A", "MATHS"), ("1B", "MATHS")]);
        let engine = TimetableEngine::new(input, EngineConfig::default()).unwrap();

        for seed in 0..5 {
            let outcome = engine.generate_with_seed(seed);
            let placed = outcome.timetable.theory_count("1A", "MATHS")
                + outcome.timetable.theory_count("1B", "MATHS");
            assert_eq!(placed, 3);
            assert_eq!(outcome.report.residue_count(), 3);
            assert_eq!(outcome.timetable.availability().busy_count("T1"), 3);
        }
    }

    #[test]
    fn test_lab_rotation_of_three() {
        let input = TimetableInput::new()
            .with_year("3", ["A"])
            .with_subject("3", "OS", 2)
            .with_teacher("T1", [("3A", "OS")])
            .with_labs("3A", [("L1", "T1"), ("L2", "T2"), ("L3", "T3")]);
        let engine = TimetableEngine::new(input, EngineConfig::default()).unwrap();
        let outcome = engine.generate_with_seed(1);

        let grids = outcome.timetable.labs("3A").unwrap();
        assert_eq!(grids.block_count(), 3);
        assert!((0..5).all(|d| grids.blocks_on(d) <= 2));
        assert!(outcome.report.is_complete());
    }

    #[test]
    fn test_duplicate_claim_rejected() {
        let input = department().with_teacher("T_OTHER", [("3A", "OS")]);
        let err = TimetableEngine::new(input, EngineConfig::default()).unwrap_err();
        match err {
            TimetableError::InvalidConfig(errors) => {
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::DuplicateTeacherClaim));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explained_residue() {
        let input = TimetableInput::new()
            .with_dims(GridDims::new(1, 2))
            .with_year("1", ["A"])
            .with_subject("1", "MATHS", 3)
            .with_teacher("T1", [("1A", "MATHS")]);
        let engine =
            TimetableEngine::new(input, EngineConfig::default().with_explain_residue(true))
                .unwrap();
        let outcome = engine.generate_with_seed(0);

        assert_eq!(outcome.report.residue_count(), 1);
        let item = &outcome.report.diagnostics[0];
        assert_eq!(item.section, "1A");
        assert_eq!(item.missing, 1);
        assert_eq!(item.blocked.len(), 2);
        assert!(item
            .blocked
            .iter()
            .all(|b| b.reasons.iter().any(|r| matches!(r, Rejection::CellOccupied { .. }))));
    }

    #[test]
    fn test_report_conserves_demand_after_repair() {
        // Strict pass 1 places one, pass 2 stalls, relaxed repair fills the rest
        let input = TimetableInput::new()
            .with_dims(GridDims::new(1, 3))
            .with_year("1", ["A"])
            .with_subject("1", "MATHS", 3)
            .with_teacher("T1", [("1A", "MATHS")]);
        let demand = input.total_theory_demand();
        let engine = TimetableEngine::new(input, EngineConfig::default()).unwrap();

        for seed in 0..4 {
            let report = engine.generate_with_seed(seed).report;
            assert_eq!(report.theory_placed, 1);
            assert_eq!(report.repaired_direct, 2);
            assert_eq!(report.residue_count(), 0);
            assert_eq!(report.total_theory_placed() + report.residue_count(), demand);
        }
    }

    #[test]
    fn test_strict_run_explains_spacing() {
        let input = TimetableInput::new()
            .with_dims(GridDims::new(1, 2))
            .with_year("1", ["A"])
            .with_subject("1", "MATHS", 2)
            .with_teacher("T1", [("1A", "MATHS")]);
        let config = EngineConfig::default()
            .with_relaxed_passes(0)
            .with_explain_residue(true);
        let outcome = TimetableEngine::new(input, config)
            .unwrap()
            .generate_with_seed(0);

        assert_eq!(outcome.report.residue_count(), 1);
        let item = &outcome.report.diagnostics[0];
        let free = outcome
            .timetable
            .dims()
            .slots()
            .find(|&s| !outcome.timetable.theory("1A").unwrap().is_occupied(s))
            .unwrap();
        let reasons = &item.blocked.iter().find(|b| b.slot == free).unwrap().reasons;
        assert!(reasons.contains(&Rejection::RepeatedToday), "{reasons:?}");
    }

    #[test]
    fn test_repair_disabled_leaves_residue() {
        let input = TimetableInput::new()
            .with_dims(GridDims::new(1, 3))
            .with_year("1", ["A"])
            .with_subject("1", "MATHS", 2)
            .with_teacher("T1", [("1A", "MATHS")]);
        let config = EngineConfig::default().with_repair(false);
        let outcome = TimetableEngine::new(input, config)
            .unwrap()
            .generate_with_seed(0);
        // Pass 1 places one, pass 2 (strict) places none and ends the loop
        assert_eq!(outcome.report.theory_placed, 1);
        assert_eq!(outcome.report.residue_for("1A", "MATHS"), 1);
        assert!(outcome.report.diagnostics[0].blocked.is_empty());
    }

    #[test]
    fn test_outcome_serializes() {
        let outcome = engine(EngineConfig::default()).generate_with_seed(5);
        let json = serde_json::to_string(&outcome).unwrap();
        let back: TimetableOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report, outcome.report);
    }
}
