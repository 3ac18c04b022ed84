//! Lab pair scheduler.
//!
//! # Algorithm
//!
//! 1. For each section with at least two labs, build the cyclic rotation
//!    (`labs[i]` in B1 opposite `labs[(i + 1) % n]` in B2).
//! 2. Enumerate every legal two-period block start and shuffle once per
//!    section.
//! 3. For each pair, commit the first start in shuffled order that passes
//!    [`can_schedule_pair`] (both batches free, both teachers free and not
//!    pre-blocked, daily cap not reached).
//!
//! Greedy, no backtracking. A pair with no feasible start is reported,
//! never fatal.
//!
//! # Complexity
//! O(s * n * b) where s=sections, n=labs/section, b=block starts.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::config::DEFAULT_MAX_LAB_BLOCKS_PER_DAY;
use super::feasibility::can_schedule_pair;
use super::report::UnplacedLab;
use crate::models::{lab_rotation, LabSubject, Timetable};

/// Result of the lab phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabOutcome {
    /// Blocks committed.
    pub placed: usize,
    /// Pairs left without a block.
    pub unplaced: Vec<UnplacedLab>,
}

/// Greedy scheduler for synchronized two-batch lab blocks.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_timetable::availability::TeacherAvailability;
/// use u_timetable::models::{GridDims, LabSubject, Timetable};
/// use u_timetable::scheduler::LabScheduler;
///
/// let mut labs = BTreeMap::new();
/// labs.insert(
///     "3A".to_string(),
///     vec![LabSubject::new("DSA-LAB", "T1"), LabSubject::new("OS-LAB", "T2")],
/// );
/// let availability = TeacherAvailability::new(GridDims::default());
/// let mut timetable = Timetable::new(availability, ["3A"], labs.keys().cloned());
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let outcome = LabScheduler::new().schedule(&mut timetable, &labs, &mut rng);
/// assert_eq!(outcome.placed, 2);
/// assert!(outcome.unplaced.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LabScheduler {
    max_blocks_per_day: usize,
}

impl LabScheduler {
    /// Creates a scheduler with the default daily cap.
    pub fn new() -> Self {
        Self {
            max_blocks_per_day: DEFAULT_MAX_LAB_BLOCKS_PER_DAY,
        }
    }

    /// Sets the per-section daily block cap.
    pub fn with_max_blocks_per_day(mut self, cap: usize) -> Self {
        self.max_blocks_per_day = cap;
        self
    }

    /// Places every lab rotation into `timetable`.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        timetable: &mut Timetable,
        labs: &BTreeMap<String, Vec<LabSubject>>,
        rng: &mut R,
    ) -> LabOutcome {
        let mut outcome = LabOutcome::default();

        for (section, rotation) in labs {
            if rotation.len() < 2 {
                debug!(section = %section, labs = rotation.len(), "fewer than two labs, skipping");
                continue;
            }

            let mut starts = timetable.dims().lab_block_starts();
            starts.shuffle(rng);

            for (first, second) in lab_rotation(rotation) {
                let chosen = starts.iter().copied().find(|&start| {
                    can_schedule_pair(
                        timetable,
                        section,
                        first,
                        second,
                        start,
                        self.max_blocks_per_day,
                    )
                });

                match chosen {
                    Some(start) => {
                        timetable.place_lab_pair(section, start, first, second);
                        outcome.placed += 1;
                        debug!(
                            section = %section,
                            b1 = %first.subject,
                            b2 = %second.subject,
                            day = start.day,
                            period = start.period,
                            "lab pair placed"
                        );
                    }
                    None => {
                        warn!(
                            section = %section,
                            b1 = %first.subject,
                            b2 = %second.subject,
                            "could not place lab pair"
                        );
                        outcome.unplaced.push(UnplacedLab {
                            section: section.clone(),
                            first: first.clone(),
                            second: second.clone(),
                        });
                    }
                }
            }
        }

        outcome
    }
}

impl Default for LabScheduler {
    fn default() -> Self {
        Self::new()
    }
}
