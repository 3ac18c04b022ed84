//! Timetable quality metrics (KPIs).
//!
//! Computes placement and spacing indicators from a finished timetable
//! and its placement report.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill Rate | Theory instances placed / demanded |
//! | Lab Blocks | Two-period blocks committed across sections |
//! | Same-Day Repeats | Extra instances of a subject on one section-day |
//! | Adjacent Repeats | Back-to-back periods of one subject in a section |
//! | Busy Periods | Committed periods per teacher |
//! | Avg Idle Gaps | Mean free periods between a teacher's first and last class of a day, summed over the week |
//!
//! The repeat counts are the spacing cost paid by relaxed passes and
//! relaxed repair.

use std::collections::BTreeMap;

use super::report::PlacementReport;
use crate::models::Timetable;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Theory instances demanded.
    pub theory_demand: usize,
    /// Theory instances present in the grids.
    pub theory_placed: usize,
    /// `theory_placed / theory_demand` (1.0 for zero demand).
    pub fill_rate: f64,
    /// Lab blocks committed.
    pub lab_blocks: usize,
    /// Lab pairs left unplaced.
    pub unplaced_labs: usize,
    /// Same-day repeats across all section-days.
    pub same_day_repeats: usize,
    /// Adjacent same-subject period pairs.
    pub adjacent_repeats: usize,
    /// Committed periods per teacher.
    pub busy_periods_by_teacher: BTreeMap<String, usize>,
    /// Weekly idle gaps averaged over teachers with at least one class.
    pub avg_teacher_idle_gaps: f64,
}

impl TimetableKpi {
    /// Computes KPIs for a finished run.
    ///
    /// # Arguments
    /// * `timetable` - The committed grids.
    /// * `report` - The run's placement report.
    /// * `demand_total` - Declared theory instances across all sections.
    pub fn calculate(timetable: &Timetable, report: &PlacementReport, demand_total: usize) -> Self {
        let dims = timetable.dims();
        let mut theory_placed = 0;
        let mut same_day_repeats = 0;
        let mut adjacent_repeats = 0;

        for section in timetable.sections() {
            let Some(grid) = timetable.theory(section) else {
                continue;
            };
            theory_placed += grid.occupied_count();

            for day in 0..dims.days {
                let cells = grid.day(day);
                let mut per_subject: BTreeMap<&str, usize> = BTreeMap::new();
                for a in cells.iter().flatten() {
                    *per_subject.entry(a.subject.as_str()).or_default() += 1;
                }
                same_day_repeats += per_subject.values().map(|&n| n - 1).sum::<usize>();

                adjacent_repeats += cells
                    .windows(2)
                    .filter(|w| match (&w[0], &w[1]) {
                        (Some(a), Some(b)) => a.subject == b.subject,
                        _ => false,
                    })
                    .count();
            }
        }

        let lab_blocks = timetable
            .lab_sections()
            .filter_map(|s| timetable.labs(s))
            .map(|l| l.block_count())
            .sum();

        let availability = timetable.availability();
        let busy_periods_by_teacher: BTreeMap<String, usize> = availability
            .teachers()
            .map(|t| (t.to_string(), availability.busy_count(t)))
            .collect();

        let mut total_gaps = 0usize;
        let mut active_teachers = 0usize;
        for (teacher, &busy) in &busy_periods_by_teacher {
            if busy == 0 {
                continue;
            }
            let Some(grid) = availability.busy_grid(teacher) else {
                continue;
            };
            active_teachers += 1;
            for day in 0..dims.days {
                total_gaps += idle_gaps(grid.day(day));
            }
        }
        let avg_teacher_idle_gaps = if active_teachers == 0 {
            0.0
        } else {
            total_gaps as f64 / active_teachers as f64
        };

        let fill_rate = if demand_total == 0 {
            1.0
        } else {
            theory_placed as f64 / demand_total as f64
        };

        Self {
            theory_demand: demand_total,
            theory_placed,
            fill_rate,
            lab_blocks,
            unplaced_labs: report.unplaced_labs.len(),
            same_day_repeats,
            adjacent_repeats,
            busy_periods_by_teacher,
            avg_teacher_idle_gaps,
        }
    }

    /// Spacing violations of either kind.
    pub fn spacing_violations(&self) -> usize {
        self.same_day_repeats + self.adjacent_repeats
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_spacing_violations: usize) -> bool {
        self.fill_rate >= min_fill_rate
            && self.unplaced_labs == 0
            && self.spacing_violations() <= max_spacing_violations
    }
}

/// Free periods strictly between the first and last busy period.
fn idle_gaps(day: &[bool]) -> usize {
    let first = day.iter().position(|&b| b);
    let last = day.iter().rposition(|&b| b);
    match (first, last) {
        (Some(f), Some(l)) => day[f..=l].iter().filter(|&&b| !b).count(),
        _ => 0,
    }
}
