//! Placement report: what the run could not place, and why.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Rejection;
use crate::models::{LabSubject, Slot};

/// Section key → subject instances still needing a slot.
pub type Residue = BTreeMap<String, Vec<String>>;

/// Removes one instance of `subject` from `list`. Returns whether one
/// was present.
pub(crate) fn remove_one(list: &mut Vec<String>, subject: &str) -> bool {
    match list.iter().position(|s| s == subject) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}

/// A lab pair the lab scheduler found no block for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedLab {
    /// Section key.
    pub section: String,
    /// Lab for batch 1.
    pub first: LabSubject,
    /// Lab for batch 2.
    pub second: LabSubject,
}

/// Rejection reasons for one candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRejections {
    /// Candidate slot.
    pub slot: Slot,
    /// Every rule the slot failed.
    pub reasons: Vec<Rejection>,
}

/// A subject still short of its weekly frequency after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueItem {
    /// Section key.
    pub section: String,
    /// Subject name.
    pub subject: String,
    /// Instances left unplaced.
    pub missing: usize,
    /// Per-slot reasons, in the spacing mode repair ran with. Filled
    /// when explanations are on.
    pub blocked: Vec<SlotRejections>,
}

/// Outcome counters and shortfall diagnostics for one run.
///
/// A non-empty residue is a capacity or data shortfall, not an engine
/// failure; the caller decides whether it is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Lab blocks committed.
    pub lab_blocks_placed: usize,
    /// Lab pairs with no feasible block.
    pub unplaced_labs: Vec<UnplacedLab>,
    /// Theory passes run (may stop before the budget).
    pub theory_passes_run: usize,
    /// How many of those ran relaxed.
    pub relaxed_passes_run: usize,
    /// Theory instances placed by the passes.
    pub theory_placed: usize,
    /// Residue instances placed directly by the repair pass.
    pub repaired_direct: usize,
    /// Residue instances placed by a repair swap.
    pub repaired_by_swap: usize,
    /// Unplaced theory instances per section.
    pub residue: Residue,
    /// One entry per (section, subject) left in the residue.
    pub diagnostics: Vec<ResidueItem>,
}

impl PlacementReport {
    /// Whether every lab pair and theory instance was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced_labs.is_empty() && self.residue_count() == 0
    }

    /// Total unplaced theory instances.
    pub fn residue_count(&self) -> usize {
        self.residue.values().map(Vec::len).sum()
    }

    /// Unplaced instances of `subject` in `section`.
    pub fn residue_for(&self, section: &str, subject: &str) -> usize {
        self.residue
            .get(section)
            .map_or(0, |list| list.iter().filter(|s| *s == subject).count())
    }

    /// Theory instances placed overall, repair included.
    pub fn total_theory_placed(&self) -> usize {
        self.theory_placed + self.repaired_direct + self.repaired_by_swap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_one() {
        let mut list = vec!["OS".to_string(), "DSA".to_string(), "OS".to_string()];
        assert!(remove_one(&mut list, "OS"));
        assert_eq!(list, vec!["DSA", "OS"]);
        assert!(!remove_one(&mut list, "MATHS"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_report_counts() {
        let mut report = PlacementReport::default();
        assert!(report.is_complete());

        report
            .residue
            .insert("3A".into(), vec!["OS".into(), "OS".into()]);
        report.residue.insert("3B".into(), vec![]);
        assert_eq!(report.residue_count(), 2);
        assert_eq!(report.residue_for("3A", "OS"), 2);
        assert_eq!(report.residue_for("3B", "OS"), 0);
        assert!(!report.is_complete());

        report.theory_placed = 5;
        report.repaired_direct = 1;
        report.repaired_by_swap = 1;
        assert_eq!(report.total_theory_placed(), 7);
    }
}
