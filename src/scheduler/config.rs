//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default theory pass budget.
pub const DEFAULT_THEORY_PASSES: usize = 10;
/// Default per-section daily lab block cap.
pub const DEFAULT_MAX_LAB_BLOCKS_PER_DAY: usize = 2;

/// Order in which the theory scheduler scans candidate slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOrder {
    /// Every slot, freshly shuffled for each subject instance.
    #[default]
    Shuffled,
    /// Day-major order.
    Sequential,
    /// Prefer slots that leave the teacher free on both sides, scanning
    /// from a random starting day and period.
    TeacherGaps,
}

/// Tunables for one engine run.
///
/// # Example
///
/// ```
/// use u_timetable::scheduler::{EngineConfig, ScanOrder};
///
/// let config = EngineConfig::default()
///     .with_theory_passes(6)
///     .with_relaxed_passes(0)
///     .with_scan_order(ScanOrder::Sequential);
/// assert_eq!(config.relaxed_pass_count(), 0);
/// assert!(!config.relaxation_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of theory passes.
    pub theory_passes: usize,
    /// Number of trailing passes run in relaxed mode. `None` relaxes every
    /// pass after the midpoint.
    pub relaxed_passes: Option<usize>,
    /// Slot scan order for theory placement.
    pub scan_order: ScanOrder,
    /// Lab blocks a section may hold per day.
    pub max_lab_blocks_per_day: usize,
    /// Whether the repair pass runs after the theory passes.
    pub repair: bool,
    /// Attach per-slot rejection reasons to every residue item.
    pub explain_residue: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            theory_passes: DEFAULT_THEORY_PASSES,
            relaxed_passes: None,
            scan_order: ScanOrder::Shuffled,
            max_lab_blocks_per_day: DEFAULT_MAX_LAB_BLOCKS_PER_DAY,
            repair: true,
            explain_residue: false,
        }
    }
}

impl EngineConfig {
    /// Sets the theory pass budget.
    pub fn with_theory_passes(mut self, passes: usize) -> Self {
        self.theory_passes = passes;
        self
    }

    /// Sets the number of trailing relaxed passes.
    pub fn with_relaxed_passes(mut self, passes: usize) -> Self {
        self.relaxed_passes = Some(passes);
        self
    }

    /// Sets the slot scan order.
    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.scan_order = order;
        self
    }

    /// Sets the daily lab block cap.
    pub fn with_max_lab_blocks_per_day(mut self, cap: usize) -> Self {
        self.max_lab_blocks_per_day = cap;
        self
    }

    /// Enables or disables the repair pass.
    pub fn with_repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    /// Enables residue explanations.
    pub fn with_explain_residue(mut self, explain: bool) -> Self {
        self.explain_residue = explain;
        self
    }

    /// Number of relaxed passes actually run at the end of the budget.
    pub fn relaxed_pass_count(&self) -> usize {
        match self.relaxed_passes {
            Some(n) => n.min(self.theory_passes),
            None => self.theory_passes - self.theory_passes / 2,
        }
    }

    /// Whether 1-based `pass` runs relaxed.
    pub fn is_relaxed_pass(&self, pass: usize) -> bool {
        pass > self.theory_passes - self.relaxed_pass_count()
    }

    /// Whether any spacing relaxation is allowed. The repair pass only
    /// relaxes spacing when this holds.
    pub fn relaxation_enabled(&self) -> bool {
        self.relaxed_pass_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relaxes_back_half() {
        let config = EngineConfig::default();
        assert_eq!(config.relaxed_pass_count(), 5);
        assert!(!config.is_relaxed_pass(5));
        assert!(config.is_relaxed_pass(6));
        assert!(config.is_relaxed_pass(10));
    }

    #[test]
    fn test_odd_budget_midpoint() {
        // 5 passes: midpoint 2, passes 3..=5 relaxed
        let config = EngineConfig::default().with_theory_passes(5);
        assert!(!config.is_relaxed_pass(2));
        assert!(config.is_relaxed_pass(3));
    }

    #[test]
    fn test_explicit_relaxed_passes_clamped() {
        let config = EngineConfig::default()
            .with_theory_passes(4)
            .with_relaxed_passes(9);
        assert_eq!(config.relaxed_pass_count(), 4);
        assert!(config.is_relaxed_pass(1));
    }

    #[test]
    fn test_zero_relaxed_passes() {
        let config = EngineConfig::default().with_relaxed_passes(0);
        assert!((1..=10).all(|p| !config.is_relaxed_pass(p)));
        assert!(!config.relaxation_enabled());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"theory_passes": 4, "scan_order": "TeacherGaps"}"#).unwrap();
        assert_eq!(config.theory_passes, 4);
        assert_eq!(config.scan_order, ScanOrder::TeacherGaps);
        assert!(config.repair);
        assert_eq!(config.max_lab_blocks_per_day, 2);
    }
}
