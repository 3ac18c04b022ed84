//! Assignment, batch and lab-subject models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject taught by a teacher, as written into one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Subject name.
    pub subject: String,
    /// Teacher name.
    pub teacher: String,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            teacher: teacher.into(),
        }
    }
}

/// One of the two lab sub-groups of a section.
///
/// Both batches of a section run labs at the same time, each with its
/// own subject and teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Batch {
    B1,
    B2,
}

impl Batch {
    /// Both batches, in order.
    pub const ALL: [Batch; 2] = [Batch::B1, Batch::B2];
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Batch::B1 => f.write_str("B1"),
            Batch::B2 => f.write_str("B2"),
        }
    }
}

/// A lab subject and the teacher who runs it for a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSubject {
    /// Lab subject name (e.g., "DSA-LAB").
    pub subject: String,
    /// Teacher name.
    pub teacher: String,
}

impl LabSubject {
    /// Creates a lab subject.
    pub fn new(subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            teacher: teacher.into(),
        }
    }

    /// The assignment this lab writes into a batch grid.
    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.subject.clone(), self.teacher.clone())
    }
}

impl<S: Into<String>, T: Into<String>> From<(S, T)> for LabSubject {
    fn from((subject, teacher): (S, T)) -> Self {
        Self::new(subject, teacher)
    }
}

/// Cyclic lab rotation: pair `i` runs `labs[i]` in B1 opposite
/// `labs[(i + 1) % n]` in B2.
///
/// Empty for fewer than two labs.
pub fn lab_rotation(labs: &[LabSubject]) -> Vec<(&LabSubject, &LabSubject)> {
    let n = labs.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n).map(|i| (&labs[i], &labs[(i + 1) % n])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_of_three() {
        let labs: Vec<LabSubject> = vec![("A", "T1").into(), ("B", "T2").into(), ("C", "T3").into()];
        let pairs: Vec<(&str, &str)> = lab_rotation(&labs)
            .into_iter()
            .map(|(a, b)| (a.subject.as_str(), b.subject.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("B", "C"), ("C", "A")]);
    }

    #[test]
    fn test_rotation_of_two_runs_both_ways() {
        let labs: Vec<LabSubject> = vec![("CN", "T1").into(), ("WEB", "T2").into()];
        let pairs = lab_rotation(&labs);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.subject, "CN");
        assert_eq!(pairs[1].0.subject, "WEB");
    }

    #[test]
    fn test_rotation_needs_two() {
        let labs: Vec<LabSubject> = vec![("CN", "T1").into()];
        assert!(lab_rotation(&labs).is_empty());
        assert!(lab_rotation(&[]).is_empty());
    }

    #[test]
    fn test_batch_display() {
        assert_eq!(Batch::B1.to_string(), "B1");
        assert_eq!(Batch::ALL, [Batch::B1, Batch::B2]);
    }
}
