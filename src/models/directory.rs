//! (section, subject) → teacher resolution.

use std::collections::BTreeMap;

/// Resolves which teacher teaches a subject to a section.
///
/// Built once from the teacher claim table by
/// [`validate_input`](crate::validation::validate_input); a pair maps to
/// exactly one teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherDirectory {
    by_pair: BTreeMap<(String, String), String>,
}

impl TeacherDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a claim. Returns the previous teacher when the pair was
    /// already claimed; the existing claim is kept in that case.
    pub fn claim(
        &mut self,
        section: impl Into<String>,
        subject: impl Into<String>,
        teacher: impl Into<String>,
    ) -> Option<&str> {
        use std::collections::btree_map::Entry;
        match self.by_pair.entry((section.into(), subject.into())) {
            Entry::Vacant(slot) => {
                slot.insert(teacher.into());
                None
            }
            Entry::Occupied(existing) => Some(existing.into_mut().as_str()),
        }
    }

    /// Teacher for `(section, subject)`, if claimed.
    pub fn teacher_for(&self, section: &str, subject: &str) -> Option<&str> {
        self.by_pair
            .get(&(section.to_string(), subject.to_string()))
            .map(String::as_str)
    }

    /// Number of claimed pairs.
    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    /// Whether no pair is claimed.
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_resolve() {
        let mut dir = TeacherDirectory::new();
        assert!(dir.claim("3A", "OS", "X").is_none());
        assert_eq!(dir.teacher_for("3A", "OS"), Some("X"));
        assert_eq!(dir.teacher_for("3B", "OS"), None);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_duplicate_claim_keeps_first() {
        let mut dir = TeacherDirectory::new();
        dir.claim("3A", "OS", "X");
        assert_eq!(dir.claim("3A", "OS", "Y"), Some("X"));
        assert_eq!(dir.teacher_for("3A", "OS"), Some("X"));
    }
}
