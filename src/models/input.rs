//! Timetable input model.
//!
//! Everything the engine consumes at construction time: the section
//! roster, weekly subject frequencies, teacher claims, lab rotations and
//! pre-blocked teacher slots. Immutable for the duration of a run.
//!
//! All maps are `BTreeMap` so iteration order, and with it every seeded
//! run, is reproducible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{GridDims, LabSubject, Slot};
use crate::error::TimetableResult;

/// Static input for one timetable generation.
///
/// # Example
///
/// ```
/// use u_timetable::models::{TimetableInput, Slot};
///
/// let input = TimetableInput::new()
///     .with_year("3", ["A", "B"])
///     .with_subject("3", "MATHS", 4)
///     .with_teacher("X", [("3A", "MATHS"), ("3B", "MATHS")])
///     .with_labs("3A", [("DSA-LAB", "T1"), ("OS-LAB", "T2")])
///     .with_preblocked("X", [Slot::new(0, 0)]);
///
/// assert_eq!(input.section_keys(), vec!["3A".to_string(), "3B".to_string()]);
/// assert_eq!(input.total_theory_demand(), 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableInput {
    /// Grid dimensions (days × periods).
    pub dims: GridDims,
    /// Year label → ordered section letters. Section key = year + letter.
    pub sections: BTreeMap<String, Vec<String>>,
    /// Year label → (subject → weekly frequency).
    pub subjects: BTreeMap<String, BTreeMap<String, u32>>,
    /// Teacher → (section key, subject) pairs the teacher is responsible for.
    pub teachers: BTreeMap<String, Vec<(String, String)>>,
    /// Section key → ordered lab rotation.
    pub labs: BTreeMap<String, Vec<LabSubject>>,
    /// Teacher → slots the teacher may never be scheduled into.
    pub preblocked: BTreeMap<String, Vec<Slot>>,
}

impl TimetableInput {
    /// Creates an empty input with default dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an input document from JSON.
    pub fn from_json(json: &str) -> TimetableResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the grid dimensions.
    pub fn with_dims(mut self, dims: GridDims) -> Self {
        self.dims = dims;
        self
    }

    /// Adds a year with its section letters.
    pub fn with_year<I, S>(mut self, year: impl Into<String>, letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .entry(year.into())
            .or_default()
            .extend(letters.into_iter().map(Into::into));
        self
    }

    /// Sets the weekly frequency of a subject for every section of a year.
    pub fn with_subject(
        mut self,
        year: impl Into<String>,
        subject: impl Into<String>,
        frequency: u32,
    ) -> Self {
        self.subjects
            .entry(year.into())
            .or_default()
            .insert(subject.into(), frequency);
        self
    }

    /// Adds (section, subject) claims for a teacher.
    pub fn with_teacher<I, A, B>(mut self, teacher: impl Into<String>, claims: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.teachers
            .entry(teacher.into())
            .or_default()
            .extend(claims.into_iter().map(|(s, x)| (s.into(), x.into())));
        self
    }

    /// Sets the lab rotation for a section.
    pub fn with_labs<I, L>(mut self, section: impl Into<String>, labs: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabSubject>,
    {
        self.labs
            .insert(section.into(), labs.into_iter().map(Into::into).collect());
        self
    }

    /// Adds pre-blocked slots for a teacher.
    pub fn with_preblocked<I>(mut self, teacher: impl Into<String>, slots: I) -> Self
    where
        I: IntoIterator<Item = Slot>,
    {
        self.preblocked
            .entry(teacher.into())
            .or_default()
            .extend(slots);
        self
    }

    /// All theory section keys, ordered by year then roster order.
    pub fn section_keys(&self) -> Vec<String> {
        self.sections_with_year()
            .into_iter()
            .map(|(_, key)| key)
            .collect()
    }

    /// `(year, section key)` for every rostered section.
    pub fn sections_with_year(&self) -> Vec<(&str, String)> {
        self.sections
            .iter()
            .flat_map(|(year, letters)| {
                letters
                    .iter()
                    .map(move |l| (year.as_str(), format!("{year}{l}")))
            })
            .collect()
    }

    /// Subject multiset for one year: each subject repeated by its frequency.
    pub fn demand_for_year(&self, year: &str) -> Vec<String> {
        self.subjects
            .get(year)
            .map(|table| {
                table
                    .iter()
                    .flat_map(|(subject, &freq)| {
                        std::iter::repeat(subject.clone()).take(freq as usize)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Declared weekly frequency of `subject` for `year`.
    pub fn frequency(&self, year: &str, subject: &str) -> u32 {
        self.subjects
            .get(year)
            .and_then(|t| t.get(subject))
            .copied()
            .unwrap_or(0)
    }

    /// Total theory instances across all sections.
    pub fn total_theory_demand(&self) -> usize {
        self.sections_with_year()
            .iter()
            .map(|(year, _)| {
                self.subjects
                    .get(*year)
                    .map(|t| t.values().map(|&f| f as usize).sum::<usize>())
                    .unwrap_or(0)
            })
            .sum()
    }
}
