#![forbid(unsafe_code)]

//! Section identifiers and the ordered section sequence.
//!
//! A page is a fixed, ordered list of [`Section`]s. Order determines
//! next/previous semantics and which section is "last". The sequence is
//! validated once at construction and never mutated afterwards (labels may
//! be swapped wholesale when the UI language changes, ids may not).
//!
//! # Invariants
//!
//! 1. A [`SectionSequence`] is never empty.
//! 2. Ids are unique within a sequence.
//! 3. The first section is the default active section.

use std::fmt;
use std::sync::Arc;

/// Stable identifier of a section (e.g. `"hero"`).
///
/// Cheap to clone: the string is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(Arc<str>);

impl SectionId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Static descriptor of one content block on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    /// Display name in the current UI language.
    pub label: String,
}

impl Section {
    #[must_use]
    pub fn new(id: impl Into<SectionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Direction of a one-section step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Direction implied by a vertical delta; `None` for zero.
    #[must_use]
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Next)
        } else if delta < 0.0 {
            Some(Self::Previous)
        } else {
            None
        }
    }
}

/// Errors raised when building a [`SectionSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// The sequence had no sections.
    Empty,
    /// The same id appeared more than once.
    Duplicate(SectionId),
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "section sequence must not be empty"),
            Self::Duplicate(id) => write!(f, "duplicate section id: {id}"),
        }
    }
}

impl std::error::Error for SectionError {}

/// Ordered, validated list of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSequence {
    sections: Vec<Section>,
}

impl SectionSequence {
    /// Validate and build a sequence.
    pub fn new(sections: Vec<Section>) -> Result<Self, SectionError> {
        if sections.is_empty() {
            return Err(SectionError::Empty);
        }
        for (i, section) in sections.iter().enumerate() {
            if sections[..i].iter().any(|s| s.id == section.id) {
                return Err(SectionError::Duplicate(section.id.clone()));
            }
        }
        Ok(Self { sections })
    }

    /// Build a sequence whose labels equal the ids.
    pub fn from_ids<I, S>(ids: I) -> Result<Self, SectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            ids.into_iter()
                .map(|id| Section::new(id.as_ref(), id.as_ref()))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The default active section.
    #[must_use]
    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    #[must_use]
    pub fn last(&self) -> &Section {
        &self.sections[self.sections.len() - 1]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// `true` iff `id` is the id of the final section.
    #[must_use]
    pub fn is_last(&self, id: &str) -> bool {
        self.last().id == *id
    }

    /// Index one step away from `index`, or `None` past either end.
    #[must_use]
    pub fn step(&self, index: usize, direction: Direction) -> Option<usize> {
        let target = match direction {
            Direction::Next => index.checked_add(1)?,
            Direction::Previous => index.checked_sub(1)?,
        };
        (target < self.sections.len()).then_some(target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.iter().map(|s| &s.id)
    }

    /// Replace labels from `other` for every id both sequences share.
    ///
    /// Ids and order are left untouched.
    pub fn relabel_from(&mut self, other: &SectionSequence) {
        for section in &mut self.sections {
            if let Some(idx) = other.index_of(section.id.as_str()) {
                section.label.clone_from(&other.sections[idx].label);
            }
        }
    }
}

impl<'a> IntoIterator for &'a SectionSequence {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
