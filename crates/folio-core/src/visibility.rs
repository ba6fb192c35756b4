#![forbid(unsafe_code)]

//! Visibility geometry: which section is "really" on screen.
//!
//! Two strategies are provided:
//!
//! - [`VisibilityMap`] keeps the latest intersection ratio reported for each
//!   section and picks the most visible one above a threshold. This is fed
//!   continuously by the host's intersection observer.
//! - [`section_in_band`] inspects section bounding boxes directly and picks
//!   the section whose vertical midpoint lies in a central band of the
//!   viewport. Used once on mount, when intersection callbacks for an
//!   already-visible element may not have fired.

use crate::section::{SectionId, SectionSequence};

/// One intersection observation for a section.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub id: SectionId,
    /// Fraction of the section inside the viewport, `0.0..=1.0`.
    pub ratio: f64,
}

impl IntersectionEntry {
    #[must_use]
    pub fn new(id: impl Into<SectionId>, ratio: f64) -> Self {
        Self {
            id: id.into(),
            ratio,
        }
    }
}

/// Latest intersection ratio per section, in sequence order.
#[derive(Debug, Clone)]
pub struct VisibilityMap {
    ids: Vec<SectionId>,
    ratios: Vec<f64>,
}

impl VisibilityMap {
    #[must_use]
    pub fn new(sections: &SectionSequence) -> Self {
        let ids: Vec<SectionId> = sections.ids().cloned().collect();
        let ratios = vec![0.0; ids.len()];
        Self { ids, ratios }
    }

    /// Record an observation. Unknown ids are ignored; ratios are clamped to
    /// `0.0..=1.0` and non-finite values count as `0.0`.
    ///
    /// Returns `true` if the id was known.
    pub fn record(&mut self, entry: &IntersectionEntry) -> bool {
        let Some(idx) = self.ids.iter().position(|id| *id == entry.id) else {
            return false;
        };
        self.ratios[idx] = if entry.ratio.is_finite() {
            entry.ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        true
    }

    #[must_use]
    pub fn ratio(&self, id: &str) -> Option<f64> {
        self.ids
            .iter()
            .position(|candidate| *candidate == *id)
            .map(|idx| self.ratios[idx])
    }

    /// Most visible section with a ratio of at least `threshold`.
    ///
    /// Ties go to the section earlier in the sequence.
    #[must_use]
    pub fn candidate(&self, threshold: f64) -> Option<&SectionId> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &ratio) in self.ratios.iter().enumerate() {
            if ratio < threshold {
                continue;
            }
            if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
                best = Some((idx, ratio));
            }
        }
        best.map(|(idx, _)| &self.ids[idx])
    }

    /// Forget every observation.
    pub fn clear(&mut self) {
        self.ratios.iter_mut().for_each(|r| *r = 0.0);
    }
}

/// Vertical extent of a section relative to the viewport top, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Central band of the viewport as fractions of its height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub start: f64,
    pub end: f64,
}

impl Default for Band {
    fn default() -> Self {
        Self {
            start: 0.4,
            end: 0.6,
        }
    }
}

impl Band {
    #[must_use]
    pub fn contains(&self, y: f64, viewport_height: f64) -> bool {
        let lo = viewport_height * self.start;
        let hi = viewport_height * self.end;
        y >= lo && y <= hi
    }
}

/// First section (in sequence order) whose midpoint lies inside `band`.
///
/// `bounds` yields `None` for sections the host cannot measure; those are
/// skipped. Returns `None` if nothing qualifies or the viewport is empty.
pub fn section_in_band<'a, F>(
    sections: &'a SectionSequence,
    viewport_height: f64,
    band: Band,
    mut bounds: F,
) -> Option<&'a SectionId>
where
    F: FnMut(&SectionId) -> Option<SectionBounds>,
{
    if !(viewport_height.is_finite() && viewport_height > 0.0) {
        return None;
    }
    sections.ids().find(|id| {
        bounds(*id).is_some_and(|b| b.height > 0.0 && band.contains(b.midpoint(), viewport_height))
    })
}
