#![forbid(unsafe_code)]

//! Deep-link parsing: the section a URL asks the page to open on.
//!
//! Two forms are recognised and may both be present:
//!
//! - a fragment: `/#contact`
//! - a `section` query parameter: `/?section=about`
//!
//! When both are present the query parameter wins.

use url::Url;

use crate::section::{SectionId, SectionSequence};

/// Base used to resolve relative inputs such as `/#about` or `?section=x`.
const RELATIVE_BASE: &str = "http://folio.invalid/";

/// Name of the query parameter carrying a section id.
pub const SECTION_QUERY_PARAM: &str = "section";

/// The section-related parts of a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub fragment: Option<String>,
    pub query_section: Option<String>,
}

impl DeepLink {
    /// Parse an absolute URL, a path, or a bare `#fragment` / `?query`.
    ///
    /// Input that cannot be parsed at all yields an empty link.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::default();
        }
        let parsed =
            Url::parse(input).or_else(|_| Url::parse(RELATIVE_BASE).and_then(|b| b.join(input)));
        let Ok(url) = parsed else {
            return Self::default();
        };

        let fragment = url
            .fragment()
            .map(percent_decode)
            .filter(|f| !f.is_empty());
        let query_section = url
            .query_pairs()
            .filter(|(key, _)| key == SECTION_QUERY_PARAM)
            .map(|(_, value)| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .last();

        Self {
            fragment,
            query_section,
        }
    }

    /// Requested section id, without checking it exists.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.query_section
            .as_deref()
            .or(self.fragment.as_deref())
    }

    /// Requested section id if it names a section in `sections`.
    ///
    /// Falls back to the fragment when the query names an unknown section.
    #[must_use]
    pub fn resolve(&self, sections: &SectionSequence) -> Option<SectionId> {
        [self.query_section.as_deref(), self.fragment.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|candidate| {
                sections
                    .index_of(candidate)
                    .and_then(|idx| sections.get(idx))
                    .map(|section| section.id.clone())
            })
    }
}

fn percent_decode(fragment: &str) -> String {
    // Fragments use the same escaping as query values minus `+`.
    let escaped = fragment.replace('+', "%2B");
    url::form_urlencoded::parse(format!("v={escaped}").as_bytes())
        .next()
        .map(|(_, value)| value.trim().to_owned())
        .unwrap_or_default()
}
