#![forbid(unsafe_code)]

//! UI languages supported by the site.

use std::fmt;

/// A supported UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Lang {
    #[default]
    De,
    En,
    Ru,
}

impl Lang {
    /// All languages in cycle order.
    pub const ALL: [Lang; 3] = [Lang::De, Lang::En, Lang::Ru];

    /// Lowercase language code (`"de"`, `"en"`, `"ru"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    /// Parse a language code. Case-insensitive, surrounding whitespace ignored.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    /// Next language in the de → en → ru → de cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::De => Self::En,
            Self::En => Self::Ru,
            Self::Ru => Self::De,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
