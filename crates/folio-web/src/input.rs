#![forbid(unsafe_code)]

//! Deterministic, JSON-friendly host event schema for `folio-web`.
//!
//! The page script (JS/TS) forwards DOM activity as small JSON objects with
//! a `kind` tag:
//!
//! ```json
//! {"kind":"mount","url":"https://example.org/?section=about"}
//! {"kind":"wheel","delta_y":120.0}
//! {"kind":"touch_start","y":640.0}
//! {"kind":"intersection","entries":[{"id":"skills","ratio":0.62}]}
//! {"kind":"navigate","id":"contact"}
//! {"kind":"tick"}
//! ```
//!
//! The same encoding is used for record/replay of a browsing session.

use std::fmt;

use folio_core::IntersectionEntry;
use serde::{Deserialize, Serialize};

/// One observed intersection ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionJson {
    pub id: String,
    pub ratio: f64,
}

impl From<&IntersectionJson> for IntersectionEntry {
    fn from(value: &IntersectionJson) -> Self {
        IntersectionEntry::new(value.id.as_str(), value.ratio)
    }
}

/// Host event forwarded from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    /// Section elements are in the DOM; `url` carries a possible deep link.
    Mount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Wheel {
        delta_y: f64,
    },
    TouchStart {
        y: f64,
    },
    TouchEnd {
        y: f64,
    },
    TouchCancel,
    Intersection {
        entries: Vec<IntersectionJson>,
    },
    /// A navigation link (header, footer) was activated.
    Navigate {
        id: String,
    },
    Tick,
    Unmount,
}

impl HostEvent {
    /// Encode this event as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, HostEventError> {
        serde_json::to_string(self).map_err(HostEventError::Json)
    }

    /// Decode and check an event JSON string.
    ///
    /// Errors occur if the JSON does not match the schema or names an empty
    /// section id.
    pub fn from_json_str(s: &str) -> Result<Self, HostEventError> {
        let event: Self = serde_json::from_str(s).map_err(HostEventError::Json)?;
        event.check()?;
        Ok(event)
    }

    /// Stable `kind` tag, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Mount { .. } => "mount",
            Self::Wheel { .. } => "wheel",
            Self::TouchStart { .. } => "touch_start",
            Self::TouchEnd { .. } => "touch_end",
            Self::TouchCancel => "touch_cancel",
            Self::Intersection { .. } => "intersection",
            Self::Navigate { .. } => "navigate",
            Self::Tick => "tick",
            Self::Unmount => "unmount",
        }
    }

    fn check(&self) -> Result<(), HostEventError> {
        match self {
            Self::Navigate { id } if id.trim().is_empty() => {
                Err(HostEventError::EmptySectionId { kind: self.kind() })
            }
            Self::Intersection { entries } if entries.iter().any(|e| e.id.trim().is_empty()) => {
                Err(HostEventError::EmptySectionId { kind: self.kind() })
            }
            _ => Ok(()),
        }
    }
}

/// Errors decoding a host event.
#[derive(Debug)]
pub enum HostEventError {
    /// Malformed JSON or schema mismatch.
    Json(serde_json::Error),
    /// An event named a section with an empty id.
    EmptySectionId { kind: &'static str },
}

impl fmt::Display for HostEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid host event JSON: {e}"),
            Self::EmptySectionId { kind } => write!(f, "{kind} event has an empty section id"),
        }
    }
}

impl std::error::Error for HostEventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::EmptySectionId { .. } => None,
        }
    }
}
