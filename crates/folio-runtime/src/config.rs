#![forbid(unsafe_code)]

//! Policy-as-data configuration for the section pager.
//!
//! Every timing and threshold the pager uses lives in one [`PagerConfig`]
//! that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # folio.toml
//! [gesture]
//! cooldown_ms = 700
//!
//! [viewport]
//! threshold = 0.5
//! ```
//!
//! ```rust,ignore
//! let config = PagerConfig::from_toml_file("folio.toml")?;
//! let config = PagerConfig::load("folio.json")?; // parse + validate
//! ```
//!
//! # Defaults
//!
//! `PagerConfig::default()` reproduces the site's tuned values: a 900ms
//! gesture cooldown, a 50px swipe threshold, a 250ms settle window, a 0.55
//! visibility threshold, a 200ms observer throttle and a 325ms initial
//! probe delay over the central 40%-60% band.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use folio_core::{Band, GestureConfig};

use crate::host::ScrollBehavior;

// ---------------------------------------------------------------------------
// Top-level PagerConfig
// ---------------------------------------------------------------------------

/// All pager tunables.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PagerConfig {
    /// Wheel and touch translation.
    pub gesture: GesturePolicy,
    /// Scroll executor timing.
    pub executor: ExecutorPolicy,
    /// Viewport observer thresholds and timing.
    pub viewport: ViewportPolicy,
}

impl PagerConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a file (JSON if the extension is `.json`, TOML otherwise) and
    /// reject it unless it validates.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// `Ok(self)` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.gesture.cooldown_ms == 0 {
            errors.push("gesture.cooldown_ms must be > 0".into());
        }
        if !(self.gesture.swipe_threshold_px.is_finite() && self.gesture.swipe_threshold_px >= 0.0)
        {
            errors.push(format!(
                "gesture.swipe_threshold_px must be >= 0, got {}",
                self.gesture.swipe_threshold_px
            ));
        }

        // A cooldown shorter than the settle window would let one flick
        // queue a second step behind the first.
        if self.gesture.cooldown_ms < self.executor.settle_ms {
            errors.push(format!(
                "gesture.cooldown_ms ({}) must be >= executor.settle_ms ({})",
                self.gesture.cooldown_ms, self.executor.settle_ms
            ));
        }

        let v = &self.viewport;
        if !(v.threshold > 0.0 && v.threshold <= 1.0) {
            errors.push(format!(
                "viewport.threshold must be in (0, 1], got {}",
                v.threshold
            ));
        }
        if !(0.0..=1.0).contains(&v.band_start) || !(0.0..=1.0).contains(&v.band_end) {
            errors.push(format!(
                "viewport.band_start and band_end must be in [0, 1], got {}..{}",
                v.band_start, v.band_end
            ));
        } else if v.band_start >= v.band_end {
            errors.push(format!(
                "viewport.band_start must be < band_end, got {}..{}",
                v.band_start, v.band_end
            ));
        }

        errors
    }

    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            cooldown: Duration::from_millis(self.gesture.cooldown_ms),
            swipe_threshold: self.gesture.swipe_threshold_px,
        }
    }

    #[must_use]
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.executor.settle_ms)
    }

    #[must_use]
    pub fn scroll_behavior(&self) -> ScrollBehavior {
        self.executor.scroll_behavior
    }

    #[must_use]
    pub fn observer_throttle(&self) -> Duration {
        Duration::from_millis(self.viewport.throttle_ms)
    }

    #[must_use]
    pub fn initial_probe_delay(&self) -> Duration {
        Duration::from_millis(self.viewport.initial_probe_delay_ms)
    }

    #[must_use]
    pub fn band(&self) -> Band {
        Band {
            start: self.viewport.band_start,
            end: self.viewport.band_end,
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Gesture translation parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GesturePolicy {
    /// Window after an accepted gesture during which input is discarded (ms).
    /// Default: 900.
    pub cooldown_ms: u64,
    /// Minimum vertical swipe travel (CSS px). Default: 50.
    pub swipe_threshold_px: f64,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self {
            cooldown_ms: 900,
            swipe_threshold_px: 50.0,
        }
    }
}

/// Scroll executor parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ExecutorPolicy {
    /// Time a smooth scroll is assumed to take (ms). Default: 250.
    pub settle_ms: u64,
    /// Animation requested from the host. Default: smooth.
    pub scroll_behavior: ScrollBehavior,
}

impl Default for ExecutorPolicy {
    fn default() -> Self {
        Self {
            settle_ms: 250,
            scroll_behavior: ScrollBehavior::Smooth,
        }
    }
}

/// Viewport observer parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ViewportPolicy {
    /// Minimum intersection ratio for a section to count as visible.
    /// Default: 0.55.
    pub threshold: f64,
    /// Minimum interval between two reports (ms). Default: 200.
    pub throttle_ms: u64,
    /// Delay between mount and the band probe (ms). Default: 325.
    pub initial_probe_delay_ms: u64,
    /// Upper edge of the probe band, fraction of viewport height. Default: 0.4.
    pub band_start: f64,
    /// Lower edge of the probe band, fraction of viewport height. Default: 0.6.
    pub band_end: f64,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        let band = Band::default();
        Self {
            threshold: 0.55,
            throttle_ms: 200,
            initial_probe_delay_ms: 325,
            band_start: band.start,
            band_end: band.end,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a pager configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
