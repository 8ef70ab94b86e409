//! # Location Selector Core Library
//!
//! This library turns a history of timestamped location samples into the rows a
//! history browser or exporter shows. Rows come out in one of two shapes:
//!
//! - **Direct mode**: the matching raw samples, one row each
//! - **Grid mode**: one row per regularly spaced "ideal" instant inside a bounded
//!   window, filled with the nearest sample within half an interval or left as a gap
//!
//! ## Data Flow
//! 1. **Condition**: read the persisted query ([`config`]) and normalize it ([`condition`])
//! 2. **Fetch**: one half-open range query against a [`source::SampleSource`]
//! 3. **Filter**: drop samples worse than the accuracy floor ([`filter`])
//! 4. **Snap**: in grid mode, match samples to instants with a forward-only sweep ([`snap`])
//! 5. **Order/limit**: apply the requested order and row cap ([`ordering`])
//!
//! [`selector::Selector`] composes these steps. Everything except the fetch is
//! synchronous and allocation-light; the fetch is the only `.await`.
//!
//! ## Core Types
//! - [`LocationSample`]: a single stored position fix
//! - [`Slot`]: one output row, either a match or a gap

use serde::{Deserialize, Serialize};

pub mod condition;
pub mod config;
pub mod filter;
pub mod grid;
pub mod ordering;
pub mod render;
pub mod selector;
pub mod snap;
pub mod source;

/// A single position fix as recorded by the logger.
///
/// Only `time_millis` and `accuracy` matter to the selection algorithm; the
/// remaining fields are carried through untouched for consumers.
///
/// # Example
/// ```
/// use location_selector_lib::LocationSample;
///
/// let fix = LocationSample::at(1_000, 5.0);
/// assert_eq!(fix.time_millis, 1_000);
/// assert!(fix.provider.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Row id assigned by the store
    #[serde(default)]
    pub id: i64,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Horizontal accuracy radius in meters (smaller is better)
    pub accuracy: f32,
    /// Location provider name, e.g. "gps" or "fused"
    #[serde(default)]
    pub provider: Option<String>,
    /// Battery level at capture time, 0-100
    #[serde(default)]
    pub battery_pct: i32,
    #[serde(default)]
    pub is_charging: bool,
    /// Capture time in Unix milliseconds
    pub time_millis: i64,
}

impl LocationSample {
    /// Build a sample with only the fields the selector looks at.
    pub fn at(time_millis: i64, accuracy: f32) -> Self {
        Self {
            id: 0,
            lat: 0.0,
            lon: 0.0,
            accuracy,
            provider: None,
            battery_pct: 0,
            is_charging: false,
            time_millis,
        }
    }
}

/// One output row.
///
/// In grid mode `ideal_ms` is the grid instant and `sample` is the nearest fix
/// within half an interval, or `None` for a gap. In direct mode every row is a
/// match with `ideal_ms == sample.time_millis` and `delta_ms == Some(0)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Target (ideal) instant in Unix milliseconds
    pub ideal_ms: i64,
    /// Matched sample, `None` on a gap
    pub sample: Option<LocationSample>,
    /// `sample.time_millis - ideal_ms`, present only when matched
    pub delta_ms: Option<i64>,
}

impl Slot {
    /// A row filled with `sample` for the instant `ideal_ms`.
    pub fn matched(ideal_ms: i64, sample: LocationSample) -> Self {
        let delta_ms = sample.time_millis.saturating_sub(ideal_ms);
        Self {
            ideal_ms,
            sample: Some(sample),
            delta_ms: Some(delta_ms),
        }
    }

    /// A row with no sample close enough to `ideal_ms`.
    pub fn gap(ideal_ms: i64) -> Self {
        Self {
            ideal_ms,
            sample: None,
            delta_ms: None,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.sample.is_none()
    }
}
