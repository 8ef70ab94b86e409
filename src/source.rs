//! # Sample Sources
//!
//! The selector never talks to storage directly. It depends on [`SampleSource`],
//! a single half-open range query returning samples in ascending time order.
//!
//! ## Contract
//! - Results cover `[from_inclusive, to_exclusive)` and are sorted by `time_millis`
//! - Results may be empty; duplicates are allowed and kept
//! - Identical arguments against unchanged data give identical results
//! - Failures surface as [`SourceError`] and are never swallowed by the selector
//!
//! Two implementations ship with the crate: [`InMemorySource`] for embedding and
//! tests, and [`JsonFileSource`] which loads an exported sample file from disk.

use crate::condition::effective_limit;
use crate::LocationSample;
use async_trait::async_trait;
use std::{fs, io, path::Path};
use thiserror::Error;

/// Default row cap assumed by [`soft_fetch_limit`] when no limit is set.
const DEFAULT_LIMIT: usize = 100;
/// Candidate rows per output row budgeted by [`soft_fetch_limit`].
const ROWS_PER_OUTPUT: usize = 5;
const SOFT_FLOOR: usize = 1_000;
const SOFT_CEILING: usize = 200_000;

/// Errors raised by sample sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Reading the backing file failed
    #[error("sample store IO: {0}")]
    Io(#[from] io::Error),

    /// The backing file is not a valid sample list
    #[error("sample decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Stored samples are not in ascending time order
    #[error("samples out of order at index {index}: {current} after {previous}")]
    Unordered {
        index: usize,
        previous: i64,
        current: i64,
    },

    /// A range query matched more rows than the store is allowed to return
    #[error("range query matched {found} rows, store cap is {max_rows}")]
    TooManyRows { found: usize, max_rows: usize },

    /// The backend cannot answer right now
    #[error("sample store unavailable: {0}")]
    Unavailable(String),
}

/// Range query over stored samples.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Samples with `from_inclusive <= time_millis < to_exclusive`, ascending.
    async fn find_between(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<Vec<LocationSample>, SourceError>;
}

#[async_trait]
impl<S: SampleSource + ?Sized> SampleSource for std::sync::Arc<S> {
    async fn find_between(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<Vec<LocationSample>, SourceError> {
        (**self).find_between(from_inclusive, to_exclusive).await
    }
}

/// Advisory cap on candidate rows requested for one grid query.
///
/// `max(limit * 5, 1000)` clamped to at most 200,000, where a missing or
/// non-positive limit counts as 100. This bounds memory for very wide windows;
/// the selector only reports when it is exceeded.
///
/// # Example
/// ```
/// use location_selector_lib::source::soft_fetch_limit;
///
/// assert_eq!(soft_fetch_limit(None), 1_000);
/// assert_eq!(soft_fetch_limit(Some(400)), 2_000);
/// assert_eq!(soft_fetch_limit(Some(1_000_000)), 200_000);
/// ```
pub fn soft_fetch_limit(limit: Option<i32>) -> usize {
    let base = effective_limit(limit)
        .unwrap_or(DEFAULT_LIMIT)
        .saturating_mul(ROWS_PER_OUTPUT)
        .max(SOFT_FLOOR);
    base.min(SOFT_CEILING)
}

/// Samples held in memory, sorted ascending by time.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    samples: Vec<LocationSample>,
    max_rows: Option<usize>,
}

impl InMemorySource {
    /// Wrap samples that are already ascending.
    ///
    /// Returns [`SourceError::Unordered`] at the first out-of-order pair.
    pub fn new(samples: Vec<LocationSample>) -> Result<Self, SourceError> {
        check_ascending(&samples)?;
        Ok(Self {
            samples,
            max_rows: None,
        })
    }

    /// Sort samples by time (stable, so duplicates keep their input order).
    pub fn from_unsorted(mut samples: Vec<LocationSample>) -> Self {
        samples.sort_by_key(|s| s.time_millis);
        Self {
            samples,
            max_rows: None,
        }
    }

    /// Refuse queries matching more than `max_rows` rows.
    ///
    /// An over-cap query fails with [`SourceError::TooManyRows`] rather than
    /// returning a partial range, since a truncated result would be
    /// indistinguishable from missing data.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn range(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<&[LocationSample], SourceError> {
        if to_exclusive <= from_inclusive {
            return Ok(&[]);
        }
        let lo = self
            .samples
            .partition_point(|s| s.time_millis < from_inclusive);
        let hi = self.samples.partition_point(|s| s.time_millis < to_exclusive);
        match self.max_rows {
            Some(max_rows) if hi - lo > max_rows => Err(SourceError::TooManyRows {
                found: hi - lo,
                max_rows,
            }),
            _ => Ok(&self.samples[lo..hi]),
        }
    }
}

#[async_trait]
impl SampleSource for InMemorySource {
    async fn find_between(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<Vec<LocationSample>, SourceError> {
        Ok(self.range(from_inclusive, to_exclusive)?.to_vec())
    }
}

/// Samples loaded from a JSON array on disk.
///
/// The file is read once on open; queries are then answered from memory.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    inner: InMemorySource,
}

impl JsonFileSource {
    /// Load and validate a sample file.
    ///
    /// The file must hold a JSON array of samples in ascending time order.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let data = fs::read(path.as_ref())?;
        let samples: Vec<LocationSample> = serde_json::from_slice(&data)?;
        let inner = InMemorySource::new(samples)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            samples = inner.len(),
            "loaded sample file"
        );
        Ok(Self { inner })
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.inner = self.inner.with_max_rows(max_rows);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl SampleSource for JsonFileSource {
    async fn find_between(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<Vec<LocationSample>, SourceError> {
        self.inner.find_between(from_inclusive, to_exclusive).await
    }
}

fn check_ascending(samples: &[LocationSample]) -> Result<(), SourceError> {
    for (i, pair) in samples.windows(2).enumerate() {
        if pair[1].time_millis < pair[0].time_millis {
            return Err(SourceError::Unordered {
                index: i + 1,
                previous: pair[0].time_millis,
                current: pair[1].time_millis,
            });
        }
    }
    Ok(())
}
