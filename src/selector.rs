//! # Selection Orchestrator
//!
//! [`Selector::select`] turns a [`Condition`] into output rows. It normalizes
//! the condition, picks a [`Mode`], issues exactly one range query against the
//! [`SampleSource`], and composes the filter, snapper and order/limit steps.
//!
//! ## Modes
//! - **Direct**: no interval, or either bound missing. A grid cannot be anchored
//!   without both ends, so an interval on a half-open window falls back here.
//! - **Grid**: interval and both bounds present. Instants are spaced `T` apart
//!   from the window start, and each matches samples within `W = T / 2`.
//!
//! ## Errors and cancellation
//! The fetch is the only `.await`. Its error is returned unchanged; nothing is
//! retried here. Dropping the returned future while it waits on the fetch
//! abandons the whole call, so no partial row list is ever observable.

use crate::condition::{Condition, SortOrder};
use crate::filter::filter_by_accuracy;
use crate::grid::build_capped;
use crate::ordering::{order_and_limit, order_then_truncate};
use crate::snap::{direct_to_slots, snap_to_grid};
use crate::source::{soft_fetch_limit, SampleSource, SourceError};
use crate::Slot;
use std::sync::Arc;
use tracing::{debug, warn};

/// Milliseconds per second of grid interval.
const MILLIS_PER_SEC: i64 = 1_000;

/// Extraction plan for a normalized condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Raw samples in `[from_inclusive, to_exclusive)`.
    Direct { from_inclusive: i64, to_exclusive: i64 },
    /// Grid over `[from, to]` with spacing `step_ms` and half-window `half_window_ms`.
    Grid {
        from: i64,
        to: i64,
        step_ms: i64,
        half_window_ms: i64,
    },
}

impl Mode {
    /// Choose the mode for an already-normalized condition.
    ///
    /// Non-positive intervals are floored to one second.
    pub fn plan(cond: &Condition) -> Self {
        match (cond.interval_sec, cond.from_millis, cond.to_millis) {
            (Some(interval_sec), Some(from), Some(to)) => {
                let step_ms = interval_sec.max(1).saturating_mul(MILLIS_PER_SEC);
                Mode::Grid {
                    from,
                    to,
                    step_ms,
                    half_window_ms: step_ms / 2,
                }
            }
            (_, from, to) => Mode::Direct {
                from_inclusive: from.unwrap_or(i64::MIN),
                to_exclusive: to.map_or(i64::MAX, |t| t.saturating_add(1)),
            },
        }
    }

    /// Half-open range the single fetch covers.
    ///
    /// Grid mode widens the window by `W` on both sides so instants at the edges
    /// see every candidate within reach.
    pub fn fetch_range(&self) -> (i64, i64) {
        match *self {
            Mode::Direct {
                from_inclusive,
                to_exclusive,
            } => (from_inclusive, to_exclusive),
            Mode::Grid {
                from,
                to,
                half_window_ms,
                ..
            } => (
                from.saturating_sub(half_window_ms),
                to.saturating_add(half_window_ms).saturating_add(1),
            ),
        }
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, Mode::Grid { .. })
    }
}

/// Runs selections against one sample source.
///
/// Holds no mutable state, so one selector can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Selector<S> {
    source: S,
}

impl<S: SampleSource> Selector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Select rows for `condition`.
    ///
    /// # Returns
    /// - Direct mode: one row per surviving sample, `delta_ms == Some(0)`
    /// - Grid mode: one row per instant (match or gap), ordered, then capped
    /// - `Err(SourceError)`: the fetch failed; passed through unchanged
    pub async fn select(&self, condition: &Condition) -> Result<Vec<Slot>, SourceError> {
        let cond = condition.normalized();
        let mode = Mode::plan(&cond);
        let (fetch_from, fetch_to) = mode.fetch_range();

        debug!(?mode, fetch_from, fetch_to, "selecting samples");

        let fetched = self.source.find_between(fetch_from, fetch_to).await?;
        let fetched_count = fetched.len();
        let candidates = filter_by_accuracy(fetched, cond.min_accuracy);

        let slots = match mode {
            Mode::Direct { .. } => {
                let kept = order_and_limit(candidates, cond.order, cond.effective_limit());
                direct_to_slots(kept)
            }
            Mode::Grid {
                from,
                to,
                step_ms,
                half_window_ms,
            } => {
                let guard = soft_fetch_limit(cond.limit);
                if fetched_count > guard {
                    warn!(
                        fetched = fetched_count,
                        soft_limit = guard,
                        "grid fetch exceeded soft candidate limit"
                    );
                }
                // Only instants that survive the row cap are built and snapped
                let limit = cond.effective_limit();
                let targets = build_capped(from, to, step_ms, limit, cond.order);
                let snapped = snap_to_grid(&candidates, &targets, half_window_ms);
                order_then_truncate(snapped, cond.order, limit)
            }
        };

        debug!(
            fetched = fetched_count,
            matched = matched_count(&slots),
            rows = slots.len(),
            newest_first = cond.order == SortOrder::NewestFirst,
            "selection complete"
        );
        Ok(slots)
    }
}

fn matched_count(slots: &[Slot]) -> usize {
    slots.iter().filter(|s| !s.is_gap()).count()
}

/// Screen-facing use case: build the row list, gaps included, for a condition.
#[derive(Debug)]
pub struct BuildSelectedSlots<S> {
    selector: Arc<Selector<S>>,
}

impl<S> Clone for BuildSelectedSlots<S> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<S: SampleSource> BuildSelectedSlots<S> {
    pub fn new(selector: Arc<Selector<S>>) -> Self {
        Self { selector }
    }

    pub async fn run(&self, condition: &Condition) -> Result<Vec<Slot>, SourceError> {
        self.selector.select(condition).await
    }
}
