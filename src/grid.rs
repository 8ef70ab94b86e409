//! # Grid Builder
//!
//! Generates the ascending lattice of "ideal" instants for a bounded window.
//! The selector always anchors the lattice at the window start; the end-anchored
//! variant is kept for callers that want the newest instant to land exactly on
//! the window end.

use crate::condition::SortOrder;

/// Upper bound on the up-front allocation for a lattice.
const MAX_PREALLOC: usize = 1 << 16;

fn lattice_len(start: i64, end: i64, step: i64) -> usize {
    let span = (end as i128 - start as i128) / step as i128 + 1;
    usize::try_from(span).unwrap_or(usize::MAX).min(MAX_PREALLOC)
}

/// Instants `start, start + step, ...` up to the last value `<= end`.
///
/// Returns an empty vector when `step <= 0` or `end < start`. The lattice only
/// reaches `end` exactly when `end - start` is a multiple of `step`.
///
/// # Example
/// ```
/// use location_selector_lib::grid::build_ascending;
///
/// assert_eq!(build_ascending(0, 10_000, 5_000), vec![0, 5_000, 10_000]);
/// assert_eq!(build_ascending(0, 9_999, 5_000), vec![0, 5_000]);
/// ```
pub fn build_ascending(start: i64, end: i64, step: i64) -> Vec<i64> {
    if step <= 0 || end < start {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(lattice_len(start, end, step));
    let mut g = start;
    loop {
        out.push(g);
        match g.checked_add(step) {
            Some(next) if next <= end => g = next,
            _ => break,
        }
    }
    out
}

/// Same spacing as [`build_ascending`] but anchored at `end`, walking down to
/// the last value `>= start`. The result is returned in ascending order.
pub fn build_from_end(start: i64, end: i64, step: i64) -> Vec<i64> {
    if step <= 0 || end < start {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(lattice_len(start, end, step));
    let mut g = end;
    loop {
        out.push(g);
        match g.checked_sub(step) {
            Some(prev) if prev >= start => g = prev,
            _ => break,
        }
    }
    out.reverse();
    out
}

/// The part of the start-anchored lattice that survives a row cap, ascending.
///
/// With `OldestFirst` this is the first `limit` instants, with `NewestFirst`
/// the last `limit`. Equal to building the full lattice and cutting it, but
/// only the kept instants are ever generated.
///
/// # Example
/// ```
/// use location_selector_lib::condition::SortOrder;
/// use location_selector_lib::grid::build_capped;
///
/// assert_eq!(build_capped(0, 50, 10, Some(2), SortOrder::OldestFirst), vec![0, 10]);
/// assert_eq!(build_capped(0, 55, 10, Some(2), SortOrder::NewestFirst), vec![40, 50]);
/// ```
pub fn build_capped(
    start: i64,
    end: i64,
    step: i64,
    limit: Option<usize>,
    order: SortOrder,
) -> Vec<i64> {
    let Some(limit) = limit else {
        return build_ascending(start, end, step);
    };
    if step <= 0 || end < start || limit == 0 {
        return Vec::new();
    }
    let total = (end as i128 - start as i128) / step as i128 + 1;
    let kept = total.min(limit as i128);
    let (first, last) = match order {
        SortOrder::OldestFirst => (0, kept - 1),
        SortOrder::NewestFirst => (total - kept, total - 1),
    };
    // Both instants lie inside [start, end], so they fit in i64
    let at = |k: i128| (start as i128 + k * step as i128) as i64;
    build_ascending(at(first), at(last), step)
}
