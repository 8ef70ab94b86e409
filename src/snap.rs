//! # Grid Snapping
//!
//! Matches ascending candidate samples to ascending grid instants. Each instant
//! takes the candidate closest to it within `[g - W, g + W]`, or becomes a gap.
//!
//! ## Sweep
//! A single cursor (a plain index into the candidate slice) only ever moves
//! forward. For each instant it first skips candidates older than `g - W`; those
//! cannot match this or any later instant because instants never decrease. It
//! then scans forward while candidates are `<= g + W`, keeping the best match.
//! The scan itself does not move the cursor, so a candidate can still serve the
//! next instant when windows overlap.
//!
//! ## Tie-break
//! The best match is only replaced on a *strictly* smaller distance. On an exact
//! tie the earlier-scanned, i.e. older, sample wins.

use crate::{LocationSample, Slot};

/// Produce exactly one [`Slot`] per grid instant.
///
/// Both `candidates` (by `time_millis`) and `grid` must be ascending.
///
/// # Example
/// ```
/// use location_selector_lib::{snap::snap_to_grid, LocationSample};
///
/// let cands = vec![LocationSample::at(100, 1.0), LocationSample::at(4_800, 1.0)];
/// let slots = snap_to_grid(&cands, &[0, 5_000, 10_000], 2_500);
/// assert_eq!(slots[0].delta_ms, Some(100));
/// assert_eq!(slots[1].delta_ms, Some(-200));
/// assert!(slots[2].is_gap());
/// ```
pub fn snap_to_grid(candidates: &[LocationSample], grid: &[i64], half_window: i64) -> Vec<Slot> {
    let mut out = Vec::with_capacity(grid.len());
    let mut cursor = 0usize;

    for &g in grid {
        let left = g.saturating_sub(half_window);
        let right = g.saturating_add(half_window);

        while cursor < candidates.len() && candidates[cursor].time_millis < left {
            cursor += 1;
        }

        let mut best: Option<(usize, u64)> = None;
        for (idx, cand) in candidates.iter().enumerate().skip(cursor) {
            if cand.time_millis > right {
                break;
            }
            let dist = cand.time_millis.abs_diff(g);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((idx, dist));
            }
        }

        out.push(match best {
            Some((idx, _)) => Slot::matched(g, candidates[idx].clone()),
            None => Slot::gap(g),
        });
    }

    out
}

/// Direct-mode rows: one match per sample with `ideal_ms == time_millis`.
pub fn direct_to_slots(samples: Vec<LocationSample>) -> Vec<Slot> {
    samples
        .into_iter()
        .map(|s| Slot {
            ideal_ms: s.time_millis,
            delta_ms: Some(0),
            sample: Some(s),
        })
        .collect()
}
