//! Accuracy filter.

use crate::LocationSample;

/// Keep samples whose accuracy is at most `threshold`.
///
/// Identity when no threshold is set. Stable: survivors keep their relative order.
pub fn filter_by_accuracy(
    samples: Vec<LocationSample>,
    threshold: Option<f32>,
) -> Vec<LocationSample> {
    match threshold {
        None => samples,
        Some(max) => samples.into_iter().filter(|s| s.accuracy <= max).collect(),
    }
}
