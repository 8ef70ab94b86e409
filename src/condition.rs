//! # Query Conditions
//!
//! A [`Condition`] describes one selection request: an optional time window,
//! an optional grid interval, an accuracy floor, a row cap and an output order.
//! Every optional field means "unbounded" or "off" when absent, so no sentinel
//! values are needed to tell "unset" apart from a legitimate zero.

use serde::{Deserialize, Serialize};

/// Final output order of the selected rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

impl SortOrder {
    /// Parse a persisted order name, falling back to [`SortOrder::OldestFirst`]
    /// for anything unrecognized.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some("NewestFirst") => SortOrder::NewestFirst,
            Some("OldestFirst") => SortOrder::OldestFirst,
            _ => SortOrder::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::OldestFirst => "OldestFirst",
            SortOrder::NewestFirst => "NewestFirst",
        }
    }
}

/// Selection condition.
///
/// - `from_millis` / `to_millis`: inclusive window bounds, either may be absent
/// - `interval_sec`: grid spacing; absent selects direct mode
/// - `limit`: row cap, effective only when `>= 1`
/// - `min_accuracy`: keep only samples whose accuracy is `<=` this value
/// - `order`: final output order
///
/// # Example
/// ```
/// use location_selector_lib::condition::Condition;
///
/// let cond = Condition { from_millis: Some(10), to_millis: Some(5), ..Default::default() };
/// let norm = cond.normalized();
/// assert_eq!((norm.from_millis, norm.to_millis), (Some(5), Some(10)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub from_millis: Option<i64>,
    pub to_millis: Option<i64>,
    pub interval_sec: Option<i64>,
    pub limit: Option<i32>,
    pub min_accuracy: Option<f32>,
    #[serde(default)]
    pub order: SortOrder,
}

impl Condition {
    /// Swap the bounds when both are present and given in reverse.
    ///
    /// Total and idempotent; any other condition is returned unchanged.
    pub fn normalized(&self) -> Self {
        match (self.from_millis, self.to_millis) {
            (Some(from), Some(to)) if from > to => Self {
                from_millis: Some(to),
                to_millis: Some(from),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// Row cap as a count, or `None` when unbounded.
    pub fn effective_limit(&self) -> Option<usize> {
        effective_limit(self.limit)
    }
}

/// A limit is effective only when it is at least one; absent, zero and negative
/// values all mean "no cap".
pub fn effective_limit(limit: Option<i32>) -> Option<usize> {
    limit.filter(|&n| n >= 1).map(|n| n as usize)
}
