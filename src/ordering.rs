//! # Order/Limit Policy
//!
//! Applies the requested output order and row cap to an ascending sequence.
//! With `NewestFirst` the cap keeps the *latest* rows, so a limit of N always
//! means "the N most recent", never "the N earliest, reversed".

use crate::condition::SortOrder;

/// Order an ascending sequence and cap it at `limit` rows.
///
/// # Example
/// ```
/// use location_selector_lib::condition::SortOrder;
/// use location_selector_lib::ordering::order_and_limit;
///
/// let rows = vec![1, 2, 3, 4, 5];
/// assert_eq!(order_and_limit(rows.clone(), SortOrder::OldestFirst, Some(2)), vec![1, 2]);
/// assert_eq!(order_and_limit(rows, SortOrder::NewestFirst, Some(2)), vec![5, 4]);
/// ```
pub fn order_and_limit<T>(mut ascending: Vec<T>, order: SortOrder, limit: Option<usize>) -> Vec<T> {
    match order {
        SortOrder::OldestFirst => {
            if let Some(n) = limit {
                ascending.truncate(n);
            }
            ascending
        }
        SortOrder::NewestFirst => {
            if let Some(n) = limit {
                let skip = ascending.len().saturating_sub(n);
                ascending.drain(..skip);
            }
            ascending.reverse();
            ascending
        }
    }
}

/// Put an ascending sequence in the requested order, then keep the first
/// `limit` rows of the result.
///
/// Grid mode uses this: rows are ordered first and the cap is applied to the
/// already-ordered sequence, so gap rows count toward the limit like matches.
pub fn order_then_truncate<T>(
    mut ascending: Vec<T>,
    order: SortOrder,
    limit: Option<usize>,
) -> Vec<T> {
    if order == SortOrder::NewestFirst {
        ascending.reverse();
    }
    if let Some(n) = limit {
        ascending.truncate(n);
    }
    ascending
}
