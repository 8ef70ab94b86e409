//! # Row Rendering
//!
//! Plain-text output of selected rows for the command-line driver. Gap rows
//! are printed with a dash in place of the sample columns so holes in the
//! history stand out when scanning the table.

use crate::Slot;
use chrono::{DateTime, SecondsFormat, Utc};

const HEADER: &str = "ideal (UTC)                 delta_ms   lat          lon          acc_m";

/// Format a Unix-millisecond instant as RFC 3339, or the raw number if it is
/// outside chrono's representable range.
pub fn format_instant(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

/// Render one row of the table, without the trailing newline.
fn format_row(slot: &Slot) -> String {
    let ideal = format_instant(slot.ideal_ms);
    match (&slot.sample, slot.delta_ms) {
        (Some(sample), Some(delta)) => format!(
            "{:<27} {:>8}   {:<12.6} {:<12.6} {:.1}",
            ideal, delta, sample.lat, sample.lon, sample.accuracy
        ),
        _ => format!("{:<27} {:>8}   -", ideal, "gap"),
    }
}

/// Render rows as a fixed-width table with a summary footer.
pub fn format_table(slots: &[Slot]) -> String {
    let gaps = slots.iter().filter(|s| s.is_gap()).count();

    let mut lines = Vec::with_capacity(slots.len() + 2);
    lines.push(HEADER.to_string());
    lines.extend(slots.iter().map(format_row));
    lines.push(format!("{} rows, {} gaps", slots.len(), gaps));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Print rows to stdout.
pub fn draw_ascii(slots: &[Slot]) {
    print!("{}", format_table(slots));
}
