//! Header row detection.
//!
//! Every non-blank sample row is scored as `width * (1 + contrast)`:
//!
//! - `width` is 1.0 when the row's non-empty cell count equals the modal count of the
//!   sample and falls off linearly with the distance from it (banner rows score low).
//! - `contrast` is the row's share of purely textual cells minus the mean share over the
//!   rows just below it. Header rows are text over data that mostly is not.
//!
//! Rows are scanned top to bottom and a later row replaces the current best only if it
//! scores more than [`LATER_ROW_MARGIN`] higher, so near-ties resolve to the earliest row.

use crate::inference::GUESS_ORDER;
use crate::types::{Cell, CellType, Value};

/// How many rows below a candidate are compared against it.
pub const LOOKAHEAD: usize = 10;

/// Score lead a later row needs over the current best.
pub const LATER_ROW_MARGIN: f64 = 0.25;

fn non_empty(row: &[Cell]) -> usize {
    row.iter().filter(|c| !c.empty()).count()
}

// Text that does not parse as any of the more specific types.
fn is_textual(cell: &Cell) -> bool {
    matches!(cell.value, Value::Text(_))
        && !cell.empty()
        && !GUESS_ORDER
            .iter()
            .filter(|t| **t != CellType::String)
            .any(|t| t.test(&cell.value))
}

fn text_share(row: &[Cell]) -> f64 {
    let filled = non_empty(row);
    if filled == 0 {
        return 0.0;
    }
    row.iter().filter(|c| is_textual(c)).count() as f64 / filled as f64
}

/// Most common non-empty cell count among rows that have any values; 0 if none do.
///
/// Ties go to the wider count.
pub fn column_count_modal<R: AsRef<[Cell]>>(rows: &[R]) -> usize {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for row in rows {
        let filled = non_empty(row.as_ref());
        if filled == 0 {
            continue;
        }
        match counts.iter_mut().find(|(width, _)| *width == filled) {
            Some((_, n)) => *n += 1,
            None => counts.push((filled, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|&(width, n)| (n, width))
        .map(|(width, _)| width)
        .unwrap_or(0)
}

/// Guess the header row of a sample.
///
/// Returns the 0-based offset of the most probable header row and its cell values as
/// text. An empty or all-blank sample yields `(0, vec![])`.
pub fn headers_guess<I, R>(rows: I) -> (usize, Vec<String>)
where
    I: IntoIterator<Item = R>,
    R: AsRef<[Cell]>,
{
    let rows: Vec<R> = rows.into_iter().collect();
    let modal = column_count_modal(&rows);
    if modal == 0 {
        return (0, Vec::new());
    }

    let shares: Vec<Option<f64>> = rows
        .iter()
        .map(|r| (non_empty(r.as_ref()) > 0).then(|| text_share(r.as_ref())))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for (i, row) in rows.iter().enumerate() {
        let filled = non_empty(row.as_ref());
        if filled == 0 {
            continue;
        }
        let width = 1.0 - (filled as f64 - modal as f64).abs() / modal as f64;
        if width <= 0.0 {
            continue;
        }

        let below: Vec<f64> = shares[i + 1..].iter().flatten().take(LOOKAHEAD).copied().collect();
        let contrast = if below.is_empty() {
            0.0
        } else {
            shares[i].unwrap_or(0.0) - below.iter().sum::<f64>() / below.len() as f64
        };

        let score = width * (1.0 + contrast);
        match best {
            Some((_, best_score)) if score <= best_score + LATER_ROW_MARGIN => {}
            _ => best = Some((i, score)),
        }
    }

    match best {
        Some((offset, _)) => {
            let headers = rows[offset].as_ref().iter().map(|c| c.value.to_string()).collect();
            (offset, headers)
        }
        None => (0, Vec::new()),
    }
}
