//! Column type inference.
//!
//! For every column the candidate types are tried from most to least specific
//! ([`GUESS_ORDER`]). A candidate survives only if every non-empty sample value in the
//! column parses under it; the first survivor wins. Columns with no values at all are
//! [`CellType::String`].
//!
//! Dates additionally have to agree on a format. Each value picks the first catalogue
//! format that parses it (or the format carried by an already typed date cell). When all
//! values agree the column gets `Date(Some(format))`; when they disagree the date
//! candidate is dropped and the next survivor wins, usually `String`.
//!
//! Lenient mode parses text with surrounding whitespace trimmed. Strict mode takes text as
//! written, so a padded value such as `" 12"` only fits `String`.

use crate::dates;
use crate::types::{Cell, CellType, Value};

const CANDIDATES: usize = 5;

/// Candidate order, most specific first. Dates are refined per column.
pub const GUESS_ORDER: [CellType; CANDIDATES] = [
    CellType::Bool,
    CellType::Date(None),
    CellType::Integer,
    CellType::Float,
    CellType::String,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum DateFormats {
    Unseen,
    Agreed(Option<String>),
    Mixed,
}

#[derive(Debug, Clone)]
struct ColumnGuess {
    alive: [bool; CANDIDATES],
    dates: DateFormats,
    seen_value: bool,
    strict: bool,
}

impl ColumnGuess {
    fn new(strict: bool) -> Self {
        Self {
            alive: [true; CANDIDATES],
            dates: DateFormats::Unseen,
            seen_value: false,
            strict,
        }
    }

    fn observe(&mut self, cell: &Cell) {
        if cell.empty() {
            return;
        }
        self.seen_value = true;
        let padded = self.strict && matches!(&cell.value, Value::Text(s) if s.trim() != s);
        for (alive, candidate) in self.alive.iter_mut().zip(GUESS_ORDER.iter()) {
            if !*alive {
                continue;
            }
            *alive = match candidate {
                CellType::String => true,
                _ if padded => false,
                CellType::Date(_) => match date_format_of(cell) {
                    Some(format) => {
                        self.dates = match std::mem::replace(&mut self.dates, DateFormats::Mixed) {
                            DateFormats::Unseen => DateFormats::Agreed(format),
                            DateFormats::Agreed(seen) if seen == format => DateFormats::Agreed(seen),
                            _ => DateFormats::Mixed,
                        };
                        true
                    }
                    None => false,
                },
                other => other.test(&cell.value),
            };
        }
    }

    fn resolve(self) -> CellType {
        if !self.seen_value {
            return CellType::String;
        }
        for (alive, candidate) in self.alive.iter().zip(GUESS_ORDER.iter()) {
            if !*alive {
                continue;
            }
            match (candidate, &self.dates) {
                (CellType::Date(_), DateFormats::Agreed(format)) => return CellType::Date(format.clone()),
                (CellType::Date(_), _) => continue,
                (other, _) => return other.clone(),
            }
        }
        CellType::String
    }
}

// `Some(format)` when the cell is a date; the inner option is the format it matched.
fn date_format_of(cell: &Cell) -> Option<Option<String>> {
    match (&cell.value, &cell.cell_type) {
        (Value::Date(_), CellType::Date(format)) => Some(format.clone()),
        (Value::Date(_), _) => Some(None),
        (Value::Text(s), _) => dates::guess_date_format(s).map(|f| Some(f.to_owned())),
        _ => None,
    }
}

/// Guess one type per column over `rows`.
///
/// The result is as wide as the widest row; ragged rows simply contribute nothing to the
/// columns they lack. See the module docs for the `strict` flag.
pub fn type_guess<I, R>(rows: I, strict: bool) -> Vec<CellType>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[Cell]>,
{
    let mut columns: Vec<ColumnGuess> = Vec::new();
    for row in rows {
        let row = row.as_ref();
        if row.len() > columns.len() {
            columns.resize_with(row.len(), || ColumnGuess::new(strict));
        }
        for (guess, cell) in columns.iter_mut().zip(row) {
            guess.observe(cell);
        }
    }
    columns.into_iter().map(ColumnGuess::resolve).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{types_processor, Processor};
    use crate::types::Row;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|r| r.iter().map(|v| Cell::text(*v)).collect())
            .collect()
    }

    #[test]
    fn integer_column_stays_integer() {
        let sample = rows(&[&["1"], &["2"], &["-3"]]);
        assert_eq!(type_guess(&sample, false), vec![CellType::Integer]);
    }

    #[test]
    fn one_decimal_value_promotes_to_float() {
        let sample = rows(&[&["1"], &["2.5"], &["3"]]);
        assert_eq!(type_guess(&sample, false), vec![CellType::Float]);
        assert_eq!(type_guess(&sample, true), vec![CellType::Float]);
    }

    #[test]
    fn one_alphabetic_value_demotes_to_string() {
        let sample = rows(&[&["1"], &["abc"], &["3"]]);
        assert_eq!(type_guess(&sample, false), vec![CellType::String]);
        assert_eq!(type_guess(&sample, true), vec![CellType::String]);
    }

    #[test]
    fn empty_cells_are_ignored_and_empty_columns_are_strings() {
        let sample = rows(&[&["1", ""], &["", " "], &["3", ""]]);
        assert_eq!(type_guess(&sample, true), vec![CellType::Integer, CellType::String]);
    }

    #[test]
    fn result_is_as_wide_as_widest_row() {
        let sample = rows(&[&["a"], &["b", "1", "yes"], &["c", "2"]]);
        assert_eq!(
            type_guess(&sample, false),
            vec![CellType::String, CellType::Integer, CellType::Bool]
        );
    }

    #[test]
    fn bools_and_dates_beat_wider_types() {
        let sample = rows(&[&["true", "2011-01-01"], &["No", "2011-01-02"]]);
        assert_eq!(
            type_guess(&sample, true),
            vec![CellType::Bool, CellType::Date(Some("%Y-%m-%d".into()))]
        );
    }

    #[test]
    fn mixed_date_formats_fall_back_to_string() {
        let sample = rows(&[&["2011-01-01"], &["02.01.2011"]]);
        assert_eq!(type_guess(&sample, false), vec![CellType::String]);
        assert_eq!(type_guess(&sample, true), vec![CellType::String]);

        let agreeing = rows(&[&["2011-01-05"], &["2011-02-01"]]);
        assert_eq!(type_guess(&agreeing, false), vec![CellType::Date(Some("%Y-%m-%d".into()))]);
    }

    #[test]
    fn padded_values_only_fit_in_lenient_mode() {
        let sample = rows(&[&[" 12", "yes "], &["7", "no"]]);
        assert_eq!(type_guess(&sample, false), vec![CellType::Integer, CellType::Bool]);
        assert_eq!(type_guess(&sample, true), vec![CellType::String, CellType::String]);
    }

    #[test]
    fn null_cells_count_as_empty() {
        let mut sample = rows(&[&["1"], &["x"], &["2"]]);
        sample[1][0].value = Value::Null;
        assert_eq!(type_guess(&sample, true), vec![CellType::Integer]);
    }

    #[test]
    fn guessing_cast_output_gives_same_types() {
        let sample = rows(&[
            &["2011-01-01", "3", "1.5", "yes", "Galway"],
            &["2011-01-02", "-1", "2", "no", "Cork"],
        ]);
        let types = type_guess(&sample, false);
        let p = types_processor(types.clone());
        let cast: Vec<Row> = sample.into_iter().filter_map(|r| p.process(0, r)).collect();
        assert_eq!(type_guess(&cast, false), types);
        assert_eq!(type_guess(&cast, true), types);
    }
}
