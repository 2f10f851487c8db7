//! Delimited-text dialects: sniffing from a text sample and per-field overrides.

use std::io::{self, Read};

/// Candidate delimiters, in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

const SNIFF_RECORDS: usize = 50;

/// Record terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// Any of `\r\n`, `\n` or `\r`.
    #[default]
    CrLf,
    /// Exactly this byte.
    Byte(u8),
}

/// How a delimited-text source is split into records and fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    /// `""` inside a quoted field is a literal quote. When off, `\` escapes instead.
    pub double_quote: bool,
    pub line_terminator: LineTerminator,
    /// Drop spaces that directly follow a delimiter.
    pub skip_initial_space: bool,
}

impl Default for Dialect {
    /// The spreadsheet-export dialect: comma, double quote, doubled quotes.
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            double_quote: true,
            line_terminator: LineTerminator::CrLf,
            skip_initial_space: false,
        }
    }
}

/// Caller-supplied dialect fields; each `Some` replaces the sniffed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialectOverrides {
    pub delimiter: Option<u8>,
    pub quote: Option<u8>,
    pub double_quote: Option<bool>,
    pub line_terminator: Option<LineTerminator>,
    pub skip_initial_space: Option<bool>,
}

impl DialectOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Dialect {
    /// Merge overrides field by field.
    pub fn with_overrides(self, o: &DialectOverrides) -> Self {
        Self {
            delimiter: o.delimiter.unwrap_or(self.delimiter),
            quote: o.quote.unwrap_or(self.quote),
            double_quote: o.double_quote.unwrap_or(self.double_quote),
            line_terminator: o.line_terminator.unwrap_or(self.line_terminator),
            skip_initial_space: o.skip_initial_space.unwrap_or(self.skip_initial_space),
        }
    }

    /// A `csv` reader configured for this dialect. Rows may be ragged; nothing is a header.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut b = csv::ReaderBuilder::new();
        b.has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(self.double_quote)
            .terminator(match self.line_terminator {
                LineTerminator::CrLf => csv::Terminator::CRLF,
                LineTerminator::Byte(t) => csv::Terminator::Any(t),
            });
        if !self.double_quote {
            b.escape(Some(b'\\'));
        }
        b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    Escaped,
    ClosingQuote,
}

/// Drops spaces at the start of every unquoted field position, before the text is split.
///
/// Quoted content is passed through untouched, so `a, "b, c"` yields `a` and `b, c`.
/// Expects UTF-8 (or any ASCII-compatible) input.
#[derive(Debug)]
pub struct InitialSpaceSkipper<R> {
    inner: R,
    delimiter: u8,
    quote: u8,
    double_quote: bool,
    terminator: LineTerminator,
    state: FieldState,
}

impl<R: Read> InitialSpaceSkipper<R> {
    pub fn new(inner: R, dialect: &Dialect) -> Self {
        Self {
            inner,
            delimiter: dialect.delimiter,
            quote: dialect.quote,
            double_quote: dialect.double_quote,
            terminator: dialect.line_terminator,
            state: FieldState::Start,
        }
    }

    fn ends_field(&self, b: u8) -> bool {
        b == self.delimiter
            || match self.terminator {
                LineTerminator::CrLf => b == b'\n' || b == b'\r',
                LineTerminator::Byte(t) => b == t,
            }
    }

    // Advance over one byte; `false` means drop it.
    fn step(&mut self, b: u8) -> bool {
        use FieldState::*;
        self.state = match self.state {
            Start if b == b' ' => return false,
            Start if b == self.quote => Quoted,
            Quoted if b == b'\\' && !self.double_quote => Escaped,
            Quoted if b == self.quote => {
                if self.double_quote {
                    ClosingQuote
                } else {
                    Unquoted
                }
            }
            Quoted => Quoted,
            Escaped => Quoted,
            ClosingQuote if b == self.quote => Quoted,
            Start | Unquoted | ClosingQuote => {
                if self.ends_field(b) {
                    Start
                } else {
                    Unquoted
                }
            }
        };
        true
    }
}

impl<R: Read> Read for InitialSpaceSkipper<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }
            let mut kept = 0;
            for i in 0..n {
                let b = buf[i];
                if self.step(b) {
                    buf[kept] = b;
                    kept += 1;
                }
            }
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}

#[derive(Default)]
struct Tally {
    per_record: Vec<[usize; 4]>,
    spaced: [usize; 4],
}

/// Sniff a dialect from decoded sample text.
///
/// The delimiter is the candidate that occurs most consistently per record outside quoted
/// fields (mean count over one plus its standard deviation). Text without any candidate
/// delimiter keeps the default comma. A sample whose last record may be cut off should
/// be passed whole; the final unterminated record is ignored when others exist.
pub fn sniff(sample: &str) -> Dialect {
    let quote = sniff_quote(sample);
    let tally = tally(sample, quote);

    let mut best: Option<(usize, f64)> = None;
    for (i, _) in CANDIDATE_DELIMITERS.iter().enumerate() {
        let counts: Vec<f64> = tally.per_record.iter().map(|r| r[i] as f64).collect();
        if counts.is_empty() {
            break;
        }
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        if mean == 0.0 {
            continue;
        }
        let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let score = mean / (1.0 + variance.sqrt());
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((i, score));
        }
    }

    let mut dialect = Dialect {
        quote,
        ..Dialect::default()
    };
    if let Some((i, _)) = best {
        dialect.delimiter = CANDIDATE_DELIMITERS[i];
        let total: usize = tally.per_record.iter().map(|r| r[i]).sum();
        dialect.skip_initial_space = total > 0 && tally.spaced[i] == total;
    }
    dialect
}

// `"` unless `'` opens more fields.
fn sniff_quote(sample: &str) -> u8 {
    let opens = |q: char| {
        let mut prev: Option<char> = None;
        let mut n = 0;
        for c in sample.chars() {
            if c == q {
                let at_field_start = match prev {
                    None | Some('\n') | Some('\r') => true,
                    Some(p) => p.is_ascii() && CANDIDATE_DELIMITERS.contains(&(p as u8)),
                };
                if at_field_start {
                    n += 1;
                }
            }
            if c != ' ' {
                prev = Some(c);
            }
        }
        n
    };
    if opens('\'') > opens('"') { b'\'' } else { b'"' }
}

fn tally(sample: &str, quote: u8) -> Tally {
    let mut t = Tally::default();
    let mut current = [0usize; 4];
    let mut in_quotes = false;
    let mut after: Option<usize> = None;
    let mut pending = false;

    for b in sample.bytes() {
        if let Some(i) = after.take() {
            if b == b' ' {
                t.spaced[i] += 1;
            }
        }
        if b == quote {
            in_quotes = !in_quotes;
            pending = true;
            continue;
        }
        if in_quotes {
            continue;
        }
        match b {
            b'\n' | b'\r' => {
                if pending {
                    t.per_record.push(current);
                    if t.per_record.len() == SNIFF_RECORDS {
                        return t;
                    }
                }
                current = [0; 4];
                pending = false;
            }
            _ => {
                pending = true;
                if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|d| *d == b) {
                    current[i] += 1;
                    after = Some(i);
                }
            }
        }
    }
    if pending && t.per_record.is_empty() {
        t.per_record.push(current);
    }
    t
}
