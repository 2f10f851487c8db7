//! Core data model: values, cell types, cells and rows.
//!
//! A [`Cell`] is one decoded value plus its [`CellType`]. Processors receive rows by value
//! and hand back the rows they produce.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, NaiveTime};

use crate::dates;
use crate::error::{IngestionError, IngestionResult};

/// A single decoded scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/absent value.
    Null,
    /// Text, as decoded from the source.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(BigDecimal),
    /// Date (with time of day; midnight when the source had none).
    Date(NaiveDateTime),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// Borrow the text payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// `true` for [`Value::Null`] and for blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Date(dt) if dt.time() == NaiveTime::MIN => write!(f, "{}", dt.format("%Y-%m-%d")),
            Value::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Type tag attached to every cell.
///
/// Two `Date` tags are equal only when their formats match (or both are format-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Free text; accepts anything.
    String,
    /// Whole numbers without a decimal point or exponent.
    Integer,
    /// Floating point numbers.
    Float,
    /// Decimal numbers kept at full precision.
    Decimal,
    /// Dates, optionally pinned to a strftime format.
    Date(Option<String>),
    /// `true`/`false`/`yes`/`no` (case-insensitive).
    Bool,
}

impl CellType {
    /// Short lowercase name, e.g. for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CellType::String => "string",
            CellType::Integer => "integer",
            CellType::Float => "float",
            CellType::Decimal => "decimal",
            CellType::Date(_) => "date",
            CellType::Bool => "bool",
        }
    }

    /// The canonical absent value for this type.
    pub fn empty_value(&self) -> Value {
        match self {
            CellType::String => Value::Text(String::new()),
            _ => Value::Null,
        }
    }

    /// Does `value` fit this type?
    ///
    /// Already typed values are accepted by their own type and by every wider type.
    pub fn test(&self, value: &Value) -> bool {
        match (self, value) {
            (CellType::String, _) => true,
            (_, Value::Null) => false,
            (_, Value::Text(s)) => self.parse(s).is_some(),
            (CellType::Integer, Value::Integer(_)) => true,
            (CellType::Float | CellType::Decimal, Value::Integer(_) | Value::Float(_) | Value::Decimal(_)) => {
                true
            }
            (CellType::Date(_), Value::Date(_)) => true,
            (CellType::Bool, Value::Bool(_)) => true,
            _ => false,
        }
    }

    /// Convert `value` into this type's native representation.
    ///
    /// A value that does not fit becomes [`CellType::empty_value`]; casting never fails.
    pub fn cast(&self, value: &Value) -> Value {
        if value.is_empty() {
            return self.empty_value();
        }
        let cast = match (self, value) {
            (CellType::String, Value::Text(s)) => Some(Value::Text(s.clone())),
            (CellType::String, other) => Some(Value::Text(other.to_string())),
            (_, Value::Text(s)) => self.parse(s),
            (CellType::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
            (CellType::Integer, Value::Float(f)) if f.fract() == 0.0 => Some(Value::Integer(*f as i64)),
            (CellType::Float, Value::Integer(i)) => Some(Value::Float(*i as f64)),
            (CellType::Float, Value::Float(f)) => Some(Value::Float(*f)),
            (CellType::Float, Value::Decimal(d)) => d.to_string().parse().ok().map(Value::Float),
            (CellType::Decimal, Value::Integer(i)) => Some(Value::Decimal(BigDecimal::from(*i))),
            (CellType::Decimal, Value::Float(f)) => BigDecimal::from_str(&f.to_string()).ok().map(Value::Decimal),
            (CellType::Decimal, Value::Decimal(d)) => Some(Value::Decimal(d.clone())),
            (CellType::Date(_), Value::Date(dt)) => Some(Value::Date(*dt)),
            (CellType::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
            _ => None,
        };
        cast.unwrap_or_else(|| self.empty_value())
    }

    fn parse(&self, raw: &str) -> Option<Value> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        match self {
            CellType::String => Some(Value::Text(raw.to_owned())),
            CellType::Integer => parse_integer(s).map(Value::Integer),
            CellType::Float => parse_float(s).map(Value::Float),
            CellType::Decimal => parse_decimal(s).map(Value::Decimal),
            CellType::Date(Some(format)) => dates::parse_date(s, format).map(Value::Date),
            CellType::Date(None) => dates::parse_any_date(s).map(Value::Date),
            CellType::Bool => parse_bool(s).map(Value::Bool),
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellType::Date(Some(format)) => write!(f, "date({format})"),
            other => f.write_str(other.name()),
        }
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.strip_prefix('+').unwrap_or(s).parse().ok()
}

// Rejects "inf"/"nan" and friends, which `f64::from_str` would otherwise accept.
fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn parse_float(s: &str) -> Option<f64> {
    if !looks_numeric(s) {
        return None;
    }
    s.parse().ok()
}

fn parse_decimal(s: &str) -> Option<BigDecimal> {
    if !looks_numeric(s) {
        return None;
    }
    BigDecimal::from_str(s).ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Decoded value.
    pub value: Value,
    /// Type tag (assigned by the decoder or by a types processor).
    pub cell_type: CellType,
    /// Column name, once a headers processor has run.
    pub column: Option<String>,
    properties: BTreeMap<String, String>,
}

impl Cell {
    /// Create a cell with an explicit type.
    pub fn new(value: Value, cell_type: CellType) -> Self {
        Self {
            value,
            cell_type,
            column: None,
            properties: BTreeMap::new(),
        }
    }

    /// Create a [`CellType::String`] cell holding `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Value::Text(text.into()), CellType::String)
    }

    /// Copy of this cell with `column` set.
    pub fn with_column(mut self, column: Option<String>) -> Self {
        self.column = column;
        self
    }

    /// Copy of this cell with an extra decoder-specific property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// `true` when the value is absent (null or blank text). `0` is not empty.
    pub fn empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Look up a decoder-specific property (e.g. the markup tag of an HTML cell).
    pub fn property(&self, name: &str) -> IngestionResult<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| IngestionError::NoSuchProperty { name: name.to_owned() })
    }

    /// All properties set on this cell.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// A row is an ordered list of cells; widths may differ between rows.
pub type Row = Vec<Cell>;
