//! Table-schema export of guessed headers and types.
//!
//! Produces the JSON Table Schema shape: `{"fields": [{"id", "label", "type"}]}` with
//! type names `string`, `integer`, `number`, `date` and `boolean`.

use serde::{Deserialize, Serialize};

use crate::inference::{headers_guess, type_guess};
use crate::rowset::RowSet;
use crate::types::CellType;

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Schema type name of a cell type.
pub fn schema_type_name(cell_type: &CellType) -> &'static str {
    match cell_type {
        CellType::String => "string",
        CellType::Integer => "integer",
        CellType::Float | CellType::Decimal => "number",
        CellType::Date(_) => "date",
        CellType::Bool => "boolean",
    }
}

/// Pair headers and types by position. Extra entries on either side are dropped.
pub fn headers_and_types_as_schema<S: AsRef<str>>(headers: &[S], types: &[CellType]) -> TableSchema {
    TableSchema {
        fields: headers
            .iter()
            .zip(types)
            .map(|(header, cell_type)| SchemaField {
                id: header.as_ref().to_owned(),
                label: header.as_ref().to_owned(),
                field_type: schema_type_name(cell_type).to_owned(),
            })
            .collect(),
    }
}

/// Guess the header row and column types of `rowset`'s sample and export them.
///
/// Types are guessed from the sampled rows below the header only.
pub fn rowset_as_schema(rowset: &RowSet) -> TableSchema {
    let (offset, headers) = headers_guess(rowset.sample());
    let types = type_guess(rowset.sample().skip(offset + 1), false);
    headers_and_types_as_schema(&headers, &types)
}
