use thiserror::Error;

/// Convenience result type for reading and inspecting tables.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned across detection, decoding and table lookup.
///
/// Every failure this crate reports is one of these variants. Use [`IngestionError::kind`]
/// to catch broadly (read vs. table lookup vs. property lookup) instead of matching variants.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, truncated stream).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Archive container could not be opened or enumerated.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The content could not be read as the expected format.
    ///
    /// `diagnostics` carries one entry per rejected detection attempt or archive member.
    #[error("read error: {message}{}", render_diagnostics(.diagnostics))]
    Read {
        message: String,
        diagnostics: Vec<String>,
    },

    /// No table with the requested name exists in the table set.
    #[error("no table named '{name}'")]
    TableNotFound { name: String },

    /// More than one table carries the requested name.
    #[error("{count} tables named '{name}'")]
    AmbiguousTable { name: String, count: usize },

    /// A requested optional property is not set.
    #[error("no property named '{name}'")]
    NoSuchProperty { name: String },
}

/// Coarse classification of [`IngestionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bytes or structure could not be parsed as the expected format.
    Read,
    /// A table lookup failed.
    Table,
    /// A property lookup failed.
    Property,
}

impl IngestionError {
    /// Build a [`IngestionError::Read`] without diagnostics.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableNotFound { .. } | Self::AmbiguousTable { .. } => ErrorKind::Table,
            Self::NoSuchProperty { .. } => ErrorKind::Property,
            _ => ErrorKind::Read,
        }
    }

    /// Per-attempt failure reasons collected while detecting or unpacking a source.
    pub fn diagnostics(&self) -> &[String] {
        match self {
            Self::Read { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

fn render_diagnostics(diagnostics: &[String]) -> String {
    if diagnostics.is_empty() {
        return String::new();
    }
    format!(" ({})", diagnostics.join("; "))
}
