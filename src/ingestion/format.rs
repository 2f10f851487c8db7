//! Recognised table formats and the fixed MIME/extension lookup tables.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Formats a source can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Delimited text, dialect sniffed.
    Csv,
    /// Tab-delimited text.
    Tab,
    /// Spreadsheet workbooks, legacy and OOXML (feature-gated behind `excel`).
    Xls,
    /// OpenDocument spreadsheets (feature-gated behind `excel`).
    Ods,
    /// Markup tables (feature-gated behind `html`).
    Html,
    /// Recognised, but no decoder is bundled.
    Pdf,
    /// Archive whose members are dispatched one by one.
    Zip,
}

/// Spreadsheet OOXML MIME type.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

static MIME_LOOKUP: &[(&str, Format)] = &[
    ("application/x-zip-compressed", Format::Zip),
    ("application/zip", Format::Zip),
    ("text/comma-separated-values", Format::Csv),
    ("application/csv", Format::Csv),
    ("text/csv", Format::Csv),
    ("text/tab-separated-values", Format::Tab),
    ("application/tsv", Format::Tab),
    ("text/tsv", Format::Tab),
    ("application/ms-excel", Format::Xls),
    ("application/xls", Format::Xls),
    ("application/vnd.ms-excel", Format::Xls),
    // Some sniffers report OOXML workbooks as bare octet streams.
    ("application/octet-stream", Format::Xls),
    (XLSX_MIME, Format::Xls),
    ("application/vnd.openxmlformats-officedocument.spreadsheetml.sheetapplication/zip", Format::Xls),
    ("application/vnd.ms-excel.sheet.macroenabled.12", Format::Xls),
    ("application/x-ole-storage", Format::Xls),
    ("application/CDFV2-corrupt", Format::Xls),
    ("text/html", Format::Html),
    // XHTML is often served as XML.
    ("application/xml", Format::Html),
    ("text/xml", Format::Html),
    ("application/xhtml+xml", Format::Html),
    ("application/pdf", Format::Pdf),
    // Could be tab-delimited too; the dialect sniffer sorts that out.
    ("text/plain", Format::Csv),
    ("application/vnd.oasis.opendocument.spreadsheet", Format::Ods),
    ("application/x-vnd.oasis.opendocument.spreadsheet", Format::Ods),
];

// Substrings of free-form sniffer descriptions.
static FUZZY_MIME_LOOKUP: &[(&str, Format)] = &[("Composite Document File V2 Document", Format::Xls)];

static EXTENSION_LOOKUP: &[(&str, Format)] = &[
    ("zip", Format::Zip),
    ("csv", Format::Csv),
    ("tsv", Format::Tab),
    ("tab", Format::Tab),
    ("xls", Format::Xls),
    ("xlsx", Format::Xls),
    ("xlt", Format::Xls),
    ("xlm", Format::Xls),
    ("xlsm", Format::Xls),
    ("xlsb", Format::Xls),
    ("xltx", Format::Xls),
    ("xltm", Format::Xls),
    ("ods", Format::Ods),
    ("htm", Format::Html),
    ("html", Format::Html),
    ("pdf", Format::Pdf),
];

static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(\w*)").expect("valid regex"));

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tab => "TAB",
            Self::Xls => "XLS",
            Self::Ods => "ODS",
            Self::Html => "HTML",
            Self::Pdf => "PDF",
            Self::Zip => "ZIP",
        }
    }

    /// Exact MIME lookup, then the fuzzy description table.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        MIME_LOOKUP
            .iter()
            .find(|(m, _)| *m == mime)
            .or_else(|| FUZZY_MIME_LOOKUP.iter().find(|(m, _)| mime.contains(m)))
            .map(|(_, f)| *f)
    }

    /// Lookup of an already cleaned extension (see [`clean_ext`]).
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSION_LOOKUP.iter().find(|(e, _)| *e == ext).map(|(_, f)| *f)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best guess at the extension in a file name, URL or bare extension, lower-cased.
///
/// ```
/// use anytable::ingestion::clean_ext;
///
/// assert_eq!(clean_ext(""), "");
/// assert_eq!(clean_ext("tsv"), "tsv");
/// assert_eq!(clean_ext("FILE.ZIP"), "zip");
/// assert_eq!(clean_ext("http://myserver.info/file.xlsx?download=True"), "xlsx");
/// ```
pub fn clean_ext(name: &str) -> String {
    let dotted = format!(".{name}");
    EXTENSION_RE
        .captures_iter(&dotted)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}
