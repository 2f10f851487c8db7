//! Unified entry point: detect the format of a source and open it as a [`TableSet`].
//!
//! Detection is a cascade that stops at the first stage that recognises a format:
//!
//! 1. [`DetectOptions::mime_type`], looked up in the fixed MIME table
//! 2. [`DetectOptions::extension`], cleaned with [`clean_ext`] and looked up
//! 3. content sniffing of the leading bytes, when [`DetectOptions::auto_detect`] is on
//!
//! Every stage that was given something and rejected it leaves a diagnostic. When the
//! cascade runs out, the call fails with [`IngestionError::Read`] carrying all of them.

use std::error::Error as StdError;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::rowset::TableSet;

use super::csv::{self, CsvOptions};
use super::format::{clean_ext, Format};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::sniff::detect_mime;
use super::zip;

/// Which cascade stage picked the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStage {
    MimeHint,
    Extension,
    ContentSniff,
}

/// Outcome of [`detect_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub format: Format,
    pub stage: DetectionStage,
    /// Rejections from the stages tried before `stage`.
    pub diagnostics: Vec<String>,
}

/// Options controlling detection and decoding.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct DetectOptions {
    /// MIME type reported by whoever handed over the bytes (e.g. an HTTP header).
    pub mime_type: Option<String>,
    /// File name, URL or bare extension.
    pub extension: Option<String>,
    /// Sniff the content when the hints do not settle the format. Default `true`.
    pub auto_detect: bool,
    /// Sample window for every decoded table; [`crate::rowset::DEFAULT_WINDOW`] when `None`.
    pub window: Option<usize>,
    /// Delimited-text options. `csv.window` takes precedence over `window`.
    pub csv: CsvOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for DetectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectOptions")
            .field("mime_type", &self.mime_type)
            .field("extension", &self.extension)
            .field("auto_detect", &self.auto_detect)
            .field("window", &self.window)
            .field("csv", &self.csv)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            mime_type: None,
            extension: None,
            auto_detect: true,
            window: None,
            csv: CsvOptions::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl DetectOptions {
    fn csv_options(&self) -> CsvOptions {
        let mut csv = self.csv.clone();
        csv.window = csv.window.or(self.window);
        csv
    }
}

/// Run the detection cascade without decoding anything.
///
/// The stream is left at the position it had on entry.
pub fn detect_format<R: Read + Seek + ?Sized>(
    stream: &mut R,
    options: &DetectOptions,
) -> IngestionResult<Detection> {
    let mut diagnostics = Vec::new();
    let found = |format: Format, stage: DetectionStage, diagnostics: Vec<String>| -> IngestionResult<Detection> {
        tracing::debug!(%format, ?stage, "detected format");
        Ok(Detection {
            format,
            stage,
            diagnostics,
        })
    };

    if let Some(mime) = options.mime_type.as_deref() {
        match Format::from_mime(mime) {
            Some(format) => return found(format, DetectionStage::MimeHint, diagnostics),
            None => diagnostics.push(format!("Did not recognise MIME type given: \"{mime}\".")),
        }
    }

    if let Some(given) = options.extension.as_deref() {
        let ext = clean_ext(given);
        if !ext.is_empty() {
            match Format::from_extension(&ext) {
                Some(format) => return found(format, DetectionStage::Extension, diagnostics),
                None => diagnostics.push(format!("Did not recognise extension \"{ext}\" (given \"{given}\").")),
            }
        }
    }

    if options.auto_detect {
        let mime = detect_mime(stream)?;
        match Format::from_mime(&mime) {
            Some(format) => return found(format, DetectionStage::ContentSniff, diagnostics),
            None => diagnostics.push(format!("Did not recognise detected MIME type: \"{mime}\".")),
        }
    }

    if diagnostics.is_empty() {
        return Err(IngestionError::read("Did not attempt any detection."));
    }
    Err(IngestionError::Read {
        message: "could not detect table format".to_owned(),
        diagnostics,
    })
}

/// Decode `stream` (from its current position) with the decoder for `format`.
pub fn open_format<R: Read + Seek + 'static>(
    stream: R,
    format: Format,
    options: &DetectOptions,
) -> IngestionResult<TableSet> {
    match format {
        Format::Csv => csv::csv_table_set(stream, &options.csv_options()),
        Format::Tab => csv::tab_table_set(stream, &options.csv_options()),
        Format::Xls | Format::Ods => open_workbook(stream, options.window),
        Format::Html => open_markup(stream, options.window),
        Format::Pdf => Err(IngestionError::read(
            "PDF tables are recognised but no PDF decoder is bundled",
        )),
        Format::Zip => zip::zip_table_set(stream, options),
    }
}

/// Detect the format of `stream` and decode it.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` with the number of tables
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use anytable::ingestion::{detect_and_open, DetectOptions};
///
/// # fn main() -> Result<(), anytable::IngestionError> {
/// let bytes = b"date,temperature\n2011-01-01,3\n2011-01-02,-1\n".to_vec();
/// let tables = detect_and_open(Cursor::new(bytes), &DetectOptions::default())?;
/// assert_eq!(tables.len(), 1);
/// assert_eq!(tables.tables()[0].sample().count(), 3);
/// # Ok(())
/// # }
/// ```
///
/// ## Hints
///
/// ```
/// use std::io::Cursor;
///
/// use anytable::ingestion::{detect_and_open, DetectOptions};
///
/// # fn main() -> Result<(), anytable::IngestionError> {
/// let opts = DetectOptions {
///     mime_type: Some("text/tab-separated-values".to_string()),
///     ..Default::default()
/// };
/// let tables = detect_and_open(Cursor::new(b"a\tb\n1\t2\n".to_vec()), &opts)?;
/// let first = tables.tables()[0].sample().next().unwrap();
/// assert_eq!(first.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn detect_and_open<R: Read + Seek + 'static>(stream: R, options: &DetectOptions) -> IngestionResult<TableSet> {
    let source = options.extension.clone().unwrap_or_else(|| "<stream>".to_owned());
    open_reported(stream, options, source)
}

/// Open a file and dispatch it, using its name as the extension hint unless one is given.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use anytable::ingestion::{open_path, DetectOptions, IngestionSeverity, StdErrObserver};
///
/// # fn main() -> Result<(), anytable::IngestionError> {
/// let opts = DetectOptions {
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: IngestionSeverity::Critical,
///     ..Default::default()
/// };
/// let tables = open_path("downloads/budget.xlsx", &opts)?;
/// for table in tables.tables() {
///     println!("{}: {} sampled rows", table.name(), table.sample().count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn open_path(path: impl AsRef<Path>, options: &DetectOptions) -> IngestionResult<TableSet> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let mut options = options.clone();
    if options.extension.is_none() {
        options.extension = path.file_name().and_then(|n| n.to_str()).map(str::to_owned);
    }

    match File::open(path) {
        Ok(file) => open_reported(BufReader::new(file), &options, source),
        Err(e) => {
            let result = Err(IngestionError::from(e));
            report(&options, &IngestionContext { source, format: None }, &result);
            result
        }
    }
}

fn open_reported<R: Read + Seek + 'static>(
    mut stream: R,
    options: &DetectOptions,
    source: String,
) -> IngestionResult<TableSet> {
    let (format, result) = match detect_format(&mut stream, options) {
        Ok(detection) => {
            for rejected in &detection.diagnostics {
                tracing::debug!(source = %source, "{rejected}");
            }
            (Some(detection.format), open_format(stream, detection.format, options))
        }
        Err(e) => (None, Err(e)),
    };
    report(options, &IngestionContext { source, format }, &result);
    result
}

fn report(options: &DetectOptions, ctx: &IngestionContext, result: &IngestionResult<TableSet>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(tables) => obs.on_success(ctx, IngestionStats { tables: tables.len() }),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Severity an observer sees for `e`: I/O failures are critical, undecodable content is
/// an error, and lookup misses are warnings.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(err) => chain_severity(err),
        IngestionError::Zip(::zip::result::ZipError::Io(_)) => IngestionSeverity::Critical,
        IngestionError::Zip(err) => chain_severity(err),
        IngestionError::Read { .. } => IngestionSeverity::Error,
        IngestionError::TableNotFound { .. }
        | IngestionError::AmbiguousTable { .. }
        | IngestionError::NoSuchProperty { .. } => IngestionSeverity::Warning,
    }
}

// Decoder errors often wrap I/O, but not always in a structured way.
fn chain_severity(e: &(dyn StdError + 'static)) -> IngestionSeverity {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return IngestionSeverity::Critical;
        }
        cur = err.source();
    }
    IngestionSeverity::Error
}

fn open_workbook<R: Read>(stream: R, window: Option<usize>) -> IngestionResult<TableSet> {
    #[cfg(feature = "excel")]
    {
        super::excel::workbook_table_set(stream, window)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (stream, window);
        Err(IngestionError::read(
            "spreadsheet decoding not enabled (enable cargo feature 'excel')",
        ))
    }
}

fn open_markup<R: Read>(stream: R, window: Option<usize>) -> IngestionResult<TableSet> {
    #[cfg(feature = "html")]
    {
        super::html::html_table_set(stream, window)
    }

    #[cfg(not(feature = "html"))]
    {
        let _ = (stream, window);
        Err(IngestionError::read(
            "markup-table decoding not enabled (enable cargo feature 'html')",
        ))
    }
}
