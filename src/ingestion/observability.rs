//! Callbacks fired by [`super::unified`] after each dispatch attempt.
//!
//! Every attempt ends in exactly one `on_success` or `on_failure`. A failure whose
//! [`IngestionSeverity`] reaches `DetectOptions::alert_at_or_above` goes to `on_alert` instead.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;

use super::format::Format;

/// How bad a failed open was. Ordered, so thresholds compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    /// A name or index lookup missed; the source itself decoded.
    Warning,
    /// The bytes could not be decoded as any supported format.
    Error,
    /// The source could not be read at all.
    Critical,
}

/// The source a callback refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    /// File path, or a short description of an in-memory stream.
    pub source: String,
    /// `None` when no format accepted the source.
    pub format: Option<Format>,
}

/// Reported with `on_success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub tables: usize,
}

/// Receives dispatch outcomes. All methods default to doing nothing, except
/// [`Self::on_alert`], which falls back to [`Self::on_failure`].
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

// One outcome, rendered the same way by the text sinks below.
enum Outcome<'a> {
    Opened(IngestionStats),
    Failed(IngestionSeverity, &'a IngestionError),
    Alert(IngestionSeverity, &'a IngestionError),
}

impl Outcome<'_> {
    fn render(&self, ctx: &IngestionContext) -> String {
        let format = ctx.format.map_or("unknown", |f| f.name());
        match self {
            Outcome::Opened(stats) => {
                format!("ok format={format} source={} tables={}", ctx.source, stats.tables)
            }
            Outcome::Failed(severity, error) => {
                format!("fail severity={severity:?} format={format} source={} err={error}", ctx.source)
            }
            Outcome::Alert(severity, error) => {
                format!("ALERT severity={severity:?} format={format} source={} err={error}", ctx.source)
            }
        }
    }
}

/// Forwards every callback to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    fn each(&self, f: impl Fn(&dyn IngestionObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints one `[anytable] ...` line per outcome to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[anytable] {}", Outcome::Opened(stats).render(ctx));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[anytable] {}", Outcome::Failed(severity, error).render(ctx));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[anytable] {}", Outcome::Alert(severity, error).render(ctx));
    }
}

/// Emits `tracing` events: `info` on success, `warn` on failure, `error` on alert.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(format = ?ctx.format, source = %ctx.source, tables = stats.tables, "opened");
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            format = ?ctx.format,
            source = %ctx.source,
            severity = ?severity,
            diagnostics = error.diagnostics().len(),
            "open failed: {error}"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(format = ?ctx.format, source = %ctx.source, severity = ?severity, "{error}");
    }
}

/// Appends timestamped outcome lines to a file. I/O errors on the log itself are dropped.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn record(&self, ctx: &IngestionContext, outcome: Outcome<'_>) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let line = format!("{secs} {}\n", outcome.render(ctx));

        let _guard = self.lock.lock();
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(e) = appended {
            tracing::debug!(path = %self.path.display(), "observer log not written: {e}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.record(ctx, Outcome::Opened(stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(ctx, Outcome::Alert(severity, error));
    }
}
