//! Archives of tables: every member is dispatched on its own.

use std::io::{Cursor, Read, Seek};

use ::zip::ZipArchive;

use crate::error::{IngestionError, IngestionResult};
use crate::rowset::TableSet;

use super::csv::CsvOptions;
use super::unified::{detect_and_open, DetectOptions};

const MACOS_METADATA: &str = "__MACOSX";

/// Decode every member of a ZIP archive and merge their tables in archive order.
///
/// Members are dispatched by their own extension, falling back to content sniffing.
/// Delimited-text members produce a table named after the member path. A member that
/// fails to decode is recorded as a diagnostic; the archive fails only when no member
/// produced a table.
pub fn zip_table_set<R: Read + Seek>(stream: R, options: &DetectOptions) -> IngestionResult<TableSet> {
    let mut archive = ZipArchive::new(stream)?;
    let mut tables = Vec::new();
    let mut skipped = Vec::new();

    for i in 0..archive.len() {
        let (name, bytes) = match read_member(&mut archive, i) {
            Ok(Some(member)) => member,
            Ok(None) => continue,
            Err((name, e)) => {
                tracing::warn!(member = %name, error = %e, "unreadable archive member");
                skipped.push(format!("{name}: {e}"));
                continue;
            }
        };

        let member_options = DetectOptions {
            mime_type: None,
            extension: member_extension(&name).map(str::to_owned),
            auto_detect: true,
            window: options.window,
            csv: CsvOptions {
                name: Some(name.clone()),
                ..options.csv.clone()
            },
            observer: None,
            alert_at_or_above: options.alert_at_or_above,
        };
        match detect_and_open(Cursor::new(bytes), &member_options) {
            Ok(found) => {
                tracing::debug!(member = %name, tables = found.len(), "decoded archive member");
                tables.extend(found);
            }
            Err(e) => {
                tracing::warn!(member = %name, error = %e, "skipping archive member");
                skipped.push(format!("{name}: {e}"));
            }
        }
    }

    if tables.is_empty() {
        return Err(IngestionError::Read {
            message: "archive has no recognised tables".to_owned(),
            diagnostics: skipped,
        });
    }
    Ok(TableSet::new(tables))
}

type Member = (String, Vec<u8>);

// `Ok(None)` for directories and metadata.
fn read_member<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<Option<Member>, (String, IngestionError)> {
    let mut file = archive
        .by_index(index)
        .map_err(|e| (format!("#{index}"), IngestionError::from(e)))?;
    let name = file.name().to_owned();
    if file.is_dir() || name.contains(MACOS_METADATA) {
        return Ok(None);
    }
    let mut bytes = Vec::with_capacity(file.size().min(1 << 26) as usize);
    match file.read_to_end(&mut bytes) {
        Ok(_) => Ok(Some((name, bytes))),
        Err(e) => Err((name, IngestionError::from(e))),
    }
}

// Extension of the member's file name, if it has one.
fn member_extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rfind('.').map(|dot| &file[dot + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_extensions() {
        assert_eq!(member_extension("data/a.csv"), Some("csv"));
        assert_eq!(member_extension("v1.2/README"), None);
        assert_eq!(member_extension("x.tar.gz"), Some("gz"));
    }
}
