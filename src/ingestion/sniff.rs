//! MIME sniffing from leading bytes.

use std::io::{Read, Seek};

use crate::error::IngestionResult;

use super::format::{Format, XLSX_MIME};
use super::stream::peek;

/// Bytes inspected when sniffing a MIME type.
pub const SNIFF_HEADER_BYTES: usize = 4096;

const OCTET_STREAM: &str = "application/octet-stream";
const EMPTY: &str = "application/x-empty";

/// Classify leading bytes.
///
/// Binary signatures come from `infer`. Anything it does not know is markup if it opens
/// with a tag and mentions a table, plain text if it looks like text, and an octet stream
/// otherwise.
pub fn sniff_mime(header: &[u8]) -> &'static str {
    if header.is_empty() {
        return EMPTY;
    }
    if let Some(kind) = infer::get(header) {
        return kind.mime_type();
    }
    if header.starts_with(b"\xFF\xFE") || header.starts_with(b"\xFE\xFF") {
        return "text/plain";
    }

    let body = header.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(header);
    let lead = body.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(body.len());
    if body.get(lead) == Some(&b'<') {
        let lower = body.to_ascii_lowercase();
        if [&b"<table"[..], b"<html", b"<!doctype html"]
            .iter()
            .any(|tag| lower.windows(tag.len()).any(|w| w == *tag))
        {
            return "text/html";
        }
    }
    if looks_like_text(body) {
        return "text/plain";
    }
    OCTET_STREAM
}

fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes
        .iter()
        .any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x1B))
}

/// Sniff the MIME type at the current position of `stream`, leaving the position as it was.
///
/// A ZIP carrying an office manifest, and a legacy workbook type reported for ZIP bytes,
/// both become the OOXML workbook type.
pub fn detect_mime<R: Read + Seek + ?Sized>(stream: &mut R) -> IngestionResult<String> {
    let header = peek(stream, SNIFF_HEADER_BYTES)?;
    let mime = sniff_mime(&header);

    let manifest = b"[Content_Types].xml";
    if Format::from_mime(mime) == Some(Format::Zip)
        && header.windows(manifest.len()).any(|w| w == manifest)
    {
        return Ok(XLSX_MIME.to_owned());
    }
    if mime == "application/vnd.ms-excel" && header.starts_with(b"PK") {
        return Ok(XLSX_MIME.to_owned());
    }
    Ok(mime.to_owned())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn text_and_markup() {
        assert_eq!(sniff_mime(b"a,b\n1,2\n"), "text/plain");
        assert_eq!(sniff_mime(b"\xEF\xBB\xBFa;b\n"), "text/plain");
        assert_eq!(sniff_mime("caf\u{e9}\n".as_bytes()), "text/plain");
        assert_eq!(sniff_mime(b"  <div><TABLE><tr><td>1</td></tr></TABLE></div>"), "text/html");
        assert_eq!(sniff_mime(b""), EMPTY);
    }

    #[test]
    fn binary_signatures() {
        assert_eq!(sniff_mime(b"%PDF-1.4\n%..."), "application/pdf");
        assert_eq!(sniff_mime(&[0u8, 1, 2, 3, 0, 0, 9]), OCTET_STREAM);
    }

    #[test]
    fn detection_rewinds() {
        let mut c = Cursor::new(b"x\ty\n".to_vec());
        assert_eq!(detect_mime(&mut c).unwrap(), "text/plain");
        assert_eq!(c.position(), 0);
    }
}
