//! Character-encoding detection and streaming transcoding to UTF-8.

use std::io::{self, Read};

use chardetng::EncodingDetector;
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};

use crate::error::{IngestionError, IngestionResult};

/// Bytes of a source inspected for encoding and dialect detection.
pub const SNIFF_BYTES: usize = 16 * 1024;

const CHUNK: usize = 8 * 1024;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Pick the encoding of a source from its leading bytes.
///
/// An explicit `label` (any WHATWG label such as `"latin1"` or `"utf-16le"`) wins. Then a
/// byte-order mark. Then prefixes that are valid UTF-8 (allowing a character cut off at the
/// end) are UTF-8, and anything else is left to a statistical detector. An empty prefix is
/// UTF-8.
pub fn detect_encoding(prefix: &[u8], label: Option<&str>) -> IngestionResult<&'static Encoding> {
    if let Some(label) = label {
        return Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| IngestionError::read(format!("unknown encoding label '{label}'")));
    }
    if let Some((encoding, _)) = Encoding::for_bom(prefix) {
        return Ok(encoding);
    }
    if prefix.is_empty() || prefix.len() - Encoding::utf8_valid_up_to(prefix) < 4 {
        return Ok(UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(prefix, prefix.len() < SNIFF_BYTES);
    Ok(detector.guess(None, true))
}

/// Decode bytes in one go; bad sequences become U+FFFD and a BOM is dropped.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_with_bom_removal(bytes);
    text.trim_start_matches('\u{FEFF}').to_owned()
}

/// A reader producing UTF-8 from a source in any supported encoding.
///
/// Malformed input is replaced with U+FFFD rather than reported. A byte-order mark is
/// removed whether it matches `encoding` or is a UTF-8 BOM that survived decoding.
pub struct TranscodingReader<R> {
    inner: R,
    decoder: Decoder,
    input: Box<[u8]>,
    in_pos: usize,
    in_len: usize,
    output: Box<[u8]>,
    out_pos: usize,
    out_len: usize,
    started: bool,
    eof: bool,
    finished: bool,
}

impl<R: Read> TranscodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder_with_bom_removal(),
            input: vec![0; CHUNK].into_boxed_slice(),
            in_pos: 0,
            in_len: 0,
            output: vec![0; CHUNK * 3].into_boxed_slice(),
            out_pos: 0,
            out_len: 0,
            started: false,
            eof: false,
            finished: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        if self.in_pos == self.in_len && !self.eof {
            self.in_len = self.inner.read(&mut self.input)?;
            self.in_pos = 0;
            self.eof = self.in_len == 0;
        }

        let (result, read, written, _) = self.decoder.decode_to_utf8(
            &self.input[self.in_pos..self.in_len],
            &mut self.output,
            self.eof,
        );
        self.in_pos += read;
        self.out_pos = 0;
        self.out_len = written;

        if !self.started && written > 0 {
            self.started = true;
            if self.output[..written].starts_with(UTF8_BOM) {
                self.out_pos = UTF8_BOM.len();
            }
        }
        if self.eof && result == CoderResult::InputEmpty {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for TranscodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_pos < self.out_len {
                let n = buf.len().min(self.out_len - self.out_pos);
                buf[..n].copy_from_slice(&self.output[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.finished || buf.is_empty() {
                return Ok(0);
            }
            self.fill()?;
        }
    }
}
