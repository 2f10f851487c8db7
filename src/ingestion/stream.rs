//! Seekable byte sources shared between a decoder and its row sets.

use std::cell::RefCell;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

use crate::error::IngestionResult;

/// Object-safe `Read + Seek`.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// A stream owned jointly by every row set decoded from it.
///
/// Row sets reposition the stream at the start of each full iteration, so two iterations
/// interleaved over the same stream read garbage. Single-threaded by construction.
pub type SharedStream = Rc<RefCell<Box<dyn ReadSeek>>>;

/// Box `stream` into a [`SharedStream`].
pub fn share(stream: impl Read + Seek + 'static) -> SharedStream {
    Rc::new(RefCell::new(Box::new(stream)))
}

/// A reader over a [`SharedStream`] that borrows the stream only for the duration of each
/// `read` call.
pub struct SharedReader {
    stream: SharedStream,
}

impl SharedReader {
    /// Seek the shared stream to `position` and read from there.
    pub fn at(stream: SharedStream, position: u64) -> io::Result<Self> {
        stream.borrow_mut().seek(SeekFrom::Start(position))?;
        Ok(Self { stream })
    }
}

impl Read for SharedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.borrow_mut().read(buf)
    }
}

/// Drain a non-seekable reader into memory so it can be dispatched and re-read.
pub fn buffer_stream<R: Read>(mut reader: R) -> IngestionResult<Cursor<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(Cursor::new(bytes))
}

/// Read at most `limit` bytes from the current position, then seek back to it.
pub(crate) fn peek<R: Read + Seek + ?Sized>(stream: &mut R, limit: usize) -> IngestionResult<Vec<u8>> {
    let start = stream.stream_position()?;
    let mut prefix = Vec::with_capacity(limit.min(64 * 1024));
    (&mut *stream).take(limit as u64).read_to_end(&mut prefix)?;
    stream.seek(SeekFrom::Start(start))?;
    Ok(prefix)
}

/// Everything from the current position to the end.
pub(crate) fn read_remaining<R: Read + ?Sized>(stream: &mut R) -> IngestionResult<Vec<u8>> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_leaves_position_untouched() {
        let mut c = Cursor::new(b"hello world".to_vec());
        c.set_position(6);
        assert_eq!(peek(&mut c, 3).unwrap(), b"wor");
        assert_eq!(c.position(), 6);
        assert_eq!(peek(&mut c, 100).unwrap(), b"world");
    }

    #[test]
    fn shared_reader_rewinds_on_creation() {
        let s = share(Cursor::new(b"abc".to_vec()));
        let mut first = String::new();
        SharedReader::at(s.clone(), 0).unwrap().read_to_string(&mut first).unwrap();
        let mut second = String::new();
        SharedReader::at(s, 1).unwrap().read_to_string(&mut second).unwrap();
        assert_eq!(first, "abc");
        assert_eq!(second, "bc");
    }

    #[test]
    fn buffer_stream_makes_any_reader_seekable() {
        let reader: &[u8] = b"a,b\n";
        let mut c = buffer_stream(reader).unwrap();
        c.seek(SeekFrom::End(-1)).unwrap();
        assert_eq!(c.position(), 3);
    }
}
