#![doc = r#"
The byte source seam between the decoder and whatever stores the file.

The container parser and the per-track event decoder only ever need three
primitives from the underlying store: seek to an absolute offset, read the
next byte, and report the current offset. Anything that can do those three
things — an in-memory slice, a file, a flash chip behind a driver — can back
playback by implementing [`MidiSource`].

Reads past the end of the data yield `None` rather than an error; chunk
lengths are validated up front during [`load`](crate::file::MidiFile::load),
so a short read mid-event is a malformed-file symptom, not an I/O contract
violation. Nothing is retried.
"#]

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::LoadError;

/// A positioned, re-seekable byte reader that playback decodes from.
pub trait MidiSource {
    /// Reposition to an absolute offset from the start of the data.
    ///
    /// Returns `false` if the offset lies beyond the end of the data.
    fn seek_to(&mut self, offset: u64) -> bool;

    /// The next byte, advancing the position, or `None` at end of data.
    fn read_byte(&mut self) -> Option<u8>;

    /// Current absolute offset from the start of the data.
    fn position(&self) -> u64;

    /// Advance the position by `n` bytes without delivering them.
    fn skip(&mut self, n: u64) -> bool {
        let target = self.position() + n;
        self.seek_to(target)
    }
}

/// A [`MidiSource`] over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Wrap a byte slice, positioned at the start.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl MidiSource for SliceSource<'_> {
    fn seek_to(&mut self, offset: u64) -> bool {
        if offset > self.bytes.len() as u64 {
            return false;
        }
        self.pos = offset as usize;
        true
    }

    fn read_byte(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }
}

/// A [`MidiSource`] over a file on disk.
///
/// Buffering is intentionally absent: playback reads a handful of bytes per
/// scheduling step and re-seeks between tracks, so the OS page cache does
/// the useful work.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
    pos: u64,
}

impl FileSource {
    /// Open `path` for playback.
    ///
    /// An empty path maps to [`LoadError::NoFile`] and any I/O failure to
    /// [`LoadError::Open`], matching the load result codes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LoadError::NoFile);
        }
        let file = File::open(path).map_err(|_| LoadError::Open)?;
        let len = file.metadata().map_err(|_| LoadError::Open)?.len();
        Ok(Self { file, len, pos: 0 })
    }
}

impl MidiSource for FileSource {
    fn seek_to(&mut self, offset: u64) -> bool {
        if offset > self.len {
            return false;
        }
        match self.file.seek(SeekFrom::Start(offset)) {
            Ok(p) => {
                self.pos = p;
                true
            }
            Err(_) => false,
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf) {
            Ok(1) => {
                self.pos += 1;
                Some(buf[0])
            }
            _ => None,
        }
    }

    fn position(&self) -> u64 {
        self.pos
    }
}
