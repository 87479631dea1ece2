use std::io::{Read, Seek, SeekFrom};

use crate::error::{DecodeError, Result};

/// A seekable byte source that knows its own length.
///
/// All structure reads go through [`Source::at`], which refuses to position
/// the reader anywhere a fixed-size read of `needed` bytes would run past the
/// end of the input.
#[derive(Debug)]
pub struct Source<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> Source<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    /// Fails with `TruncatedRead` unless `needed` bytes exist at `offset`.
    pub fn check(&self, offset: u64, needed: u64, what: &'static str) -> Result<()> {
        match offset.checked_add(needed) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(DecodeError::TruncatedRead {
                what,
                offset,
                needed,
                available: self.len,
            }),
        }
    }

    /// Seeks to `offset` after checking that `needed` bytes can be read there.
    pub fn at(&mut self, offset: u64, needed: u64, what: &'static str) -> Result<&mut R> {
        self.check(offset, needed, what)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(&mut self.inner)
    }

    /// Reads exactly `len` bytes at `offset` into a fresh buffer.
    pub fn read_vec(&mut self, offset: u64, len: u64, what: &'static str) -> Result<Vec<u8>> {
        let reader = self.at(offset, len, what)?;
        // `check` bounded len by the source length, which fits in memory here
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}
