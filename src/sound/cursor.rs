//! Forward-only big-endian byte cursor
//!
//! Wraps any `Read` source and counts every byte taken from it. Skips are
//! performed by reading and discarding, so the source never needs `Seek`.

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};

use super::decoder::{DecodeError, DecodeResult};

/// Byte cursor over an exclusively owned source
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Total bytes taken from the source so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Read `n` bytes (1..=8) as a big-endian unsigned integer
    pub fn read_be(&mut self, n: usize) -> DecodeResult<u64> {
        if n == 0 || n > 8 {
            return Err(DecodeError::Io(format!(
                "big-endian read width must be 1..=8 bytes, got {}",
                n
            )));
        }
        let value = self.inner.read_uint::<BigEndian>(n)?;
        self.consumed += n as u64;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let value = self.inner.read_u8()?;
        self.consumed += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let value = self.inner.read_u16::<BigEndian>()?;
        self.consumed += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        let value = self.inner.read_u32::<BigEndian>()?;
        self.consumed += 4;
        Ok(value)
    }

    /// Fill `buf` completely
    pub fn read_raw(&mut self, buf: &mut [u8]) -> DecodeResult<()> {
        self.inner.read_exact(buf)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    /// Advance past `n` bytes without surfacing them
    pub fn skip(&mut self, n: u64) -> DecodeResult<()> {
        if self.skip_up_to(n)? < n {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(())
    }

    /// Advance past at most `n` bytes, returning how many were skipped
    pub fn skip_up_to(&mut self, n: u64) -> DecodeResult<u64> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.consumed += skipped;
        Ok(skipped)
    }

    /// Read at most `n` bytes, stopping quietly at end of stream
    pub fn read_up_to(&mut self, n: u64) -> DecodeResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(1 << 20) as usize);
        (&mut self.inner).take(n).read_to_end(&mut buf)?;
        self.consumed += buf.len() as u64;
        Ok(buf)
    }

    /// Fill as much of `buf` as the source allows, returning the count
    ///
    /// Used at chunk boundaries where zero bytes means a clean end of stream.
    pub fn fill(&mut self, buf: &mut [u8]) -> DecodeResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.consumed += filled as u64;
        Ok(filled)
    }
}
