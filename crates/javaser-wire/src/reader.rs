use bytes::Bytes;

use crate::error::{Result, WireError};

/// Big-endian cursor over a fully buffered stream.
///
/// A failed read leaves the cursor where it was, so callers can report
/// the partial state they already decoded.
#[derive(Debug, Clone)]
pub struct WireReader {
    buf: Bytes,
    pos: usize,
}

impl WireReader {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            pos: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Skip `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read exactly `n` bytes. The returned buffer shares the input allocation.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        let out = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Read a UTF string with a 2-byte length prefix, returning the raw bytes.
    pub fn read_utf(&mut self) -> Result<Bytes> {
        let start = self.pos;
        let len = self.read_u16()? as usize;
        self.read_bytes(len).inspect_err(|_| self.pos = start)
    }

    /// Read a UTF string with an 8-byte length prefix, returning the raw bytes.
    pub fn read_long_utf(&mut self) -> Result<Bytes> {
        let start = self.pos;
        let len = self.read_u64()?;
        let len = match usize::try_from(len) {
            Ok(len) => len,
            Err(_) => {
                self.pos = start;
                return Err(WireError::InputTruncated {
                    expected: usize::MAX,
                    available: self.remaining(),
                });
            }
        };
        self.read_bytes(len).inspect_err(|_| self.pos = start)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        let available = self.remaining();
        if available < n {
            tracing::trace!(
                offset = self.pos,
                expected = n,
                available,
                "read past end of input"
            );
            return Err(WireError::InputTruncated {
                expected: n,
                available,
            });
        }
        Ok(())
    }
}
