use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{encode_header, StreamHeader};
use crate::error::{Result, WireError};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Big-endian output buffer for encoded streams.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Create a writer that already holds the stream header.
    pub fn with_header(header: StreamHeader) -> Self {
        let mut writer = Self::new();
        encode_header(header, &mut writer.buf);
        writer
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    pub fn put_slice(&mut self, src: &[u8]) {
        self.buf.put_slice(src);
    }

    /// Write a UTF string with a 2-byte length prefix.
    ///
    /// Fails with [`WireError::LengthOverflow`] above `u16::MAX` bytes; such
    /// strings need [`Self::put_long_utf`].
    pub fn put_utf(&mut self, raw: &[u8]) -> Result<()> {
        let len: u16 = length_prefix("UTF string", raw.len())?;
        self.buf.put_u16(len);
        self.buf.put_slice(raw);
        Ok(())
    }

    /// Write a UTF string with an 8-byte length prefix.
    pub fn put_long_utf(&mut self, raw: &[u8]) {
        self.buf.put_u64(raw.len() as u64);
        self.buf.put_slice(raw);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing and return the encoded bytes.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// `len` converted to the integer type of its length prefix.
pub fn length_prefix<T: TryFrom<usize>>(what: &'static str, len: usize) -> Result<T> {
    T::try_from(len).map_err(|_| WireError::LengthOverflow { what, len })
}
