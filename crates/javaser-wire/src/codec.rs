use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

/// Stream header: magic (2) + version (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Stream magic (`STREAM_MAGIC`).
pub const MAGIC: u16 = 0xACED;

/// Stream version written by the encoder (`STREAM_VERSION`).
pub const VERSION: u16 = 0x0005;

/// First handle assigned in every stream (`baseWireHandle`).
pub const HANDLE_BASE: u32 = 0x7E_0000;

/// The fixed header at the start of every stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Always [`MAGIC`] once decoded.
    pub magic: u16,
    /// Accepted as-is; not validated.
    pub version: u16,
}

impl Default for StreamHeader {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
        }
    }
}

/// Encode the stream header.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬────────────────────────┐
/// │ Magic (2B)   │ Version (2B) │ Content elements ...   │
/// │ 0xAC 0xED    │ 0x00 0x05    │                        │
/// └──────────────┴──────────────┴────────────────────────┘
/// ```
pub fn encode_header(header: StreamHeader, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE);
    dst.put_u16(header.magic);
    dst.put_u16(header.version);
}

/// Decode the stream header from the start of `src`.
///
/// The version is accepted without validation.
pub fn decode_header(src: &[u8]) -> Result<StreamHeader> {
    if src.len() < HEADER_SIZE {
        return Err(WireError::InputTruncated {
            expected: HEADER_SIZE,
            available: src.len(),
        });
    }

    let magic = u16::from_be_bytes([src[0], src[1]]);
    if magic != MAGIC {
        return Err(WireError::MalformedMagic { found: magic });
    }
    let version = u16::from_be_bytes([src[2], src[3]]);

    Ok(StreamHeader { magic, version })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_header() {
        let mut buf = BytesMut::new();
        encode_header(StreamHeader::default(), &mut buf);

        assert_eq!(buf.as_ref(), &[0xAC, 0xED, 0x00, 0x05]);
        let header = decode_header(&buf).unwrap();
        assert_eq!(header, StreamHeader::default());
    }

    #[test]
    fn test_decode_accepts_any_version() {
        let header = decode_header(&[0xAC, 0xED, 0x00, 0x04]).unwrap();
        assert_eq!(header.version, 4);
    }

    #[test]
    fn test_decode_incomplete_header() {
        let err = decode_header(&[0xAC, 0xED, 0x00]).unwrap_err();
        assert_eq!(
            err,
            WireError::InputTruncated {
                expected: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_decode_invalid_magic() {
        let err = decode_header(&[0xCA, 0xFE, 0x00, 0x05]).unwrap_err();
        assert!(matches!(err, WireError::MalformedMagic { found: 0xCAFE }));
    }
}
