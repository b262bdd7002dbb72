/// Errors that can occur while reading or writing wire primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The stream header does not start with `0xACED`.
    #[error("invalid stream magic 0x{found:04x} (expected 0xaced)")]
    MalformedMagic { found: u16 },

    /// The input ended before a complete primitive could be read.
    #[error("input truncated (needed {expected} bytes, {available} available)")]
    InputTruncated { expected: usize, available: usize },

    /// A length is too large for the prefix that carries it on the wire.
    #[error("{what} length {len} does not fit its length prefix")]
    LengthOverflow { what: &'static str, len: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
