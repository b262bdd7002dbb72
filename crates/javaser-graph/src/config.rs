/// Default bound on recursive descent while decoding.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Arrays whose class is only known through a back-reference are treated
/// as byte arrays when they are larger than this many elements...
pub const BYTE_ARRAY_HEURISTIC_MIN_SIZE: usize = 100;

/// ...and this many leading elements are all byte-typed.
pub const BYTE_ARRAY_HEURISTIC_SAMPLE: usize = 100;

/// Controls decoder behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum nesting of content elements. Deeper input fails with
    /// `GraphError::NestingTooDeep`.
    pub max_depth: usize,
    /// Store byte arrays as one contiguous buffer instead of one value per
    /// element.
    pub collapse_byte_arrays: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collapse_byte_arrays: true,
        }
    }
}
