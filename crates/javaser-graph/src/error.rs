use javaser_wire::WireError;

/// Errors that can occur while decoding or encoding a node graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Wire-level error (bad magic, truncated input).
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A tag that is not valid at this position in the stream.
    #[error("unexpected tag 0x{tag:02x} while reading {context}")]
    UnknownTag { tag: u8, context: &'static str },

    /// A field type code outside `BCDFIJSZ[L`.
    #[error("unsupported field type 0x{0:02x}")]
    UnsupportedFieldType(u8),

    /// A back-reference to a handle that was never assigned.
    #[error("unresolved reference to handle 0x{0:08x}")]
    UnresolvedReference(u32),

    /// A class description slot holds a node that cannot describe a class.
    #[error("{kind} cannot be used as a class description")]
    UnsupportedSuperclassNodeKind { kind: &'static str },

    /// A required child is missing or has the wrong shape.
    #[error("{discriminator} is missing required field `{missing_field}`")]
    DocumentShapeMismatch {
        discriminator: String,
        missing_field: String,
    },

    /// Recursive descent went deeper than the configured limit.
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// An array declared a negative element count.
    #[error("negative array size {0}")]
    NegativeArraySize(i32),

    /// An array class name does not carry an element type (`[X...`).
    #[error("invalid array class name {0:?}")]
    InvalidArrayClassName(String),

    /// Following superclass references never reached a root class.
    #[error("cyclic class hierarchy through handle 0x{0:08x}")]
    CyclicClassHierarchy(u32),
}

impl GraphError {
    pub(crate) fn shape(discriminator: &str, missing_field: &str) -> Self {
        Self::DocumentShapeMismatch {
            discriminator: discriminator.to_string(),
            missing_field: missing_field.to_string(),
        }
    }

    /// True when the error is caused by running out of input.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Wire(WireError::InputTruncated { .. }))
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
