use javaser_graph::GraphError;

/// Errors that can occur while converting between documents and nodes.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Graph-level error (bad field type, encode failure).
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required key is missing, `null`, or has the wrong JSON type.
    #[error("{discriminator} is missing required field `{missing_field}`")]
    DocumentShapeMismatch {
        discriminator: String,
        missing_field: String,
    },

    /// `type_verbose` names no known record kind.
    #[error("unknown discriminator {0:?}")]
    UnknownDiscriminator(String),

    /// A byte field does not hold valid base64.
    #[error("`{field}` is not valid base64: {source}")]
    InvalidBase64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },
}

impl DocumentError {
    pub(crate) fn shape(discriminator: &str, missing_field: &str) -> Self {
        Self::DocumentShapeMismatch {
            discriminator: discriminator.to_string(),
            missing_field: missing_field.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;
