//! JSON documents for Java object serialization node graphs.
//!
//! Every node renders as an object carrying a numeric `type` and a
//! `type_verbose` discriminator. Byte payloads are base64, empty lists are
//! `null`. [`from_document`] reverses [`to_document`]; a string document
//! whose `value` was edited is re-encoded from that value.
//!
//! ```
//! use javaser_document::{from_document, to_document};
//! use javaser_graph::Node;
//!
//! let node = Node::string("hello");
//! let doc = to_document(&node);
//! assert_eq!(doc["value"], "hello");
//! assert_eq!(from_document(&doc).unwrap(), node);
//! ```

pub mod error;
pub mod parse;
pub mod render;

pub use error::{DocumentError, Result};
pub use parse::{document_to_nodes, from_document};
pub use render::{nodes_to_document, to_document};

/// Pretty-printed JSON text for a list of nodes.
pub fn to_json_pretty(nodes: &[javaser_graph::Node]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&nodes_to_document(nodes))?)
}

/// Parse JSON text holding one document or an array of documents.
pub fn from_json_str(text: &str) -> Result<Vec<javaser_graph::Node>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    document_to_nodes(&value)
}
