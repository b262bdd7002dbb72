//! Lenient codec for the Java Object Serialization Stream Protocol.
//!
//! Protocol layers that carry serialized Java objects use three entry
//! points: [`decode`] bytes into top-level nodes, [`encode`] nodes back into
//! bytes, and [`document_to_nodes`] to turn an edited JSON template into
//! nodes.
//!
//! # Crate Structure
//!
//! - [`wire`]: tag catalogs, stream header, big-endian reader and writer
//! - [`graph`]: node model, handle table, decoder, encoder strategies, dump
//! - [`document`]: JSON documents for nodes
//!
//! ```
//! let decoded = javaser::decode(vec![0xAC, 0xED, 0x00, 0x05, 0x74, 0x00, 0x02, b'h', b'i']);
//! assert!(decoded.is_complete());
//! let doc = javaser::document::nodes_to_document(&decoded.nodes);
//! let nodes = javaser::document_to_nodes(&doc).unwrap();
//! assert_eq!(&javaser::encode(&nodes).unwrap()[4..], b"\x74\x00\x02hi");
//! ```

use bytes::Bytes;

/// Re-export wire types.
pub mod wire {
    pub use javaser_wire::*;
}

/// Re-export graph types.
pub mod graph {
    pub use javaser_graph::*;
}

/// Re-export document types.
pub mod document {
    pub use javaser_document::*;
}

pub use javaser_document::{document_to_nodes, DocumentError};
pub use javaser_graph::{
    decode, decode_with_config, encode, encode_all, CodebaseEncoder, DecodeConfig, Decoded,
    FaithfulEncoder, GraphError, Node,
};

/// Encode a graph, replacing the first class description's annotation with
/// `codebase`.
pub fn encode_with_codebase(nodes: &[Node], codebase: &str) -> Result<Bytes, GraphError> {
    encode_all(nodes, &mut CodebaseEncoder::new(codebase))
}
