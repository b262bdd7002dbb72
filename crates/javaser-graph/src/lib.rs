//! Node graph for Java object serialization streams.
//!
//! [`decode`] turns a stream into a list of top-level [`Node`]s, keeping
//! whatever was decoded before an error. [`encode_all`] writes a graph back
//! with a chosen [`ClassDescEncoder`]: [`FaithfulEncoder`] reproduces the
//! input, [`CodebaseEncoder`] injects a codebase annotation into the first
//! class description.
//!
//! ```
//! use javaser_graph::{decode, encode, Node};
//!
//! let decoded = decode(vec![0xAC, 0xED, 0x00, 0x05, 0x70]);
//! assert_eq!(decoded.nodes, vec![Node::null()]);
//! assert_eq!(encode(&decoded.nodes).unwrap().as_ref(), &[0xAC, 0xED, 0x00, 0x05, 0x70]);
//! ```

pub mod config;
pub mod decode;
pub mod dump;
pub mod encode;
pub mod error;
pub mod handle;
pub mod node;

pub use config::DecodeConfig;
pub use decode::{decode, decode_with_config, Decoded};
pub use encode::{
    encode, encode_all, encode_node, write_class_details, ClassDescEncoder, CodebaseEncoder,
    FaithfulEncoder,
};
pub use error::{GraphError, Result};
pub use handle::{HandleTable, Resolved};
pub use node::{
    ArrayElements, ArrayValue, BlockData, ClassData, ClassDesc, ClassDetails, ClassField,
    ClassFields, ClassValue, EnumValue, FieldPayload, FieldValue, Node, ObjectValue, StringValue,
};
