//! Wire primitives for the Java object serialization stream protocol.
//!
//! Every stream starts with a fixed 4-byte header:
//! - A 2-byte magic number (`0xACED`)
//! - A 2-byte stream version (`0x0005`)
//!
//! followed by content elements, each led by a one-byte tag. All integers
//! are big-endian. This crate only knows how to move bytes; the node model
//! built on top of it lives in `javaser-graph`.

pub mod codec;
pub mod error;
pub mod mutf8;
pub mod reader;
pub mod tags;
pub mod writer;

pub use codec::{
    decode_header, encode_header, StreamHeader, HANDLE_BASE, HEADER_SIZE, MAGIC, VERSION,
};
pub use error::{Result, WireError};
pub use mutf8::{decode_modified_utf8, encode_modified_utf8, ModifiedUtf8};
pub use reader::WireReader;
pub use tags::{class_flags, FieldType};
pub use writer::{length_prefix, WireWriter};
