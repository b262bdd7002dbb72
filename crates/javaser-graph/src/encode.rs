//! Encoder and class-description strategies.
//!
//! Encoding is a pure function of the graph. Handles already stored in the
//! nodes are not renumbered or checked; a graph produced by the decoder is
//! self-consistent by construction.

use bytes::Bytes;
use javaser_wire::tags::*;
use javaser_wire::{length_prefix, StreamHeader, WireWriter};

use crate::error::{GraphError, Result};
use crate::node::{
    ArrayElements, ClassDetails, ClassField, FieldPayload, FieldValue, Node, StringValue,
    X_CLASSFIELD, X_FIELDVALUE,
};

/// Writes class descriptions. Every other record kind is written the same
/// way regardless of strategy.
pub trait ClassDescEncoder {
    fn encode_class_desc(&mut self, details: &ClassDetails, out: &mut WireWriter) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Re-emits class descriptions exactly as they are in the graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct FaithfulEncoder;

impl ClassDescEncoder for FaithfulEncoder {
    fn encode_class_desc(&mut self, details: &ClassDetails, out: &mut WireWriter) -> Result<()> {
        write_class_details(details, details.annotation_slot(), out, self)
    }

    fn name(&self) -> &'static str {
        "faithful"
    }
}

/// Replaces the annotation of the first class description written with a
/// single string naming a codebase URL. Later descriptions are written
/// faithfully.
#[derive(Debug, Clone)]
pub struct CodebaseEncoder {
    codebase: String,
    class_descs_seen: usize,
}

impl CodebaseEncoder {
    pub fn new(codebase: impl Into<String>) -> Self {
        Self {
            codebase: codebase.into(),
            class_descs_seen: 0,
        }
    }

    pub fn codebase(&self) -> &str {
        &self.codebase
    }

    /// Number of class descriptions written so far.
    pub fn class_descs_seen(&self) -> usize {
        self.class_descs_seen
    }
}

impl ClassDescEncoder for CodebaseEncoder {
    fn encode_class_desc(&mut self, details: &ClassDetails, out: &mut WireWriter) -> Result<()> {
        self.class_descs_seen += 1;
        if self.class_descs_seen == 1 {
            tracing::debug!(
                class = %details.class_name,
                codebase = %self.codebase,
                "injecting codebase annotation"
            );
            let annotation = [Node::String(StringValue::new(&self.codebase))];
            return write_class_details(details, &annotation, out, self);
        }
        write_class_details(details, details.annotation_slot(), out, self)
    }

    fn name(&self) -> &'static str {
        "codebase"
    }
}

/// Write a class description with the given annotation contents.
///
/// Shared by every strategy; `strategy` is used again for the superclass.
pub fn write_class_details(
    details: &ClassDetails,
    annotations: &[Node],
    out: &mut WireWriter,
    strategy: &mut dyn ClassDescEncoder,
) -> Result<()> {
    if details.is_proxy {
        out.put_u8(TC_PROXYCLASSDESC);
        out.put_u32(length_prefix(
            "proxy interface list",
            details.proxy_interface_names.len(),
        )?);
        for name in &details.proxy_interface_names {
            out.put_utf(name.as_bytes())?;
        }
    } else {
        out.put_u8(TC_CLASSDESC);
        out.put_utf(details.class_name.as_bytes())?;
        out.put_slice(&details.serial_version);
        out.put_u8(details.desc_flags);
        out.put_u16(length_prefix("field list", details.fields.fields.len())?);
        for field in &details.fields.fields {
            write_field_desc(field, out, strategy)?;
        }
    }
    for annotation in annotations {
        annotation.encode(out, strategy)?;
    }
    out.put_u8(TC_ENDBLOCKDATA);
    details.super_class.encode(out, strategy)
}

fn write_field_desc(
    field: &ClassField,
    out: &mut WireWriter,
    strategy: &mut dyn ClassDescEncoder,
) -> Result<()> {
    out.put_u8(field.field_type.tag());
    out.put_utf(field.name.as_bytes())?;
    if field.field_type.is_reference() {
        let class_name = field
            .class_name
            .as_ref()
            .ok_or_else(|| GraphError::shape(X_CLASSFIELD, "class_name_1"))?;
        class_name.encode(out, strategy)?;
    }
    Ok(())
}

impl FieldValue {
    pub fn encode(&self, out: &mut WireWriter, strategy: &mut dyn ClassDescEncoder) -> Result<()> {
        match (&self.value, self.field_type.width()) {
            (FieldPayload::Raw(raw), Some(_)) => {
                out.put_slice(raw);
                Ok(())
            }
            (FieldPayload::Nested(node), None) => node.encode(out, strategy),
            (FieldPayload::Raw(_), None) => Err(GraphError::shape(X_FIELDVALUE, "object")),
            (FieldPayload::Nested(_), Some(_)) => Err(GraphError::shape(X_FIELDVALUE, "bytes")),
        }
    }
}

impl Node {
    /// Serialize this record, using `strategy` for class descriptions.
    pub fn encode(&self, out: &mut WireWriter, strategy: &mut dyn ClassDescEncoder) -> Result<()> {
        match self {
            Node::Null { is_empty: true } | Node::EndBlockData { is_empty: true } => {}
            Node::Null { .. } => out.put_u8(TC_NULL),
            Node::EndBlockData { .. } => out.put_u8(TC_ENDBLOCKDATA),
            Node::Reset => out.put_u8(TC_RESET),
            Node::Reference { handle } => {
                out.put_u8(TC_REFERENCE);
                out.put_u32(*handle);
            }
            Node::String(s) => {
                if s.is_long || s.raw.len() > usize::from(u16::MAX) {
                    out.put_u8(TC_LONGSTRING);
                    out.put_long_utf(&s.raw);
                } else {
                    out.put_u8(TC_STRING);
                    out.put_utf(&s.raw)?;
                }
            }
            Node::ClassDesc(desc) => strategy.encode_class_desc(&desc.detail, out)?,
            Node::ClassDetails(details) => strategy.encode_class_desc(details, out)?,
            Node::Object(obj) => {
                out.put_u8(TC_OBJECT);
                obj.class.encode(out, strategy)?;
                for level in &obj.class_data {
                    for value in &level.field_values {
                        value.encode(out, strategy)?;
                    }
                    for item in &level.block_data {
                        item.encode(out, strategy)?;
                    }
                }
            }
            Node::Array(arr) => {
                out.put_u8(TC_ARRAY);
                arr.class.encode(out, strategy)?;
                out.put_i32(length_prefix("array", arr.size())?);
                match &arr.elements {
                    ArrayElements::Bytes(bytes) => out.put_slice(bytes),
                    ArrayElements::Values(values) => {
                        for value in values {
                            value.encode(out, strategy)?;
                        }
                    }
                }
            }
            Node::Class(class) => {
                out.put_u8(TC_CLASS);
                class.desc.encode(out, strategy)?;
            }
            Node::Enum(value) => {
                out.put_u8(TC_ENUM);
                value.type_desc.encode(out, strategy)?;
                value.constant_name.encode(out, strategy)?;
            }
            Node::BlockData(block) => {
                if block.is_long || block.contents.len() > usize::from(u8::MAX) {
                    out.put_u8(TC_BLOCKDATALONG);
                    out.put_u32(length_prefix("block data", block.contents.len())?);
                } else {
                    out.put_u8(TC_BLOCKDATA);
                    out.put_u8(block.contents.len() as u8);
                }
                out.put_slice(&block.contents);
            }
        }
        Ok(())
    }
}

/// Encode a whole stream: header, then every node in order.
pub fn encode_all(nodes: &[Node], strategy: &mut dyn ClassDescEncoder) -> Result<Bytes> {
    let mut out = WireWriter::with_header(StreamHeader::default());
    for node in nodes {
        node.encode(&mut out, strategy)?;
    }
    tracing::debug!(
        nodes = nodes.len(),
        bytes = out.len(),
        strategy = strategy.name(),
        "encode finished"
    );
    Ok(out.freeze())
}

/// Encode a whole stream faithfully.
pub fn encode(nodes: &[Node]) -> Result<Bytes> {
    encode_all(nodes, &mut FaithfulEncoder)
}

/// Encode a single node without the stream header.
pub fn encode_node(node: &Node, strategy: &mut dyn ClassDescEncoder) -> Result<Bytes> {
    let mut out = WireWriter::new();
    node.encode(&mut out, strategy)?;
    Ok(out.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ClassField, ClassFields};
    use javaser_wire::{FieldType, WireError};

    #[test]
    fn short_string_wire_form() {
        let bytes = encode_node(&Node::string("hello"), &mut FaithfulEncoder).unwrap();
        assert_eq!(bytes.as_ref(), b"\x74\x00\x05hello");
    }

    #[test]
    fn empty_markers_write_nothing() {
        let nodes = [
            Node::Null { is_empty: true },
            Node::EndBlockData { is_empty: true },
        ];
        let bytes = encode(&nodes).unwrap();
        assert_eq!(bytes.as_ref(), &[0xAC, 0xED, 0x00, 0x05]);
    }

    #[test]
    fn oversized_block_data_is_promoted() {
        let block = Node::BlockData(crate::node::BlockData {
            is_long: false,
            contents: Bytes::from(vec![0u8; 300]),
        });
        let bytes = encode_node(&block, &mut FaithfulEncoder).unwrap();
        assert_eq!(&bytes[..5], &[0x7A, 0x00, 0x00, 0x01, 0x2C]);
        assert_eq!(bytes.len(), 305);
    }

    #[test]
    fn class_desc_layout() {
        let mut details = ClassDetails::new("A", 1, 0x02);
        details.fields = ClassFields {
            fields: vec![ClassField::primitive("size", FieldType::Int)],
        };
        let bytes = encode_node(&details.into_node(), &mut FaithfulEncoder).unwrap();
        let mut expected = vec![0x72, 0x00, 0x01, b'A', 0, 0, 0, 0, 0, 0, 0, 1, 0x02, 0x00, 0x01];
        expected.extend_from_slice(&[b'I', 0x00, 0x04]);
        expected.extend_from_slice(b"size");
        expected.extend_from_slice(&[0x78, 0x70]);
        assert_eq!(bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn oversized_names_are_rejected() {
        let details = ClassDetails::new("A".repeat(70_000), 1, 0x02);
        let err = encode_node(&details.into_node(), &mut FaithfulEncoder).unwrap_err();
        assert_eq!(
            err,
            GraphError::Wire(WireError::LengthOverflow {
                what: "UTF string",
                len: 70_000
            })
        );

        let mut details = ClassDetails::new("A", 1, 0x02);
        details
            .fields
            .fields
            .push(ClassField::primitive("x".repeat(65_536), FieldType::Int));
        let err = encode_node(&details.into_node(), &mut FaithfulEncoder).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Wire(WireError::LengthOverflow { len: 65_536, .. })
        ));
    }

    #[test]
    fn oversized_field_list_is_rejected() {
        let mut details = ClassDetails::new("A", 1, 0x02);
        details.fields.fields = (0..=usize::from(u16::MAX))
            .map(|i| ClassField::primitive(format!("f{i}"), FieldType::Byte))
            .collect();
        let err = encode_node(&details.into_node(), &mut FaithfulEncoder).unwrap_err();
        assert_eq!(
            err,
            GraphError::Wire(WireError::LengthOverflow {
                what: "field list",
                len: 65_536
            })
        );
    }

    #[test]
    fn object_field_without_signature_is_a_shape_error() {
        let mut details = ClassDetails::new("A", 1, 0x02);
        details.fields.fields.push(ClassField {
            name: "next".into(),
            field_type: FieldType::Object,
            class_name: None,
        });
        let err = encode_node(&details.into_node(), &mut FaithfulEncoder).unwrap_err();
        assert_eq!(err, GraphError::shape("X_CLASSFIELD", "class_name_1"));
    }

    #[test]
    fn mismatched_field_payload() {
        let value = FieldValue {
            field_type: FieldType::Int,
            value: FieldPayload::Nested(Node::null()),
        };
        let err = value
            .encode(&mut WireWriter::new(), &mut FaithfulEncoder)
            .unwrap_err();
        assert_eq!(err, GraphError::shape("X_FIELDVALUE", "bytes"));
    }

    #[test]
    fn codebase_patches_only_first_class_desc() {
        let mut inner = ClassDetails::new("B", 2, 0x02);
        inner.annotations = vec![Node::null()];
        let mut outer = ClassDetails::new("A", 1, 0x02);
        outer.super_class = inner.into_node();

        let mut strategy = CodebaseEncoder::new("http://x/");
        let bytes = encode_node(&outer.clone().into_node(), &mut strategy).unwrap();
        assert_eq!(strategy.class_descs_seen(), 2);

        let mut expected = vec![0x72, 0x00, 0x01, b'A', 0, 0, 0, 0, 0, 0, 0, 1, 0x02, 0x00, 0x00];
        expected.extend_from_slice(b"\x74\x00\x09http://x/\x78");
        expected.extend_from_slice(&[0x72, 0x00, 0x01, b'B', 0, 0, 0, 0, 0, 0, 0, 2, 0x02, 0x00, 0x00]);
        expected.extend_from_slice(&[0x70, 0x78, 0x70]);
        assert_eq!(bytes.as_ref(), expected.as_slice());

        let faithful = encode_node(&outer.into_node(), &mut FaithfulEncoder).unwrap();
        assert_ne!(faithful, bytes);
    }
}
