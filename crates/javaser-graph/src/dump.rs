//! Indented, human-readable listing of a decoded graph.
//!
//! The layout follows the SerializationDumper convention: one record per
//! line, children indented beneath their parent, handles shown as they are
//! assigned. References are labelled from the handles live at that point
//! in the stream, so a `TC_RESET` starts the numbering over.

use javaser_wire::tags::class_flags;
use javaser_wire::FieldType;

use crate::handle::{HandleTable, Resolved};
use crate::node::{ArrayElements, ClassData, ClassDetails, FieldPayload, FieldValue, Node};

const INDENT: &str = "  ";

/// Render top-level nodes as an indented listing.
pub fn render(nodes: &[Node]) -> String {
    let mut table = HandleTable::new();
    let mut out = String::new();
    for node in nodes {
        table.collect(node);
        let mut dumper = Dumper {
            table: &table,
            out,
            depth: 0,
        };
        dumper.node(node);
        out = dumper.out;
    }
    out
}

struct Dumper<'t> {
    table: &'t HandleTable,
    out: String,
    depth: usize,
}

impl Dumper<'_> {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn tag_line(&mut self, node: &Node) {
        let tag = node.tag();
        if tag == 0 {
            self.line(node.kind_name());
        } else {
            self.line(format!("{} - 0x{tag:02x}", node.kind_name()));
        }
    }

    fn handle_line(&mut self, handle: u32) {
        self.line(format!("newHandle 0x{handle:08x}"));
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Null { is_empty: true } => self.line("TC_NULL - (end of input)"),
            Node::EndBlockData { is_empty: true } => self.line("TC_ENDBLOCKDATA - (end of input)"),
            Node::Null { .. } | Node::EndBlockData { .. } | Node::Reset => self.tag_line(node),
            Node::Reference { handle } => {
                self.tag_line(node);
                let target = self
                    .table
                    .get(*handle)
                    .map(Node::kind_name)
                    .unwrap_or("unresolved");
                self.indented(|d| d.line(format!("Handle - 0x{handle:08x} - {target}")));
            }
            Node::String(s) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.handle_line(s.handle);
                    d.line(format!("Length - {}", s.size()));
                    d.line(format!("Value - {:?}", s.text()));
                });
            }
            Node::ClassDesc(desc) => self.class_details(&desc.detail),
            Node::ClassDetails(details) => self.class_details(details),
            Node::Object(obj) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.node(&obj.class);
                    d.handle_line(obj.handle);
                    d.line("classdata");
                    let levels = class_levels(d.table, &obj.class);
                    d.indented(|d| {
                        for (i, data) in obj.class_data.iter().enumerate() {
                            d.class_data(levels.get(i).copied().flatten(), data);
                        }
                    });
                });
            }
            Node::Array(arr) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.node(&arr.class);
                    d.handle_line(arr.handle);
                    d.line(format!("Array size - {}", arr.size()));
                    d.line("Values");
                    d.indented(|d| match &arr.elements {
                        ArrayElements::Bytes(bytes) => {
                            d.line(format!("(byte[]) 0x{}", hex_preview(bytes)));
                        }
                        ArrayElements::Values(values) => {
                            for (i, value) in values.iter().enumerate() {
                                d.line(format!("Index {i}:"));
                                d.indented(|d| d.field_value(value));
                            }
                        }
                    });
                });
            }
            Node::Class(class) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.node(&class.desc);
                    d.handle_line(class.handle);
                });
            }
            Node::Enum(value) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.node(&value.type_desc);
                    d.handle_line(value.handle);
                    d.line("enumConstantName");
                    d.indented(|d| d.node(&value.constant_name));
                });
            }
            Node::BlockData(block) => {
                self.tag_line(node);
                self.indented(|d| {
                    d.line(format!("Length - {}", block.size()));
                    d.line(format!("Contents - 0x{}", hex_preview(&block.contents)));
                });
            }
        }
    }

    fn class_details(&mut self, details: &ClassDetails) {
        if details.is_proxy {
            self.line("TC_PROXYCLASSDESC - 0x7d");
        } else {
            self.line("TC_CLASSDESC - 0x72");
        }
        self.indented(|d| {
            if details.is_proxy {
                d.handle_line(details.handle);
                d.line(format!(
                    "Interface count - {}",
                    details.proxy_interface_names.len()
                ));
                d.indented(|d| {
                    for name in &details.proxy_interface_names {
                        d.line(name.to_string());
                    }
                });
            } else {
                d.line(format!("className - {}", details.class_name));
                d.line(format!(
                    "serialVersionUID - 0x{:016x}",
                    u64::from_be_bytes(details.serial_version)
                ));
                d.handle_line(details.handle);
                d.line(format!(
                    "classDescFlags - 0x{:02x} - {}",
                    details.desc_flags,
                    class_flags::describe(details.desc_flags).join(" | ")
                ));
                d.line(format!("fieldCount - {}", details.fields.field_count()));
                d.indented(|d| {
                    for field in &details.fields.fields {
                        d.line(format!("{} - {}", field.field_type.name(), field.name));
                        if let Some(signature) = &field.class_name {
                            d.indented(|d| d.node(signature));
                        }
                    }
                });
            }
            d.line("classAnnotations");
            d.indented(|d| {
                for annotation in details.annotation_slot() {
                    d.node(annotation);
                }
                d.line("TC_ENDBLOCKDATA - 0x78");
            });
            d.line("superClassDesc");
            d.indented(|d| d.node(&details.super_class));
        });
    }

    fn class_data(&mut self, details: Option<&ClassDetails>, data: &ClassData) {
        let Some(details) = details else {
            if data.field_values.is_empty() && data.block_data.is_empty() {
                return;
            }
            self.line("<unknown class>");
            self.indented(|d| d.class_data_body(None, data));
            return;
        };
        let label = if details.is_proxy {
            "<dynamic proxy class>".to_string()
        } else {
            details.class_name.to_string()
        };
        self.line(label);
        self.indented(|d| d.class_data_body(Some(details), data));
    }

    fn class_data_body(&mut self, details: Option<&ClassDetails>, data: &ClassData) {
        if !data.field_values.is_empty() {
            self.line("values");
            self.indented(|d| {
                for (i, value) in data.field_values.iter().enumerate() {
                    let name = details
                        .and_then(|c| c.fields.fields.get(i))
                        .map(|f| f.name.to_string())
                        .unwrap_or_else(|| format!("field {i}"));
                    d.line(name);
                    d.indented(|d| d.field_value(value));
                }
            });
        }
        if !data.block_data.is_empty() {
            self.line("objectAnnotation");
            self.indented(|d| {
                for item in &data.block_data {
                    d.node(item);
                }
            });
        }
    }

    fn field_value(&mut self, value: &FieldValue) {
        match &value.value {
            FieldPayload::Nested(node) => {
                self.line(format!("({})", value.field_type.name()));
                self.indented(|d| d.node(node));
            }
            FieldPayload::Raw(raw) => self.line(format!(
                "({}){} - 0x{}",
                value.field_type.name(),
                primitive_text(value),
                hex_preview(raw)
            )),
        }
    }
}

/// Class details for each class-data entry, most-super first, with `None`
/// for the null level that ends the chain.
fn class_levels<'a>(table: &'a HandleTable, class: &'a Node) -> Vec<Option<&'a ClassDetails>> {
    let mut chain = Vec::new();
    let mut current = class;
    while chain.len() < 256 {
        match table.resolve_class(current) {
            Ok(Resolved::Class(details)) => {
                chain.push(Some(details));
                current = &details.super_class;
            }
            _ => {
                chain.push(None);
                break;
            }
        }
    }
    chain.reverse();
    chain
}

fn primitive_text(value: &FieldValue) -> String {
    let Some(raw) = value.raw_bytes() else {
        return String::new();
    };
    match value.field_type {
        FieldType::Boolean => (raw.first().copied().unwrap_or(0) != 0).to_string(),
        FieldType::Char => value
            .as_i64()
            .and_then(|c| char::from_u32(c as u32))
            .map(|c| c.to_string())
            .unwrap_or_default(),
        FieldType::Float => <[u8; 4]>::try_from(raw.as_ref())
            .map(|b| f32::from_be_bytes(b).to_string())
            .unwrap_or_default(),
        FieldType::Double => <[u8; 8]>::try_from(raw.as_ref())
            .map(|b| f64::from_be_bytes(b).to_string())
            .unwrap_or_default(),
        _ => value.as_i64().map(|v| v.to_string()).unwrap_or_default(),
    }
}

/// Hex of at most 64 bytes, with an ellipsis when longer.
fn hex_preview(bytes: &[u8]) -> String {
    const LIMIT: usize = 64;
    let mut text = hex::encode(&bytes[..bytes.len().min(LIMIT)]);
    if bytes.len() > LIMIT {
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ClassField, ObjectValue};

    #[test]
    fn renders_object_with_named_fields() {
        let mut details = ClassDetails::new("demo.Box", 1, 0x02);
        details.handle = 0x7E_0000;
        details
            .fields
            .fields
            .push(ClassField::primitive("size", FieldType::Int));
        let object = Node::Object(Box::new(ObjectValue {
            class: details.into_node(),
            handle: 0x7E_0001,
            class_data: vec![
                ClassData::default(),
                ClassData {
                    field_values: vec![FieldValue::int(2)],
                    block_data: Vec::new(),
                },
            ],
        }));

        let text = render(&[object]);
        assert!(text.starts_with("TC_OBJECT - 0x73\n"));
        assert!(text.contains("className - demo.Box"));
        assert!(text.contains("classDescFlags - 0x02 - SC_SERIALIZABLE"));
        assert!(text.contains("newHandle 0x007e0001"));
        assert!(text.contains("\n    demo.Box\n"));
        assert!(text.contains("(int)2 - 0x00000002"));
    }

    #[test]
    fn reference_names_its_target() {
        let text = render(&[Node::string("a"), Node::reference(0)]);
        assert!(text.contains("Handle - 0x00000000 - TC_STRING"));
        let text = render(&[Node::reference(0x7E_0005)]);
        assert!(text.contains("unresolved"));
    }

    #[test]
    fn long_byte_buffers_are_truncated() {
        assert_eq!(hex_preview(&[0xAB; 2]), "abab");
        assert!(hex_preview(&[0; 100]).ends_with("..."));
        assert_eq!(hex_preview(&[0; 100]).len(), 128 + 3);
    }

    #[test]
    fn reset_restarts_reference_labels() {
        let mut before = crate::node::StringValue::new("old");
        before.handle = 0x7E_0000;
        let mut details = ClassDetails::new("demo.After", 1, 0x02);
        details.handle = 0x7E_0000;
        let nodes = [
            Node::String(before),
            Node::reference(0x7E_0000),
            Node::Reset,
            details.into_node(),
            Node::reference(0x7E_0000),
        ];

        let text = render(&nodes);
        let labels: Vec<&str> = text
            .lines()
            .filter(|l| l.contains("Handle - 0x007e0000"))
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].ends_with("TC_STRING"));
        assert!(labels[1].ends_with("TC_CLASSDESC"));
    }
}
