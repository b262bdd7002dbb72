//! Node → document.

use base64::{engine::general_purpose::STANDARD, Engine};
use javaser_graph::node::{X_CLASSDATA, X_CLASSDESC, X_CLASSFIELD, X_CLASSFIELDS, X_FIELDVALUE};
use javaser_graph::{
    ArrayElements, ClassData, ClassDetails, ClassField, FieldPayload, FieldValue, Node,
};
use javaser_wire::tags::tag_name;
use serde_json::{json, Map, Value};

/// Render one node as a self-describing document.
pub fn to_document(node: &Node) -> Value {
    match node {
        Node::Null { is_empty } => marker(node.tag(), *is_empty),
        Node::EndBlockData { is_empty } => marker(node.tag(), *is_empty),
        Node::Reset => head(node.tag(), tag_name(node.tag())).into(),
        Node::Reference { handle } => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("value".into(), b64(&handle.to_be_bytes()));
            doc.insert("handle".into(), json!(handle));
            doc.into()
        }
        Node::String(s) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("is_long".into(), json!(s.is_long));
            doc.insert("size".into(), json!(s.size()));
            doc.insert("raw".into(), b64(&s.raw));
            doc.insert("value".into(), json!(s.text()));
            doc.insert("handle".into(), json!(s.handle));
            doc.into()
        }
        Node::ClassDesc(desc) => {
            let mut doc = head(0, X_CLASSDESC);
            doc.insert("detail".into(), class_details(&desc.detail));
            doc.into()
        }
        Node::ClassDetails(details) => class_details(details),
        Node::Object(obj) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("class_desc".into(), to_document(&obj.class));
            doc.insert(
                "class_data".into(),
                list(obj.class_data.iter().map(class_data)),
            );
            doc.insert("handle".into(), json!(obj.handle));
            doc.into()
        }
        Node::Array(arr) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("class_desc".into(), to_document(&arr.class));
            doc.insert("size".into(), json!(arr.size()));
            match &arr.elements {
                ArrayElements::Values(values) => {
                    doc.insert("values".into(), list(values.iter().map(field_value)));
                    doc.insert("handle".into(), json!(arr.handle));
                }
                ArrayElements::Bytes(bytes) => {
                    doc.insert("values".into(), Value::Null);
                    doc.insert("handle".into(), json!(arr.handle));
                    doc.insert("bytescode".into(), json!(true));
                    doc.insert("bytes".into(), b64(bytes));
                }
            }
            doc.into()
        }
        Node::Class(class) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("class_desc".into(), to_document(&class.desc));
            doc.insert("handle".into(), json!(class.handle));
            doc.into()
        }
        Node::Enum(value) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("type_class_desc".into(), to_document(&value.type_desc));
            doc.insert("constant_name".into(), to_document(&value.constant_name));
            doc.insert("handle".into(), json!(value.handle));
            doc.into()
        }
        Node::BlockData(block) => {
            let mut doc = head(node.tag(), tag_name(node.tag()));
            doc.insert("is_long".into(), json!(block.is_long));
            doc.insert("size".into(), json!(block.size()));
            doc.insert("contents".into(), b64(&block.contents));
            doc.into()
        }
    }
}

/// Render a list of top-level nodes as a JSON array.
pub fn nodes_to_document(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(to_document).collect())
}

fn head(tag: u8, discriminator: &str) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("type".into(), json!(tag));
    doc.insert("type_verbose".into(), json!(discriminator));
    doc
}

fn marker(tag: u8, is_empty: bool) -> Value {
    let mut doc = head(tag, tag_name(tag));
    if is_empty {
        doc.insert("is_empty".into(), json!(true));
    }
    doc.into()
}

fn b64(bytes: &[u8]) -> Value {
    Value::String(STANDARD.encode(bytes))
}

/// Empty lists render as `null`.
fn list(items: impl Iterator<Item = Value>) -> Value {
    let items: Vec<Value> = items.collect();
    if items.is_empty() {
        Value::Null
    } else {
        Value::Array(items)
    }
}

fn class_details(details: &ClassDetails) -> Value {
    let tag = if details.is_proxy {
        javaser_wire::tags::TC_PROXYCLASSDESC
    } else {
        javaser_wire::tags::TC_CLASSDESC
    };
    let mut doc = head(tag, tag_name(tag));
    doc.insert("is_null".into(), json!(false));
    doc.insert("class_name".into(), json!(details.class_name.text()));
    let serial = if details.is_proxy {
        Value::Null
    } else {
        b64(&details.serial_version)
    };
    doc.insert("serial_version".into(), serial);
    doc.insert("handle".into(), json!(details.handle));
    doc.insert("desc_flag".into(), json!(details.desc_flags));

    let mut fields = head(0, X_CLASSFIELDS);
    fields.insert("field_count".into(), json!(details.fields.field_count()));
    fields.insert(
        "fields".into(),
        list(details.fields.fields.iter().map(class_field)),
    );
    doc.insert("fields".into(), fields.into());

    doc.insert(
        "annotations".into(),
        list(details.annotations.iter().map(to_document)),
    );
    doc.insert("super_class".into(), to_document(&details.super_class));
    doc.insert("dynamic_proxy_class".into(), json!(details.is_proxy));
    doc.insert(
        "dynamic_proxy_class_interface_count".into(),
        json!(details.proxy_interface_names.len()),
    );
    doc.insert(
        "dynamic_proxy_annotation".into(),
        list(details.proxy_annotation.iter().map(to_document)),
    );
    doc.insert(
        "dynamic_proxy_class_interface_names".into(),
        list(details.proxy_interface_names.iter().map(|n| json!(n.text()))),
    );
    doc.into()
}

fn class_field(field: &ClassField) -> Value {
    let mut doc = head(0, X_CLASSFIELD);
    doc.insert("name".into(), json!(field.name.text()));
    doc.insert("field_type".into(), json!(field.field_type.tag()));
    doc.insert("field_type_verbose".into(), json!(field.field_type.name()));
    doc.insert(
        "class_name_1".into(),
        field.class_name.as_ref().map_or(Value::Null, to_document),
    );
    doc.into()
}

fn class_data(data: &ClassData) -> Value {
    let mut doc = head(0, X_CLASSDATA);
    doc.insert(
        "fields".into(),
        list(data.field_values.iter().map(field_value)),
    );
    doc.insert(
        "block_data".into(),
        list(data.block_data.iter().map(to_document)),
    );
    doc.into()
}

fn field_value(value: &FieldValue) -> Value {
    let mut doc = head(0, X_FIELDVALUE);
    doc.insert("field_type".into(), json!(value.field_type.tag()));
    doc.insert("field_type_verbose".into(), json!(value.field_type.name()));
    match &value.value {
        FieldPayload::Raw(raw) => doc.insert("bytes".into(), b64(raw)),
        FieldPayload::Nested(node) => doc.insert("object".into(), to_document(node)),
    };
    doc.into()
}
