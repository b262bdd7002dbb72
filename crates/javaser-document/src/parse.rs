//! Document → node.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use javaser_graph::node::{X_CLASSDATA, X_CLASSDESC, X_CLASSFIELD, X_CLASSFIELDS, X_FIELDVALUE};
use javaser_graph::{
    ArrayElements, ArrayValue, BlockData, ClassData, ClassDesc, ClassDetails, ClassField,
    ClassFields, ClassValue, EnumValue, FieldPayload, FieldValue, GraphError, Node, ObjectValue,
    StringValue,
};
use javaser_wire::tags::*;
use javaser_wire::{decode_modified_utf8, encode_modified_utf8, FieldType, ModifiedUtf8};
use serde_json::{Map, Value};

use crate::error::{DocumentError, Result};

/// Rebuild one node from its document.
pub fn from_document(doc: &Value) -> Result<Node> {
    let doc = Doc::new(doc)?;
    if doc.discriminator == X_CLASSDESC {
        let detail = Doc::new(doc.required("detail")?)?;
        if !matches!(
            tag_from_name(detail.discriminator),
            Some(TC_CLASSDESC | TC_PROXYCLASSDESC)
        ) {
            return Err(DocumentError::shape(X_CLASSDESC, "detail"));
        }
        return Ok(Node::ClassDesc(Box::new(ClassDesc::new(class_details(
            &detail,
        )?))));
    }
    let tag = tag_from_name(doc.discriminator)
        .ok_or_else(|| DocumentError::UnknownDiscriminator(doc.discriminator.to_string()))?;
    match tag {
        TC_NULL => Ok(Node::Null {
            is_empty: doc.flag("is_empty"),
        }),
        TC_ENDBLOCKDATA => Ok(Node::EndBlockData {
            is_empty: doc.flag("is_empty"),
        }),
        TC_RESET => Ok(Node::Reset),
        TC_REFERENCE => Ok(Node::reference(doc.u32("handle")?)),
        TC_STRING | TC_LONGSTRING => string(&doc, tag == TC_LONGSTRING),
        TC_CLASSDESC | TC_PROXYCLASSDESC => {
            Ok(Node::ClassDetails(Box::new(class_details(&doc)?)))
        }
        TC_OBJECT => Ok(Node::Object(Box::new(ObjectValue {
            class: doc.node("class_desc")?,
            handle: doc.u32("handle")?,
            class_data: doc
                .list("class_data")?
                .iter()
                .map(class_data)
                .collect::<Result<_>>()?,
        }))),
        TC_ARRAY => array(&doc),
        TC_CLASS => Ok(Node::Class(Box::new(ClassValue {
            desc: doc.node("class_desc")?,
            handle: doc.u32("handle")?,
        }))),
        TC_ENUM => Ok(Node::Enum(Box::new(EnumValue {
            type_desc: doc.node("type_class_desc")?,
            constant_name: doc.node("constant_name")?,
            handle: doc.u32("handle")?,
        }))),
        TC_BLOCKDATA | TC_BLOCKDATALONG => Ok(Node::BlockData(BlockData {
            is_long: doc.flag("is_long") || tag == TC_BLOCKDATALONG,
            contents: doc.bytes("contents")?,
        })),
        _ => Err(DocumentError::UnknownDiscriminator(doc.discriminator.to_string())),
    }
}

/// Accept either an array of node documents or a single node document.
pub fn document_to_nodes(doc: &Value) -> Result<Vec<Node>> {
    let nodes = match doc {
        Value::Array(items) => items.iter().map(from_document).collect::<Result<Vec<_>>>()?,
        single => vec![from_document(single)?],
    };
    tracing::debug!(nodes = nodes.len(), "document converted");
    Ok(nodes)
}

/// One document object with its discriminator.
struct Doc<'a> {
    discriminator: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> Doc<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| DocumentError::shape("document", "type_verbose"))?;
        let discriminator = map
            .get("type_verbose")
            .and_then(Value::as_str)
            .ok_or_else(|| DocumentError::shape("document", "type_verbose"))?;
        Ok(Self { discriminator, map })
    }

    fn missing(&self, key: &str) -> DocumentError {
        DocumentError::shape(self.discriminator, key)
    }

    /// Present and not `null`.
    fn required(&self, key: &str) -> Result<&'a Value> {
        match self.map.get(key) {
            Some(Value::Null) | None => Err(self.missing(key)),
            Some(value) => Ok(value),
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.map.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn u64(&self, key: &str) -> Result<u64> {
        self.required(key)?
            .as_u64()
            .ok_or_else(|| self.missing(key))
    }

    fn u32(&self, key: &str) -> Result<u32> {
        u32::try_from(self.u64(key)?).map_err(|_| self.missing(key))
    }

    fn u8(&self, key: &str) -> Result<u8> {
        u8::try_from(self.u64(key)?).map_err(|_| self.missing(key))
    }

    fn str(&self, key: &str) -> Result<&'a str> {
        self.required(key)?
            .as_str()
            .ok_or_else(|| self.missing(key))
    }

    /// Base64 bytes; `null` or missing reads as empty.
    fn bytes(&self, key: &str) -> Result<Bytes> {
        let text = match self.map.get(key) {
            Some(Value::Null) | None => return Ok(Bytes::new()),
            Some(Value::String(text)) => text,
            Some(_) => return Err(self.missing(key)),
        };
        let raw = STANDARD
            .decode(text)
            .map_err(|source| DocumentError::InvalidBase64 {
                field: format!("{}.{key}", self.discriminator),
                source,
            })?;
        Ok(Bytes::from(raw))
    }

    /// A list; `null` or missing reads as empty.
    fn list(&self, key: &str) -> Result<&'a [Value]> {
        match self.map.get(key) {
            Some(Value::Null) | None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.missing(key)),
        }
    }

    fn nodes(&self, key: &str) -> Result<Vec<Node>> {
        self.list(key)?.iter().map(from_document).collect()
    }

    fn node(&self, key: &str) -> Result<Node> {
        from_document(self.required(key)?)
    }

    fn field_type(&self) -> Result<FieldType> {
        let code = self.u8("field_type")?;
        FieldType::from_tag(code).ok_or_else(|| GraphError::UnsupportedFieldType(code).into())
    }
}

fn string(doc: &Doc<'_>, is_long: bool) -> Result<Node> {
    let mut raw = doc.bytes("raw")?;
    if let Some(Value::String(value)) = doc.map.get("value") {
        if *value != decode_modified_utf8(&raw) {
            tracing::trace!(value = %value, "string value edited; re-encoding raw bytes");
            raw = Bytes::from(encode_modified_utf8(value));
        }
    }
    Ok(Node::String(StringValue {
        is_long: doc.flag("is_long") || is_long,
        raw,
        handle: doc.u32("handle")?,
    }))
}

fn class_details(doc: &Doc<'_>) -> Result<ClassDetails> {
    let is_proxy = tag_from_name(doc.discriminator) == Some(TC_PROXYCLASSDESC)
        || doc.flag("dynamic_proxy_class");
    let mut details = ClassDetails {
        handle: doc.u32("handle")?,
        desc_flags: doc.u8("desc_flag")?,
        is_proxy,
        super_class: doc.node("super_class")?,
        ..ClassDetails::default()
    };

    if is_proxy {
        details.proxy_annotation = doc.nodes("dynamic_proxy_annotation")?;
        details.proxy_interface_names = doc
            .list("dynamic_proxy_class_interface_names")?
            .iter()
            .map(|name| {
                name.as_str()
                    .map(ModifiedUtf8::from)
                    .ok_or_else(|| doc.missing("dynamic_proxy_class_interface_names"))
            })
            .collect::<Result<_>>()?;
        return Ok(details);
    }

    details.class_name = ModifiedUtf8::from(doc.str("class_name")?);
    let serial = doc.bytes("serial_version")?;
    details.serial_version = serial
        .as_ref()
        .try_into()
        .map_err(|_| doc.missing("serial_version"))?;
    details.fields = class_fields(doc.required("fields")?)?;
    details.annotations = doc.nodes("annotations")?;
    Ok(details)
}

fn class_fields(value: &Value) -> Result<ClassFields> {
    let doc = Doc::new(value)?;
    if doc.discriminator != X_CLASSFIELDS {
        return Err(DocumentError::shape(X_CLASSFIELDS, "type_verbose"));
    }
    let fields = doc
        .list("fields")?
        .iter()
        .map(class_field)
        .collect::<Result<_>>()?;
    Ok(ClassFields { fields })
}

fn class_field(value: &Value) -> Result<ClassField> {
    let doc = Doc::new(value)?;
    if doc.discriminator != X_CLASSFIELD {
        return Err(DocumentError::shape(X_CLASSFIELD, "type_verbose"));
    }
    let field_type = doc.field_type()?;
    let class_name = if field_type.is_reference() {
        Some(doc.node("class_name_1")?)
    } else {
        None
    };
    Ok(ClassField {
        name: ModifiedUtf8::from(doc.str("name")?),
        field_type,
        class_name,
    })
}

fn class_data(value: &Value) -> Result<ClassData> {
    let doc = Doc::new(value)?;
    if doc.discriminator != X_CLASSDATA {
        return Err(DocumentError::shape(X_CLASSDATA, "type_verbose"));
    }
    Ok(ClassData {
        field_values: doc
            .list("fields")?
            .iter()
            .map(field_value)
            .collect::<Result<_>>()?,
        block_data: doc.nodes("block_data")?,
    })
}

fn field_value(value: &Value) -> Result<FieldValue> {
    let doc = Doc::new(value)?;
    if doc.discriminator != X_FIELDVALUE {
        return Err(DocumentError::shape(X_FIELDVALUE, "type_verbose"));
    }
    let field_type = doc.field_type()?;
    let payload = match field_type.width() {
        None => FieldPayload::Nested(doc.node("object")?),
        Some(width) => {
            let raw = doc.bytes("bytes")?;
            if raw.len() != width {
                return Err(doc.missing("bytes"));
            }
            FieldPayload::Raw(raw)
        }
    };
    Ok(FieldValue {
        field_type,
        value: payload,
    })
}

fn array(doc: &Doc<'_>) -> Result<Node> {
    let elements = if doc.flag("bytescode") {
        ArrayElements::Bytes(doc.bytes("bytes")?)
    } else {
        ArrayElements::Values(
            doc.list("values")?
                .iter()
                .map(field_value)
                .collect::<Result<_>>()?,
        )
    };
    Ok(Node::Array(Box::new(ArrayValue {
        class: doc.node("class_desc")?,
        handle: doc.u32("handle")?,
        elements,
    })))
}
