//! Recursive-descent decoder.
//!
//! Decoding is lenient: elements are read until the input runs out, and a
//! failure part way through keeps every top-level node decoded before it.

use bytes::Bytes;
use javaser_wire::tags::*;
use javaser_wire::{
    decode_header, FieldType, ModifiedUtf8, StreamHeader, WireError, WireReader, HEADER_SIZE,
};

use crate::config::DecodeConfig;
use crate::error::{GraphError, Result};
use crate::handle::{HandleTable, Resolved};
use crate::node::{
    ArrayElements, ArrayValue, BlockData, ClassData, ClassDetails, ClassField, ClassValue,
    EnumValue, FieldPayload, FieldValue, Node, ObjectValue, StringValue,
};

/// Result of a decode call.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The stream header, if it could be read.
    pub header: Option<StreamHeader>,
    /// Top-level nodes decoded before the input ended or an error occurred.
    pub nodes: Vec<Node>,
    /// The error that stopped decoding early.
    pub error: Option<GraphError>,
    /// Bytes covered by `header` and `nodes`.
    pub consumed: usize,
}

impl Decoded {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial results and return the nodes only if decoding
    /// reached the end of input.
    pub fn into_result(self) -> Result<Vec<Node>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.nodes),
        }
    }
}

/// Decode a complete stream with the default configuration.
pub fn decode(input: impl Into<Bytes>) -> Decoded {
    decode_with_config(input, &DecodeConfig::default())
}

/// Decode a complete stream.
pub fn decode_with_config(input: impl Into<Bytes>, config: &DecodeConfig) -> Decoded {
    let input = input.into();
    let header = match decode_header(&input) {
        Ok(header) => header,
        Err(err) => {
            tracing::warn!(error = %err, "stream header rejected");
            return Decoded {
                header: None,
                nodes: Vec::new(),
                error: Some(err.into()),
                consumed: 0,
            };
        }
    };

    let mut decoder = Decoder::new(input.slice(HEADER_SIZE..), config);
    let mut nodes = Vec::new();
    let mut error = None;
    while !decoder.reader.is_empty() {
        match decoder.read_content() {
            Ok(node) => {
                tracing::trace!(kind = node.kind_name(), "decoded top-level element");
                nodes.push(node);
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    decoded = nodes.len(),
                    offset = HEADER_SIZE + decoder.last_complete,
                    "decode stopped early; returning partial result"
                );
                error = Some(err);
                break;
            }
        }
        decoder.last_complete = decoder.reader.position();
    }

    let consumed = HEADER_SIZE + decoder.last_complete;
    tracing::debug!(nodes = nodes.len(), consumed, "decode finished");
    Decoded {
        header: Some(header),
        nodes,
        error,
        consumed,
    }
}

/// What the class-data walk needs from one ancestor level.
struct Level {
    serializable: bool,
    annotated: bool,
    fields: Vec<FieldType>,
}

impl Level {
    fn of(details: &ClassDetails) -> Self {
        Self {
            serializable: details.is_serializable(),
            annotated: details.has_object_annotation(),
            fields: details.fields.fields.iter().map(|f| f.field_type).collect(),
        }
    }
}

struct Decoder<'c> {
    reader: WireReader,
    handles: HandleTable,
    config: &'c DecodeConfig,
    depth: usize,
    last_complete: usize,
}

impl<'c> Decoder<'c> {
    fn new(body: Bytes, config: &'c DecodeConfig) -> Self {
        Self {
            reader: WireReader::new(body),
            handles: HandleTable::new(),
            config,
            depth: 0,
            last_complete: 0,
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.config.max_depth {
            return Err(GraphError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn read_content(&mut self) -> Result<Node> {
        let tag = self.reader.read_u8()?;
        self.nested(|d| d.read_tagged(tag))
    }

    fn read_tagged(&mut self, tag: u8) -> Result<Node> {
        tracing::trace!(tag = tag_name(tag), offset = self.reader.position(), "element");
        match tag {
            TC_NULL => Ok(Node::null()),
            TC_REFERENCE => self.read_reference(),
            TC_STRING => self.read_string(false),
            TC_LONGSTRING => self.read_string(true),
            TC_CLASSDESC => Ok(self.read_class_details()?.into_node()),
            TC_PROXYCLASSDESC => Ok(self.read_proxy_details()?.into_node()),
            TC_OBJECT => self.read_object(),
            TC_ARRAY => self.read_array(),
            TC_CLASS => self.read_class(),
            TC_ENUM => self.read_enum(),
            TC_BLOCKDATA => {
                let len = self.reader.read_u8()?;
                let contents = self.reader.read_bytes(usize::from(len))?;
                Ok(Node::BlockData(BlockData {
                    is_long: false,
                    contents,
                }))
            }
            TC_BLOCKDATALONG => {
                let len = self.reader.read_u32()? as usize;
                let contents = self.reader.read_bytes(len)?;
                Ok(Node::BlockData(BlockData {
                    is_long: true,
                    contents,
                }))
            }
            TC_ENDBLOCKDATA => Ok(Node::end_block()),
            TC_RESET => {
                tracing::debug!("handle table reset");
                self.handles.reset();
                Ok(Node::Reset)
            }
            other if is_content_tag(other) => Err(GraphError::UnknownTag {
                tag: other,
                context: "unsupported content element",
            }),
            other => Err(GraphError::UnknownTag {
                tag: other,
                context: "content element",
            }),
        }
    }

    fn read_reference(&mut self) -> Result<Node> {
        let handle = self.reader.read_u32()?;
        Ok(Node::reference(handle))
    }

    fn read_name(&mut self) -> Result<ModifiedUtf8> {
        Ok(ModifiedUtf8::from_raw(self.reader.read_utf()?))
    }

    fn read_string(&mut self, is_long: bool) -> Result<Node> {
        let handle = self.handles.assign();
        let raw = if is_long {
            self.reader.read_long_utf()?
        } else {
            self.reader.read_utf()?
        };
        let node = Node::String(StringValue {
            is_long,
            raw,
            handle,
        });
        self.handles.register(handle, node.clone());
        Ok(node)
    }

    /// A string slot: `TC_STRING`, `TC_LONGSTRING` or `TC_REFERENCE`.
    fn read_string_object(&mut self) -> Result<Node> {
        match self.reader.read_u8()? {
            TC_STRING => self.read_string(false),
            TC_LONGSTRING => self.read_string(true),
            TC_REFERENCE => self.read_reference(),
            other => Err(GraphError::UnknownTag {
                tag: other,
                context: "string",
            }),
        }
    }

    /// A class slot. End of input reads as an empty null.
    fn read_class_desc(&mut self) -> Result<Node> {
        let Some(tag) = self.reader.peek_u8() else {
            return Ok(Node::Null { is_empty: true });
        };
        self.reader.advance(1)?;
        self.nested(|d| match tag {
            TC_CLASSDESC => Ok(d.read_class_details()?.into_node()),
            TC_PROXYCLASSDESC => Ok(d.read_proxy_details()?.into_node()),
            TC_NULL => Ok(Node::null()),
            TC_REFERENCE => d.read_reference(),
            other => Err(GraphError::UnknownTag {
                tag: other,
                context: "class description",
            }),
        })
    }

    fn register_details(&mut self, details: &ClassDetails) {
        self.handles
            .register(details.handle, Node::ClassDetails(Box::new(details.clone())));
    }

    fn read_class_details(&mut self) -> Result<ClassDetails> {
        let class_name = self.read_name()?;
        let serial_version = self.reader.read_array::<8>()?;
        let handle = self.handles.assign();
        let mut details = ClassDetails {
            class_name,
            serial_version,
            handle,
            ..ClassDetails::default()
        };
        self.register_details(&details);

        details.desc_flags = self.reader.read_u8()?;
        let field_count = self.reader.read_u16()?;
        for _ in 0..field_count {
            let field = self.read_field_desc()?;
            details.fields.fields.push(field);
        }
        self.register_details(&details);
        tracing::trace!(
            class = %details.class_name,
            flags = ?class_flags::describe(details.desc_flags),
            fields = field_count,
            "class description"
        );

        details.annotations = self.read_class_annotation()?;
        details.super_class = self.read_class_desc()?;
        self.register_details(&details);
        Ok(details)
    }

    fn read_proxy_details(&mut self) -> Result<ClassDetails> {
        let handle = self.handles.assign();
        let mut details = ClassDetails {
            handle,
            is_proxy: true,
            ..ClassDetails::default()
        };
        self.register_details(&details);

        let count = self.reader.read_u32()?;
        for _ in 0..count {
            let name = self.read_name()?;
            details.proxy_interface_names.push(name);
        }
        details.proxy_annotation = self.read_class_annotation()?;
        details.super_class = self.read_class_desc()?;
        self.register_details(&details);
        Ok(details)
    }

    fn read_field_desc(&mut self) -> Result<ClassField> {
        let code = self.reader.read_u8()?;
        let field_type = FieldType::from_tag(code).ok_or(GraphError::UnsupportedFieldType(code))?;
        let name = self.read_name()?;
        let class_name = if field_type.is_reference() {
            Some(self.read_string_object()?)
        } else {
            None
        };
        Ok(ClassField {
            name,
            field_type,
            class_name,
        })
    }

    /// Content elements up to `TC_ENDBLOCKDATA`, which is not kept.
    fn read_class_annotation(&mut self) -> Result<Vec<Node>> {
        let mut contents = Vec::new();
        loop {
            let node = self.read_content()?;
            if matches!(node, Node::EndBlockData { .. }) {
                return Ok(contents);
            }
            contents.push(node);
        }
    }

    /// Fail unless a class slot names a concrete class.
    fn require_class(&self, class: &Node) -> Result<()> {
        match self.handles.resolve_class(class)? {
            Resolved::Class(_) => Ok(()),
            Resolved::Absent(handle) => Err(GraphError::UnresolvedReference(handle)),
            Resolved::Null => Err(self.null_class_error(class)),
        }
    }

    fn null_class_error(&self, class: &Node) -> GraphError {
        if matches!(class, Node::Null { is_empty: true }) {
            WireError::InputTruncated {
                expected: 1,
                available: 0,
            }
            .into()
        } else {
            GraphError::UnsupportedSuperclassNodeKind { kind: "TC_NULL" }
        }
    }

    fn read_object(&mut self) -> Result<Node> {
        let class = self.read_class_desc()?;
        self.require_class(&class)?;
        let handle = self.handles.assign();
        let mut object = ObjectValue {
            class,
            handle,
            class_data: Vec::new(),
        };
        self.handles
            .register(handle, Node::Object(Box::new(object.clone())));

        let levels = self.class_levels(&object.class)?;
        for level in levels.iter().rev() {
            let data = self.read_class_data(level.as_ref())?;
            object.class_data.push(data);
        }
        Ok(Node::Object(Box::new(object)))
    }

    /// The class and its ancestors, own class first. A null or unknown
    /// superclass ends the chain with a `None` level.
    fn class_levels(&self, class: &Node) -> Result<Vec<Option<Level>>> {
        let mut levels = Vec::new();
        let mut current = class;
        loop {
            if levels.len() > self.config.max_depth {
                return Err(GraphError::CyclicClassHierarchy(
                    current.handle().unwrap_or_default(),
                ));
            }
            match self.handles.resolve_class(current)? {
                Resolved::Class(details) => {
                    levels.push(Some(Level::of(details)));
                    current = &details.super_class;
                }
                Resolved::Null | Resolved::Absent(_) => {
                    levels.push(None);
                    return Ok(levels);
                }
            }
        }
    }

    fn read_class_data(&mut self, level: Option<&Level>) -> Result<ClassData> {
        let mut data = ClassData::default();
        let Some(level) = level else {
            return Ok(data);
        };

        if level.serializable {
            for field_type in &level.fields {
                let value = self.read_field_value(*field_type)?;
                data.field_values.push(value);
            }
        }

        if level.annotated {
            loop {
                if self.reader.is_empty() {
                    tracing::trace!("object annotation ended by end of input");
                    data.block_data.push(Node::EndBlockData { is_empty: true });
                    break;
                }
                let node = self.read_content()?;
                let done = matches!(node, Node::EndBlockData { .. });
                data.block_data.push(node);
                if done {
                    break;
                }
            }
        }
        Ok(data)
    }

    fn read_field_value(&mut self, field_type: FieldType) -> Result<FieldValue> {
        if let Some(width) = field_type.width() {
            let raw = self.reader.read_bytes(width)?;
            return Ok(FieldValue::raw(field_type, raw));
        }
        let tag = self.reader.read_u8()?;
        let allowed = match field_type {
            FieldType::Array => matches!(tag, TC_NULL | TC_ARRAY | TC_REFERENCE),
            _ => matches!(
                tag,
                TC_OBJECT
                    | TC_REFERENCE
                    | TC_NULL
                    | TC_STRING
                    | TC_LONGSTRING
                    | TC_CLASS
                    | TC_ARRAY
                    | TC_ENUM
            ),
        };
        if !allowed {
            return Err(GraphError::UnknownTag {
                tag,
                context: if field_type == FieldType::Array {
                    "array field"
                } else {
                    "object field"
                },
            });
        }
        let node = self.nested(|d| d.read_tagged(tag))?;
        Ok(FieldValue {
            field_type,
            value: FieldPayload::Nested(node),
        })
    }

    fn array_element_type(&self, class: &Node) -> Result<FieldType> {
        let details = match self.handles.resolve_class(class)? {
            Resolved::Class(details) => details,
            Resolved::Absent(handle) => return Err(GraphError::UnresolvedReference(handle)),
            Resolved::Null => return Err(self.null_class_error(class)),
        };
        let name = details.class_name.as_bytes();
        if name.len() < 2 || name[0] != b'[' {
            return Err(GraphError::InvalidArrayClassName(details.class_name.to_string()));
        }
        FieldType::from_tag(name[1]).ok_or(GraphError::UnsupportedFieldType(name[1]))
    }

    fn read_array(&mut self) -> Result<Node> {
        let class = self.read_class_desc()?;
        let handle = self.handles.assign();
        let mut array = ArrayValue {
            class,
            handle,
            elements: ArrayElements::Values(Vec::new()),
        };
        self.handles
            .register(handle, Node::Array(Box::new(array.clone())));

        let size = self.reader.read_i32()?;
        let size = usize::try_from(size).map_err(|_| GraphError::NegativeArraySize(size))?;
        if size > 0 {
            let element = self.array_element_type(&array.class)?;
            if self.config.collapse_byte_arrays && element == FieldType::Byte {
                array.elements = ArrayElements::Bytes(self.reader.read_bytes(size)?);
            } else {
                let mut values = Vec::with_capacity(size.min(self.reader.remaining()));
                for _ in 0..size {
                    values.push(self.read_field_value(element)?);
                }
                array.elements = ArrayElements::Values(values);
            }
        }
        if self.config.collapse_byte_arrays && array.collapse_bytes() {
            tracing::trace!(size, "byte array collapsed");
        }
        Ok(Node::Array(Box::new(array)))
    }

    fn read_class(&mut self) -> Result<Node> {
        let desc = self.read_class_desc()?;
        let handle = self.handles.assign();
        let node = Node::Class(Box::new(ClassValue { desc, handle }));
        self.handles.register(handle, node.clone());
        Ok(node)
    }

    fn read_enum(&mut self) -> Result<Node> {
        let type_desc = self.read_class_desc()?;
        let handle = self.handles.assign();
        let mut value = EnumValue {
            type_desc,
            constant_name: Node::null(),
            handle,
        };
        self.handles
            .register(handle, Node::Enum(Box::new(value.clone())));
        value.constant_name = self.read_string_object()?;
        Ok(Node::Enum(Box::new(value)))
    }
}
