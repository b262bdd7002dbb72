//! The node model.
//!
//! One closed enum covers every record kind that can appear in a stream.
//! Nodes own their children; cross-links between records are expressed as
//! [`Node::Reference`] handles and resolved through a
//! [`HandleTable`](crate::handle::HandleTable) only when a concrete value is
//! needed.

use bytes::Bytes;
use javaser_wire::{decode_modified_utf8, encode_modified_utf8, ModifiedUtf8};
use javaser_wire::tags::{self, class_flags};
use javaser_wire::FieldType;

use crate::config::{BYTE_ARRAY_HEURISTIC_MIN_SIZE, BYTE_ARRAY_HEURISTIC_SAMPLE};

/// Discriminator of the class description wrapper.
pub const X_CLASSDESC: &str = "X_CLASSDESC";
/// Discriminator of a class's field list.
pub const X_CLASSFIELDS: &str = "X_CLASSFIELDS";
/// Discriminator of a single field descriptor.
pub const X_CLASSFIELD: &str = "X_CLASSFIELD";
/// Discriminator of one ancestor level of object data.
pub const X_CLASSDATA: &str = "X_CLASSDATA";
/// Discriminator of a single field value.
pub const X_FIELDVALUE: &str = "X_FIELDVALUE";

/// A decoded stream record.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `TC_NULL`. `is_empty` marks a slot that was missing because the
    /// input ended; it encodes to nothing.
    Null { is_empty: bool },
    /// `TC_REFERENCE` to a previously assigned handle.
    Reference { handle: u32 },
    /// `TC_STRING` / `TC_LONGSTRING`.
    String(StringValue),
    /// A class description as it appears in a class slot.
    ClassDesc(Box<ClassDesc>),
    /// A bare class description, as stored in the handle table.
    ClassDetails(Box<ClassDetails>),
    /// `TC_OBJECT`.
    Object(Box<ObjectValue>),
    /// `TC_ARRAY`.
    Array(Box<ArrayValue>),
    /// `TC_CLASS`.
    Class(Box<ClassValue>),
    /// `TC_ENUM`.
    Enum(Box<EnumValue>),
    /// `TC_BLOCKDATA` / `TC_BLOCKDATALONG`.
    BlockData(BlockData),
    /// `TC_ENDBLOCKDATA`. `is_empty` marks a terminator implied by the end
    /// of input; it encodes to nothing.
    EndBlockData { is_empty: bool },
    /// `TC_RESET`.
    Reset,
}

impl Node {
    /// An explicit `TC_NULL`.
    pub fn null() -> Self {
        Self::Null { is_empty: false }
    }

    /// An explicit `TC_ENDBLOCKDATA`.
    pub fn end_block() -> Self {
        Self::EndBlockData { is_empty: false }
    }

    pub fn reference(handle: u32) -> Self {
        Self::Reference { handle }
    }

    pub fn string(text: &str) -> Self {
        Self::String(StringValue::new(text))
    }

    /// Wire tag of the record, 0 for the class description wrapper.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Null { .. } => tags::TC_NULL,
            Self::Reference { .. } => tags::TC_REFERENCE,
            Self::String(s) if s.is_long => tags::TC_LONGSTRING,
            Self::String(_) => tags::TC_STRING,
            Self::ClassDesc(_) => 0,
            Self::ClassDetails(d) if d.is_proxy => tags::TC_PROXYCLASSDESC,
            Self::ClassDetails(_) => tags::TC_CLASSDESC,
            Self::Object(_) => tags::TC_OBJECT,
            Self::Array(_) => tags::TC_ARRAY,
            Self::Class(_) => tags::TC_CLASS,
            Self::Enum(_) => tags::TC_ENUM,
            Self::BlockData(b) if b.is_long => tags::TC_BLOCKDATALONG,
            Self::BlockData(_) => tags::TC_BLOCKDATA,
            Self::EndBlockData { .. } => tags::TC_ENDBLOCKDATA,
            Self::Reset => tags::TC_RESET,
        }
    }

    /// Discriminator name used in dumps and documents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ClassDesc(_) => X_CLASSDESC,
            other => tags::tag_name(other.tag()),
        }
    }

    /// Handle assigned to this record, if it carries one.
    pub fn handle(&self) -> Option<u32> {
        match self {
            Self::String(s) => Some(s.handle),
            Self::ClassDesc(d) => Some(d.detail.handle),
            Self::ClassDetails(d) => Some(d.handle),
            Self::Object(o) => Some(o.handle),
            Self::Array(a) => Some(a.handle),
            Self::Class(c) => Some(c.handle),
            Self::Enum(e) => Some(e.handle),
            Self::Reference { handle } => Some(*handle),
            _ => None,
        }
    }

    /// The class details behind a class slot, without following references.
    pub fn class_details(&self) -> Option<&ClassDetails> {
        match self {
            Self::ClassDesc(d) => Some(&d.detail),
            Self::ClassDetails(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null { .. })
    }

    pub fn as_string(&self) -> Option<&StringValue> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayValue> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// `TC_STRING` / `TC_LONGSTRING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    pub is_long: bool,
    /// Bytes exactly as they appeared on the wire (modified UTF-8).
    pub raw: Bytes,
    pub handle: u32,
}

impl StringValue {
    /// A short string with handle 0, for hand-built graphs.
    pub fn new(text: &str) -> Self {
        Self {
            is_long: false,
            raw: Bytes::from(encode_modified_utf8(text)),
            handle: 0,
        }
    }

    /// Length in bytes of the wire form.
    pub fn size(&self) -> u64 {
        self.raw.len() as u64
    }

    /// Decoded text.
    pub fn text(&self) -> String {
        decode_modified_utf8(&self.raw)
    }
}

/// Class description wrapper.
///
/// Kept apart from [`ClassDetails`] because the wrapper is what occupies a
/// class slot, while the handle table points at the details.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
    pub detail: ClassDetails,
}

impl ClassDesc {
    pub fn new(detail: ClassDetails) -> Self {
        Self { detail }
    }
}

/// Schema portion of a serialized class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDetails {
    pub class_name: ModifiedUtf8,
    pub serial_version: [u8; 8],
    pub handle: u32,
    pub desc_flags: u8,
    pub fields: ClassFields,
    pub annotations: Vec<Node>,
    /// Next class up the hierarchy: usually a `ClassDesc`, `Reference` or `Null`.
    pub super_class: Node,
    pub is_proxy: bool,
    pub proxy_interface_names: Vec<ModifiedUtf8>,
    pub proxy_annotation: Vec<Node>,
}

impl Default for ClassDetails {
    fn default() -> Self {
        Self {
            class_name: ModifiedUtf8::default(),
            serial_version: [0; 8],
            handle: 0,
            desc_flags: 0,
            fields: ClassFields::default(),
            annotations: Vec::new(),
            super_class: Node::null(),
            is_proxy: false,
            proxy_interface_names: Vec::new(),
            proxy_annotation: Vec::new(),
        }
    }
}

impl ClassDetails {
    /// A plain class description with no fields and a null superclass.
    pub fn new(class_name: impl Into<ModifiedUtf8>, serial_version: u64, desc_flags: u8) -> Self {
        Self {
            class_name: class_name.into(),
            serial_version: serial_version.to_be_bytes(),
            desc_flags,
            ..Self::default()
        }
    }

    pub fn serial_version_uid(&self) -> i64 {
        i64::from_be_bytes(self.serial_version)
    }

    pub fn is_serializable(&self) -> bool {
        self.desc_flags & class_flags::SC_SERIALIZABLE != 0
    }

    pub fn has_write_method(&self) -> bool {
        self.desc_flags & class_flags::SC_WRITE_METHOD != 0
    }

    pub fn is_externalizable(&self) -> bool {
        self.desc_flags & class_flags::SC_EXTERNALIZABLE != 0
    }

    pub fn is_block_data(&self) -> bool {
        self.desc_flags & class_flags::SC_BLOCKDATA != 0
    }

    /// Whether object data at this level carries a trailing annotation
    /// stream terminated by `TC_ENDBLOCKDATA`.
    pub fn has_object_annotation(&self) -> bool {
        (self.has_write_method() && self.is_serializable())
            || (self.is_externalizable() && self.is_block_data())
    }

    /// The annotation list that is written for this description:
    /// `proxy_annotation` for proxies, `annotations` otherwise.
    pub fn annotation_slot(&self) -> &[Node] {
        if self.is_proxy {
            &self.proxy_annotation
        } else {
            &self.annotations
        }
    }

    /// Element type of an array class (`[I` → int), read from the second
    /// character of the class name.
    pub fn array_element_type(&self) -> Option<FieldType> {
        let bytes = self.class_name.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'[' {
            return None;
        }
        FieldType::from_tag(bytes[1])
    }

    pub fn into_node(self) -> Node {
        Node::ClassDesc(Box::new(ClassDesc::new(self)))
    }
}

/// Declared fields of a class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFields {
    pub fields: Vec<ClassField>,
}

impl ClassFields {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// One field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassField {
    pub name: ModifiedUtf8,
    pub field_type: FieldType,
    /// Type signature string (or reference to one); only for array and
    /// object fields.
    pub class_name: Option<Node>,
}

impl ClassField {
    pub fn primitive(name: impl Into<ModifiedUtf8>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            class_name: None,
        }
    }

    pub fn object(name: impl Into<ModifiedUtf8>, field_type: FieldType, signature: Node) -> Self {
        Self {
            name: name.into(),
            field_type,
            class_name: Some(signature),
        }
    }
}

/// Field values and annotation stream for one ancestor level of an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassData {
    pub field_values: Vec<FieldValue>,
    /// Annotation contents including the closing `EndBlockData`.
    pub block_data: Vec<Node>,
}

/// `TC_OBJECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub class: Node,
    pub handle: u32,
    /// One entry per ancestor level, most-super class first.
    pub class_data: Vec<ClassData>,
}

/// Elements of an array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElements {
    Values(Vec<FieldValue>),
    /// Collapsed byte array.
    Bytes(Bytes),
}

/// `TC_ARRAY`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub class: Node,
    pub handle: u32,
    pub elements: ArrayElements,
}

impl ArrayValue {
    pub fn size(&self) -> usize {
        match &self.elements {
            ArrayElements::Values(values) => values.len(),
            ArrayElements::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.elements, ArrayElements::Bytes(_))
    }

    /// Whether this array should be stored as a byte buffer.
    ///
    /// A directly described class decides by name (`[B`). A class known only
    /// through a back-reference is guessed from the contents: more than 100
    /// elements, and the first 100 all byte-typed.
    pub fn is_byte_array(&self) -> bool {
        if let Some(details) = self.class.class_details() {
            return details.class_name == "[B";
        }
        match &self.elements {
            ArrayElements::Bytes(_) => true,
            ArrayElements::Values(values) => {
                values.len() > BYTE_ARRAY_HEURISTIC_MIN_SIZE
                    && values
                        .iter()
                        .take(BYTE_ARRAY_HEURISTIC_SAMPLE)
                        .all(|v| v.field_type == FieldType::Byte)
            }
        }
    }

    /// Move every element's byte into one buffer. Returns true if the array
    /// is collapsed afterwards. Applying it again changes nothing.
    pub fn collapse_bytes(&mut self) -> bool {
        let ArrayElements::Values(values) = &self.elements else {
            return true;
        };
        if !self.is_byte_array() {
            return false;
        }
        let mut buf = Vec::with_capacity(values.len());
        for value in values {
            match (&value.field_type, &value.value) {
                (FieldType::Byte, FieldPayload::Raw(raw)) if raw.len() == 1 => buf.push(raw[0]),
                _ => return false,
            }
        }
        self.elements = ArrayElements::Bytes(Bytes::from(buf));
        true
    }

    /// Element values, expanding a collapsed buffer back to byte values.
    pub fn values(&self) -> Vec<FieldValue> {
        match &self.elements {
            ArrayElements::Values(values) => values.clone(),
            ArrayElements::Bytes(bytes) => bytes.iter().map(|b| FieldValue::byte(*b)).collect(),
        }
    }
}

/// `TC_CLASS`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassValue {
    pub desc: Node,
    pub handle: u32,
}

/// `TC_ENUM`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub type_desc: Node,
    pub constant_name: Node,
    pub handle: u32,
}

/// `TC_BLOCKDATA` / `TC_BLOCKDATALONG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockData {
    pub is_long: bool,
    pub contents: Bytes,
}

impl BlockData {
    pub fn new(contents: impl Into<Bytes>) -> Self {
        let contents = contents.into();
        Self {
            is_long: contents.len() > usize::from(u8::MAX),
            contents,
        }
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }
}

/// Payload of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPayload {
    /// Fixed-width bytes of a primitive.
    Raw(Bytes),
    /// Nested content for array and object types.
    Nested(Node),
}

/// A single field or array element value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field_type: FieldType,
    pub value: FieldPayload,
}

impl FieldValue {
    pub fn raw(field_type: FieldType, raw: impl Into<Bytes>) -> Self {
        Self {
            field_type,
            value: FieldPayload::Raw(raw.into()),
        }
    }

    pub fn byte(v: u8) -> Self {
        Self::raw(FieldType::Byte, vec![v])
    }

    pub fn boolean(v: bool) -> Self {
        Self::raw(FieldType::Boolean, vec![u8::from(v)])
    }

    pub fn short(v: i16) -> Self {
        Self::raw(FieldType::Short, v.to_be_bytes().to_vec())
    }

    pub fn int(v: i32) -> Self {
        Self::raw(FieldType::Int, v.to_be_bytes().to_vec())
    }

    pub fn long(v: i64) -> Self {
        Self::raw(FieldType::Long, v.to_be_bytes().to_vec())
    }

    pub fn object(node: Node) -> Self {
        Self {
            field_type: FieldType::Object,
            value: FieldPayload::Nested(node),
        }
    }

    pub fn array(node: Node) -> Self {
        Self {
            field_type: FieldType::Array,
            value: FieldPayload::Nested(node),
        }
    }

    pub fn raw_bytes(&self) -> Option<&Bytes> {
        match &self.value {
            FieldPayload::Raw(raw) => Some(raw),
            FieldPayload::Nested(_) => None,
        }
    }

    pub fn nested(&self) -> Option<&Node> {
        match &self.value {
            FieldPayload::Raw(_) => None,
            FieldPayload::Nested(node) => Some(node),
        }
    }

    /// The value as a signed integer, for 1/2/4/8-byte integral types.
    pub fn as_i64(&self) -> Option<i64> {
        let raw = self.raw_bytes()?;
        match (self.field_type, raw.len()) {
            (FieldType::Byte | FieldType::Boolean, 1) => Some(i64::from(raw[0] as i8)),
            (FieldType::Short, 2) => Some(i64::from(i16::from_be_bytes([raw[0], raw[1]]))),
            (FieldType::Char, 2) => Some(i64::from(u16::from_be_bytes([raw[0], raw[1]]))),
            (FieldType::Int, 4) => Some(i64::from(i32::from_be_bytes([
                raw[0], raw[1], raw[2], raw[3],
            ]))),
            (FieldType::Long, 8) => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Some(i64::from_be_bytes(buf))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_values(n: usize) -> Vec<FieldValue> {
        (0..n).map(|i| FieldValue::byte(i as u8)).collect()
    }

    fn array_of(class: Node, values: Vec<FieldValue>) -> ArrayValue {
        ArrayValue {
            class,
            handle: 0x7E_0001,
            elements: ArrayElements::Values(values),
        }
    }

    #[test]
    fn named_byte_array_collapses() {
        let class = ClassDetails::new("[B", 0xACF3_17F8_0606_54E0, 0x02).into_node();
        let mut arr = array_of(class, byte_values(200));
        assert!(arr.collapse_bytes());
        assert_eq!(arr.size(), 200);
        match &arr.elements {
            ArrayElements::Bytes(bytes) => assert_eq!(bytes[199], 199),
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn collapse_is_idempotent() {
        let class = ClassDetails::new("[B", 1, 0x02).into_node();
        let mut once = array_of(class, byte_values(10));
        once.collapse_bytes();
        let mut twice = once.clone();
        twice.collapse_bytes();
        assert_eq!(once, twice);
    }

    #[test]
    fn referenced_class_uses_size_heuristic() {
        let mut small = array_of(Node::reference(0x7E_0000), byte_values(100));
        assert!(!small.collapse_bytes());

        let mut large = array_of(Node::reference(0x7E_0000), byte_values(101));
        assert!(large.collapse_bytes());
    }

    #[test]
    fn int_array_never_collapses() {
        let class = ClassDetails::new("[I", 1, 0x02).into_node();
        let mut arr = array_of(class, vec![FieldValue::int(1); 300]);
        assert!(!arr.collapse_bytes());
        assert!(!arr.is_collapsed());
    }

    #[test]
    fn collapsed_values_expand() {
        let arr = ArrayValue {
            class: Node::null(),
            handle: 0,
            elements: ArrayElements::Bytes(Bytes::from_static(&[7, 8])),
        };
        assert_eq!(arr.values(), vec![FieldValue::byte(7), FieldValue::byte(8)]);
    }

    #[test]
    fn array_element_type_from_name() {
        assert_eq!(
            ClassDetails::new("[I", 0, 0).array_element_type(),
            Some(FieldType::Int)
        );
        assert_eq!(
            ClassDetails::new("[Ljava.lang.String;", 0, 0).array_element_type(),
            Some(FieldType::Object)
        );
        assert_eq!(ClassDetails::new("java.util.Map", 0, 0).array_element_type(), None);
    }

    #[test]
    fn object_annotation_flags() {
        assert!(ClassDetails::new("a", 0, 0x03).has_object_annotation());
        assert!(!ClassDetails::new("a", 0, 0x02).has_object_annotation());
        assert!(ClassDetails::new("a", 0, 0x0C).has_object_annotation());
        assert!(!ClassDetails::new("a", 0, 0x04).has_object_annotation());
    }

    #[test]
    fn field_value_integers() {
        assert_eq!(FieldValue::int(2).as_i64(), Some(2));
        assert_eq!(FieldValue::long(-5).as_i64(), Some(-5));
        assert_eq!(FieldValue::byte(0xFF).as_i64(), Some(-1));
        assert_eq!(FieldValue::object(Node::null()).as_i64(), None);
    }

    #[test]
    fn node_tags_and_names() {
        assert_eq!(Node::null().tag(), 0x70);
        assert_eq!(Node::string("x").kind_name(), "TC_STRING");
        let desc = ClassDetails::new("a", 0, 2).into_node();
        assert_eq!(desc.tag(), 0);
        assert_eq!(desc.kind_name(), "X_CLASSDESC");
        assert_eq!(Node::Reset.kind_name(), "TC_RESET");
    }
}
