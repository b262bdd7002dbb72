//! Tag catalogs.
//!
//! Two disjoint one-byte spaces: content tags lead every record in the
//! stream, field-type tags describe a class field or array element.

/// Explicit null reference.
pub const TC_NULL: u8 = 0x70;

/// Back-reference to a previously assigned handle.
pub const TC_REFERENCE: u8 = 0x71;

/// New class description.
pub const TC_CLASSDESC: u8 = 0x72;

/// New object.
pub const TC_OBJECT: u8 = 0x73;

/// New string with a 2-byte length.
pub const TC_STRING: u8 = 0x74;

/// New array.
pub const TC_ARRAY: u8 = 0x75;

/// `java.lang.Class` literal.
pub const TC_CLASS: u8 = 0x76;

/// Block data with a 1-byte length.
pub const TC_BLOCKDATA: u8 = 0x77;

/// End of an optional block of data or objects.
pub const TC_ENDBLOCKDATA: u8 = 0x78;

/// Reset the handle table.
pub const TC_RESET: u8 = 0x79;

/// Block data with a 4-byte length.
pub const TC_BLOCKDATALONG: u8 = 0x7A;

/// Exception thrown during write. Catalogued, never decoded.
pub const TC_EXCEPTION: u8 = 0x7B;

/// New string with an 8-byte length.
pub const TC_LONGSTRING: u8 = 0x7C;

/// New dynamic proxy class description.
pub const TC_PROXYCLASSDESC: u8 = 0x7D;

/// New enum constant.
pub const TC_ENUM: u8 = 0x7E;

/// Returns the protocol name for a content tag.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        TC_NULL => "TC_NULL",
        TC_REFERENCE => "TC_REFERENCE",
        TC_CLASSDESC => "TC_CLASSDESC",
        TC_OBJECT => "TC_OBJECT",
        TC_STRING => "TC_STRING",
        TC_ARRAY => "TC_ARRAY",
        TC_CLASS => "TC_CLASS",
        TC_BLOCKDATA => "TC_BLOCKDATA",
        TC_ENDBLOCKDATA => "TC_ENDBLOCKDATA",
        TC_RESET => "TC_RESET",
        TC_BLOCKDATALONG => "TC_BLOCKDATALONG",
        TC_EXCEPTION => "TC_EXCEPTION",
        TC_LONGSTRING => "TC_LONGSTRING",
        TC_PROXYCLASSDESC => "TC_PROXYCLASSDESC",
        TC_ENUM => "TC_ENUM",
        _ => "TC_UNKNOWN",
    }
}

/// Inverse of [`tag_name`].
pub fn tag_from_name(name: &str) -> Option<u8> {
    let tag = match name {
        "TC_NULL" => TC_NULL,
        "TC_REFERENCE" => TC_REFERENCE,
        "TC_CLASSDESC" => TC_CLASSDESC,
        "TC_OBJECT" => TC_OBJECT,
        "TC_STRING" => TC_STRING,
        "TC_ARRAY" => TC_ARRAY,
        "TC_CLASS" => TC_CLASS,
        "TC_BLOCKDATA" => TC_BLOCKDATA,
        "TC_ENDBLOCKDATA" => TC_ENDBLOCKDATA,
        "TC_RESET" => TC_RESET,
        "TC_BLOCKDATALONG" => TC_BLOCKDATALONG,
        "TC_EXCEPTION" => TC_EXCEPTION,
        "TC_LONGSTRING" => TC_LONGSTRING,
        "TC_PROXYCLASSDESC" => TC_PROXYCLASSDESC,
        "TC_ENUM" => TC_ENUM,
        _ => return None,
    };
    Some(tag)
}

/// Returns true if the byte is one of the content tags.
pub fn is_content_tag(tag: u8) -> bool {
    (TC_NULL..=TC_ENUM).contains(&tag)
}

/// Class description flags (`classDescFlags`).
pub mod class_flags {
    /// The class has a `writeObject` method.
    pub const SC_WRITE_METHOD: u8 = 0x01;
    /// The class is `Serializable`.
    pub const SC_SERIALIZABLE: u8 = 0x02;
    /// The class is `Externalizable`.
    pub const SC_EXTERNALIZABLE: u8 = 0x04;
    /// Externalizable data is written in block data mode.
    pub const SC_BLOCKDATA: u8 = 0x08;
    /// The class is an enum.
    pub const SC_ENUM: u8 = 0x10;

    /// Names of the flags set in `flags`, lowest bit first.
    pub fn describe(flags: u8) -> Vec<&'static str> {
        let mut names = Vec::new();
        if flags & SC_WRITE_METHOD != 0 {
            names.push("SC_WRITE_METHOD");
        }
        if flags & SC_SERIALIZABLE != 0 {
            names.push("SC_SERIALIZABLE");
        }
        if flags & SC_EXTERNALIZABLE != 0 {
            names.push("SC_EXTERNALIZABLE");
        }
        if flags & SC_BLOCKDATA != 0 {
            names.push("SC_BLOCKDATA");
        }
        if flags & SC_ENUM != 0 {
            names.push("SC_ENUM");
        }
        names
    }
}

/// Field and array element type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Parse a type code byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        let ty = match tag {
            b'B' => Self::Byte,
            b'C' => Self::Char,
            b'D' => Self::Double,
            b'F' => Self::Float,
            b'I' => Self::Int,
            b'J' => Self::Long,
            b'S' => Self::Short,
            b'Z' => Self::Boolean,
            b'[' => Self::Array,
            b'L' => Self::Object,
            _ => return None,
        };
        Some(ty)
    }

    /// The type code byte.
    pub fn tag(self) -> u8 {
        match self {
            Self::Byte => b'B',
            Self::Char => b'C',
            Self::Double => b'D',
            Self::Float => b'F',
            Self::Int => b'I',
            Self::Long => b'J',
            Self::Short => b'S',
            Self::Boolean => b'Z',
            Self::Array => b'[',
            Self::Object => b'L',
        }
    }

    /// Fixed wire width for primitive types, `None` for array/object.
    pub fn width(self) -> Option<usize> {
        match self {
            Self::Byte | Self::Boolean => Some(1),
            Self::Char | Self::Short => Some(2),
            Self::Float | Self::Int => Some(4),
            Self::Double | Self::Long => Some(8),
            Self::Array | Self::Object => None,
        }
    }

    /// True for array and object types, whose values are nested content.
    pub fn is_reference(self) -> bool {
        self.width().is_none()
    }

    /// Lower-case Java type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_roundtrip() {
        for tag in TC_NULL..=TC_ENUM {
            let name = tag_name(tag);
            assert_eq!(tag_from_name(name), Some(tag), "{name}");
        }
        assert_eq!(tag_name(0x00), "TC_UNKNOWN");
        assert_eq!(tag_from_name("X_CLASSDESC"), None);
    }

    #[test]
    fn content_tag_range() {
        assert!(is_content_tag(TC_NULL));
        assert!(is_content_tag(TC_ENUM));
        assert!(!is_content_tag(0x6F));
        assert!(!is_content_tag(0x7F));
    }

    #[test]
    fn field_type_widths() {
        assert_eq!(FieldType::Byte.width(), Some(1));
        assert_eq!(FieldType::Char.width(), Some(2));
        assert_eq!(FieldType::Float.width(), Some(4));
        assert_eq!(FieldType::Long.width(), Some(8));
        assert_eq!(FieldType::Object.width(), None);
        assert!(FieldType::Array.is_reference());
    }

    #[test]
    fn field_type_tags_roundtrip() {
        for tag in *b"BCDFIJSZ[L" {
            let ty = FieldType::from_tag(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
        assert_eq!(FieldType::from_tag(b'X'), None);
    }

    #[test]
    fn describe_flags() {
        assert_eq!(
            class_flags::describe(0x03),
            vec!["SC_WRITE_METHOD", "SC_SERIALIZABLE"]
        );
        assert!(class_flags::describe(0).is_empty());
    }
}
