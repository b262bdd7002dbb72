//! Hand-assembled streams shaped like real captures.

#![allow(dead_code)]

use bytes::Bytes;
use javaser_wire::tags::*;
use javaser_wire::{StreamHeader, WireWriter};

pub struct StreamBuilder {
    w: WireWriter,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self {
            w: WireWriter::with_header(StreamHeader::default()),
        }
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.w.put_u8(tag);
        self
    }

    pub fn u8(self, v: u8) -> Self {
        self.tag(v)
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.w.put_u16(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.w.put_u32(v);
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.w.put_i32(v);
        self
    }

    pub fn bytes(mut self, raw: &[u8]) -> Self {
        self.w.put_slice(raw);
        self
    }

    pub fn utf(mut self, text: &str) -> Self {
        self.w.put_utf(text.as_bytes()).unwrap();
        self
    }

    pub fn string(self, text: &str) -> Self {
        self.tag(TC_STRING).utf(text)
    }

    pub fn reference(self, handle: u32) -> Self {
        self.tag(TC_REFERENCE).u32(handle)
    }

    /// `TC_CLASSDESC`, name, serial and flags. Field count and fields follow.
    pub fn class_desc(self, name: &str, serial: u64, flags: u8) -> Self {
        self.class_desc_raw(name.as_bytes(), serial, flags)
    }

    /// Like [`Self::class_desc`] with the name bytes written as given.
    pub fn class_desc_raw(mut self, name: &[u8], serial: u64, flags: u8) -> Self {
        self.w.put_u8(TC_CLASSDESC);
        self.w.put_utf(name).unwrap();
        self.w.put_u64(serial);
        self.w.put_u8(flags);
        self
    }

    pub fn field(self, code: u8, name: &str) -> Self {
        self.u8(code).utf(name)
    }

    pub fn field_raw(mut self, code: u8, name: &[u8]) -> Self {
        self.w.put_u8(code);
        self.w.put_utf(name).unwrap();
        self
    }

    pub fn end(self) -> Self {
        self.tag(TC_ENDBLOCKDATA)
    }

    pub fn null(self) -> Self {
        self.tag(TC_NULL)
    }

    pub fn build(self) -> Bytes {
        self.w.freeze()
    }
}

/// Serializable class with one `int size` field set to 2.
pub fn counter_object() -> Bytes {
    StreamBuilder::new()
        .tag(TC_OBJECT)
        .class_desc("demo.Counter", 0x1122_3344_5566_7788, 0x02)
        .u16(1)
        .field(b'I', "size")
        .end()
        .null()
        .i32(2)
        .build()
}

pub const JVMID_CONTENTS: [u8; 28] = [
    0x01, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x00, 0x09, b'1', b'2', b'7', b'.', b'0', b'.', b'0', b'.',
    b'1', 0x83, 0xB5, 0x79, 0x52, 0, 0, 0, 0,
];

/// Two externalizable objects; the second reuses the class by reference.
pub fn externalizable_pair() -> Bytes {
    StreamBuilder::new()
        .tag(TC_OBJECT)
        .class_desc("t3.rjvm.JVMID", 0xDC49_C23E_DE12_1E2A, 0x0C)
        .u16(0)
        .end()
        .null()
        .tag(TC_BLOCKDATA)
        .u8(JVMID_CONTENTS.len() as u8)
        .bytes(&JVMID_CONTENTS)
        .end()
        .tag(TC_OBJECT)
        .reference(0x7E_0000)
        .tag(TC_BLOCKDATA)
        .u8(2)
        .bytes(&[0xAA, 0xBB])
        .end()
        .build()
}

/// Subclass with an object field over a base class with a write method.
pub fn subclass_with_write_method() -> Bytes {
    StreamBuilder::new()
        .tag(TC_OBJECT)
        .class_desc("demo.Named", 7, 0x02)
        .u16(1)
        .field(b'L', "name")
        .string("Ljava/lang/String;")
        .end()
        .class_desc("demo.Base", 8, 0x03)
        .u16(2)
        .field(b'F', "loadFactor")
        .field(b'I', "threshold")
        .end()
        .null()
        // Base: loadFactor, threshold, then the annotation stream
        .bytes(&0.75f32.to_be_bytes())
        .i32(12)
        .tag(TC_BLOCKDATA)
        .u8(8)
        .bytes(&[0, 0, 0, 16, 0, 0, 0, 1])
        .string("k")
        .string("v")
        .end()
        // Named: name
        .string("alice")
        .build()
}

/// Primitive, byte, string and referenced-class arrays.
pub fn arrays() -> Bytes {
    let mut builder = StreamBuilder::new()
        .tag(TC_ARRAY)
        .class_desc("[I", 0x4DBA_6026_76EA_B2A5, 0x02)
        .u16(0)
        .end()
        .null()
        .i32(3)
        .i32(1)
        .i32(-2)
        .i32(3)
        .tag(TC_ARRAY)
        .class_desc("[B", 0xACF3_17F8_0606_54E0, 0x02)
        .u16(0)
        .end()
        .null()
        .i32(200);
    let payload: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();
    builder = builder.bytes(&payload);
    builder
        .tag(TC_ARRAY)
        .class_desc("[Ljava.lang.String;", 0xADD2_56E7_E91D_7B47, 0x02)
        .u16(0)
        .end()
        .null()
        .i32(3)
        .string("a")
        .string("b")
        .reference(0x7E_0006)
        .tag(TC_ARRAY)
        .reference(0x7E_0002)
        .i32(4)
        .bytes(&[9, 8, 7, 6])
        .build()
}

/// Enum constants and a class literal.
pub fn enums() -> Bytes {
    StreamBuilder::new()
        .tag(TC_ENUM)
        .class_desc("demo.Color", 0, 0x12)
        .u16(0)
        .end()
        .class_desc("java.lang.Enum", 0, 0x12)
        .u16(0)
        .end()
        .null()
        .string("RED")
        .tag(TC_CLASS)
        .reference(0x7E_0000)
        .tag(TC_ENUM)
        .reference(0x7E_0000)
        .string("GREEN")
        .build()
}

/// Dynamic proxy object, block data, and a handle reset.
pub fn proxy_and_reset() -> Bytes {
    StreamBuilder::new()
        .tag(TC_OBJECT)
        .tag(TC_PROXYCLASSDESC)
        .u32(1)
        .utf("java.lang.Runnable")
        .end()
        .class_desc("java.lang.reflect.Proxy", 0xE127_DA20_CC10_43CB, 0x02)
        .u16(1)
        .field(b'L', "h")
        .string("Ljava/lang/reflect/InvocationHandler;")
        .end()
        .null()
        .null()
        .tag(TC_BLOCKDATA)
        .u8(3)
        .bytes(&[1, 2, 3])
        .tag(TC_RESET)
        .string("after")
        .build()
}

pub fn all() -> Vec<(&'static str, Bytes)> {
    vec![
        ("counter_object", counter_object()),
        ("externalizable_pair", externalizable_pair()),
        ("subclass_with_write_method", subclass_with_write_method()),
        ("arrays", arrays()),
        ("enums", enums()),
        ("proxy_and_reset", proxy_and_reset()),
    ]
}
