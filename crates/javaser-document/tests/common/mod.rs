//! Small streams for exercising the document bridge.

#![allow(dead_code)]

use bytes::Bytes;
use javaser_wire::tags::*;
use javaser_wire::{encode_modified_utf8, StreamHeader, WireWriter};

/// Field descriptor: type code, name, and the signature for reference types.
pub type Field<'a> = (u8, &'a str, Option<&'a str>);

pub fn stream(body: impl FnOnce(&mut WireWriter)) -> Bytes {
    let mut w = WireWriter::with_header(StreamHeader::default());
    body(&mut w);
    w.freeze()
}

pub fn utf(w: &mut WireWriter, text: &str) {
    w.put_utf(&encode_modified_utf8(text)).unwrap();
}

pub fn string(w: &mut WireWriter, text: &str) {
    w.put_u8(TC_STRING);
    utf(w, text);
}

/// `TC_CLASSDESC` up to and including its empty annotation. The superclass
/// is written next by the caller.
pub fn class_desc(w: &mut WireWriter, name: &str, serial: u64, flags: u8, fields: &[Field<'_>]) {
    w.put_u8(TC_CLASSDESC);
    utf(w, name);
    w.put_u64(serial);
    w.put_u8(flags);
    w.put_u16(fields.len() as u16);
    for (code, field, signature) in fields {
        w.put_u8(*code);
        utf(w, field);
        if let Some(signature) = signature {
            string(w, signature);
        }
    }
    w.put_u8(TC_ENDBLOCKDATA);
}

pub fn counter_object() -> Bytes {
    stream(|w| {
        w.put_u8(TC_OBJECT);
        class_desc(w, "demo.Counter", 0x1122_3344_5566_7788, 0x02, &[(b'I', "size", None)]);
        w.put_u8(TC_NULL);
        w.put_i32(2);
    })
}

pub fn subclass_with_write_method() -> Bytes {
    stream(|w| {
        w.put_u8(TC_OBJECT);
        class_desc(
            w,
            "demo.Named",
            7,
            0x02,
            &[(b'L', "name", Some("Ljava/lang/String;"))],
        );
        class_desc(
            w,
            "demo.Base",
            8,
            0x03,
            &[(b'F', "loadFactor", None), (b'I', "threshold", None)],
        );
        w.put_u8(TC_NULL);
        w.put_slice(&0.75f32.to_be_bytes());
        w.put_i32(12);
        w.put_u8(TC_BLOCKDATA);
        w.put_u8(8);
        w.put_slice(&[0, 0, 0, 16, 0, 0, 0, 1]);
        string(w, "k");
        string(w, "v");
        w.put_u8(TC_ENDBLOCKDATA);
        string(w, "alice");
    })
}

pub fn arrays() -> Bytes {
    stream(|w| {
        w.put_u8(TC_ARRAY);
        class_desc(w, "[I", 0x4DBA_6026_76EA_B2A5, 0x02, &[]);
        w.put_u8(TC_NULL);
        w.put_i32(2);
        w.put_i32(-1);
        w.put_i32(7);
        w.put_u8(TC_ARRAY);
        class_desc(w, "[B", 0xACF3_17F8_0606_54E0, 0x02, &[]);
        w.put_u8(TC_NULL);
        w.put_i32(4);
        w.put_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
    })
}

pub fn enum_and_reset() -> Bytes {
    stream(|w| {
        w.put_u8(TC_ENUM);
        class_desc(w, "demo.Color", 0, 0x12, &[]);
        class_desc(w, "java.lang.Enum", 0, 0x12, &[]);
        w.put_u8(TC_NULL);
        string(w, "RED");
        w.put_u8(TC_RESET);
        w.put_u8(TC_PROXYCLASSDESC);
        w.put_u32(1);
        utf(w, "java.lang.Runnable");
        w.put_u8(TC_ENDBLOCKDATA);
        w.put_u8(TC_NULL);
    })
}

/// Class and field names that need modified UTF-8: an embedded NUL and a
/// supplementary character.
pub fn modified_utf8_names() -> Bytes {
    stream(|w| {
        w.put_u8(TC_OBJECT);
        class_desc(w, "demo.a\0b", 3, 0x02, &[(b'J', "n\u{1F600}", None)]);
        w.put_u8(TC_NULL);
        w.put_u64(42);
    })
}

pub fn all() -> Vec<(&'static str, Bytes)> {
    vec![
        ("counter_object", counter_object()),
        ("subclass_with_write_method", subclass_with_write_method()),
        ("arrays", arrays()),
        ("enum_and_reset", enum_and_reset()),
        ("modified_utf8_names", modified_utf8_names()),
    ]
}
