//! Handle assignment and back-reference resolution.

use std::collections::HashMap;

use javaser_wire::{ModifiedUtf8, HANDLE_BASE};

use crate::error::{GraphError, Result};
use crate::node::{ClassDetails, FieldPayload, Node};

/// Upper bound on reference hops while resolving a class description.
const MAX_RESOLVE_STEPS: usize = 64;

/// Outcome of resolving a class slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// A concrete class description.
    Class(&'a ClassDetails),
    /// An explicit or end-of-input `TC_NULL`.
    Null,
    /// A reference to a handle that was never assigned.
    Absent(u32),
}

/// Maps assigned handles to the records they name.
///
/// One table lives for one decode call. Class descriptions are stored as
/// bare [`Node::ClassDetails`]; every other record is stored as itself.
#[derive(Debug, Clone)]
pub struct HandleTable {
    next: u32,
    entries: HashMap<u32, Node>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            next: HANDLE_BASE,
            entries: HashMap::new(),
        }
    }

    /// Rebuild a table from an already decoded graph, for consumers that
    /// need to resolve references after the decode call has returned. The
    /// result holds the handles live at the end of the stream.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut table = Self::new();
        for node in nodes {
            table.collect(node);
        }
        table
    }

    /// Reserve the next handle.
    pub fn assign(&mut self) -> u32 {
        let handle = self.next;
        self.next = self.next.wrapping_add(1);
        tracing::trace!(handle = format_args!("0x{handle:08x}"), "assigned handle");
        handle
    }

    /// Store (or replace) the record behind `handle`.
    pub fn register(&mut self, handle: u32, node: Node) {
        self.entries.insert(handle, node);
    }

    pub fn get(&self, handle: u32) -> Option<&Node> {
        self.entries.get(&handle)
    }

    /// Forget every handle and restart numbering at the base (`TC_RESET`).
    pub fn reset(&mut self) {
        self.next = HANDLE_BASE;
        self.entries.clear();
    }

    /// The handle the next record will receive.
    pub fn next_handle(&self) -> u32 {
        self.next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow references from a class slot until a class description or a
    /// null is reached.
    ///
    /// A handle that was never assigned resolves to [`Resolved::Absent`];
    /// callers decide whether that is a null or an error. Slots holding any
    /// other kind of record fail with `UnsupportedSuperclassNodeKind`.
    pub fn resolve_class<'a>(&'a self, slot: &'a Node) -> Result<Resolved<'a>> {
        let mut current = slot;
        let mut last_handle = 0;
        for _ in 0..MAX_RESOLVE_STEPS {
            match current {
                Node::ClassDesc(desc) => return Ok(Resolved::Class(&desc.detail)),
                Node::ClassDetails(details) => return Ok(Resolved::Class(details)),
                Node::Null { .. } => return Ok(Resolved::Null),
                Node::Reference { handle } => {
                    last_handle = *handle;
                    match self.entries.get(handle) {
                        Some(target) => current = target,
                        None => return Ok(Resolved::Absent(*handle)),
                    }
                }
                other => {
                    return Err(GraphError::UnsupportedSuperclassNodeKind {
                        kind: other.kind_name(),
                    })
                }
            }
        }
        Err(GraphError::CyclicClassHierarchy(last_handle))
    }

    /// Class name behind a class slot, if it resolves.
    pub fn class_name<'a>(&'a self, slot: &'a Node) -> Option<&'a ModifiedUtf8> {
        match self.resolve_class(slot) {
            Ok(Resolved::Class(details)) => Some(&details.class_name),
            _ => None,
        }
    }

    /// Text of a string record, following a reference if needed.
    pub fn string_text(&self, node: &Node) -> Option<String> {
        match node {
            Node::String(s) => Some(s.text()),
            Node::Reference { handle } => match self.entries.get(handle) {
                Some(Node::String(s)) => Some(s.text()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Register every handle `node` carries, in stream order. A
    /// [`Node::Reset`] clears the table, as it does while decoding.
    pub fn collect(&mut self, node: &Node) {
        match node {
            Node::String(s) => self.register(s.handle, node.clone()),
            Node::ClassDesc(desc) => self.collect_details(&desc.detail),
            Node::ClassDetails(details) => self.collect_details(details),
            Node::Object(obj) => {
                self.collect(&obj.class);
                self.register(obj.handle, node.clone());
                for level in &obj.class_data {
                    for value in &level.field_values {
                        if let FieldPayload::Nested(nested) = &value.value {
                            self.collect(nested);
                        }
                    }
                    for item in &level.block_data {
                        self.collect(item);
                    }
                }
            }
            Node::Array(arr) => {
                self.collect(&arr.class);
                self.register(arr.handle, node.clone());
                for value in arr.values() {
                    if let FieldPayload::Nested(nested) = &value.value {
                        self.collect(nested);
                    }
                }
            }
            Node::Class(class) => {
                self.collect(&class.desc);
                self.register(class.handle, node.clone());
            }
            Node::Enum(value) => {
                self.collect(&value.type_desc);
                self.register(value.handle, node.clone());
                self.collect(&value.constant_name);
            }
            Node::Reset => self.reset(),
            Node::Null { .. }
            | Node::Reference { .. }
            | Node::BlockData(_)
            | Node::EndBlockData { .. } => {}
        }
    }

    fn collect_details(&mut self, details: &ClassDetails) {
        self.register(details.handle, Node::ClassDetails(Box::new(details.clone())));
        for field in &details.fields.fields {
            if let Some(name) = &field.class_name {
                self.collect(name);
            }
        }
        for annotation in details.annotation_slot() {
            self.collect(annotation);
        }
        self.collect(&details.super_class);
    }
}
