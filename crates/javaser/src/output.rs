use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use javaser_graph::Node;

use crate::exit::{io_error, CliResult};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON documents, one array per stream.
    Json,
    /// One row per top-level node.
    Table,
    /// Indented dump listing.
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_nodes_table(nodes: &[Node]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "TAG", "HANDLE", "DETAIL"]);
    for (i, node) in nodes.iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            node.kind_name().to_string(),
            match node {
                Node::Reference { .. } => String::new(),
                other => other
                    .handle()
                    .map(|h| format!("0x{h:08x}"))
                    .unwrap_or_default(),
            },
            node_detail(node),
        ]);
    }
    println!("{table}");
}

/// Short description of a top-level node for table output.
pub fn node_detail(node: &Node) -> String {
    match node {
        Node::String(s) => format!("{:?}", s.text()),
        Node::Reference { handle } => format!("-> 0x{handle:08x}"),
        Node::ClassDesc(desc) => desc.detail.class_name.to_string(),
        Node::ClassDetails(details) => details.class_name.to_string(),
        Node::Object(obj) => class_label(&obj.class),
        Node::Array(arr) => format!("{} [{}]", class_label(&arr.class), arr.size()),
        Node::Class(class) => class_label(&class.desc),
        Node::Enum(value) => format!(
            "{}.{}",
            class_label(&value.type_desc),
            value
                .constant_name
                .as_string()
                .map(|s| s.text())
                .unwrap_or_default()
        ),
        Node::BlockData(block) => format!("{} bytes", block.size()),
        Node::Null { .. } | Node::EndBlockData { .. } | Node::Reset => String::new(),
    }
}

fn class_label(class: &Node) -> String {
    match class {
        Node::Reference { handle } => format!("ref 0x{handle:08x}"),
        other => other
            .class_details()
            .map(|d| d.class_name.to_string())
            .unwrap_or_else(|| other.kind_name().to_string()),
    }
}

pub fn print_raw(data: &[u8]) -> CliResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)
        .and_then(|()| out.flush())
        .map_err(|err| io_error("write stdout", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use javaser_graph::{ClassDetails, EnumValue};

    #[test]
    fn enum_detail_names_the_constant() {
        let node = Node::Enum(Box::new(EnumValue {
            type_desc: ClassDetails::new("demo.Color", 0, 0x12).into_node(),
            constant_name: Node::string("RED"),
            handle: 0x7E_0002,
        }));
        assert_eq!(node_detail(&node), "demo.Color.RED");
    }

    #[test]
    fn reference_detail() {
        assert_eq!(node_detail(&Node::reference(0x7E_0001)), "-> 0x007e0001");
    }
}
