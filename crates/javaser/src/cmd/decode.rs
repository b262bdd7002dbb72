use javaser_graph::{decode_with_config, DecodeConfig, Decoded};

use crate::cmd::DecodeArgs;
use crate::exit::{graph_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_nodes_table, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = args.input.read()?;
    let config = DecodeConfig {
        max_depth: args.max_depth,
        collapse_byte_arrays: !args.no_collapse,
    };
    let decoded = decode_with_config(input, &config);
    print_decoded(&decoded, format)?;
    finish(decoded)
}

fn print_decoded(decoded: &Decoded, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = javaser_document::to_json_pretty(&decoded.nodes)
                .map_err(|err| CliError::new(INTERNAL, format!("render documents: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => print_nodes_table(&decoded.nodes),
        OutputFormat::Pretty => print!("{}", javaser_graph::dump::render(&decoded.nodes)),
    }
    Ok(())
}

/// Partial output has already been printed; a decode error still fails the
/// command.
pub fn finish(decoded: Decoded) -> CliResult<i32> {
    match decoded.error {
        None => Ok(SUCCESS),
        Some(err) => {
            tracing::warn!(
                nodes = decoded.nodes.len(),
                consumed = decoded.consumed,
                "stream decoded partially"
            );
            Err(graph_error(
                &format!("decode stopped at byte {}", decoded.consumed),
                err,
            ))
        }
    }
}
