use javaser_graph::{encode_all, ClassDescEncoder, CodebaseEncoder, FaithfulEncoder};

use crate::cmd::{read_source, EncodeArgs};
use crate::exit::{
    document_error, graph_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS,
    USAGE,
};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    if args.codebase.as_deref().is_some_and(|url| url.trim().is_empty()) {
        return Err(CliError::new(USAGE, "codebase must not be empty"));
    }
    let source = read_source(args.input.as_deref())?;
    let text = std::str::from_utf8(&source)
        .map_err(|err| CliError::new(DATA_INVALID, format!("document is not UTF-8: {err}")))?;
    let nodes = javaser_document::from_json_str(text)
        .map_err(|err| document_error("parse document", err))?;

    let mut strategy: Box<dyn ClassDescEncoder> = match args.codebase {
        Some(url) => Box::new(CodebaseEncoder::new(url)),
        None => Box::new(FaithfulEncoder),
    };
    let bytes = encode_all(&nodes, strategy.as_mut()).map_err(|err| graph_error("encode", err))?;

    let out = if args.hex {
        let mut text = hex::encode(&bytes);
        text.push('\n');
        text.into_bytes()
    } else {
        bytes.to_vec()
    };
    match &args.output {
        Some(path) => std::fs::write(path, out)
            .map_err(|err| io_error(&format!("write {}", path.display()), err))?,
        None => print_raw(&out)?,
    }
    Ok(SUCCESS)
}
