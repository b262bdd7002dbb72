use javaser_graph::{decode, dump};

use crate::cmd::decode::finish;
use crate::cmd::DumpArgs;
use crate::exit::CliResult;

pub fn run(args: DumpArgs) -> CliResult<i32> {
    let decoded = decode(args.input.read()?);
    if let Some(header) = decoded.header {
        println!(
            "STREAM_MAGIC - 0x{:04x}\nSTREAM_VERSION - 0x{:04x}\nContents",
            header.magic, header.version
        );
    }
    print!("{}", dump::render(&decoded.nodes));
    finish(decoded)
}
