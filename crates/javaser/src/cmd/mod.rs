use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod decode;
pub mod dump;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a serialized stream into JSON documents or a node table.
    Decode(DecodeArgs),
    /// Encode JSON documents back into a serialized stream.
    Encode(EncodeArgs),
    /// Print an indented listing of a serialized stream.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Dump(args) => dump::run(args),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Nesting limit for recursive records.
    #[arg(long, default_value_t = javaser_graph::config::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
    /// Keep `[B` arrays as per-element values.
    #[arg(long)]
    pub no_collapse: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON document file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Replace the first class description's annotation with this URL.
    #[arg(long, value_name = "URL")]
    pub codebase: Option<String>,
    /// Write hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Write to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Whole input as bytes, from a file or stdin.
pub fn read_source(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("read stdin", err))?;
            Ok(buf)
        }
    }
}

impl InputArgs {
    /// Stream bytes, hex-decoded when `--hex` is set.
    pub fn read(&self) -> CliResult<Vec<u8>> {
        let raw = read_source(self.input.as_deref())?;
        if !self.hex {
            return Ok(raw);
        }
        parse_hex(&raw)
    }
}

/// Hex text with any whitespace removed.
fn parse_hex(text: &[u8]) -> CliResult<Vec<u8>> {
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(compact).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}
