//! # errtrail CLI
//!
//! Prints how errtrail renders typical error chains.
//!
//! Usage:
//!   errtrail <scenario> [--trace] [--json]
//!   errtrail read <file>
//!
//! Examples:
//!   errtrail local
//!   errtrail nested-global --trace
//!   errtrail wrapped-external --json --trace
//!   errtrail read Cargo.toml

use clap::{Parser, Subcommand};
use errtrail::{Error, Format, ResultExt};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

static GLOBAL_ERR: LazyLock<Error> = LazyLock::new(|| Error::new_global("global error"));

#[derive(Parser)]
#[command(name = "errtrail")]
#[command(author, version, about = "errtrail - error chains with stack traces")]
struct Cli {
    #[command(subcommand)]
    scenario: Scenario,

    /// Include stack traces
    #[arg(short, long, global = true)]
    trace: bool,

    /// Print the structured tree as JSON
    #[arg(short, long, global = true)]
    json: bool,

    /// Enable debug logging (otherwise RUST_LOG applies)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Scenario {
    /// A root error wrapped once
    Local,
    /// A root error created two calls deep, then wrapped
    NestedLocal,
    /// A global error wrapped in a helper, then again by the caller
    Global,
    /// A global error wrapped three times across calls
    NestedGlobal,
    /// An external error that was never wrapped
    External,
    /// An external error wrapped twice
    WrappedExternal,
    /// Read and parse a JSON file, reporting any failure
    Read {
        /// Path to the file
        #[arg(required = true)]
        file: PathBuf,
    },
}

// =============================================================================
// Scenarios
// =============================================================================

fn local_err() -> Error {
    Error::new("local error")
}

fn nested_local_err() -> Error {
    local_err()
}

fn global_err() -> Error {
    GLOBAL_ERR.clone().wrap("some context")
}

fn nested_global_err() -> Error {
    global_err().wrap("more context")
}

fn external_err() -> Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected EOF").into()
}

fn read_json(path: &Path) -> errtrail::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("error reading file '{}'", path.display()))?;
    serde_json::from_str(&text)
        .wrap_err_with(|| format!("error parsing file '{}'", path.display()))
}

impl Scenario {
    fn run(&self) -> errtrail::Result<()> {
        let err = match self {
            Scenario::Local => local_err().wrap("new context"),
            Scenario::NestedLocal => nested_local_err().wrap("new context"),
            Scenario::Global => global_err().wrap("new context"),
            Scenario::NestedGlobal => nested_global_err().wrap("new context"),
            Scenario::External => external_err(),
            Scenario::WrappedExternal => external_err()
                .wrap("additional context")
                .wrap("even more context"),
            Scenario::Read { file } => {
                let value = read_json(file)?;
                tracing::debug!(file = %file.display(), kind = json_kind(&value), "parsed file");
                return Ok(());
            }
        };
        Err(err)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let err = match cli.scenario.run() {
        Ok(()) => {
            println!("no error");
            return Ok(());
        }
        Err(err) => err,
    };

    let format = Format::new(cli.trace);
    let unpacked = err.unpack();
    tracing::debug!(
        kind = %err.kind(),
        links = unpacked.chain.len(),
        external = unpacked.external.is_some(),
        "unpacked error"
    );

    if cli.json {
        let tree = unpacked.to_structured_tree(&format);
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!("{}", unpacked.to_plain_text(&format));
    }

    Ok(())
}
