mod commands;
mod config;
mod document;
mod logging;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Which value of a document to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Side {
    Previous,
    Value,
}

impl Side {
    pub(crate) fn key(self) -> &'static str {
        match self {
            Side::Previous => "previous",
            Side::Value => "value",
        }
    }
}

/// Typed Micheline value toolkit.
#[derive(Parser)]
#[command(name = "bcd", version, about = "Typed Micheline value toolkit")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive (e.g. "debug" or "bcd_core=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Document files are JSON objects with a `type` tree and a `value` tree,
/// plus a `previous` tree for commands that compare two values.
#[derive(Subcommand)]
enum Commands {
    /// Render a value as a Miguel presentation tree
    Miguel {
        /// Path to the document file
        file: PathBuf,
        /// Which value to render
        #[arg(long, default_value = "value", value_enum)]
        side: Side,
    },

    /// Diff the `previous` value of a document against its `value`
    Diff {
        /// Path to the document file
        file: PathBuf,
    },

    /// Generate a JSON-Schema form descriptor for a document
    Schema {
        /// Path to the document file
        file: PathBuf,
        /// Emit the schema of the type only, without form values
        #[arg(long)]
        type_only: bool,
    },

    /// Rebuild a Micheline value from JSON-Schema form values
    FromSchema {
        /// Path to the document file providing the type
        file: PathBuf,
        /// Path to the form values JSON file
        #[arg(long)]
        values: PathBuf,
    },

    /// Encode a value into packed binary (hex)
    Pack {
        /// Path to the document file
        file: PathBuf,
        /// Which value to encode
        #[arg(long, default_value = "value", value_enum)]
        side: Side,
    },

    /// Decode packed binary (hex) against the type of a document
    Unpack {
        /// Path to the document file providing the type
        file: PathBuf,
        /// Packed bytes, hex encoded, optional 0x prefix
        hex: String,
    },

    /// Speculatively decode bytes as a packed expression
    TryUnpack {
        /// Bytes, hex encoded, optional 0x prefix
        hex: String,
    },

    /// List the search-index strings of a value
    Strings {
        /// Path to the document file
        file: PathBuf,
        /// Which value to index
        #[arg(long, default_value = "value", value_enum)]
        side: Side,
    },

    /// Compare the `previous` value of a document with its `value`
    Compare {
        /// Path to the document file
        file: PathBuf,
    },

    /// Diff two big-map cell sets by content
    BigmapDiff {
        /// Path to the big-map document file
        file: PathBuf,
    },

    /// Run the `current` cells of a big-map document through the handler pipeline
    BigmapCells {
        /// Path to the big-map document file
        file: PathBuf,
    },
}

/// Shared command state: output settings and loaded configuration.
pub(crate) struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    pub config: Config,
}

impl Context {
    /// Report `msg` and exit with status 1.
    pub(crate) fn fail(&self, msg: &str) -> ! {
        report_error(msg, self.output, self.quiet);
        process::exit(1);
    }

    /// Print `value` as JSON, honouring `[output] pretty`.
    pub(crate) fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        let rendered = if self.config.output.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        match rendered {
            Ok(s) => println!("{}", s),
            Err(e) => self.fail(&format!("serialization error: {}", e)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match config::read_config(path) {
            Ok(c) => c,
            Err(msg) => {
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    logging::init_logger(cli.log_level.as_deref(), config.log.level.as_deref());
    tracing::debug!(
        config = ?cli.config,
        max_depth = config.engine.max_depth,
        pretty = config.output.pretty,
        "configuration loaded"
    );

    let ctx = Context {
        output: cli.output,
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Commands::Miguel { file, side } => commands::cmd_miguel(&file, side, &ctx),
        Commands::Diff { file } => commands::cmd_diff(&file, &ctx),
        Commands::Schema { file, type_only } => commands::cmd_schema(&file, type_only, &ctx),
        Commands::FromSchema { file, values } => commands::cmd_from_schema(&file, &values, &ctx),
        Commands::Pack { file, side } => commands::cmd_pack(&file, side, &ctx),
        Commands::Unpack { file, hex } => commands::cmd_unpack(&file, &hex, &ctx),
        Commands::TryUnpack { hex } => commands::cmd_try_unpack(&hex, &ctx),
        Commands::Strings { file, side } => commands::cmd_strings(&file, side, &ctx),
        Commands::Compare { file } => commands::cmd_compare(&file, &ctx),
        Commands::BigmapDiff { file } => commands::cmd_bigmap_diff(&file, &ctx),
        Commands::BigmapCells { file } => commands::cmd_bigmap_cells(&file, &ctx),
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
