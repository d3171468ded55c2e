use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::document::ExportFormat;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Move arrest records into bond applications and printable documents",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print one arrest row as a header-keyed record
    Read(ReadArgs),
    /// Remember a row for later `update` and `render` calls
    Select(SelectArgs),
    /// Write form fields into an existing row by fuzzy header matching
    Update(UpdateArgs),
    /// Append a bond application to the applications table
    Submit(SubmitArgs),
    /// Create the applications table and its header row if missing
    EnsureSchema(EnsureSchemaArgs),
    /// Render a row as a text, markdown or PDF document
    Render(RenderArgs),
    /// List a table's dimensions and headers
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Directory holding one CSV file per table
    #[arg(short = 's', long = "store", global = true)]
    pub store: Option<PathBuf>,
    /// YAML configuration file (defaults to bond-intake.yml in the store)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, global = true)]
    pub delimiter: Option<String>,
    /// Character encoding of the table files (defaults to utf-8)
    #[arg(long = "input-encoding", global = true)]
    pub input_encoding: Option<String>,
    /// YAML file replacing the built-in field synonym rules
    #[arg(long = "synonyms", global = true)]
    pub synonyms: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum RecordFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// 1-based row number (row 1 is the header)
    #[arg(short, long)]
    pub row: usize,
    /// Table to read (defaults to the configured arrests table)
    #[arg(short, long)]
    pub table: Option<String>,
    /// Table to use when the requested one does not exist
    #[arg(long = "fallback-table")]
    pub fallback_table: Option<String>,
    /// Booking number expected on the row; a mismatch is logged
    #[arg(long)]
    pub booking: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = RecordFormat::Json)]
    pub format: RecordFormat,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// 1-based row number to remember
    #[arg(short, long)]
    pub row: usize,
    /// Table the row belongs to (defaults to the configured arrests table)
    #[arg(short, long)]
    pub table: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Row to update (defaults to the selected row)
    #[arg(short, long)]
    pub row: Option<usize>,
    /// Table to update (defaults to the selected or configured table)
    #[arg(short, long)]
    pub table: Option<String>,
    /// JSON file holding an object of form fields
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Individual `field=value` assignments, applied after --input. Field
    /// names are camel-cased, so `bond amount=500` sets `bondAmount`
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub set: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// JSON file holding the application fields (`-` for stdin)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Applications table (defaults to the configured submissions table)
    #[arg(short, long)]
    pub table: Option<String>,
}

#[derive(Debug, Args)]
pub struct EnsureSchemaArgs {
    /// Applications table (defaults to the configured submissions table)
    #[arg(short, long)]
    pub table: Option<String>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Row to render (defaults to the selected row)
    #[arg(short, long)]
    pub row: Option<usize>,
    /// Table to render from (defaults to the selected or configured table)
    #[arg(short, long)]
    pub table: Option<String>,
    /// Document format: txt, md or pdf
    #[arg(short, long, default_value = "pdf")]
    pub format: ExportFormat,
    /// Destination file (defaults to <title>.<format> in the output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Document title (defaults to the configured title)
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Table to describe (defaults to the configured arrests table)
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Parses a `field=value` assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected field=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
