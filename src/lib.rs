pub mod cli;
pub mod config;
pub mod csv_store;
pub mod document;
pub mod error;
pub mod inspect;
pub mod io_utils;
pub mod mapper;
pub mod pdf;
pub mod record;
pub mod selection;
pub mod store;
pub mod submission;
pub mod synonyms;
pub mod table;
pub mod value;

use std::{
    env,
    io::{self, Read},
    path::Path,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, RecordFormat},
    config::Config,
    document::{DocumentSink, FileSink},
    selection::{Selection, SelectionStore},
    store::RowStore,
    submission::Submission,
    value::CellValue,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("bond_intake", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::resolve(&cli.store)?;
    debug!("Using store {:?}", config.store_dir);
    match cli.command {
        Commands::Read(args) => handle_read(&config, &args),
        Commands::Select(args) => handle_select(&config, &args),
        Commands::Update(args) => handle_update(&config, &args),
        Commands::Submit(args) => handle_submit(&config, &args),
        Commands::EnsureSchema(args) => handle_ensure_schema(&config, &args),
        Commands::Render(args) => handle_render(&config, &args),
        Commands::Inspect(args) => inspect::execute(&config, &args),
    }
}

fn handle_read(config: &Config, args: &cli::ReadArgs) -> Result<()> {
    let store = config.open_store()?;
    let name = args.table.as_deref().unwrap_or(&config.arrests_table);
    let fallback = args
        .fallback_table
        .as_deref()
        .or(config.fallback_table.as_deref());
    let record = read_arrest_record(&store, name, fallback, args.row)
        .context("Failed to retrieve arrest data")?;

    if let Some(booking) = &args.booking {
        record::check_booking_number(&record, &config.synonym_table(), booking);
    }

    match args.format {
        RecordFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&record).context("Serializing record as JSON")?
            );
        }
        RecordFormat::Yaml => {
            print!(
                "{}",
                serde_yaml::to_string(&record).context("Serializing record as YAML")?
            );
        }
        RecordFormat::Table => {
            let headers = vec!["header".to_string(), "value".to_string()];
            let rows = record
                .iter()
                .map(|(header, value)| vec![header.to_string(), value.as_display()])
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
    }
    info!("Returned record with {} key(s)", record.len());
    Ok(())
}

fn read_arrest_record(
    store: &dyn RowStore,
    name: &str,
    fallback: Option<&str>,
    row: usize,
) -> error::Result<record::Record> {
    let table = record::resolve_table(store, name, fallback)?;
    record::read_record(store, &table, row)
}

fn handle_select(config: &Config, args: &cli::SelectArgs) -> Result<()> {
    let store = config.open_store()?;
    let name = args.table.as_deref().unwrap_or(&config.arrests_table);
    let table = store::require_table(&store, name)?;
    record::check_data_row(&table, args.row)?;
    let mut selections = config.selection_store();
    Selection {
        table: table.name.clone(),
        row: args.row,
    }
    .save(&mut selections, &config.selection_key)?;
    info!("Selected row {} of '{}'", args.row, table.name);
    Ok(())
}

fn selected_row(
    config: &Config,
    row: Option<usize>,
    table: Option<&str>,
    selections: &dyn SelectionStore,
) -> Result<Selection> {
    let mut selection = selection::resolve_row(row, table, selections, &config.selection_key)?;
    if selection.table.is_empty() {
        selection.table = config.arrests_table.clone();
    }
    Ok(selection)
}

fn handle_update(config: &Config, args: &cli::UpdateArgs) -> Result<()> {
    let mut store = config.open_store()?;
    let selections = config.selection_store();
    let target = selected_row(config, args.row, args.table.as_deref(), &selections)?;

    let mut submission = match &args.input {
        Some(path) => load_submission(path)?,
        None => Submission::new(),
    };
    for raw in &args.set {
        let (key, value) = cli::parse_assignment(raw).map_err(anyhow::Error::msg)?;
        submission.insert(&synonyms::field_key(&key), CellValue::from(value.as_str()));
    }

    let table = store::require_table(&store, &target.table)?;
    let applied = mapper::apply_fields(
        &mut store,
        &table,
        target.row,
        &submission,
        &config.synonym_table(),
    )
    .with_context(|| format!("Failed to update row {} of '{}'", target.row, target.table))?;
    println!(
        "Updated {} field(s) in row {} of '{}'",
        applied.fields_written, target.row, target.table
    );
    Ok(())
}

fn handle_submit(config: &Config, args: &cli::SubmitArgs) -> Result<()> {
    let mut store = config.open_store()?;
    let name = args.table.as_deref().unwrap_or(&config.submissions_table);
    let submission = load_submission(&args.input)?;
    let receipt = submission::submit_application(&mut store, name, &submission)
        .context("Failed to submit application")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&receipt).context("Serializing receipt")?
    );
    Ok(())
}

fn handle_ensure_schema(config: &Config, args: &cli::EnsureSchemaArgs) -> Result<()> {
    let mut store = config.open_store()?;
    let name = args.table.as_deref().unwrap_or(&config.submissions_table);
    if submission::ensure_schema(&mut store, name)? {
        println!("Created '{name}'");
    } else {
        println!("'{name}' already exists");
    }
    Ok(())
}

fn handle_render(config: &Config, args: &cli::RenderArgs) -> Result<()> {
    let store = config.open_store()?;
    let selections = config.selection_store();
    let target = selected_row(config, args.row, args.table.as_deref(), &selections)?;
    let table = store::require_table(&store, &target.table)?;
    record::check_data_row(&table, target.row)?;

    let headers = record::read_headers(&store, &table)?;
    let row = store.read_range(&table.name, target.row, 1, table.last_col)?;
    let title = args.title.as_deref().unwrap_or(&config.document_title);
    let sink = FileSink::new(config.output_dir());
    let document = sink.render(title, document::record_lines(&headers, &row));

    let path = match &args.output {
        Some(path) => {
            document::write_document(&document, args.format, path)?;
            path.clone()
        }
        None => sink.export(&document, args.format)?,
    };
    println!("{}", path.display());
    Ok(())
}

fn load_submission(path: &Path) -> Result<Submission> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Reading submission from stdin")?;
        return Ok(Submission::from_json_str(&raw)?);
    }
    Submission::load(path)
}
