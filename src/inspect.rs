//! Table structure listing, used to check a store before mapping into it.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::InspectArgs,
    config::Config,
    record::read_headers,
    store::{HeaderStyle, RowStore, TableMeta, require_table},
    table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub meta: TableMeta,
    pub headers: Vec<String>,
    pub style: HeaderStyle,
}

impl TableDescription {
    /// One row per column: position, spreadsheet letter, header text.
    pub fn column_rows(&self) -> Vec<Vec<String>> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                vec![
                    (idx + 1).to_string(),
                    table::column_letter(idx + 1),
                    header.clone(),
                ]
            })
            .collect()
    }
}

pub fn describe_table(store: &dyn RowStore, name: &str) -> crate::error::Result<TableDescription> {
    let meta = require_table(store, name)?;
    let headers = read_headers(store, &meta)?;
    let style = store.header_style(name)?;
    Ok(TableDescription {
        meta,
        headers,
        style,
    })
}

pub fn execute(config: &Config, args: &InspectArgs) -> Result<()> {
    let name = args.table.as_deref().unwrap_or(&config.arrests_table);
    let store = config.open_store()?;
    let description =
        describe_table(&store, name).with_context(|| format!("Inspecting table '{name}'"))?;

    println!(
        "{}: {} row(s), {} column(s){}",
        description.meta.name,
        description.meta.last_row,
        description.meta.last_col,
        if description.style.frozen_rows > 0 {
            format!(", {} frozen row(s)", description.style.frozen_rows)
        } else {
            String::new()
        }
    );
    let headers = vec!["#".to_string(), "col".to_string(), "header".to_string()];
    table::print_table(&headers, &description.column_rows());
    info!(
        "Listed {} header(s) from '{}'",
        description.headers.len(),
        description.meta.name
    );
    Ok(())
}
