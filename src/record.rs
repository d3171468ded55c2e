//! Header-keyed view of one data row.
//!
//! [`read_record`] pairs the header row with a data row over the table's full
//! used width. Columns whose header is blank are skipped. When two columns
//! carry the same header text the later column's value wins, keeping the
//! position of the first occurrence.

use log::{debug, info, warn};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    error::{IntakeError, Result},
    store::{RowStore, TableMeta, require_table},
    synonyms::SynonymTable,
    value::CellValue,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites in place.
    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        let header = header.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == header) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == header)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(header, _)| header.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(header, value)| (header.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (header, value) in &self.fields {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Builds a record from parallel header and value rows.
pub fn pair_columns(headers: &[String], values: &[CellValue]) -> Record {
    let mut record = Record::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.trim().is_empty() {
            continue;
        }
        let value = values.get(idx).cloned().unwrap_or_default();
        record.insert(header.clone(), value);
    }
    record
}

/// Resolves `name`, falling back to `fallback` when the named table is
/// missing.
pub fn resolve_table(
    store: &dyn RowStore,
    name: &str,
    fallback: Option<&str>,
) -> Result<TableMeta> {
    if let Some(meta) = store.table_meta(name)? {
        return Ok(meta);
    }
    match fallback {
        Some(other) if other != name => {
            warn!("Table '{name}' not found, falling back to '{other}'");
            match store.table_meta(other)? {
                Some(meta) => Ok(meta),
                None => Err(IntakeError::TableNotFound {
                    name: name.to_string(),
                    available: store.table_names()?,
                }),
            }
        }
        _ => require_table(store, name),
    }
}

/// Returns the header row as display strings over the full used width.
pub fn read_headers(store: &dyn RowStore, table: &TableMeta) -> Result<Vec<String>> {
    let cells = store.read_range(&table.name, 1, 1, table.last_col)?;
    Ok(cells.iter().map(CellValue::as_display).collect())
}

pub fn check_data_row(table: &TableMeta, row: usize) -> Result<()> {
    if row < 2 || row > table.last_row {
        return Err(IntakeError::OutOfRange {
            row,
            last_row: table.last_row,
        });
    }
    Ok(())
}

pub fn read_record(store: &dyn RowStore, table: &TableMeta, row: usize) -> Result<Record> {
    info!(
        "Reading row {row} of '{}' ({} row(s), {} column(s))",
        table.name, table.last_row, table.last_col
    );
    let headers = read_headers(store, table)?;
    check_data_row(table, row)?;
    let values = store.read_range(&table.name, row, 1, table.last_col)?;
    let record = pair_columns(&headers, &values);
    debug!(
        "Mapped {} field(s): {}",
        record.len(),
        record.keys().take(10).collect::<Vec<_>>().join(", ")
    );
    Ok(record)
}

/// Logs a warning when the record's booking column disagrees with the
/// booking number the caller expected. Never fails the read.
pub fn check_booking_number(record: &Record, synonyms: &SynonymTable, expected: &str) -> bool {
    let Some(rule) = synonyms.rule("bookingNumber") else {
        return true;
    };
    let headers = record.keys().map(str::to_string).collect::<Vec<_>>();
    let Some(idx) = rule.resolve(&headers) else {
        debug!("No booking column to cross-check against '{expected}'");
        return true;
    };
    let found = record
        .get(&headers[idx])
        .map(CellValue::as_display)
        .unwrap_or_default();
    if found.trim() == expected.trim() {
        true
    } else {
        warn!(
            "Booking number mismatch: expected '{expected}', column '{}' holds '{found}'",
            headers[idx]
        );
        false
    }
}
