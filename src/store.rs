//! Row store abstraction and the in-memory backend.
//!
//! A row store is a set of named tables addressed with 1-based row and column
//! positions, the way a spreadsheet addresses cells. Row 1 is the header row.
//! Reads past the used range yield [`CellValue::Empty`]; writes past it grow
//! the table.
//!
//! Backends:
//!
//! - [`MemoryStore`]: tables held in memory, used by tests and embedders.
//! - [`crate::csv_store::CsvStore`]: one CSV file per table in a directory.

use std::{
    collections::{BTreeMap, BTreeSet},
    io,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{IntakeError, Result},
    value::CellValue,
};

/// Dimensions of a table's used range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub last_row: usize,
    pub last_col: usize,
}

/// Presentation of the header row. Backends without formatting persist it as
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub frozen_rows: usize,
}

pub trait RowStore {
    /// Returns the table's used range, or `None` when the table does not exist.
    fn table_meta(&self, name: &str) -> Result<Option<TableMeta>>;

    fn table_names(&self) -> Result<Vec<String>>;

    /// Creates a table whose first row is `header`. Fails if it already exists.
    fn create_table(&mut self, name: &str, header: &[String]) -> Result<TableMeta>;

    fn read_range(
        &self,
        table: &str,
        row: usize,
        col_start: usize,
        col_count: usize,
    ) -> Result<Vec<CellValue>>;

    fn write_cell(&mut self, table: &str, row: usize, col: usize, value: &CellValue)
    -> Result<()>;

    /// Appends `values` after the last used row and returns the new row index.
    fn append_row(&mut self, table: &str, values: &[CellValue]) -> Result<usize>;

    fn style_header(&mut self, table: &str, style: HeaderStyle) -> Result<()>;

    fn header_style(&self, table: &str) -> Result<HeaderStyle>;
}

/// Looks up a table that must exist, reporting the tables that do.
pub fn require_table(store: &dyn RowStore, name: &str) -> Result<TableMeta> {
    match store.table_meta(name)? {
        Some(meta) => Ok(meta),
        None => Err(IntakeError::TableNotFound {
            name: name.to_string(),
            available: store.table_names()?,
        }),
    }
}

pub(crate) fn check_position(table: &str, row: usize, col: usize) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(IntakeError::write_failure(
            table,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cell positions are 1-based (got row {row}, column {col})"),
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: Vec<Vec<CellValue>>,
    style: HeaderStyle,
}

impl MemoryTable {
    fn meta(&self, name: &str) -> TableMeta {
        TableMeta {
            name: name.to_string(),
            last_row: self.rows.len(),
            last_col: self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
    rejected_cells: BTreeSet<(String, usize, usize)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from display strings; each string is inferred into a
    /// typed cell the same way the CSV backend reads files.
    pub fn with_table(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|raw| CellValue::infer(raw)).collect())
            .collect();
        self.tables.insert(
            name.to_string(),
            MemoryTable {
                rows,
                style: HeaderStyle::default(),
            },
        );
        self
    }

    /// Makes every later write to `(row, col)` of `table` fail.
    pub fn reject_writes_at(&mut self, table: &str, row: usize, col: usize) {
        self.rejected_cells.insert((table.to_string(), row, col));
    }

    /// Returns a copy of the table's rows, header included.
    pub fn rows(&self, table: &str) -> Option<Vec<Vec<CellValue>>> {
        self.tables.get(table).map(|t| t.rows.clone())
    }

    pub fn cell(&self, table: &str, row: usize, col: usize) -> CellValue {
        self.tables
            .get(table)
            .and_then(|t| t.rows.get(row.checked_sub(1)?))
            .and_then(|r| r.get(col.checked_sub(1)?))
            .cloned()
            .unwrap_or_default()
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        let available = if self.tables.contains_key(name) {
            Vec::new()
        } else {
            self.tables.keys().cloned().collect()
        };
        self.tables
            .get_mut(name)
            .ok_or_else(|| IntakeError::TableNotFound {
                name: name.to_string(),
                available,
            })
    }

    fn check_writable(&self, table: &str, row: usize, col: usize) -> Result<()> {
        if self
            .rejected_cells
            .contains(&(table.to_string(), row, col))
        {
            return Err(IntakeError::write_failure(
                table,
                io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("cell ({row}, {col}) is protected"),
                ),
            ));
        }
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| IntakeError::TableNotFound {
                name: name.to_string(),
                available: self.tables.keys().cloned().collect(),
            })
    }
}

impl RowStore for MemoryStore {
    fn table_meta(&self, name: &str) -> Result<Option<TableMeta>> {
        Ok(self.tables.get(name).map(|t| t.meta(name)))
    }

    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn create_table(&mut self, name: &str, header: &[String]) -> Result<TableMeta> {
        if self.tables.contains_key(name) {
            return Err(IntakeError::write_failure(
                name,
                io::Error::new(io::ErrorKind::AlreadyExists, "table already exists"),
            ));
        }
        let table = MemoryTable {
            rows: vec![header.iter().map(|h| CellValue::from(h.as_str())).collect()],
            style: HeaderStyle::default(),
        };
        let meta = table.meta(name);
        self.tables.insert(name.to_string(), table);
        Ok(meta)
    }

    fn read_range(
        &self,
        table: &str,
        row: usize,
        col_start: usize,
        col_count: usize,
    ) -> Result<Vec<CellValue>> {
        let data = self.table(table)?;
        let source = row.checked_sub(1).and_then(|idx| data.rows.get(idx));
        Ok((0..col_count)
            .map(|offset| {
                source
                    .and_then(|r| r.get((col_start + offset).checked_sub(1)?))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    fn write_cell(
        &mut self,
        table: &str,
        row: usize,
        col: usize,
        value: &CellValue,
    ) -> Result<()> {
        check_position(table, row, col)?;
        self.check_writable(table, row, col)?;
        let data = self.table_mut(table)?;
        if data.rows.len() < row {
            data.rows.resize_with(row, Vec::new);
        }
        let target = &mut data.rows[row - 1];
        if target.len() < col {
            target.resize(col, CellValue::Empty);
        }
        target[col - 1] = value.clone();
        Ok(())
    }

    fn append_row(&mut self, table: &str, values: &[CellValue]) -> Result<usize> {
        let row = self.table(table)?.rows.len() + 1;
        for col in 1..=values.len() {
            self.check_writable(table, row, col)?;
        }
        let data = self.table_mut(table)?;
        data.rows.push(values.to_vec());
        Ok(row)
    }

    fn style_header(&mut self, table: &str, style: HeaderStyle) -> Result<()> {
        self.table_mut(table)?.style = style;
        Ok(())
    }

    fn header_style(&self, table: &str) -> Result<HeaderStyle> {
        Ok(self.table(table)?.style)
    }
}
