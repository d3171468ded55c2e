use std::{
    fs, io,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    error::{IntakeError, Result},
    io_utils::{self, TableFile},
    store::{HeaderStyle, RowStore, TableMeta, check_position},
    value::CellValue,
};

const TABLE_EXTENSION: &str = "csv";
const LAYOUT_SUFFIX: &str = ".layout.yml";

/// Row store backed by a directory holding one `<table>.csv` file per table.
///
/// Cells are kept as raw text so a rewrite only changes the cells that were
/// written; values are typed on read with [`CellValue::infer`]. Header
/// formatting lives in a `<table>.layout.yml` sidecar.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: io_utils::DEFAULT_DELIMITER,
            encoding: UTF_8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TABLE_EXTENSION}"))
    }

    fn layout_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{LAYOUT_SUFFIX}"))
    }

    fn validate_name(name: &str) -> io::Result<()> {
        if name.trim().is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{name}' is not a valid table name"),
            ));
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<TableFile>> {
        Self::validate_name(name).map_err(|err| IntakeError::read_failure(name, err))?;
        let path = self.table_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        let file = io_utils::read_rows(&path, self.delimiter, self.encoding)
            .map_err(|err| IntakeError::read_failure(name, err))?;
        debug!("Loaded {} row(s) from {:?}", file.rows.len(), path);
        Ok(Some(file))
    }

    fn load_existing(&self, name: &str) -> Result<TableFile> {
        match self.load(name)? {
            Some(file) => Ok(file),
            None => Err(IntakeError::TableNotFound {
                name: name.to_string(),
                available: self.table_names()?,
            }),
        }
    }

    fn save(&self, name: &str, file: &TableFile) -> Result<()> {
        io_utils::write_rows(&self.table_path(name), file, self.delimiter, self.encoding)
            .map_err(|err| IntakeError::write_failure(name, err))
    }
}

fn meta_for(name: &str, rows: &[Vec<String>]) -> TableMeta {
    TableMeta {
        name: name.to_string(),
        last_row: rows.len(),
        last_col: rows.iter().map(Vec::len).max().unwrap_or(0),
    }
}

impl RowStore for CsvStore {
    fn table_meta(&self, name: &str) -> Result<Option<TableMeta>> {
        Ok(self.load(name)?.map(|file| meta_for(name, &file.rows)))
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let root = self.root.display().to_string();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(IntakeError::read_failure(&root, err)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| IntakeError::read_failure(&root, err))?
                .path();
            let is_table = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TABLE_EXTENSION));
            if !is_table || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_table(&mut self, name: &str, header: &[String]) -> Result<TableMeta> {
        Self::validate_name(name).map_err(|err| IntakeError::write_failure(name, err))?;
        if self.table_path(name).exists() {
            return Err(IntakeError::write_failure(
                name,
                io::Error::new(io::ErrorKind::AlreadyExists, "table already exists"),
            ));
        }
        fs::create_dir_all(&self.root).map_err(|err| IntakeError::write_failure(name, err))?;
        let file = TableFile {
            rows: vec![header.to_vec()],
            bom: false,
        };
        self.save(name, &file)?;
        Ok(meta_for(name, &file.rows))
    }

    fn read_range(
        &self,
        table: &str,
        row: usize,
        col_start: usize,
        col_count: usize,
    ) -> Result<Vec<CellValue>> {
        let file = self.load_existing(table)?;
        let source = row.checked_sub(1).and_then(|idx| file.rows.get(idx));
        Ok((0..col_count)
            .map(|offset| {
                source
                    .and_then(|r| r.get((col_start + offset).checked_sub(1)?))
                    .map(|raw| CellValue::infer(raw))
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
        let mut file = self.load_existing(table)?;
        if file.rows.len() < row {
            file.rows.resize_with(row, Vec::new);
        }
        let target = &mut file.rows[row - 1];
        if target.len() < col {
            target.resize(col, String::new());
        }
        target[col - 1] = value.as_display();
        self.save(table, &file)
    }

    fn append_row(&mut self, table: &str, values: &[CellValue]) -> Result<usize> {
        let mut file = self.load_existing(table)?;
        file.rows.push(values.iter().map(CellValue::as_display).collect());
        self.save(table, &file)?;
        Ok(file.rows.len())
    }

    fn style_header(&mut self, table: &str, style: HeaderStyle) -> Result<()> {
        self.load_existing(table)?;
        let serialized = serde_yaml::to_string(&style)
            .map_err(|err| IntakeError::write_failure(table, io::Error::other(err)))?;
        fs::write(self.layout_path(table), serialized)
            .map_err(|err| IntakeError::write_failure(table, err))
    }

    fn header_style(&self, table: &str) -> Result<HeaderStyle> {
        let path = self.layout_path(table);
        if !path.is_file() {
            return Ok(HeaderStyle::default());
        }
        let raw = fs::read_to_string(&path).map_err(|err| IntakeError::read_failure(table, err))?;
        serde_yaml::from_str(&raw).map_err(|err| {
            IntakeError::read_failure(
                table,
                io::Error::new(io::ErrorKind::InvalidData, err),
            )
        })
    }
}
