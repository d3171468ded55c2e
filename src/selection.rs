//! Remembers which row a user picked between two separate invocations.
//!
//! The selection is process-wide: one key, no per-user scoping, no expiry.
//! A second user selecting a row replaces the first user's choice. Library
//! operations never consult it; only the CLI turns it into an explicit row.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::IntakeError;

pub const DEFAULT_SELECTION_KEY: &str = "selectedRow";

pub trait SelectionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub table: String,
    pub row: usize,
}

impl Selection {
    pub fn load(store: &dyn SelectionStore, key: &str) -> Result<Option<Self>> {
        match store.get(key)? {
            Some(raw) => {
                let selection = serde_json::from_str(&raw)
                    .with_context(|| format!("Parsing stored selection '{key}'"))?;
                Ok(Some(selection))
            }
            None => Ok(None),
        }
    }

    pub fn save(&self, store: &mut dyn SelectionStore, key: &str) -> Result<()> {
        let raw = serde_json::to_string(self).context("Serializing selection")?;
        store.set(key, &raw)
    }
}

/// Picks the explicit row when given, otherwise the stored selection. An
/// explicit `table` overrides the stored one.
pub fn resolve_row(
    explicit: Option<usize>,
    table: Option<&str>,
    store: &dyn SelectionStore,
    key: &str,
) -> Result<Selection> {
    if let Some(row) = explicit {
        return Ok(Selection {
            table: table.unwrap_or_default().to_string(),
            row,
        });
    }
    let stored = Selection::load(store, key)?.ok_or(IntakeError::NoSelection)?;
    Ok(Selection {
        table: table.map(str::to_string).unwrap_or(stored.table),
        row: stored.row,
    })
}

#[derive(Debug, Clone, Default)]
pub struct MemorySelectionStore {
    values: HashMap<String, String>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value properties persisted as a flat JSON object.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.is_file() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Opening selection file {:?}", self.path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Parsing selection file {:?}", self.path))
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating directory {parent:?}"))?;
        }
        let raw = serde_json::to_string_pretty(&values).context("Serializing selection file")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Writing selection file {:?}", self.path))
    }
}
