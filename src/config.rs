//! Settings shared by every subcommand.
//!
//! Values come from an optional YAML file (by default `bond-intake.yml` in the
//! store directory) and are then overridden by command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cli::StoreArgs,
    csv_store::CsvStore,
    io_utils,
    selection::{DEFAULT_SELECTION_KEY, FileSelectionStore},
    synonyms::SynonymTable,
};

pub const CONFIG_FILE_NAME: &str = "bond-intake.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store_dir: PathBuf,
    pub delimiter: Option<String>,
    pub encoding: Option<String>,
    pub arrests_table: String,
    pub fallback_table: Option<String>,
    pub submissions_table: String,
    pub selection_file: Option<PathBuf>,
    pub selection_key: String,
    pub document_title: String,
    pub output_dir: Option<PathBuf>,
    pub synonyms: Option<SynonymTable>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("."),
            delimiter: None,
            encoding: None,
            arrests_table: "Lee County Arrests".to_string(),
            fallback_table: None,
            submissions_table: "Bond Applications".to_string(),
            selection_file: None,
            selection_key: DEFAULT_SELECTION_KEY.to_string(),
            document_title: "Arrest Record".to_string(),
            output_dir: None,
            synonyms: None,
        }
    }
}

impl Config {
    /// Reads a config file. Relative paths inside it are taken relative to
    /// the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Opening config file {path:?}"))?;
        let config: Self =
            serde_yaml::from_str(&raw).with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(match path.parent() {
            Some(base) => config.rebased(base),
            None => config,
        })
    }

    fn rebased(mut self, base: &Path) -> Self {
        let rebase = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.store_dir = rebase(self.store_dir);
        self.selection_file = self.selection_file.map(rebase);
        self.output_dir = self.output_dir.map(rebase);
        self
    }

    /// Loads the explicit config file, or the default one inside the store
    /// directory when present, then applies flag overrides.
    pub fn resolve(args: &StoreArgs) -> Result<Self> {
        let store_dir = args.store.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => {
                let candidate = store_dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    debug!("Using config file {candidate:?}");
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        if args.store.is_some() || args.config.is_none() {
            config.store_dir = store_dir;
        }
        if let Some(delimiter) = &args.delimiter {
            config.delimiter = Some(delimiter.clone());
        }
        if let Some(encoding) = &args.input_encoding {
            config.encoding = Some(encoding.clone());
        }
        if let Some(path) = &args.synonyms {
            config.synonyms = Some(SynonymTable::load(path)?);
        }
        Ok(config)
    }

    pub fn delimiter(&self) -> Result<u8> {
        match &self.delimiter {
            Some(raw) => io_utils::parse_delimiter(raw).map_err(anyhow::Error::msg),
            None => Ok(io_utils::DEFAULT_DELIMITER),
        }
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        io_utils::resolve_encoding(self.encoding.as_deref())
    }

    pub fn open_store(&self) -> Result<CsvStore> {
        Ok(CsvStore::new(&self.store_dir)
            .with_delimiter(self.delimiter()?)
            .with_encoding(self.encoding()?))
    }

    pub fn selection_store(&self) -> FileSelectionStore {
        let path = self
            .selection_file
            .clone()
            .unwrap_or_else(|| self.store_dir.join(".selection.json"));
        FileSelectionStore::new(path)
    }

    pub fn synonym_table(&self) -> SynonymTable {
        self.synonyms.clone().unwrap_or_default()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.store_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config =
            serde_yaml::from_str("arrests_table: Collier County Arrests\n").unwrap();
        assert_eq!(config.arrests_table, "Collier County Arrests");
        assert_eq!(config.submissions_table, "Bond Applications");
        assert_eq!(config.selection_key, "selectedRow");
        assert!(config.synonyms.is_none());
    }

    #[test]
    fn explicit_config_paths_are_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(
            &path,
            "store_dir: tables\noutput_dir: /tmp/exports\nselection_file: picked.json\n",
        )
        .unwrap();

        let config = Config::resolve(&StoreArgs {
            config: Some(path),
            ..StoreArgs::default()
        })
        .unwrap();
        assert_eq!(config.store_dir, dir.path().join("tables"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/exports")));
        assert_eq!(
            config.selection_store().path(),
            dir.path().join("picked.json").as_path()
        );
    }

    #[test]
    fn store_flag_overrides_the_configured_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "store_dir: tables\n").unwrap();

        let config = Config::resolve(&StoreArgs {
            store: Some(PathBuf::from("elsewhere")),
            config: Some(path),
            ..StoreArgs::default()
        })
        .unwrap();
        assert_eq!(config.store_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("arrest_table: typo\n").is_err());
    }
}
