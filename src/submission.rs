//! Submitted application records and the fixed-schema applications table.
//!
//! The applications table always carries the same 28 columns. A submission is
//! laid out against that schema by field key, independently of the synonym
//! rules used when updating arrest rows.

use std::{fs, path::Path};

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;

use crate::{
    error::{IntakeError, Result},
    store::{HeaderStyle, RowStore},
    value::CellValue,
};

/// Header label and the submission field each column is filled from. The
/// first column is stamped with the write time.
pub const SUBMISSION_COLUMNS: [(&str, &str); 28] = [
    ("Timestamp", ""),
    ("Booking Number", "bookingNumber"),
    ("Defendant Full Name", "defendantFullName"),
    ("Defendant DOB", "defendantDOB"),
    ("Defendant Phone", "defendantPhone"),
    ("Defendant Email", "defendantEmail"),
    ("Defendant Address", "defendantAddress"),
    ("Defendant City", "defendantCity"),
    ("Defendant State", "defendantState"),
    ("Defendant ZIP", "defendantZip"),
    ("Charges", "charges"),
    ("Bond Amount", "bondAmount"),
    ("Bond Type", "bondType"),
    ("Case Number", "caseNumber"),
    ("County", "county"),
    ("Court Date", "courtDate"),
    ("Court Time", "courtTime"),
    ("Court Location", "courtLocation"),
    ("Indemnitor Name", "indemnitorName"),
    ("Indemnitor Relationship", "indemnitorRelationship"),
    ("Indemnitor Phone", "indemnitorPhone"),
    ("Indemnitor Email", "indemnitorEmail"),
    ("Indemnitor Address", "indemnitorAddress"),
    ("Indemnitor City", "indemnitorCity"),
    ("Indemnitor State", "indemnitorState"),
    ("Indemnitor ZIP", "indemnitorZip"),
    ("Indemnitor Employer", "indemnitorEmployer"),
    ("Additional Notes", "additionalNotes"),
];

pub fn submission_headers() -> Vec<String> {
    SUBMISSION_COLUMNS
        .iter()
        .map(|(header, _)| header.to_string())
        .collect()
}

/// Form fields keyed by name. Keys are matched exactly: `bond_amount` does
/// not find a value submitted as `bondAmount`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    fields: Vec<(String, CellValue)>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: CellValue) {
        match self.fields.iter_mut().find(|(existing, _)| existing.as_str() == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing.as_str() == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            IntakeError::InvalidSubmission("expected a JSON object of field values".to_string())
        })?;
        let mut submission = Submission::new();
        for (key, value) in object {
            submission.insert(key, CellValue::from_json(value));
        }
        Ok(submission)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| IntakeError::InvalidSubmission(err.to_string()))?;
        Self::from_json(&value)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening submission file {path:?}"))?;
        Self::from_json_str(&raw).with_context(|| format!("Parsing submission file {path:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub success: bool,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub row: usize,
}

/// Creates the applications table with its header row, bolded and frozen,
/// unless it already exists. Returns whether the table was created.
pub fn ensure_schema(store: &mut dyn RowStore, table: &str) -> Result<bool> {
    if store.table_meta(table)?.is_some() {
        debug!("Table '{table}' already exists");
        return Ok(false);
    }
    info!("Creating '{table}' with {} columns", SUBMISSION_COLUMNS.len());
    store.create_table(table, &submission_headers())?;
    store.style_header(
        table,
        HeaderStyle {
            bold: true,
            frozen_rows: 1,
        },
    )?;
    Ok(true)
}

/// Lays a submission out against the fixed schema. Missing fields become
/// empty strings.
pub fn build_row(submission: &Submission, timestamp: NaiveDateTime) -> Vec<CellValue> {
    SUBMISSION_COLUMNS
        .iter()
        .map(|(_, key)| {
            if key.is_empty() {
                CellValue::DateTime(timestamp)
            } else {
                submission.get(key).cloned().unwrap_or_default()
            }
        })
        .collect()
}

pub fn append_submission(
    store: &mut dyn RowStore,
    table: &str,
    submission: &Submission,
) -> Result<Receipt> {
    append_submission_at(store, table, submission, Local::now().naive_local())
}

pub fn append_submission_at(
    store: &mut dyn RowStore,
    table: &str,
    submission: &Submission,
    timestamp: NaiveDateTime,
) -> Result<Receipt> {
    let row = store.append_row(table, &build_row(submission, timestamp))?;
    info!("Appended application to '{table}' at row {row}");
    Ok(Receipt {
        success: true,
        message: "Application submitted successfully".to_string(),
        timestamp,
        row,
    })
}

/// Ensures the applications table exists, then appends the submission.
pub fn submit_application(
    store: &mut dyn RowStore,
    table: &str,
    submission: &Submission,
) -> Result<Receipt> {
    ensure_schema(store, table)?;
    append_submission(store, table, submission)
}
