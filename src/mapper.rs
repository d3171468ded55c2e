//! Writes a submitted form back into an existing row.
//!
//! Planning is pure: [`plan_fields`] walks the synonym rules in order and
//! picks a target column for every submitted key it knows. Committing writes
//! those cells one by one and then stamps the last-updated column. There is no
//! transaction; a failed write leaves the earlier writes in place.

use chrono::{Local, NaiveDateTime};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    error::Result,
    record::{check_data_row, read_headers},
    store::{RowStore, TableMeta},
    submission::Submission,
    synonyms::SynonymTable,
    value::CellValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    /// 1-based column in the target table.
    pub column: usize,
    pub header: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPlan {
    pub assignments: Vec<Assignment>,
    /// Submitted keys without a synonym rule.
    pub ignored: Vec<String>,
    /// Keys with a rule but no matching header.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub fields_written: usize,
    pub timestamp_column: Option<usize>,
}

pub fn plan_fields(
    headers: &[String],
    submission: &Submission,
    synonyms: &SynonymTable,
) -> MappingPlan {
    let mut assignments = Vec::new();
    let mut unmatched = Vec::new();
    for rule in &synonyms.rules {
        let Some(value) = submission.get(&rule.key) else {
            continue;
        };
        match rule.resolve(headers) {
            Some(idx) => {
                debug!("Field '{}' -> column {} '{}'", rule.key, idx + 1, headers[idx]);
                assignments.push(Assignment {
                    key: rule.key.clone(),
                    column: idx + 1,
                    header: headers[idx].clone(),
                    value: value.clone(),
                });
            }
            None => {
                debug!("Field '{}' matched no header", rule.key);
                unmatched.push(rule.key.clone());
            }
        }
    }
    let ignored = submission
        .keys()
        .filter(|key| !synonyms.rules.iter().any(|rule| rule.key == *key))
        .map(str::to_string)
        .collect();
    MappingPlan {
        assignments,
        ignored,
        unmatched,
    }
}

pub fn apply_fields(
    store: &mut dyn RowStore,
    table: &TableMeta,
    row: usize,
    submission: &Submission,
    synonyms: &SynonymTable,
) -> Result<Applied> {
    apply_fields_at(
        store,
        table,
        row,
        submission,
        synonyms,
        Local::now().naive_local(),
    )
}

pub fn apply_fields_at(
    store: &mut dyn RowStore,
    table: &TableMeta,
    row: usize,
    submission: &Submission,
    synonyms: &SynonymTable,
    now: NaiveDateTime,
) -> Result<Applied> {
    check_data_row(table, row)?;
    let headers = read_headers(&*store, table)?;
    let plan = plan_fields(&headers, submission, synonyms);
    if !plan.ignored.is_empty() {
        info!(
            "Ignoring field(s) without a column rule: {}",
            plan.ignored.iter().join(", ")
        );
    }

    for assignment in &plan.assignments {
        store.write_cell(&table.name, row, assignment.column, &assignment.value)?;
    }

    let timestamp_column = synonyms.resolve_timestamp(&headers).map(|idx| idx + 1);
    if let Some(column) = timestamp_column {
        store.write_cell(&table.name, row, column, &CellValue::DateTime(now))?;
    }

    info!(
        "Updated row {row} of '{}': {} field(s) written",
        table.name,
        plan.assignments.len()
    );
    Ok(Applied {
        fields_written: plan.assignments.len(),
        timestamp_column,
    })
}
