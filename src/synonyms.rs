//! Ordered synonym rules used to resolve form field names to table columns.
//!
//! A rule pairs a canonical field key with candidate header substrings.
//! Resolution is deterministic and first-match-wins:
//!
//! 1. headers are scanned left to right;
//! 2. for each header, the rule's candidates are tried in configured order;
//! 3. the first header whose lowercase text contains a lowercase candidate is
//!    the target, and no further headers are examined.
//!
//! Because candidates are substrings, a broad candidate such as `Name` will
//! claim an earlier `Indemnitor Name` column before a later `Defendant Name`
//! one. That ordering is part of the contract.

use std::path::Path;

use anyhow::{Context, Result};
use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("defendantName", &["Defendant Name", "Name", "Defendant", "Full Name"]),
    ("dob", &["DOB", "Date of Birth", "Birth Date", "Birthdate"]),
    ("phone", &["Phone", "Phone Number", "Telephone", "Cell", "Mobile"]),
    ("email", &["Email", "E-mail", "Mail"]),
    ("address", &["Address", "Street", "Location", "Residence"]),
    ("arrestDate", &["Arrest Date", "Date of Arrest", "Arrested"]),
    (
        "bookingNumber",
        &["Booking Number", "Booking #", "Booking", "Book Number"],
    ),
    ("charges", &["Charges", "Charge", "Offense", "Crime"]),
    ("bondAmount", &["Bond Amount", "Bond", "Bail", "Bail Amount"]),
    ("courtDate", &["Court Date", "Hearing Date", "Court", "Hearing"]),
    ("indemnitorName", &["Indemnitor Name", "Indemnitor", "Cosigner"]),
    ("relationship", &["Relationship", "Relation"]),
    ("indemnitorPhone", &["Indemnitor Phone", "Cosigner Phone"]),
    ("indemnitorEmail", &["Indemnitor Email", "Cosigner Email"]),
    ("notes", &["Notes", "Comments", "Additional Info", "Remarks"]),
];

const DEFAULT_TIMESTAMP_CANDIDATES: &[&str] = &["Last Updated", "Updated", "Timestamp"];

/// Turns a loosely typed field name such as `bond amount` or `bond_amount`
/// into its camel-case key. Only command-line assignments go through this;
/// library lookups use keys exactly as given.
pub fn field_key(raw: &str) -> String {
    raw.trim().to_lower_camel_case()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub key: String,
    pub candidates: Vec<String>,
}

impl FieldRule {
    pub fn new(key: &str, candidates: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Returns the 0-based index of the first header matched by this rule.
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        resolve_column(headers, &self.candidates)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymTable {
    pub rules: Vec<FieldRule>,
    #[serde(default = "default_timestamp_candidates")]
    pub timestamp_candidates: Vec<String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(key, candidates)| FieldRule::new(key, candidates))
                .collect(),
            timestamp_candidates: default_timestamp_candidates(),
        }
    }
}

fn default_timestamp_candidates() -> Vec<String> {
    DEFAULT_TIMESTAMP_CANDIDATES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl SynonymTable {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Opening synonym file {path:?}"))?;
        serde_yaml::from_str(&raw).context("Parsing synonym YAML")
    }

    pub fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.key == key)
    }

    pub fn resolve_timestamp(&self, headers: &[String]) -> Option<usize> {
        resolve_column(headers, &self.timestamp_candidates)
    }
}

/// Header-major, candidate-minor scan; see the module docs for ordering.
pub fn resolve_column(headers: &[String], candidates: &[String]) -> Option<usize> {
    let lowered = candidates
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        lowered.iter().any(|candidate| header.contains(candidate.as_str()))
    })
}
