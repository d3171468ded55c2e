mod common;

use bond_intake::{
    error::IntakeError,
    mapper::{apply_fields, apply_fields_at, plan_fields},
    store::{MemoryStore, RowStore},
    submission::Submission,
    synonyms::{FieldRule, SynonymTable},
    value::CellValue,
};
use common::fixed_now;

fn headers(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn bond_amount_lands_in_bail_amount_column() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[&["Name", "Bail Amount"], &["Jane Doe", ""], &["John Roe", ""]],
    );
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new().with("bondAmount", 5000_i64);

    let applied = apply_fields(&mut store, &table, 2, &submission, &SynonymTable::default())
        .unwrap();

    assert_eq!(applied.fields_written, 1);
    assert_eq!(applied.timestamp_column, None);
    assert_eq!(store.cell("t", 2, 2), CellValue::from(5000_i64));
    assert_eq!(store.cell("t", 2, 1), CellValue::text("Jane Doe"));
    assert_eq!(store.cell("t", 3, 2), CellValue::Empty);
}

#[test]
fn unknown_fields_are_ignored_without_error() {
    let mut store = MemoryStore::new().with_table("t", &[&["Name", "Notes"], &["Jane", "x"]]);
    let before = store.rows("t").unwrap();
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new().with("unknownField", "anything");

    let applied = apply_fields(&mut store, &table, 2, &submission, &SynonymTable::default())
        .unwrap();

    assert_eq!(applied.fields_written, 0);
    assert_eq!(store.rows("t").unwrap(), before);
}

#[test]
fn matching_is_case_insensitive_substring() {
    let cols = headers(&["Booking #", "Defendant Full Name", "defendant phone number"]);
    let submission = Submission::new()
        .with("defendantName", "Jane Doe")
        .with("phone", "239-555-0100");
    let plan = plan_fields(&cols, &submission, &SynonymTable::default());

    let targets = plan
        .assignments
        .iter()
        .map(|a| (a.key.as_str(), a.column))
        .collect::<Vec<_>>();
    assert_eq!(targets, vec![("defendantName", 2), ("phone", 3)]);
}

#[test]
fn first_matching_header_wins() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[&["Bond", "Bond Amount"], &["", ""]],
    );
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new().with("bondAmount", 750_i64);

    apply_fields(&mut store, &table, 2, &submission, &SynonymTable::default()).unwrap();

    // "Bond" is scanned before "Bond Amount" even though "Bond Amount" is the
    // first candidate.
    assert_eq!(store.cell("t", 2, 1), CellValue::from(750_i64));
    assert_eq!(store.cell("t", 2, 2), CellValue::Empty);
}

#[test]
fn timestamp_column_is_stamped_after_fields() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[&["Name", "Charges", "Last Updated"], &["Jane", "", ""]],
    );
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new().with("charges", "Petit Theft");

    let applied = apply_fields_at(
        &mut store,
        &table,
        2,
        &submission,
        &SynonymTable::default(),
        fixed_now(),
    )
    .unwrap();

    assert_eq!(applied.timestamp_column, Some(3));
    assert_eq!(store.cell("t", 2, 2), CellValue::text("Petit Theft"));
    assert_eq!(store.cell("t", 2, 3), CellValue::DateTime(fixed_now()));
}

#[test]
fn applying_twice_is_idempotent() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[
            &["Defendant Name", "DOB", "Bail", "Updated"],
            &["", "", "", ""],
        ],
    );
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new()
        .with("defendantName", "Jane Doe")
        .with("dob", "1990-01-01")
        .with("bondAmount", 5000_i64);
    let synonyms = SynonymTable::default();

    apply_fields_at(&mut store, &table, 2, &submission, &synonyms, fixed_now()).unwrap();
    let once = store.rows("t").unwrap();
    apply_fields_at(&mut store, &table, 2, &submission, &synonyms, fixed_now()).unwrap();
    assert_eq!(store.rows("t").unwrap(), once);
}

#[test]
fn only_exact_rule_keys_are_written() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[&["Name", "Bail Amount", "Offense"], &["Jane", "", ""]],
    );
    let before = store.rows("t").unwrap();
    let table = store.table_meta("t").unwrap().unwrap();
    // Header names as returned by `read_record` and other spellings of rule
    // keys are not rule keys.
    let submission = Submission::new()
        .with("Bond_Amount", 9_i64)
        .with("bond_amount", 10_i64)
        .with("Charges", "DUI");

    let plan = plan_fields(
        &headers(&["Name", "Bail Amount", "Offense"]),
        &submission,
        &SynonymTable::default(),
    );
    assert!(plan.assignments.is_empty());
    assert_eq!(plan.ignored, vec!["Bond_Amount", "bond_amount", "Charges"]);

    let applied = apply_fields(&mut store, &table, 2, &submission, &SynonymTable::default())
        .unwrap();
    assert_eq!(applied.fields_written, 0);
    assert_eq!(store.rows("t").unwrap(), before);
}

#[test]
fn plan_reports_ignored_and_unmatched_keys() {
    let cols = headers(&["Name"]);
    let submission = Submission::new()
        .with("defendantName", "Jane")
        .with("courtDate", "2024-07-01")
        .with("favoriteColor", "green");
    let plan = plan_fields(&cols, &submission, &SynonymTable::default());
    assert_eq!(plan.assignments.len(), 1);
    assert_eq!(plan.unmatched, vec!["courtDate".to_string()]);
    assert_eq!(plan.ignored, vec!["favoriteColor".to_string()]);
}

#[test]
fn custom_rules_are_evaluated_in_order() {
    let synonyms = SynonymTable {
        rules: vec![FieldRule::new("bondAmount", &["Surety"])],
        timestamp_candidates: vec![],
    };
    let cols = headers(&["Bond", "Surety Total"]);
    let submission = Submission::new().with("bondAmount", 100_i64);
    let plan = plan_fields(&cols, &submission, &synonyms);
    assert_eq!(plan.assignments[0].column, 2);
}

#[test]
fn rows_outside_the_data_range_are_rejected() {
    let mut store = MemoryStore::new().with_table("t", &[&["Name"], &["Jane"]]);
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new().with("defendantName", "X");
    for row in [1, 3] {
        let err = apply_fields(&mut store, &table, row, &submission, &SynonymTable::default())
            .unwrap_err();
        assert!(matches!(err, IntakeError::OutOfRange { last_row: 2, .. }));
    }
    assert_eq!(store.cell("t", 1, 1), CellValue::text("Name"));
}

#[test]
fn failed_write_keeps_earlier_fields() {
    let mut store = MemoryStore::new().with_table(
        "t",
        &[&["Name", "DOB", "Phone"], &["", "", ""]],
    );
    store.reject_writes_at("t", 2, 3);
    let table = store.table_meta("t").unwrap().unwrap();
    let submission = Submission::new()
        .with("defendantName", "Jane Doe")
        .with("dob", "1990-01-01")
        .with("phone", "239-555-0100");

    let err = apply_fields(&mut store, &table, 2, &submission, &SynonymTable::default())
        .unwrap_err();

    assert!(matches!(err, IntakeError::UpstreamWriteFailure { .. }));
    assert_eq!(store.cell("t", 2, 1), CellValue::text("Jane Doe"));
    assert_eq!(store.cell("t", 2, 2), CellValue::text("1990-01-01"));
    assert_eq!(store.cell("t", 2, 3), CellValue::Empty);
}
