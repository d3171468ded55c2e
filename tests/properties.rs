mod common;

use bond_intake::{
    mapper::apply_fields_at,
    record::{read_record, resolve_table},
    store::{MemoryStore, RowStore},
    submission::Submission,
    synonyms::SynonymTable,
    value::CellValue,
};
use common::fixed_now;
use proptest::prelude::*;

const HEADER_POOL: &[&str] = &[
    "Defendant Name",
    "Full Name",
    "DOB",
    "Phone",
    "Email",
    "Address",
    "Booking #",
    "Charges",
    "Bond Amount",
    "Court Date",
    "Indemnitor",
    "Notes",
    "Last Updated",
    "",
];

const FIELD_POOL: &[&str] = &[
    "defendantName",
    "dob",
    "phone",
    "email",
    "bookingNumber",
    "charges",
    "bondAmount",
    "courtDate",
    "indemnitorName",
    "notes",
    "unknownField",
];

fn table_rows(headers: &[String], values: &[String]) -> Vec<Vec<String>> {
    vec![headers.to_vec(), values.to_vec()]
}

fn store_from(rows: &[Vec<String>]) -> MemoryStore {
    let borrowed = rows
        .iter()
        .map(|row| row.iter().map(String::as_str).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let slices = borrowed.iter().map(Vec::as_slice).collect::<Vec<_>>();
    MemoryStore::new().with_table("t", &slices)
}

proptest! {
    #[test]
    fn record_keys_are_the_distinct_non_blank_headers(
        headers in prop::collection::vec("[A-Za-z ]{0,6}", 1..8),
        values in prop::collection::vec("[a-z]{0,5}", 0..8)
    ) {
        let store = store_from(&table_rows(&headers, &values));
        let table = resolve_table(&store, "t", None).expect("table exists");
        let record = read_record(&store, &table, 2).expect("row 2 exists");

        let mut expected: Vec<&str> = Vec::new();
        for header in &headers {
            if !header.trim().is_empty() && !expected.contains(&header.as_str()) {
                expected.push(header);
            }
        }
        prop_assert_eq!(record.keys().collect::<Vec<_>>(), expected);

        for key in record.keys() {
            let last = headers
                .iter()
                .rposition(|header| header == key)
                .expect("key comes from a header");
            let cell = CellValue::infer(values.get(last).map(String::as_str).unwrap_or(""));
            prop_assert_eq!(record.get(key), Some(&cell));
        }
    }

    #[test]
    fn applying_a_submission_twice_changes_nothing_more(
        header_picks in prop::collection::vec(0..HEADER_POOL.len(), 1..8),
        fields in prop::collection::vec((0..FIELD_POOL.len(), "[a-z]{1,6}"), 0..6)
    ) {
        let headers = header_picks
            .iter()
            .map(|idx| HEADER_POOL[*idx].to_string())
            .collect::<Vec<_>>();
        let blank = vec![String::new(); headers.len()];
        let mut store = store_from(&table_rows(&headers, &blank));
        let table = store.table_meta("t").expect("meta").expect("table exists");
        let mut submission = Submission::new();
        for (idx, value) in &fields {
            submission.insert(FIELD_POOL[*idx], value.as_str().into());
        }
        let synonyms = SynonymTable::default();

        apply_fields_at(&mut store, &table, 2, &submission, &synonyms, fixed_now())
            .expect("first apply");
        let once = store.rows("t");
        apply_fields_at(&mut store, &table, 2, &submission, &synonyms, fixed_now())
            .expect("second apply");
        prop_assert_eq!(store.rows("t"), once);
    }
}
