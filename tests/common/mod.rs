#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bond_intake::store::MemoryStore;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::{TempDir, tempdir};

pub const ARRESTS: &str = "Lee County Arrests";
pub const APPLICATIONS: &str = "Bond Applications";

/// Scratch store directory that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(name)).expect("read workspace file")
    }

    /// Writes the sample arrests table as `Lee County Arrests.csv`.
    pub fn write_arrests(&self) -> PathBuf {
        self.write(&format!("{ARRESTS}.csv"), ARRESTS_CSV)
    }
}

pub const ARRESTS_CSV: &str = "\
Booking_Number,Full_Name,DOB,All_Charges,Bond_Amount,Address,Last Updated
1013788,Jane Doe,1990-01-01,Petit Theft,5000,12 Palm St,
1013789,John Roe,1985-07-04,DUI,2500.50,9 Gulf Blvd,
1013790,Ann Poe,1979-12-31,Trespass,,,
";

/// Headers `["Full_Name","DOB","Booking_Number"]` with data on rows 2..=5.
pub fn sample_store() -> MemoryStore {
    MemoryStore::new().with_table(
        ARRESTS,
        &[
            &["Full_Name", "DOB", "Booking_Number"],
            &["Alex Smith", "1980-02-02", "B-097"],
            &["Sam Jones", "1975-03-03", "B-098"],
            &["Kim Lee", "1999-04-04", "B-099"],
            &["Jane Doe", "1990-01-01", "B-100"],
        ],
    )
}

pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}
