//! Bulk CSV import.

use std::path::Path;

use futures::future::join_all;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{DashboardError, Result};
use crate::models::CrimeRecord;
use crate::store::CrimeStore;

/// Column layout of an import file. Absent columns become empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time Occurred")]
    time_occurred: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Crime")]
    crime: String,
    #[serde(rename = "Victim Age")]
    victim_age: String,
    #[serde(rename = "Victim Sex")]
    victim_sex: String,
    #[serde(rename = "Victim Descent")]
    victim_descent: String,
    #[serde(rename = "Suspect Age")]
    suspect_age: String,
    #[serde(rename = "Suspect Sex")]
    suspect_sex: String,
    #[serde(rename = "Premise")]
    premise: String,
    #[serde(rename = "Weapons Used")]
    weapons_used: String,
}

impl From<CsvRow> for CrimeRecord {
    fn from(row: CsvRow) -> Self {
        CrimeRecord {
            id: None,
            date: row.date,
            time_occurred: row.time_occurred,
            region: row.region,
            crime: row.crime,
            victim_age: row.victim_age,
            victim_sex: row.victim_sex,
            victim_descent: row.victim_descent,
            suspect_age: row.suspect_age,
            suspect_sex: row.suspect_sex,
            premise: row.premise,
            weapons_used: row.weapons_used,
        }
        .trimmed()
    }
}

/// Reject anything that is not a `.csv` file before reading it.
pub fn check_csv_path(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(())
    } else {
        Err(DashboardError::InvalidFile(path.to_path_buf()))
    }
}

pub fn read_csv_file(path: &Path) -> Result<Vec<CrimeRecord>> {
    check_csv_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Map each non-empty row to a record, keyed by header name.
pub fn parse_csv(text: &str) -> Result<Vec<CrimeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let record = CrimeRecord::from(row?);
        if record == CrimeRecord::default() {
            continue;
        }
        for (field, value) in record.unknown_options() {
            warn!(field, value, "value outside the known option set");
        }
        records.push(record);
    }
    Ok(records)
}

/// Result of a batch insert. Inserts are independent: rows that made it in
/// stay in even when others fail.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub inserted: Vec<Uuid>,
    /// Zero-based row index and the error message of every failed insert.
    pub failed: Vec<(usize, String)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Insert every record concurrently and wait for all of them.
pub async fn insert_batch(store: &dyn CrimeStore, records: &[CrimeRecord]) -> BatchOutcome {
    let results = join_all(records.iter().map(|record| store.insert_one(record))).await;

    let mut outcome = BatchOutcome::default();
    for (row, result) in results.into_iter().enumerate() {
        match result {
            Ok(id) => outcome.inserted.push(id),
            Err(e) => {
                error!(row, "Error uploading CSV row: {e}");
                outcome.failed.push((row, e.to_string()));
            }
        }
    }
    outcome
}
