use serde::Serialize;

use crate::aggregate::year_of;
use crate::models::CrimeRecord;

/// Active filter selections. Every set field must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub crime: Option<String>,
    pub region: Option<String>,
    pub premise: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive text matched against crime, region or year.
    pub search: Option<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crime(mut self, crime: Option<&str>) -> Self {
        self.crime = selection(crime);
        self
    }

    pub fn region(mut self, region: Option<&str>) -> Self {
        self.region = selection(region);
        self
    }

    pub fn premise(mut self, premise: Option<&str>) -> Self {
        self.premise = selection(premise);
        self
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn matches(&self, record: &CrimeRecord) -> bool {
        equals(self.crime.as_deref(), &record.crime)
            && equals(self.region.as_deref(), &record.region)
            && equals(self.premise.as_deref(), &record.premise)
            && self.year.map_or(true, |year| year_of(record) == Some(year))
            && self
                .search
                .as_deref()
                .map_or(true, |needle| search_matches(needle, record))
    }

    pub fn apply(&self, records: &[CrimeRecord]) -> Vec<CrimeRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// `"All"`, `"All Crimes"` and blank selections mean "no constraint".
pub fn selection(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    match value {
        "" | "All" | "All Crimes" => None,
        other => Some(other.to_string()),
    }
}

fn equals(wanted: Option<&str>, actual: &str) -> bool {
    wanted.map_or(true, |wanted| wanted == actual.trim())
}

fn search_matches(needle: &str, record: &CrimeRecord) -> bool {
    record.crime.to_lowercase().contains(needle)
        || record.region.to_lowercase().contains(needle)
        || year_of(record).is_some_and(|year| year.to_string().contains(needle))
}
