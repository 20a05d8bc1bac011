use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{CrimeRecord, PersonRole, UNKNOWN_YEAR};

/// Category counts in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, count: usize) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), count));
            }
        }
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn get(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Most frequent category. Ties go to the category seen first.
    pub fn mode(&self) -> Option<&str> {
        self.mode_where(|_| true)
    }

    pub fn mode_excluding(&self, excluded: &str) -> Option<&str> {
        self.mode_where(|key| key != excluded)
    }

    fn mode_where(&self, keep: impl Fn(&str) -> bool) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in self.entries.iter().filter(|(key, _)| keep(key)) {
            if best.map_or(true, |current| entry.1 > current.1) {
                best = Some(entry);
            }
        }
        best.map(|(key, _)| key.as_str())
    }

    /// The `n` most frequent categories, highest first, ties in
    /// first-encountered order.
    pub fn top_n(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Count records by the key `key_fn` extracts, substituting `unknown` for
/// empty keys. Counts always sum to `records.len()`.
pub fn frequency_of<'a, F>(records: &'a [CrimeRecord], unknown: &str, key_fn: F) -> FrequencyTable
where
    F: Fn(&'a CrimeRecord) -> &'a str,
{
    let mut table = FrequencyTable::new();
    for record in records {
        let key = key_fn(record).trim();
        table.increment(if key.is_empty() { unknown } else { key });
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Average {
    Value(f64),
    NoData,
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value:.1}"),
            Self::NoData => write!(f, "N/A"),
        }
    }
}

impl Serialize for Average {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => serializer.serialize_some(value),
            Self::NoData => serializer.serialize_none(),
        }
    }
}

pub fn average_of<F>(records: &[CrimeRecord], field_fn: F) -> Average
where
    F: Fn(&CrimeRecord) -> Option<u32>,
{
    let (sum, count) = records
        .iter()
        .filter_map(field_fn)
        .fold((0u64, 0u64), |(sum, count), value| (sum + u64::from(value), count + 1));

    if count == 0 {
        Average::NoData
    } else {
        Average::Value(sum as f64 / count as f64)
    }
}

pub fn hour_of(time_occurred: &str) -> Option<usize> {
    let hour = time_occurred.trim().split(':').next()?.trim();
    let hour: usize = hour.parse().ok()?;
    (hour < 24).then_some(hour)
}

/// Incident counts per hour of the day. Records without a parsable time are
/// left out.
pub fn bucket_by_hour(records: &[CrimeRecord]) -> [usize; 24] {
    let mut buckets = [0usize; 24];
    for hour in records.iter().filter_map(|r| hour_of(&r.time_occurred)) {
        buckets[hour] += 1;
    }
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Night,
}

pub fn time_of_day(hour: usize) -> TimeOfDay {
    match hour {
        6..=11 => TimeOfDay::Morning,
        12..=17 => TimeOfDay::Afternoon,
        _ => TimeOfDay::Night,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeOfDayCounts {
    pub morning: usize,
    pub afternoon: usize,
    pub night: usize,
}

impl TimeOfDayCounts {
    pub fn get(&self, bucket: TimeOfDay) -> usize {
        match bucket {
            TimeOfDay::Morning => self.morning,
            TimeOfDay::Afternoon => self.afternoon,
            TimeOfDay::Night => self.night,
        }
    }
}

pub fn bucket_by_time_of_day(records: &[CrimeRecord]) -> TimeOfDayCounts {
    let mut counts = TimeOfDayCounts::default();
    for hour in records.iter().filter_map(|r| hour_of(&r.time_occurred)) {
        match time_of_day(hour) {
            TimeOfDay::Morning => counts.morning += 1,
            TimeOfDay::Afternoon => counts.afternoon += 1,
            TimeOfDay::Night => counts.night += 1,
        }
    }
    counts
}

/// Busiest hour, earliest on ties. `None` when no hour has any incidents.
pub fn peak_hour(buckets: &[usize; 24]) -> Option<usize> {
    let mut peak: Option<usize> = None;
    for (hour, &count) in buckets.iter().enumerate() {
        if count > 0 && peak.map_or(true, |best| count > buckets[best]) {
            peak = Some(hour);
        }
    }
    peak
}

/// `"Night 9 PM"` style label for an hour of the day.
pub fn peak_time_label(hour: usize) -> String {
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {hour12} {suffix}", time_of_day(hour))
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

pub fn year_of(record: &CrimeRecord) -> Option<i32> {
    parse_date(&record.date).map(|d| d.year())
}

pub fn year_label(record: &CrimeRecord) -> String {
    year_of(record)
        .map(|year| year.to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

pub fn bucket_by_year(records: &[CrimeRecord]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for record in records {
        table.increment(&year_label(record));
    }
    table
}

/// Counts keyed by `"<Month> <year>"`, e.g. `"May 2023"`. Undated records are
/// skipped.
pub fn bucket_by_month(records: &[CrimeRecord]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for date in records.iter().filter_map(|r| parse_date(&r.date)) {
        table.increment(&date.format("%B %Y").to_string());
    }
    table
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub victim_age: u32,
    pub suspect_age: u32,
    pub crime: String,
}

pub fn scatter_pairs(records: &[CrimeRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                victim_age: r.victim_age()?,
                suspect_age: r.suspect_age()?,
                crime: r.crime.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SexCounts {
    pub male: usize,
    pub female: usize,
}

/// Male/female counts for the victim or the suspect column. Other values are
/// ignored.
pub fn count_by_role_sex(records: &[CrimeRecord], role: PersonRole) -> SexCounts {
    let mut counts = SexCounts::default();
    for record in records {
        let sex = match role {
            PersonRole::Victim => &record.victim_sex,
            PersonRole::Suspect => &record.suspect_sex,
        };
        match sex.trim() {
            "Male" => counts.male += 1,
            "Female" => counts.female += 1,
            _ => {}
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DescentCounts {
    pub filipino: usize,
    pub foreigner: usize,
}

pub fn count_descent(records: &[CrimeRecord]) -> DescentCounts {
    let mut counts = DescentCounts::default();
    for record in records {
        match record.victim_descent.trim() {
            "Filipino" => counts.filipino += 1,
            "Foreigner" => counts.foreigner += 1,
            _ => {}
        }
    }
    counts
}

pub fn unique_sorted<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum IntensityBand {
    Low,
    Guarded,
    Elevated,
    High,
    Severe,
}

impl IntensityBand {
    pub fn for_count(count: usize) -> Self {
        match count {
            c if c > 100 => Self::Severe,
            c if c > 50 => Self::High,
            c if c > 20 => Self::Elevated,
            c if c > 10 => Self::Guarded,
            _ => Self::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_CRIME;
    use strum::IntoEnumIterator;

    fn record(crime: &str, date: &str) -> CrimeRecord {
        CrimeRecord {
            crime: crime.to_string(),
            date: date.to_string(),
            ..CrimeRecord::default()
        }
    }

    fn timed(time: &str) -> CrimeRecord {
        CrimeRecord {
            time_occurred: time.to_string(),
            ..CrimeRecord::default()
        }
    }

    #[test]
    fn frequency_counts_crimes_and_picks_mode() {
        let records = vec![
            record("Theft", "2023-05-01"),
            record("Theft", "2023-06-01"),
            record("Arson", "2023-01-01"),
        ];
        let table = frequency_of(&records, UNKNOWN_CRIME, |r| &r.crime);
        assert_eq!(
            table.entries(),
            &[("Theft".to_string(), 2), ("Arson".to_string(), 1)]
        );
        assert_eq!(table.mode(), Some("Theft"));
    }

    #[test]
    fn frequency_counts_sum_to_input_length() {
        let records = vec![
            record("Theft", ""),
            record("", ""),
            record("  ", ""),
            record("Fraud", ""),
        ];
        let table = frequency_of(&records, UNKNOWN_CRIME, |r| &r.crime);
        assert_eq!(table.total(), records.len());
        assert_eq!(table.get(UNKNOWN_CRIME), 2);
    }

    #[test]
    fn mode_tie_goes_to_first_encountered() {
        let records = vec![
            record("Robbery", ""),
            record("Arson", ""),
            record("Arson", ""),
            record("Robbery", ""),
        ];
        let table = frequency_of(&records, UNKNOWN_CRIME, |r| &r.crime);
        assert_eq!(table.mode(), Some("Robbery"));
        assert_eq!(FrequencyTable::new().mode(), None);
    }

    #[test]
    fn mode_excluding_skips_sentinel() {
        let records = vec![record("", "bad"), record("", "bad"), record("", "2021-03-03")];
        let years = bucket_by_year(&records);
        assert_eq!(years.mode(), Some(UNKNOWN_YEAR));
        assert_eq!(years.mode_excluding(UNKNOWN_YEAR), Some("2021"));
    }

    #[test]
    fn top_n_orders_by_count_then_first_seen() {
        let mut table = FrequencyTable::new();
        table.add("Knife", 2);
        table.add("Firearm", 5);
        table.add("Vehicle", 2);
        table.add("Drugs", 1);
        assert_eq!(
            table.top_n(3),
            vec![
                ("Firearm".to_string(), 5),
                ("Knife".to_string(), 2),
                ("Vehicle".to_string(), 2),
            ]
        );
    }

    #[test]
    fn average_skips_missing_values() {
        let ages = ["20", "30", "", "null"];
        let records: Vec<CrimeRecord> = ages
            .iter()
            .map(|age| CrimeRecord {
                victim_age: age.to_string(),
                ..CrimeRecord::default()
            })
            .collect();
        assert_eq!(average_of(&records, CrimeRecord::victim_age), Average::Value(25.0));
    }

    #[test]
    fn average_without_contributors_is_no_data() {
        let records = vec![CrimeRecord::default(), CrimeRecord::default()];
        let average = average_of(&records, CrimeRecord::suspect_age);
        assert_eq!(average, Average::NoData);
        assert_eq!(average.to_string(), "N/A");
        assert_eq!(average_of(&[], CrimeRecord::suspect_age), Average::NoData);
    }

    #[test]
    fn hour_buckets_skip_unparsable_times() {
        let records = vec![
            timed("09:15"),
            timed("9:40"),
            timed("23:59"),
            timed(""),
            timed("noon"),
            timed("25:00"),
        ];
        let buckets = bucket_by_hour(&records);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[9], 2);
        assert_eq!(buckets[23], 1);
        assert_eq!(buckets.iter().sum::<usize>(), 3);
    }

    #[test]
    fn time_of_day_partitions_the_day() {
        let mut seen = HashMap::new();
        for hour in 0..24 {
            *seen.entry(time_of_day(hour)).or_insert(0) += 1;
        }
        assert_eq!(seen[&TimeOfDay::Morning], 6);
        assert_eq!(seen[&TimeOfDay::Afternoon], 6);
        assert_eq!(seen[&TimeOfDay::Night], 12);
        assert_eq!(seen.values().sum::<usize>(), 24);
        assert_eq!(time_of_day(5), TimeOfDay::Night);
        assert_eq!(time_of_day(6), TimeOfDay::Morning);
        assert_eq!(time_of_day(12), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(18), TimeOfDay::Night);
    }

    #[test]
    fn time_of_day_counts_match_hour_buckets() {
        let records = vec![timed("07:00"), timed("13:30"), timed("21:05"), timed("02:00")];
        let counts = bucket_by_time_of_day(&records);
        let total: usize = TimeOfDay::iter().map(|b| counts.get(b)).sum();
        assert_eq!(total, bucket_by_hour(&records).iter().sum::<usize>());
        assert_eq!(counts.night, 2);
    }

    #[test]
    fn peak_time_uses_twelve_hour_clock() {
        let mut buckets = [0usize; 24];
        assert_eq!(peak_hour(&buckets), None);
        buckets[21] = 4;
        buckets[8] = 4;
        assert_eq!(peak_hour(&buckets), Some(8));
        assert_eq!(peak_time_label(21), "Night 9 PM");
        assert_eq!(peak_time_label(0), "Night 12 AM");
        assert_eq!(peak_time_label(12), "Afternoon 12 PM");
    }

    #[test]
    fn months_and_years_bucket_by_parsed_date() {
        let records = vec![
            record("Theft", "2023-05-01"),
            record("Theft", "2023-05-20"),
            record("Theft", "05/01/2023"),
        ];
        let months = bucket_by_month(&records);
        assert_eq!(months.entries(), &[("May 2023".to_string(), 2)]);
        let years = bucket_by_year(&records);
        assert_eq!(years.get("2023"), 2);
        assert_eq!(years.get(UNKNOWN_YEAR), 1);
    }

    #[test]
    fn scatter_requires_both_ages() {
        let records = vec![
            CrimeRecord {
                victim_age: "25".to_string(),
                suspect_age: "31".to_string(),
                crime: "Assault".to_string(),
                ..CrimeRecord::default()
            },
            CrimeRecord {
                victim_age: "40".to_string(),
                ..CrimeRecord::default()
            },
        ];
        assert_eq!(
            scatter_pairs(&records),
            vec![ScatterPoint {
                victim_age: 25,
                suspect_age: 31,
                crime: "Assault".to_string(),
            }]
        );
    }

    #[test]
    fn sex_counts_follow_role() {
        let records = vec![
            CrimeRecord {
                victim_sex: "Female".to_string(),
                suspect_sex: "Male".to_string(),
                ..CrimeRecord::default()
            },
            CrimeRecord {
                victim_sex: "Female".to_string(),
                suspect_sex: "Other".to_string(),
                ..CrimeRecord::default()
            },
        ];
        assert_eq!(
            count_by_role_sex(&records, PersonRole::Victim),
            SexCounts { male: 0, female: 2 }
        );
        assert_eq!(
            count_by_role_sex(&records, PersonRole::Suspect),
            SexCounts { male: 1, female: 0 }
        );
    }

    #[test]
    fn intensity_bands_follow_thresholds() {
        assert_eq!(IntensityBand::for_count(0), IntensityBand::Low);
        assert_eq!(IntensityBand::for_count(10), IntensityBand::Low);
        assert_eq!(IntensityBand::for_count(11), IntensityBand::Guarded);
        assert_eq!(IntensityBand::for_count(21), IntensityBand::Elevated);
        assert_eq!(IntensityBand::for_count(51), IntensityBand::High);
        assert_eq!(IntensityBand::for_count(101), IntensityBand::Severe);
    }

    #[test]
    fn unique_sorted_drops_blanks() {
        assert_eq!(
            unique_sorted(["Theft", "", "Arson", "Theft "]),
            vec!["Arson".to_string(), "Theft".to_string()]
        );
    }
}
