use serde::Serialize;
use strum::IntoEnumIterator;

use crate::aggregate::{
    self, average_of, bucket_by_hour, bucket_by_month, bucket_by_time_of_day, bucket_by_year,
    count_by_role_sex, count_descent, frequency_of, peak_hour, peak_time_label, scatter_pairs,
    unique_sorted, Average, DescentCounts, FrequencyTable, IntensityBand, ScatterPoint, SexCounts,
    TimeOfDayCounts,
};
use crate::filter::Filters;
use crate::models::{
    CrimeRecord, PersonRole, Region, UNKNOWN_CRIME, UNKNOWN_PREMISE, UNKNOWN_REGION,
    UNKNOWN_WEAPON, UNKNOWN_YEAR,
};

const NO_DATA: &str = "No Data";
const NOT_APPLICABLE: &str = "N/A";

fn crime_only(crime: Option<&str>) -> Filters {
    Filters::new().crime(crime)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub total_crimes: usize,
    pub most_common_crime: String,
    pub most_common_premise: String,
    pub year_with_highest_crime: String,
    pub crime_type_counts: FrequencyTable,
    pub premise_counts: FrequencyTable,
    /// Per-year counts, restricted to `year_crime_filter` when set. Records
    /// without a usable date are left out.
    pub year_counts: FrequencyTable,
    pub year_crime_filter: Option<String>,
}

pub fn overview_view(records: &[CrimeRecord], year_crime: Option<&str>) -> OverviewView {
    let crime_counts = frequency_of(records, UNKNOWN_CRIME, |r| &r.crime);
    let premise_counts = frequency_of(records, UNKNOWN_PREMISE, |r| &r.premise);
    let all_years = bucket_by_year(records);

    let filters = crime_only(year_crime);
    let mut year_counts = FrequencyTable::new();
    for (year, count) in bucket_by_year(&filters.apply(records)).entries() {
        if year != UNKNOWN_YEAR {
            year_counts.add(year, *count);
        }
    }

    OverviewView {
        total_crimes: records.len(),
        most_common_crime: crime_counts.mode().unwrap_or(NO_DATA).to_string(),
        most_common_premise: premise_counts.mode().unwrap_or(NO_DATA).to_string(),
        year_with_highest_crime: all_years
            .mode_excluding(UNKNOWN_YEAR)
            .unwrap_or(NO_DATA)
            .to_string(),
        crime_type_counts: crime_counts,
        premise_counts,
        year_counts,
        year_crime_filter: filters.crime,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
    pub band: IntensityBand,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionView {
    pub crime_types: Vec<String>,
    pub years: Vec<String>,
    pub filters: Filters,
    pub regions: Vec<RegionCount>,
    pub most_common_premise: String,
    pub region_with_highest_crime: String,
}

/// Choropleth data: every known region appears, even with zero incidents.
pub fn region_view(records: &[CrimeRecord], filters: &Filters) -> RegionView {
    let matching = filters.apply(records);
    let counts = frequency_of(&matching, UNKNOWN_REGION, |r| &r.region);

    let mut regions: Vec<RegionCount> = Region::iter()
        .map(|region| region.to_string())
        .chain(
            counts
                .entries()
                .iter()
                .map(|(name, _)| name.clone())
                .filter(|name| name.parse::<Region>().is_err()),
        )
        .map(|region| {
            let count = counts.get(&region);
            RegionCount {
                region,
                count,
                band: IntensityBand::for_count(count),
            }
        })
        .collect();
    regions.sort_by(|a, b| b.count.cmp(&a.count));

    let premises = frequency_of(records, UNKNOWN_PREMISE, |r| &r.premise);
    let all_regions = frequency_of(records, UNKNOWN_REGION, |r| &r.region);

    RegionView {
        crime_types: unique_sorted(records.iter().map(|r| &r.crime)),
        years: unique_sorted(records.iter().filter_map(aggregate::year_of).map(|y| y.to_string())),
        filters: filters.clone(),
        regions,
        most_common_premise: premises
            .mode_excluding(UNKNOWN_PREMISE)
            .unwrap_or(NOT_APPLICABLE)
            .to_string(),
        region_with_highest_crime: all_regions
            .mode_excluding(UNKNOWN_REGION)
            .unwrap_or(NOT_APPLICABLE)
            .to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeView {
    pub crime_types: Vec<String>,
    pub peak_time: String,
    pub most_crime_intensive_month: String,
    pub hour_crime_filter: Option<String>,
    pub crimes_by_hour: [usize; 24],
    pub time_of_day_crime_filter: Option<String>,
    pub time_of_day: TimeOfDayCounts,
}

pub fn time_view(
    records: &[CrimeRecord],
    hour_crime: Option<&str>,
    time_of_day_crime: Option<&str>,
) -> TimeView {
    let all_hours = bucket_by_hour(records);
    let hour_filters = crime_only(hour_crime);
    let tod_filters = crime_only(time_of_day_crime);

    TimeView {
        crime_types: unique_sorted(records.iter().map(|r| &r.crime)),
        peak_time: peak_hour(&all_hours)
            .map(peak_time_label)
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        most_crime_intensive_month: bucket_by_month(records)
            .mode()
            .unwrap_or(NOT_APPLICABLE)
            .to_string(),
        crimes_by_hour: bucket_by_hour(&hour_filters.apply(records)),
        hour_crime_filter: hour_filters.crime,
        time_of_day: bucket_by_time_of_day(&tod_filters.apply(records)),
        time_of_day_crime_filter: tod_filters.crime,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponView {
    pub crime_types: Vec<String>,
    /// Most, second and third most used weapon; `N/A` where there is none.
    pub top_weapons: [String; 3],
    pub crime_filter: Option<String>,
    pub weapon_counts: FrequencyTable,
}

pub fn weapon_view(records: &[CrimeRecord], crime: Option<&str>) -> WeaponView {
    let overall = frequency_of(records, UNKNOWN_WEAPON, |r| &r.weapons_used);
    let top = overall.top_n(3);
    let top_weapons = std::array::from_fn(|i| {
        top.get(i)
            .map(|(weapon, _)| weapon.clone())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    });

    let filters = crime_only(crime);
    let weapon_counts = weapon_counts_for(records, filters.crime.as_deref());

    WeaponView {
        crime_types: unique_sorted(records.iter().map(|r| {
            if r.crime.trim().is_empty() {
                UNKNOWN_CRIME
            } else {
                r.crime.as_str()
            }
        })),
        top_weapons,
        crime_filter: filters.crime,
        weapon_counts,
    }
}

/// Weapon counts for one crime type (absent crime counts as `Unknown Crime`),
/// or across all crimes.
fn weapon_counts_for(records: &[CrimeRecord], crime: Option<&str>) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for record in records {
        let record_crime = match record.crime.trim() {
            "" => UNKNOWN_CRIME,
            other => other,
        };
        if crime.is_some_and(|wanted| wanted != record_crime) {
            continue;
        }
        let weapon = match record.weapons_used.trim() {
            "" => UNKNOWN_WEAPON,
            other => other,
        };
        table.increment(weapon);
    }
    table
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicView {
    pub crime_types: Vec<String>,
    pub average_victim_age: Average,
    pub average_suspect_age: Average,
    pub scatter_crime_filter: Option<String>,
    pub scatter: Vec<ScatterPoint>,
    pub role: PersonRole,
    pub sex_crime_filter: Option<String>,
    pub sex_counts: SexCounts,
    pub descent_crime_filter: Option<String>,
    pub descent_counts: DescentCounts,
}

#[derive(Debug, Clone, Default)]
pub struct DemographicSelections<'a> {
    pub scatter_crime: Option<&'a str>,
    pub role: PersonRole,
    pub sex_crime: Option<&'a str>,
    pub descent_crime: Option<&'a str>,
}

pub fn demographic_view(
    records: &[CrimeRecord],
    selections: &DemographicSelections<'_>,
) -> DemographicView {
    let scatter_filters = crime_only(selections.scatter_crime);
    let sex_filters = crime_only(selections.sex_crime);
    let descent_filters = crime_only(selections.descent_crime);

    DemographicView {
        crime_types: unique_sorted(records.iter().map(|r| &r.crime)),
        average_victim_age: average_of(records, CrimeRecord::victim_age),
        average_suspect_age: average_of(records, CrimeRecord::suspect_age),
        scatter: scatter_pairs(&scatter_filters.apply(records)),
        scatter_crime_filter: scatter_filters.crime,
        role: selections.role,
        sex_counts: count_by_role_sex(&sex_filters.apply(records), selections.role),
        sex_crime_filter: sex_filters.crime,
        descent_counts: count_descent(&descent_filters.apply(records)),
        descent_crime_filter: descent_filters.crime,
    }
}
