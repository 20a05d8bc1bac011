use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate::{FrequencyTable, TimeOfDay};
use crate::filter::Filters;
use crate::models::{CrimeRecord, PersonRole};
use crate::table::Page;
use crate::views::{
    demographic_view, overview_view, region_view, time_view, weapon_view, DemographicSelections,
    DemographicView, OverviewView, RegionView, TimeView, WeaponView,
};

fn write_counts(output: &mut String, table: &FrequencyTable, empty: &str) {
    if table.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    for (label, count) in table.top_n(table.len()) {
        let _ = writeln!(output, "- {label}: {count}");
    }
}

fn filter_label(filter: Option<&str>) -> &str {
    filter.unwrap_or("All Crimes")
}

pub fn render_overview(view: &OverviewView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total crimes recorded: {}", view.total_crimes);
    let _ = writeln!(output, "- Most common crime type: {}", view.most_common_crime);
    let _ = writeln!(output, "- Most common premise: {}", view.most_common_premise);
    let _ = writeln!(
        output,
        "- Year with highest crime rate: {}",
        view.year_with_highest_crime
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "### Crime Types");
    write_counts(&mut output, &view.crime_type_counts, "No crimes recorded.");
    let _ = writeln!(output);
    let _ = writeln!(output, "### Premises");
    write_counts(&mut output, &view.premise_counts, "No crimes recorded.");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "### Crimes per Year ({})",
        filter_label(view.year_crime_filter.as_deref())
    );
    write_counts(&mut output, &view.year_counts, "No dated crimes recorded.");
    output
}

pub fn render_regions(view: &RegionView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Crimes by Region");
    let _ = writeln!(output, "- Most common premise: {}", view.most_common_premise);
    let _ = writeln!(
        output,
        "- Region with highest crime: {}",
        view.region_with_highest_crime
    );
    let year = view
        .filters
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "All".to_string());
    let _ = writeln!(
        output,
        "- Filters: year {year}, crime {}",
        filter_label(view.filters.crime.as_deref())
    );
    let _ = writeln!(output);
    for region in &view.regions {
        let _ = writeln!(
            output,
            "- {}: {} ({})",
            region.region, region.count, region.band
        );
    }
    output
}

pub fn render_time(view: &TimeView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Time of Occurrence");
    let _ = writeln!(output, "- Peak time of crime occurrence: {}", view.peak_time);
    let _ = writeln!(output, "- Highest crime month: {}", view.most_crime_intensive_month);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "### Crimes by Hour ({})",
        filter_label(view.hour_crime_filter.as_deref())
    );
    for (hour, count) in view.crimes_by_hour.iter().enumerate() {
        let _ = writeln!(output, "- {hour:>2}:00 {count}");
    }
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "### Time of Day ({})",
        filter_label(view.time_of_day_crime_filter.as_deref())
    );
    for bucket in [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Night] {
        let _ = writeln!(output, "- {bucket}: {}", view.time_of_day.get(bucket));
    }
    output
}

pub fn render_weapons(view: &WeaponView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Weapons");
    let [first, second, third] = &view.top_weapons;
    let _ = writeln!(output, "- Most used weapon: {first}");
    let _ = writeln!(output, "- 2nd most used weapon: {second}");
    let _ = writeln!(output, "- 3rd most used weapon: {third}");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "### Times Used ({})",
        filter_label(view.crime_filter.as_deref())
    );
    write_counts(&mut output, &view.weapon_counts, "No weapons recorded.");
    output
}

pub fn render_demographics(view: &DemographicView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Demographics");
    let _ = writeln!(output, "- Average victim age: {} years", view.average_victim_age);
    let _ = writeln!(output, "- Average suspect age: {} years", view.average_suspect_age);
    let _ = writeln!(output);

    let role = match view.role {
        PersonRole::Victim => "Victim",
        PersonRole::Suspect => "Suspect",
    };
    let _ = writeln!(
        output,
        "### {role} Sex ({})",
        filter_label(view.sex_crime_filter.as_deref())
    );
    let _ = writeln!(output, "- Male: {}", view.sex_counts.male);
    let _ = writeln!(output, "- Female: {}", view.sex_counts.female);
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "### Victim Descent ({})",
        filter_label(view.descent_crime_filter.as_deref())
    );
    let _ = writeln!(output, "- Filipino: {}", view.descent_counts.filipino);
    let _ = writeln!(output, "- Foreigner: {}", view.descent_counts.foreigner);
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "### Victim Age vs Suspect Age ({})",
        filter_label(view.scatter_crime_filter.as_deref())
    );
    if view.scatter.is_empty() {
        let _ = writeln!(output, "No records with both ages.");
    }
    for point in &view.scatter {
        let _ = writeln!(
            output,
            "- Victim Age: {} | Suspect Age: {} | Crime: {}",
            point.victim_age, point.suspect_age, point.crime
        );
    }
    output
}

pub fn render_page(page: &Page) -> String {
    let mut output = String::new();
    if page.items.is_empty() {
        let _ = writeln!(output, "No crime records match.");
    }
    for record in &page.items {
        let id = record.id.map(|id| id.to_string()).unwrap_or_default();
        let _ = writeln!(
            output,
            "{id}  {}  {}  {}  {}  victim {} {} {}  suspect {} {}  {}  {}",
            display_date(&record.date),
            record.time_occurred,
            record.region,
            record.crime,
            record.victim_age,
            record.victim_sex,
            record.victim_descent,
            record.suspect_age,
            record.suspect_sex,
            record.premise,
            record.weapons_used
        );
    }
    let _ = writeln!(
        output,
        "Page {} of {} ({} records)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );
    output
}

/// `MM/DD/YYYY` for list display; unparsable dates are shown as stored.
fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Every dashboard section in one markdown document.
pub fn build_report(records: &[CrimeRecord], generated_on: NaiveDate) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Philippine Crime Statistics Report");
    let _ = writeln!(
        output,
        "Generated on {generated_on} from {} records",
        records.len()
    );
    let sections = [
        render_overview(&overview_view(records, None)),
        render_regions(&region_view(records, &Filters::new())),
        render_time(&time_view(records, None, None)),
        render_weapons(&weapon_view(records, None)),
        render_demographics(&demographic_view(
            records,
            &DemographicSelections::default(),
        )),
    ];
    for section in sections {
        let _ = writeln!(output);
        output.push_str(&section);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CrimeRecord> {
        vec![
            CrimeRecord {
                date: "2023-05-01".to_string(),
                time_occurred: "21:30".to_string(),
                region: "Davao".to_string(),
                crime: "Theft".to_string(),
                victim_age: "30".to_string(),
                suspect_age: "25".to_string(),
                weapons_used: "Knife".to_string(),
                ..CrimeRecord::default()
            },
            CrimeRecord {
                date: "2023-05-02".to_string(),
                crime: "Theft".to_string(),
                ..CrimeRecord::default()
            },
        ]
    }

    #[test]
    fn report_contains_every_section() {
        let generated = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = build_report(&sample(), generated);
        assert!(report.starts_with("# Philippine Crime Statistics Report"));
        for heading in [
            "## Overview",
            "## Crimes by Region",
            "## Time of Occurrence",
            "## Weapons",
            "## Demographics",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("- Most common crime type: Theft"));
        assert!(report.contains("- Peak time of crime occurrence: Night 9 PM"));
        assert!(report.contains("- Average suspect age: 25.0 years"));
    }

    #[test]
    fn empty_report_uses_placeholders() {
        let generated = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = build_report(&[], generated);
        assert!(report.contains("No crimes recorded."));
        assert!(report.contains("- Average victim age: N/A years"));
        assert!(report.contains("- Most used weapon: N/A"));
    }

    #[test]
    fn list_dates_are_shown_month_first() {
        assert_eq!(display_date("2023-05-01"), "05/01/2023");
        assert_eq!(display_date("someday"), "someday");
    }
}
