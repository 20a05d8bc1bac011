//! Record list: search, sort and pagination.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::filter::Filters;
use crate::models::CrimeRecord;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Date,
    TimeOccurred,
    Region,
    Crime,
    VictimAge,
    VictimSex,
    VictimDescent,
    SuspectAge,
    SuspectSex,
    Premise,
    WeaponsUsed,
}

impl SortField {
    /// Column backing this field in the `crime_records` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::TimeOccurred => "time_occurred",
            Self::Region => "region",
            Self::Crime => "crime",
            Self::VictimAge => "victim_age",
            Self::VictimSex => "victim_sex",
            Self::VictimDescent => "victim_descent",
            Self::SuspectAge => "suspect_age",
            Self::SuspectSex => "suspect_sex",
            Self::Premise => "premise",
            Self::WeaponsUsed => "weapons_used",
        }
    }

    fn text(self, record: &CrimeRecord) -> &str {
        match self {
            Self::Date => &record.date,
            Self::TimeOccurred => &record.time_occurred,
            Self::Region => &record.region,
            Self::Crime => &record.crime,
            Self::VictimAge => &record.victim_age,
            Self::VictimSex => &record.victim_sex,
            Self::VictimDescent => &record.victim_descent,
            Self::SuspectAge => &record.suspect_age,
            Self::SuspectSex => &record.suspect_sex,
            Self::Premise => &record.premise,
            Self::WeaponsUsed => &record.weapons_used,
        }
    }

    /// Ascending comparison of two records on this field.
    pub fn compare(self, a: &CrimeRecord, b: &CrimeRecord) -> Ordering {
        match self {
            // Missing ages sort before every present age.
            Self::VictimAge => a.victim_age().cmp(&b.victim_age()),
            Self::SuspectAge => a.suspect_age().cmp(&b.suspect_age()),
            _ => text_cmp(self.text(a), self.text(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Case-folded comparison with a byte-wise tiebreak so the order is total.
fn text_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort: records with equal keys keep their relative order in both
/// directions.
pub fn sort_records(records: &mut [CrimeRecord], field: SortField, direction: SortDirection) {
    match direction {
        SortDirection::Asc => records.sort_by(|a, b| field.compare(a, b)),
        SortDirection::Desc => records.sort_by(|a, b| field.compare(b, a)),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<CrimeRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out 1-based `page` of `page_size` items.
pub fn paginate(records: &[CrimeRecord], page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_pages = records.len().div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let items = records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items: records.len(),
    }
}

#[derive(Debug, Clone)]
pub struct TableQuery {
    pub filters: Filters,
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
}

/// Filter, sort and paginate the loaded records for the list view.
pub fn build_page(records: &[CrimeRecord], query: &TableQuery) -> Page {
    let mut rows = query.filters.apply(records);
    sort_records(&mut rows, query.sort_field, query.direction);
    paginate(&rows, query.page, query.page_size)
}
