use tracing::{error, info};

use crate::error::Result;
use crate::models::CrimeRecord;
use crate::store::CrimeStore;
use crate::table::SortField;

/// The record set a view works from.
#[derive(Debug, Clone, Default)]
pub enum Snapshot {
    #[default]
    NotLoaded,
    Loaded(Vec<CrimeRecord>),
}

impl Snapshot {
    pub fn records(&self) -> &[CrimeRecord] {
        match self {
            Self::NotLoaded => &[],
            Self::Loaded(records) => records,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// One round-trip fetching the whole collection, ordered by `order_by` or by
/// date when none is given. First-encountered ties in the views follow this
/// order.
pub async fn try_load_all(
    store: &dyn CrimeStore,
    order_by: Option<SortField>,
) -> Result<Vec<CrimeRecord>> {
    let records = store.get_all(Some(order_by.unwrap_or_default())).await?;
    info!(count = records.len(), "loaded crime records");
    Ok(records)
}

/// Like [`try_load_all`], but a failed fetch is logged and leaves the
/// snapshot empty instead of failing the caller.
pub async fn load_all(store: &dyn CrimeStore, order_by: Option<SortField>) -> Snapshot {
    match try_load_all(store, order_by).await {
        Ok(records) => Snapshot::Loaded(records),
        Err(e) => {
            error!("Error fetching crime data: {e}");
            Snapshot::NotLoaded
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::aggregate::frequency_of;
    use crate::error::DashboardError;
    use crate::models::UNKNOWN_CRIME;
    use crate::store::memory::MemoryStore;

    struct Unreachable;

    #[async_trait]
    impl CrimeStore for Unreachable {
        async fn insert_one(&self, _record: &CrimeRecord) -> Result<Uuid> {
            Err(DashboardError::Storage(sqlx::Error::PoolTimedOut))
        }

        async fn insert_if_absent(&self, _record: &CrimeRecord) -> Result<bool> {
            Err(DashboardError::Storage(sqlx::Error::PoolTimedOut))
        }

        async fn get_all(&self, _order_by: Option<SortField>) -> Result<Vec<CrimeRecord>> {
            Err(DashboardError::Storage(sqlx::Error::PoolTimedOut))
        }

        async fn update_one(&self, _id: Uuid, _record: &CrimeRecord) -> Result<()> {
            Err(DashboardError::Storage(sqlx::Error::PoolTimedOut))
        }

        async fn delete_one(&self, _id: Uuid) -> Result<bool> {
            Err(DashboardError::Storage(sqlx::Error::PoolTimedOut))
        }
    }

    fn dated(date: &str) -> CrimeRecord {
        CrimeRecord {
            date: date.to_string(),
            ..CrimeRecord::default()
        }
    }

    #[tokio::test]
    async fn loads_in_date_order() {
        let store = MemoryStore::new();
        for date in ["2023-06-01", "2021-01-09", "2022-12-31"] {
            store.insert_one(&dated(date)).await.unwrap();
        }

        let snapshot = load_all(&store, None).await;
        assert!(snapshot.is_loaded());
        let dates: Vec<&str> = snapshot.records().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2021-01-09", "2022-12-31", "2023-06-01"]);
        assert!(snapshot.records().iter().all(|r| r.id.is_some()));
    }

    #[tokio::test]
    async fn mode_ties_follow_date_order_not_insertion_order() {
        let store = MemoryStore::new();
        for (date, crime) in [("2023-06-01", "Arson"), ("2021-01-09", "Theft")] {
            let record = CrimeRecord {
                crime: crime.to_string(),
                ..dated(date)
            };
            store.insert_one(&record).await.unwrap();
        }

        let records = try_load_all(&store, None).await.unwrap();
        let crimes = frequency_of(&records, UNKNOWN_CRIME, |r| &r.crime);
        assert_eq!(crimes.mode(), Some("Theft"));
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_snapshot() {
        let snapshot = load_all(&Unreachable, None).await;
        assert!(!snapshot.is_loaded());
        assert!(snapshot.records().is_empty());
        assert!(try_load_all(&Unreachable, None).await.is_err());
    }
}
