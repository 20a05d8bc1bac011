use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::CrimeRecord;
use crate::table::SortField;

#[async_trait]
pub trait CrimeStore: Send + Sync {
    async fn insert_one(&self, record: &CrimeRecord) -> Result<Uuid>;

    /// Persist a record under its own id. Returns `false` when that id is
    /// already taken and nothing was written.
    async fn insert_if_absent(&self, record: &CrimeRecord) -> Result<bool>;

    /// Every record with its id, ordered by `order_by` ascending when given.
    async fn get_all(&self, order_by: Option<SortField>) -> Result<Vec<CrimeRecord>>;

    async fn update_one(&self, id: Uuid, record: &CrimeRecord) -> Result<()>;

    /// Returns whether a record was removed.
    async fn delete_one(&self, id: Uuid) -> Result<bool>;
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::error::DashboardError;
    use crate::table::{sort_records, SortDirection};

    /// In-process store for tests. Inserts whose `crime` field is listed in
    /// `reject_crimes` fail with a storage error.
    #[derive(Default)]
    pub struct MemoryStore {
        records: Mutex<Vec<CrimeRecord>>,
        reject_crimes: HashSet<String>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting(crimes: &[&str]) -> Self {
            Self {
                records: Mutex::default(),
                reject_crimes: crimes.iter().map(|c| c.to_string()).collect(),
            }
        }

        pub fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CrimeStore for MemoryStore {
        async fn insert_one(&self, record: &CrimeRecord) -> Result<Uuid> {
            if self.reject_crimes.contains(&record.crime) {
                return Err(DashboardError::Storage(sqlx::Error::Protocol(format!(
                    "insert rejected for {}",
                    record.crime
                ))));
            }
            let id = Uuid::new_v4();
            let mut stored = record.clone();
            stored.id = Some(id);
            self.records.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn insert_if_absent(&self, record: &CrimeRecord) -> Result<bool> {
            let id = record.id.unwrap_or_else(Uuid::new_v4);
            let mut records = self.records.lock().unwrap();
            if records.iter().any(|r| r.id == Some(id)) {
                return Ok(false);
            }
            records.push(CrimeRecord {
                id: Some(id),
                ..record.clone()
            });
            Ok(true)
        }

        async fn get_all(&self, order_by: Option<SortField>) -> Result<Vec<CrimeRecord>> {
            let mut records = self.records.lock().unwrap().clone();
            if let Some(field) = order_by {
                sort_records(&mut records, field, SortDirection::Asc);
            }
            Ok(records)
        }

        async fn update_one(&self, id: Uuid, record: &CrimeRecord) -> Result<()> {
            let mut records = self.records.lock().unwrap();
            let existing = records
                .iter_mut()
                .find(|r| r.id == Some(id))
                .ok_or(DashboardError::NotFound(id))?;
            *existing = CrimeRecord {
                id: Some(id),
                ..record.clone()
            };
            Ok(())
        }

        async fn delete_one(&self, id: Uuid) -> Result<bool> {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != Some(id));
            Ok(records.len() < before)
        }
    }
}
