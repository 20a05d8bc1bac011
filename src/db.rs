use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{DashboardError, Result};
use crate::models::CrimeRecord;
use crate::store::CrimeStore;
use crate::table::SortField;

const SELECT_COLUMNS: &str = "id, date, time_occurred, region, crime, victim_age, victim_sex, \
     victim_descent, suspect_age, suspect_sex, premise, weapons_used";

/// Postgres-backed crime record collection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init_db(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// ORDER BY terms matching [`SortField::compare`]. Column names come from a
/// closed enum, never from user text.
fn order_clause(field: SortField) -> String {
    let column = field.column();
    match field {
        SortField::VictimAge | SortField::SuspectAge => format!(
            "CASE WHEN btrim({column}) ~ '^[0-9]+$' THEN btrim({column})::numeric END \
             ASC NULLS FIRST"
        ),
        _ => format!("lower(btrim({column})) ASC, btrim({column}) ASC"),
    }
}

fn record_from_row(row: &PgRow) -> CrimeRecord {
    CrimeRecord {
        id: Some(row.get("id")),
        date: row.get("date"),
        time_occurred: row.get("time_occurred"),
        region: row.get("region"),
        crime: row.get("crime"),
        victim_age: row.get("victim_age"),
        victim_sex: row.get("victim_sex"),
        victim_descent: row.get("victim_descent"),
        suspect_age: row.get("suspect_age"),
        suspect_sex: row.get("suspect_sex"),
        premise: row.get("premise"),
        weapons_used: row.get("weapons_used"),
    }
}

#[async_trait]
impl CrimeStore for PgStore {
    async fn insert_one(&self, record: &CrimeRecord) -> Result<Uuid> {
        let id: Uuid = sqlx::query(
            r#"
            INSERT INTO crime_dashboard.crime_records
            (id, date, time_occurred, region, crime, victim_age, victim_sex,
             victim_descent, suspect_age, suspect_sex, premise, weapons_used)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.date)
        .bind(&record.time_occurred)
        .bind(&record.region)
        .bind(&record.crime)
        .bind(&record.victim_age)
        .bind(&record.victim_sex)
        .bind(&record.victim_descent)
        .bind(&record.suspect_age)
        .bind(&record.suspect_sex)
        .bind(&record.premise)
        .bind(&record.weapons_used)
        .fetch_one(&self.pool)
        .await?
        .get("id");

        debug!(%id, crime = %record.crime, "inserted crime record");
        Ok(id)
    }

    async fn insert_if_absent(&self, record: &CrimeRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO crime_dashboard.crime_records
            (id, date, time_occurred, region, crime, victim_age, victim_sex,
             victim_descent, suspect_age, suspect_sex, premise, weapons_used)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id.unwrap_or_else(Uuid::new_v4))
        .bind(&record.date)
        .bind(&record.time_occurred)
        .bind(&record.region)
        .bind(&record.crime)
        .bind(&record.victim_age)
        .bind(&record.victim_sex)
        .bind(&record.victim_descent)
        .bind(&record.suspect_age)
        .bind(&record.suspect_sex)
        .bind(&record.premise)
        .bind(&record.weapons_used)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_all(&self, order_by: Option<SortField>) -> Result<Vec<CrimeRecord>> {
        let mut query = format!("SELECT {SELECT_COLUMNS} FROM crime_dashboard.crime_records");

        if let Some(field) = order_by {
            query.push_str(&format!(" ORDER BY {}, created_at ASC", order_clause(field)));
        }

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn update_one(&self, id: Uuid, record: &CrimeRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE crime_dashboard.crime_records
            SET date = $2, time_occurred = $3, region = $4, crime = $5,
                victim_age = $6, victim_sex = $7, victim_descent = $8,
                suspect_age = $9, suspect_sex = $10, premise = $11,
                weapons_used = $12
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&record.date)
        .bind(&record.time_occurred)
        .bind(&record.region)
        .bind(&record.crime)
        .bind(&record.victim_age)
        .bind(&record.victim_sex)
        .bind(&record.victim_descent)
        .bind(&record.suspect_age)
        .bind(&record.suspect_sex)
        .bind(&record.premise)
        .bind(&record.weapons_used)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DashboardError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_one(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM crime_dashboard.crime_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Insert the sample records. Their ids are fixed, so running this again
/// leaves existing rows alone. Returns how many rows were new.
pub async fn seed(store: &dyn CrimeStore) -> Result<usize> {
    let mut inserted = 0;
    for record in seed_records() {
        if store.insert_if_absent(&record).await? {
            inserted += 1;
        }
    }
    debug!(inserted, "seed records written");
    Ok(inserted)
}

/// A small, realistic sample spread over several regions, hours and years.
pub fn seed_records() -> Vec<CrimeRecord> {
    let rows = [
        (0x3d7f5d6f_24f7_4e8e_8b4b_3e7e44b4a7b2, "2023-01-14", "08:30", "National Capital Region", "Theft", "34", "Female", "Filipino", "22", "Male", "Market", "No Weapon"),
        (0x0c22f1f1_9184_4fd4_9b21_28c68a6a89dc, "2023-02-03", "21:15", "Central Visayas", "Robbery", "45", "Male", "Filipino", "29", "Male", "Street", "Knife"),
        (0xd5a0a1a2_2a3c_44c2_8f73_60b7897a9dd2, "2023-02-18", "14:05", "Davao", "Cybercrime", "52", "Female", "Foreigner", "31", "Male", "Home", "Computer"),
        (0x7b1e4c09_5d2a_4f61_9c3e_1a8f2b6d4e57, "2023-05-01", "23:40", "Calabarzon", "Murder", "27", "Male", "Filipino", "35", "Male", "Bar", "Firearm"),
        (0x9e4a2f70_0b6c_4d18_a5f2_6c3d8e1b7a40, "2023-05-22", "10:10", "Western Visayas", "Fraud", "61", "Female", "Filipino", "44", "Female", "Office", "Computer"),
        (0x2f6c8d13_7e9a_4b05_8d21_f4a6c0e3b918, "2024-03-09", "02:20", "National Capital Region", "Hit and Run", "19", "Male", "Filipino", "", "Male", "Highway", "Vehicle"),
        (0x5a3b9e26_c1d4_47f8_b06e_2d9f7a4c8e31, "2024-06-30", "17:45", "Bicol", "Physical Injury", "38", "Female", "Filipino", "40", "Male", "Home", "Bodily Force"),
        (0xc8d07f45_3a2e_4e96_9b1c_7e5a0d2f6b83, "2024-07-12", "12:00", "Northern Mindanao", "Illegal Drugs", "", "Male", "Filipino", "26", "Male", "Park", "Drugs"),
    ];

    rows.into_iter()
        .map(
            |(
                id,
                date,
                time_occurred,
                region,
                crime,
                victim_age,
                victim_sex,
                victim_descent,
                suspect_age,
                suspect_sex,
                premise,
                weapons_used,
            )| CrimeRecord {
                id: Some(Uuid::from_u128(id)),
                date: date.to_string(),
                time_occurred: time_occurred.to_string(),
                region: region.to_string(),
                crime: crime.to_string(),
                victim_age: victim_age.to_string(),
                victim_sex: victim_sex.to_string(),
                victim_descent: victim_descent.to_string(),
                suspect_age: suspect_age.to_string(),
                suspect_sex: suspect_sex.to_string(),
                premise: premise.to_string(),
                weapons_used: weapons_used.to_string(),
            },
        )
        .collect()
}
