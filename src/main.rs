use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod aggregate;
mod config;
mod db;
mod error;
mod filter;
mod import;
mod loader;
mod models;
mod report;
mod store;
mod table;
mod views;

use config::Config;
use db::PgStore;
use error::DashboardError;
use filter::Filters;
use loader::Snapshot;
use models::{
    option_names, CrimeRecord, CrimeType, Descent, PersonRole, Premise, Region, Sex, Weapon,
};
use store::CrimeStore;
use table::{SortDirection, SortField, TableQuery};
use views::DemographicSelections;

#[derive(Parser)]
#[command(name = "crime-dashboard")]
#[command(about = "Record and summarize Philippine regional crime statistics", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct RecordArgs {
    /// Date of the incident (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    /// Time of the incident (HH:MM)
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    crime: Option<String>,
    #[arg(long)]
    victim_age: Option<String>,
    #[arg(long)]
    victim_sex: Option<String>,
    #[arg(long)]
    victim_descent: Option<String>,
    #[arg(long)]
    suspect_age: Option<String>,
    #[arg(long)]
    suspect_sex: Option<String>,
    #[arg(long)]
    premise: Option<String>,
    #[arg(long)]
    weapons_used: Option<String>,
}

impl RecordArgs {
    /// Overlay the provided fields on `base`, leaving the rest untouched.
    fn apply_to(self, base: CrimeRecord) -> CrimeRecord {
        CrimeRecord {
            id: base.id,
            date: self.date.unwrap_or(base.date),
            time_occurred: self.time.unwrap_or(base.time_occurred),
            region: self.region.unwrap_or(base.region),
            crime: self.crime.unwrap_or(base.crime),
            victim_age: self.victim_age.unwrap_or(base.victim_age),
            victim_sex: self.victim_sex.unwrap_or(base.victim_sex),
            victim_descent: self.victim_descent.unwrap_or(base.victim_descent),
            suspect_age: self.suspect_age.unwrap_or(base.suspect_age),
            suspect_sex: self.suspect_sex.unwrap_or(base.suspect_sex),
            premise: self.premise.unwrap_or(base.premise),
            weapons_used: self.weapons_used.unwrap_or(base.weapons_used),
        }
        .trimmed()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Add a single crime record
    Add {
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Import crime records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Search, sort and page through recorded crimes
    List {
        /// Matches crime, region or year
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        crime: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        premise: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        #[arg(long, value_enum, default_value_t = SortDirection::Asc)]
        direction: SortDirection,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        json: bool,
    },
    /// Replace the fields of an existing record
    Edit {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Delete a record
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Print the accepted values of every enumerated field
    Options,
    /// Totals and most common crime, premise and year
    Overview {
        /// Restrict the per-year counts to one crime type
        #[arg(long)]
        crime: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Crime counts per region
    Regions {
        #[arg(long)]
        crime: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        json: bool,
    },
    /// Crimes by hour, time of day and month
    Time {
        #[arg(long)]
        hour_crime: Option<String>,
        #[arg(long)]
        time_of_day_crime: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Most used weapons
    Weapons {
        #[arg(long)]
        crime: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Ages, sex and descent of victims and suspects
    Demographics {
        #[arg(long)]
        scatter_crime: Option<String>,
        #[arg(long, value_enum, default_value_t = PersonRole::Victim)]
        role: PersonRole,
        #[arg(long)]
        sex_crime: Option<String>,
        #[arg(long)]
        descent_crime: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report of every view
    Report {
        #[arg(long, default_value = "crime-report.md")]
        out: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_view<T: Serialize>(
    view: &T,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", render(view));
    }
    Ok(())
}

fn warn_unknown_options(record: &CrimeRecord) {
    for (field, value) in record.unknown_options() {
        warn!(field, value, "value outside the known option set");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Options => {
            print_options();
            Ok(())
        }
        command => {
            let config =
                Config::load(cli.config.as_deref()).context("failed to load configuration")?;
            debug!(
                page_size = config.table.page_size,
                max_connections = config.database.max_connections,
                "configuration loaded"
            );
            let database_url = config.database_url()?;

            let store = PgStore::connect(&config.database, database_url)
                .await
                .context("failed to connect to Postgres")?;
            run(command, &config, &store).await
        }
    }
}

/// Load the snapshot a view renders from.
async fn load_snapshot(store: &dyn CrimeStore) -> Snapshot {
    let snapshot = loader::load_all(store, None).await;
    if !snapshot.is_loaded() {
        warn!("no crime data loaded, showing an empty view");
    }
    snapshot
}

/// Overlay the given fields on the stored record and replace it.
async fn edit_record(
    store: &dyn CrimeStore,
    id: Uuid,
    args: RecordArgs,
) -> error::Result<CrimeRecord> {
    let existing = loader::try_load_all(store, None)
        .await?
        .into_iter()
        .find(|r| r.id == Some(id))
        .ok_or(DashboardError::NotFound(id))?;
    let updated = args.apply_to(existing);
    warn_unknown_options(&updated);
    store.update_one(id, &updated).await?;
    Ok(updated)
}

async fn run(command: Commands, config: &Config, store: &PgStore) -> anyhow::Result<()> {
    match command {
        Commands::InitDb => {
            store.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(store).await.context("Error seeding data")?;
            println!("Seed data inserted ({inserted} new records).");
        }
        Commands::Add { record } => {
            let record = record.apply_to(CrimeRecord::default());
            warn_unknown_options(&record);
            let id = store.insert_one(&record).await.context("Error adding record")?;
            println!("Data added successfully! ({id})");
        }
        Commands::Import { csv } => {
            let records = import::read_csv_file(&csv)
                .with_context(|| format!("Please upload a valid CSV file: {}", csv.display()))?;
            let outcome = import::insert_batch(store, &records).await;

            if outcome.is_complete() {
                println!(
                    "CSV data uploaded successfully! Inserted {} records from {}.",
                    outcome.inserted.len(),
                    csv.display()
                );
            } else {
                anyhow::bail!(
                    "Failed to upload CSV data: {} of {} rows failed ({} inserted and kept).",
                    outcome.failed.len(),
                    records.len(),
                    outcome.inserted.len()
                );
            }
        }
        Commands::List {
            search,
            crime,
            region,
            premise,
            year,
            sort,
            direction,
            page,
            json,
        } => {
            let snapshot = load_snapshot(store).await;
            let query = TableQuery {
                filters: Filters::new()
                    .search(search.as_deref())
                    .crime(crime.as_deref())
                    .region(region.as_deref())
                    .premise(premise.as_deref())
                    .year(year),
                sort_field: sort.unwrap_or(config.table.default_sort),
                direction,
                page,
                page_size: config.table.page_size,
            };
            let page = table::build_page(snapshot.records(), &query);
            print_view(&page, json, report::render_page)?;
        }
        Commands::Edit { id, record } => {
            edit_record(store, id, record)
                .await
                .context("Error updating record")?;
            println!("Data updated successfully!");
        }
        Commands::Delete { id } => {
            if store.delete_one(id).await.context("Error deleting record")? {
                println!("Data deleted successfully!");
            } else {
                println!("No record with id {id}.");
            }
        }
        Commands::Overview { crime, json } => {
            let snapshot = load_snapshot(store).await;
            let view = views::overview_view(snapshot.records(), crime.as_deref());
            print_view(&view, json, report::render_overview)?;
        }
        Commands::Regions { crime, year, json } => {
            let snapshot = load_snapshot(store).await;
            let filters = Filters::new().crime(crime.as_deref()).year(year);
            let view = views::region_view(snapshot.records(), &filters);
            print_view(&view, json, report::render_regions)?;
        }
        Commands::Time {
            hour_crime,
            time_of_day_crime,
            json,
        } => {
            let snapshot = load_snapshot(store).await;
            let view = views::time_view(
                snapshot.records(),
                hour_crime.as_deref(),
                time_of_day_crime.as_deref(),
            );
            print_view(&view, json, report::render_time)?;
        }
        Commands::Weapons { crime, json } => {
            let snapshot = load_snapshot(store).await;
            let view = views::weapon_view(snapshot.records(), crime.as_deref());
            print_view(&view, json, report::render_weapons)?;
        }
        Commands::Demographics {
            scatter_crime,
            role,
            sex_crime,
            descent_crime,
            json,
        } => {
            let snapshot = load_snapshot(store).await;
            let selections = DemographicSelections {
                scatter_crime: scatter_crime.as_deref(),
                role,
                sex_crime: sex_crime.as_deref(),
                descent_crime: descent_crime.as_deref(),
            };
            let view = views::demographic_view(snapshot.records(), &selections);
            print_view(&view, json, report::render_demographics)?;
        }
        Commands::Report { out } => {
            let records = loader::try_load_all(store, None).await?;
            let report = report::build_report(&records, chrono::Local::now().date_naive());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Options => print_options(),
    }

    Ok(())
}

fn print_options() {
    let sets = [
        ("Region", option_names::<Region>()),
        ("Crime", option_names::<CrimeType>()),
        ("Victim/Suspect Sex", option_names::<Sex>()),
        ("Victim Descent", option_names::<Descent>()),
        ("Premise", option_names::<Premise>()),
        ("Weapons Used", option_names::<Weapon>()),
    ];
    for (field, values) in sets {
        println!("{field}:");
        for value in values {
            println!("  {value}");
        }
    }
}
