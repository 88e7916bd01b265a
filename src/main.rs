use dotenvy::dotenv;
use std::path::Path;
use stock_ledger::{
    config::{database, locations},
    core::{capacity, location},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const LOCATIONS_FILE: &str = "locations.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; DATABASE_URL may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    // The default database URL lives under ./data
    if let Err(e) = std::fs::create_dir_all("data") {
        warn!("Could not create data directory: {}", e);
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed locations from locations.toml when present
    if Path::new(LOCATIONS_FILE).exists() {
        let config = locations::load_default_config()
            .inspect_err(|e| error!("Failed to load {}: {}", LOCATIONS_FILE, e))?;
        let created = location::seed_locations(&db, &config).await?;
        info!(created = created.len(), "Seeded locations from {}", LOCATIONS_FILE);
    } else {
        warn!("{} not found, skipping location seeding", LOCATIONS_FILE);
    }

    // 5. Report occupancy per location
    for found in location::get_all_locations(&db).await? {
        let report = capacity::get_location_occupancy(&db, found.id).await?;
        info!(
            code = %found.code,
            active = found.active,
            occupancy = report.current_occupancy,
            max_capacity = ?report.max_capacity,
            percentage = format!("{:.1}", report.occupancy_percentage),
            above_min = report.is_above_threshold,
            "Location occupancy"
        );
    }

    Ok(())
}
