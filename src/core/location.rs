//! Location business logic - storage locations and their capacity thresholds.
//!
//! Provides creation and lookup of locations, the one-to-one threshold row, and seeding
//! from `locations.toml`. Occupancy and item associations live in `core::capacity`.

use crate::{
    config::locations::Config,
    entities::{Location, LocationThreshold, location, location_threshold},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Creates a location with a unique, non-blank code.
#[instrument(skip(db))]
pub async fn create_location(
    db: &DatabaseConnection,
    code: &str,
    location_type: &str,
    active: bool,
) -> Result<location::Model> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::validation("code", "cannot be empty"));
    }

    if get_location_by_code(db, code).await?.is_some() {
        return Err(Error::Conflict {
            entity: "location",
            message: format!("code '{code}' is already in use"),
        });
    }

    let created = location::ActiveModel {
        code: Set(code.to_string()),
        location_type: Set(location_type.trim().to_string()),
        active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(location_id = created.id, "Created location '{}'", created.code);
    Ok(created)
}

/// Finds a location by its unique ID.
pub async fn get_location_by_id(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<Option<location::Model>> {
    Location::find_by_id(location_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a location by its code.
pub async fn get_location_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<location::Model>> {
    Location::find()
        .filter(location::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all locations ordered by code.
pub async fn get_all_locations(db: &DatabaseConnection) -> Result<Vec<location::Model>> {
    Location::find()
        .order_by_asc(location::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Activates or deactivates a location.
pub async fn set_location_active(
    db: &DatabaseConnection,
    location_id: i64,
    active: bool,
) -> Result<location::Model> {
    let location = Location::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("location", location_id))?;

    let mut active_model: location::ActiveModel = location.into();
    active_model.active = Set(active);
    active_model.update(db).await.map_err(Into::into)
}

/// Returns the threshold row for a location, if one is configured.
pub async fn get_location_threshold<C>(
    db: &C,
    location_id: i64,
) -> Result<Option<location_threshold::Model>>
where
    C: ConnectionTrait,
{
    LocationThreshold::find()
        .filter(location_threshold::Column::LocationId.eq(location_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates or replaces the min/max thresholds of a location.
///
/// # Errors
/// Returns an error if:
/// - The location does not exist
/// - Either bound is negative, or `min_threshold >= max_threshold`
/// - The database write fails
#[instrument(skip(db))]
pub async fn set_location_threshold(
    db: &DatabaseConnection,
    location_id: i64,
    min_threshold: i64,
    max_threshold: i64,
) -> Result<location_threshold::Model> {
    if min_threshold < 0 {
        return Err(Error::validation("min_threshold", "must not be negative"));
    }
    if max_threshold < 0 {
        return Err(Error::validation("max_threshold", "must not be negative"));
    }
    if min_threshold >= max_threshold {
        return Err(Error::validation(
            "min_threshold",
            format!("must be below max_threshold ({min_threshold} >= {max_threshold})"),
        ));
    }

    get_location_by_id(db, location_id)
        .await?
        .ok_or_else(|| Error::not_found("location", location_id))?;

    let saved = match get_location_threshold(db, location_id).await? {
        Some(existing) => {
            let mut active_model: location_threshold::ActiveModel = existing.into();
            active_model.min_threshold = Set(min_threshold);
            active_model.max_threshold = Set(max_threshold);
            active_model.update(db).await?
        }
        None => {
            location_threshold::ActiveModel {
                location_id: Set(location_id),
                min_threshold: Set(min_threshold),
                max_threshold: Set(max_threshold),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    info!(location_id, min_threshold, max_threshold, "Location thresholds set");
    Ok(saved)
}

/// Creates the locations listed in the seed config that do not exist yet.
///
/// Existing codes are left untouched, thresholds included. Returns the newly
/// created locations.
pub async fn seed_locations(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<Vec<location::Model>> {
    let mut created = Vec::new();

    for entry in &config.locations {
        if get_location_by_code(db, entry.code.trim()).await?.is_some() {
            debug!("Location '{}' already present, skipping", entry.code);
            continue;
        }

        let location = create_location(db, &entry.code, &entry.location_type, entry.active).await?;
        if let (Some(min), Some(max)) = (entry.min_threshold, entry.max_threshold) {
            set_location_threshold(db, location.id, min, max).await?;
        }
        created.push(location);
    }

    Ok(created)
}
