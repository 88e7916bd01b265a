//! Location capacity engine - occupancy, thresholds and item↔location associations.
//!
//! Occupancy is the cumulative sum of every ledger quantity ever posted against a
//! location, whatever its type. It measures recorded throughput, not the stock
//! physically present, and the capacity checks below are defined on that figure.

use crate::{
    core::{
        ledger::{self, NewTransaction},
        location::get_location_threshold,
    },
    entities::{
        InventoryLocation, Item, Location, Transaction, TransactionType, User,
        inventory_location, item, location, location_threshold, transaction,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Read-only view of a location's capacity configuration and current occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationOccupancy {
    /// Location being reported on
    pub location_id: i64,
    /// Configured maximum, if any
    pub max_capacity: Option<i64>,
    /// Configured minimum, if any
    pub min_threshold: Option<i64>,
    /// Cumulative ledger quantity posted against the location
    pub current_occupancy: i64,
    /// `current_occupancy / max_capacity * 100`, or 0 without a maximum
    pub occupancy_percentage: f64,
    /// Whether occupancy is at or above the minimum (a missing minimum counts as 0)
    pub is_above_threshold: bool,
}

/// Sum of all ledger quantities ever posted against `location_id`.
pub async fn occupancy<C>(db: &C, location_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = Transaction::find()
        .select_only()
        .column_as(Expr::col(transaction::Column::Quantity).sum(), "occupancy")
        .filter(transaction::Column::LocationId.eq(location_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Capacity check shared by [`can_add_item`] and [`add_item_to_location`].
///
/// One more unit must fit under the maximum; the unit is a flat 1 whatever quantity the
/// caller intends to add. Without a threshold row there is no maximum.
async fn check_room<C>(db: &C, location_id: i64) -> Result<RoomCheck>
where
    C: ConnectionTrait,
{
    let occupancy = occupancy(db, location_id).await?;
    let threshold = get_location_threshold(db, location_id).await?;
    // occupancy + 1 <= max
    let has_room = threshold
        .as_ref()
        .is_none_or(|bounds| occupancy < bounds.max_threshold);

    Ok(RoomCheck {
        occupancy,
        threshold,
        has_room,
    })
}

struct RoomCheck {
    occupancy: i64,
    threshold: Option<location_threshold::Model>,
    has_room: bool,
}

async fn find_location<C: ConnectionTrait>(db: &C, location_id: i64) -> Result<location::Model> {
    Location::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("location", location_id))
}

async fn find_item<C: ConnectionTrait>(db: &C, item_id: i64) -> Result<item::Model> {
    Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("item", item_id))
}

async fn find_association<C>(
    db: &C,
    location_id: i64,
    item_id: i64,
) -> Result<Option<inventory_location::Model>>
where
    C: ConnectionTrait,
{
    InventoryLocation::find()
        .filter(inventory_location::Column::LocationId.eq(location_id))
        .filter(inventory_location::Column::ItemId.eq(item_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether the location can take one more unit: `occupancy + 1 <= max_threshold`.
///
/// # Errors
/// Returns `NotFound` if the location or the item does not exist.
pub async fn can_add_item(db: &DatabaseConnection, location_id: i64, item_id: i64) -> Result<bool> {
    find_location(db, location_id).await?;
    find_item(db, item_id).await?;
    Ok(check_room(db, location_id).await?.has_room)
}

/// Whether an item stored at the location has fallen below the location's minimum.
///
/// Compares the item's current quantity with `min_threshold`; always `false` when the
/// location has no thresholds.
///
/// # Errors
/// Returns `NotFound` if the item is not associated with the location.
pub async fn is_below_min_threshold(
    db: &DatabaseConnection,
    location_id: i64,
    item_id: i64,
) -> Result<bool> {
    find_association(db, location_id, item_id)
        .await?
        .ok_or_else(|| association_not_found(location_id, item_id))?;

    let item = find_item(db, item_id).await?;
    let threshold = get_location_threshold(db, location_id).await?;

    Ok(threshold.is_some_and(|bounds| item.current_quantity < bounds.min_threshold))
}

/// Associates an item with a location and records the stock it brings as a receipt.
///
/// The receipt carries the item's current quantity, is attributed to `actor_id`, and is
/// written in the same unit of work as the association. An item with no stock is
/// associated without a receipt.
///
/// # Errors
/// Returns an error if:
/// - The location or item does not exist (`NotFound`)
/// - The location is inactive or the actor is not a persisted user (`Validation`)
/// - The item is already associated with the location (`Conflict`)
/// - The location has no room left (`CapacityExceeded`)
/// - The database operation fails
#[instrument(skip(db))]
pub async fn add_item_to_location(
    db: &DatabaseConnection,
    location_id: i64,
    item_id: i64,
    actor_id: i64,
) -> Result<inventory_location::Model> {
    let txn = db.begin().await?;

    let location = find_location(&txn, location_id).await?;
    let item = find_item(&txn, item_id).await?;

    if !location.active {
        return Err(Error::validation(
            "location",
            format!("location '{}' is inactive", location.code),
        ));
    }

    User::find_by_id(actor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::validation("user", format!("user {actor_id} is not persisted")))?;

    if find_association(&txn, location_id, item_id).await?.is_some() {
        return Err(Error::Conflict {
            entity: "inventory location",
            message: format!("item {item_id} is already stored at location {location_id}"),
        });
    }

    let room = check_room(&txn, location_id).await?;
    if !room.has_room {
        let max_threshold = room.threshold.map_or(0, |bounds| bounds.max_threshold);
        warn!(
            location_id,
            occupancy = room.occupancy,
            max_threshold,
            "Location is full"
        );
        return Err(Error::CapacityExceeded {
            location_id,
            occupancy: room.occupancy,
            max_threshold,
        });
    }

    let association = inventory_location::ActiveModel {
        item_id: Set(item_id),
        location_id: Set(location_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if item.current_quantity > 0 {
        ledger::post_transaction(
            &txn,
            &NewTransaction {
                transaction_type: TransactionType::Receipt,
                item_id,
                location_id,
                quantity: item.current_quantity,
                user_id: actor_id,
                description: format!(
                    "Item '{}' added to location '{}'",
                    item.name, location.code
                ),
            },
        )
        .await?;
    }

    txn.commit().await?;

    info!(
        association_id = association.id,
        item_id, location_id, actor_id, "Item added to location"
    );
    Ok(association)
}

/// Removes the association between an item and a location.
///
/// Ledger entries posted while the item was stored there are kept.
///
/// # Errors
/// Returns `NotFound` if the item is not associated with the location.
#[instrument(skip(db))]
pub async fn remove_item_from_location(
    db: &DatabaseConnection,
    location_id: i64,
    item_id: i64,
    actor_id: i64,
) -> Result<inventory_location::Model> {
    let association = find_association(db, location_id, item_id)
        .await?
        .ok_or_else(|| association_not_found(location_id, item_id))?;

    association.clone().delete(db).await?;

    info!(item_id, location_id, actor_id, "Item removed from location");
    Ok(association)
}

/// Capacity configuration and computed occupancy for a location.
///
/// # Errors
/// Returns `NotFound` if the location does not exist.
pub async fn get_location_occupancy(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<LocationOccupancy> {
    find_location(db, location_id).await?;

    let current_occupancy = occupancy(db, location_id).await?;
    let threshold = get_location_threshold(db, location_id).await?;
    let max_capacity = threshold.as_ref().map(|bounds| bounds.max_threshold);
    let min_threshold = threshold.as_ref().map(|bounds| bounds.min_threshold);

    // Occupancy and capacity are unit counts far below 2^52, the cast is exact.
    #[allow(clippy::cast_precision_loss)]
    let occupancy_percentage = match max_capacity {
        Some(max) if max > 0 => current_occupancy as f64 / max as f64 * 100.0,
        _ => 0.0,
    };

    Ok(LocationOccupancy {
        location_id,
        max_capacity,
        min_threshold,
        current_occupancy,
        occupancy_percentage,
        is_above_threshold: current_occupancy >= min_threshold.unwrap_or(0),
    })
}

/// All locations an item is stored at, lowest location id first.
pub async fn get_locations_for_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<Vec<inventory_location::Model>> {
    InventoryLocation::find()
        .filter(inventory_location::Column::ItemId.eq(item_id))
        .order_by_asc(inventory_location::Column::LocationId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The location order fulfilment draws an item from: its lowest location id.
pub(crate) async fn fulfilment_location_for_item<C>(
    db: &C,
    item_id: i64,
) -> Result<Option<inventory_location::Model>>
where
    C: ConnectionTrait,
{
    InventoryLocation::find()
        .filter(inventory_location::Column::ItemId.eq(item_id))
        .order_by_asc(inventory_location::Column::LocationId)
        .one(db)
        .await
        .map_err(Into::into)
}

fn association_not_found(location_id: i64, item_id: i64) -> Error {
    Error::not_found(
        "inventory location",
        format!("item {item_id} at location {location_id}"),
    )
}
