//! Item business logic - creation and lookup of stock-keeping units.
//!
//! An item is created with its opening stock; from then on only the ledger
//! (`core::ledger`) changes `current_quantity`.

use crate::{
    entities::{Item, item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_item`].
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Display name
    pub name: String,
    /// Unit of measure
    pub unit: String,
    /// Opening stock, zero or more
    pub initial_quantity: i64,
    /// Unique QR code payload
    pub qr_code: String,
}

/// Creates a new item after validating its fields and the uniqueness of its QR code.
///
/// # Errors
/// Returns an error if:
/// - The name, unit or QR code is empty or whitespace-only
/// - The opening quantity is negative
/// - Another item already uses the QR code
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_item(db: &DatabaseConnection, new_item: NewItem) -> Result<item::Model> {
    let name = new_item.name.trim();
    let unit = new_item.unit.trim();
    let qr_code = new_item.qr_code.trim();

    if name.is_empty() {
        return Err(Error::validation("name", "cannot be empty"));
    }
    if unit.is_empty() {
        return Err(Error::validation("unit", "cannot be empty"));
    }
    if qr_code.is_empty() {
        return Err(Error::validation("qr_code", "cannot be empty"));
    }
    if new_item.initial_quantity < 0 {
        return Err(Error::validation(
            "initial_quantity",
            format!("must not be negative, got {}", new_item.initial_quantity),
        ));
    }

    if get_item_by_qr_code(db, qr_code).await?.is_some() {
        return Err(Error::Conflict {
            entity: "item",
            message: format!("QR code '{qr_code}' is already assigned"),
        });
    }

    let now = chrono::Utc::now();
    let created = item::ActiveModel {
        name: Set(name.to_string()),
        unit: Set(unit.to_string()),
        current_quantity: Set(new_item.initial_quantity),
        qr_code: Set(qr_code.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(item_id = created.id, "Created item '{}'", created.name);
    Ok(created)
}

/// Finds an item by its unique ID.
pub async fn get_item_by_id(db: &DatabaseConnection, item_id: i64) -> Result<Option<item::Model>> {
    Item::find_by_id(item_id).one(db).await.map_err(Into::into)
}

/// Finds an item by its QR code.
pub async fn get_item_by_qr_code(
    db: &DatabaseConnection,
    qr_code: &str,
) -> Result<Option<item::Model>> {
    Item::find()
        .filter(item::Column::QrCode.eq(qr_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all items alphabetically by name.
pub async fn get_all_items(db: &DatabaseConnection) -> Result<Vec<item::Model>> {
    Item::find()
        .order_by_asc(item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an item. Its ledger rows and location associations go with it.
#[instrument(skip(db))]
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    let item = Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("item", item_id))?;

    item.clone().delete(db).await?;
    info!(item_id, "Deleted item");
    Ok(item)
}
