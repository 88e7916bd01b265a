//! Shared test utilities for the stock ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{capacity, item, ledger, location, user},
    entities::{self, TransactionType},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with the given username.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, username).await
}

/// Creates a test item with the given QR code and opening stock.
///
/// # Defaults
/// * `name`: `"Item <qr_code>"`
/// * `unit`: `"pcs"`
pub async fn create_test_item(
    db: &DatabaseConnection,
    qr_code: &str,
    initial_quantity: i64,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        item::NewItem {
            name: format!("Item {qr_code}"),
            unit: "pcs".to_string(),
            initial_quantity,
            qr_code: qr_code.to_string(),
        },
    )
    .await
}

/// Creates an active `"shelf"` location with the given code and no thresholds.
pub async fn create_test_location(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::location::Model> {
    location::create_location(db, code, "shelf", true).await
}

/// The user, item and location most tests post against.
#[derive(Debug, Clone)]
pub struct StockFixture {
    /// Acting user
    pub user: entities::user::Model,
    /// Item under test
    pub item: entities::item::Model,
    /// Location the item's movements are posted against
    pub location: entities::location::Model,
}

/// Sets up a database with one user, one location and one item holding
/// `initial_quantity` units. The item is not associated with the location.
pub async fn setup_with_stock(initial_quantity: i64) -> Result<(DatabaseConnection, StockFixture)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test_user").await?;
    let location = create_test_location(&db, "A-01").await?;
    let item = create_test_item(&db, "QR-TEST", initial_quantity).await?;
    Ok((
        db,
        StockFixture {
            user,
            item,
            location,
        },
    ))
}

/// Posts a ledger transaction for the fixture's item, location and user.
pub async fn post_test_transaction(
    db: &DatabaseConnection,
    fixture: &StockFixture,
    transaction_type: TransactionType,
    quantity: i64,
) -> Result<entities::transaction::Model> {
    ledger::create_transaction(
        db,
        ledger::NewTransaction {
            transaction_type,
            item_id: fixture.item.id,
            location_id: fixture.location.id,
            quantity,
            user_id: fixture.user.id,
            description: "Test transaction".to_string(),
        },
    )
    .await
}

/// Creates an item with `initial_quantity` units and associates it with `location_id`.
///
/// The association posts a receipt for the opening stock, so the item ends up holding
/// twice `initial_quantity`.
pub async fn create_stocked_item(
    db: &DatabaseConnection,
    qr_code: &str,
    initial_quantity: i64,
    location_id: i64,
    actor_id: i64,
) -> Result<entities::item::Model> {
    let created = create_test_item(db, qr_code, initial_quantity).await?;
    capacity::add_item_to_location(db, location_id, created.id, actor_id).await?;
    item::get_item_by_id(db, created.id)
        .await?
        .ok_or_else(|| Error::not_found("item", created.id))
}

/// Reads an item's stock straight from the store.
pub async fn current_quantity(db: &DatabaseConnection, item_id: i64) -> Result<i64> {
    item::get_item_by_id(db, item_id)
        .await?
        .map(|found| found.current_quantity)
        .ok_or_else(|| Error::not_found("item", item_id))
}
