//! Database configuration module for the stock ledger.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs,
//! including the foreign keys declared on each entity's relations. The one constraint
//! entities cannot express, the composite `(item_id, location_id)` uniqueness on
//! inventory locations, is added as a separate index.

use crate::entities::{
    InventoryLocation, InventoryLocationColumn, Item, Location, LocationThreshold, Order,
    OrderLine, OrderStatusHistory, Transaction, User,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/stock_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables (if missing) from the entity definitions, parents before children,
/// followed by the unique index on `inventory_locations(item_id, location_id)`.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Item).await?;
    create_table(db, &schema, Location).await?;
    create_table(db, &schema, LocationThreshold).await?;
    create_table(db, &schema, InventoryLocation).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderLine).await?;
    create_table(db, &schema, OrderStatusHistory).await?;

    let pair_index = Index::create()
        .name("idx_inventory_locations_item_location")
        .table(InventoryLocation)
        .col(InventoryLocationColumn::ItemId)
        .col(InventoryLocationColumn::LocationId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&pair_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        inventory_location, item::Model as ItemModel, order::Model as OrderModel,
        transaction::Model as TransactionModel,
    };
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ItemModel> = Item::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _ = OrderStatusHistory::find().limit(1).all(&db).await?;
        let _ = LocationThreshold::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_inventory_location_pair_is_unique() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let item = crate::test_utils::create_test_item(&db, "QR-1", 0).await?;
        let location = crate::test_utils::create_test_location(&db, "A-01").await?;

        let row = || inventory_location::ActiveModel {
            item_id: Set(item.id),
            location_id: Set(location.id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        row().insert(&db).await?;
        assert!(row().insert(&db).await.is_err());

        Ok(())
    }
}
