//! Item entity - a stock-keeping unit with a live quantity.
//!
//! `current_quantity` is never negative and only the ledger writes it after creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Hex bolt M8")
    pub name: String,
    /// Unit of measure (e.g., "pcs", "kg")
    pub unit: String,
    /// Stock on hand
    pub current_quantity: i64,
    /// QR code payload identifying the item
    #[sea_orm(unique)]
    pub qr_code: String,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item's stock last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One item can be stored at many locations
    #[sea_orm(has_many = "super::inventory_location::Entity")]
    InventoryLocations,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::inventory_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
