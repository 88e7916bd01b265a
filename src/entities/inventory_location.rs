//! Inventory location entity - records that an item is stored at a location.
//!
//! The `(item_id, location_id)` pair is unique; the index is created alongside the
//! table in `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_locations")]
pub struct Model {
    /// Unique identifier for the association
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item stored at the location
    pub item_id: i64,
    /// Location holding the item
    pub location_id: i64,
    /// When the association was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `InventoryLocation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The associated item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
    /// The associated location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "Cascade"
    )]
    Location,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
