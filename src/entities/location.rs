//! Location entity - a physical storage slot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing code, unique (e.g., "A-01-03")
    #[sea_orm(unique)]
    pub code: String,
    /// Free-form type tag (e.g., "shelf", "pallet")
    pub location_type: String,
    /// Inactive locations accept no new items
    pub active: bool,
}

/// Defines relationships between Location and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional capacity thresholds, at most one row
    #[sea_orm(has_one = "super::location_threshold::Entity")]
    Threshold,
    /// Items stored here
    #[sea_orm(has_many = "super::inventory_location::Entity")]
    InventoryLocations,
    /// Ledger rows posted against this location
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::location_threshold::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Threshold.def()
    }
}

impl Related<super::inventory_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLocations.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
