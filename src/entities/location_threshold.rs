//! Location threshold entity - min/max occupancy bounds, one row per location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location threshold database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_thresholds")]
pub struct Model {
    /// Unique identifier for the threshold row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location these bounds apply to
    #[sea_orm(unique)]
    pub location_id: i64,
    /// Lower bound; always below `max_threshold`
    pub min_threshold: i64,
    /// Upper bound on cumulative occupancy
    pub max_threshold: i64,
}

/// Defines relationships between `LocationThreshold` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each threshold belongs to one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "Cascade"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
