//! Order entity - a multi-line stock request.
//!
//! Line count and total quantity are derived from the lines, not stored;
//! see `core::order::OrderDetails`.

use super::status::Status;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Generated business key (e.g., `"ORD-0192…"`)
    #[sea_orm(unique)]
    pub order_number: String,
    /// Current status
    pub status: Status,
    /// User who created the order
    pub user_id: i64,
    /// Free-text description
    pub description: Option<String>,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order's status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    Lines,
    /// One order has many status history rows
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    StatusHistory,
    /// Each order is created by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
