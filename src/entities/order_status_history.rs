//! Order status history entity - append-only audit trail of status changes.

use super::status::Status;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order status history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    /// Unique identifier for the history row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order whose status changed
    pub order_id: i64,
    /// Status before the change (equals `new_status` on the creation row)
    pub old_status: Status,
    /// Status after the change
    pub new_status: Status,
    /// User who made the change
    pub user_id: i64,
    /// Why the status changed
    pub reason: String,
    /// When the change was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `OrderStatusHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// History rows are deleted with their order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// The acting user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
