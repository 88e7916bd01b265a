//! Transaction entity - an immutable stock ledger entry.
//!
//! Each transaction has a `transaction_type`, `item_id`, `location_id`, a positive
//! `quantity`, the acting `user_id`, an optional `status` and a description. Once written
//! only `status` may change; the sign of the stock movement comes from the type.
use super::status::Status;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of stock movement a ledger entry records
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Goods received into stock
    #[sea_orm(string_value = "RECEIPT")]
    Receipt,
    /// Goods issued to the production floor
    #[sea_orm(string_value = "ISSUE_TO_PRODUCTION")]
    IssueToProduction,
    /// Goods issued to a sales channel
    #[sea_orm(string_value = "ISSUE_TO_SALES")]
    IssueToSales,
    /// Goods consumed by an order line
    #[sea_orm(string_value = "ORDER")]
    Order,
    /// Goods returned into stock
    #[sea_orm(string_value = "RETURN")]
    Return,
}

impl TransactionType {
    /// Whether this type removes stock from the item.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Order | Self::IssueToProduction | Self::IssueToSales)
    }

    /// Signed change to the item's quantity for a movement of `quantity` units.
    #[must_use]
    pub const fn signed_delta(self, quantity: i64) -> i64 {
        if self.is_debit() { -quantity } else { quantity }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Kind of movement
    #[sea_orm(column_name = "type")]
    pub transaction_type: TransactionType,
    /// Item whose stock moved
    pub item_id: i64,
    /// Location the movement was posted against
    pub location_id: i64,
    /// Units moved, always positive
    pub quantity: i64,
    /// User who posted the movement
    pub user_id: i64,
    /// Optional lifecycle status
    pub status: Option<Status>,
    /// Human-readable description
    pub description: String,
    /// When the transaction was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one item and goes away with it
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
    /// Each transaction is posted against one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// Each transaction is attributed to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
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

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
