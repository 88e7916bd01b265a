//! User entity - the acting identity recorded on ledger rows, orders and history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the store
    #[sea_orm(unique)]
    pub username: String,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Users are referenced by other tables but own no relations themselves
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
