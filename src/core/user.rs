//! User lookups - the persisted identities that ledger, order and history rows point at.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user with a unique, non-blank username.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("username", "cannot be empty"));
    }

    if get_user_by_username(db, username).await?.is_some() {
        return Err(Error::Conflict {
            entity: "user",
            message: format!("username '{username}' is already taken"),
        });
    }

    user::ActiveModel {
        username: Set(username.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a user by ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}
