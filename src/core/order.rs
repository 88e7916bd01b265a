//! Order workflow - multi-line orders built from ledger transactions.
//!
//! Creating an order debits every line through the ledger in a single database
//! transaction: either all lines are fulfilled or nothing is written. Each line is
//! linked to the ORDER transaction that realized it, and every status change, including
//! the initial one, is appended to `order_status_history`.
//!
//! Status transitions are unrestricted; any status may follow any other.

use crate::{
    core::{
        capacity::fulfilment_location_for_item,
        ledger::{self, NewTransaction},
    },
    entities::{
        Item, Order, OrderLine, OrderStatusHistory, Status, TransactionType, User, order,
        order_line, order_status_history,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

const CREATED_REASON: &str = "created";

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    /// Item to take from stock
    pub item_id: i64,
    /// Units to take; must be positive
    pub quantity: i64,
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    /// The order row
    pub order: order::Model,
    /// Its lines in creation order
    pub lines: Vec<order_line::Model>,
}

impl OrderDetails {
    /// Number of lines on the order.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// Sum of the line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

fn generate_order_number() -> String {
    format!("ORD-{}", Uuid::now_v7().simple()).to_uppercase()
}

async fn require_user<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<()> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::validation("user", format!("user {user_id} is not persisted")))?;
    Ok(())
}

/// Creates an order and debits stock for every line.
///
/// Each line is drawn from the item's associated location with the lowest id.
///
/// # Errors
/// Returns an error if:
/// - `lines` is empty or a line quantity is not positive (`Validation`)
/// - The acting user is not persisted (`Validation`)
/// - A line's item does not exist (`NotFound`)
/// - A line's item is not stored at any location (`Validation`)
/// - A line asks for more than the item holds (`InsufficientQuantity`)
/// - The database operation fails
///
/// Nothing is persisted when any line fails.
#[instrument(skip(db, lines), fields(line_count = lines.len()))]
pub async fn create_order(
    db: &DatabaseConnection,
    lines: &[OrderLineRequest],
    description: Option<String>,
    actor_id: i64,
) -> Result<OrderDetails> {
    if lines.is_empty() {
        return Err(Error::validation("lines", "an order needs at least one line"));
    }
    if let Some(bad) = lines.iter().find(|line| line.quantity <= 0) {
        return Err(Error::validation(
            "quantity",
            format!(
                "line for item {} must have a positive quantity, got {}",
                bad.item_id, bad.quantity
            ),
        ));
    }

    let txn = db.begin().await?;
    require_user(&txn, actor_id).await?;

    // Resolve every line before the first write
    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        Item::find_by_id(line.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("item", line.item_id))?;

        let stored_at = fulfilment_location_for_item(&txn, line.item_id)
            .await?
            .ok_or_else(|| {
                Error::validation(
                    "lines",
                    format!("item {} is not assigned to any location", line.item_id),
                )
            })?;
        resolved.push((*line, stored_at.location_id));
    }

    let now = Utc::now();
    let order_number = generate_order_number();
    let order = order::ActiveModel {
        order_number: Set(order_number.clone()),
        status: Set(Status::Pending),
        user_id: Set(actor_id),
        description: Set(description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut order_lines = Vec::with_capacity(resolved.len());
    for (position, (line, location_id)) in resolved.into_iter().enumerate() {
        let pending_line = order_line::ActiveModel {
            order_id: Set(order.id),
            item_id: Set(line.item_id),
            quantity: Set(line.quantity),
            transaction_id: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let posted = ledger::post_transaction(
            &txn,
            &NewTransaction {
                transaction_type: TransactionType::Order,
                item_id: line.item_id,
                location_id,
                quantity: line.quantity,
                user_id: actor_id,
                description: format!("Order {order_number} line {}", position + 1),
            },
        )
        .await?;

        let mut linked: order_line::ActiveModel = pending_line.into();
        linked.transaction_id = Set(Some(posted.id));
        order_lines.push(linked.update(&txn).await?);
    }

    append_history(&txn, order.id, Status::Pending, Status::Pending, actor_id, CREATED_REASON)
        .await?;

    txn.commit().await?;

    info!(
        order_id = order.id,
        order_number = %order.order_number,
        actor_id,
        "Order created"
    );
    Ok(OrderDetails {
        order,
        lines: order_lines,
    })
}

async fn append_history<C>(
    db: &C,
    order_id: i64,
    old_status: Status,
    new_status: Status,
    user_id: i64,
    reason: &str,
) -> Result<order_status_history::Model>
where
    C: ConnectionTrait,
{
    order_status_history::ActiveModel {
        order_id: Set(order_id),
        old_status: Set(old_status),
        new_status: Set(new_status),
        user_id: Set(user_id),
        reason: Set(reason.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn lines_for_order<C: ConnectionTrait>(
    db: &C,
    order_id: i64,
) -> Result<Vec<order_line::Model>> {
    OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads an order with its lines.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<OrderDetails>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let lines = lines_for_order(db, order.id).await?;
    Ok(Some(OrderDetails { order, lines }))
}

/// Loads an order by its order number.
pub async fn get_order_by_number(
    db: &DatabaseConnection,
    order_number: &str,
) -> Result<Option<OrderDetails>> {
    let Some(order) = Order::find()
        .filter(order::Column::OrderNumber.eq(order_number))
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let lines = lines_for_order(db, order.id).await?;
    Ok(Some(OrderDetails { order, lines }))
}

/// Orders created by a user, newest first.
pub async fn get_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to `new_status` and records the change in its history.
///
/// `reason` defaults to `"Status changed from OLD to NEW"`.
///
/// # Errors
/// Returns `NotFound` if the order does not exist and `Validation` if `new_status` is
/// not a recognized status or the actor is not a persisted user.
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: &str,
    reason: Option<&str>,
    actor_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;
    let new_status: Status = new_status.parse()?;
    require_user(&txn, actor_id).await?;

    let old_status = existing.status;
    let reason = reason
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(
            || format!("Status changed from {old_status} to {new_status}"),
            ToString::to_string,
        );

    let mut active_model: order::ActiveModel = existing.into();
    active_model.status = Set(new_status);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(&txn).await?;

    append_history(&txn, order_id, old_status, new_status, actor_id, &reason).await?;

    txn.commit().await?;

    info!(order_id, %old_status, %new_status, actor_id, "Order status updated");
    Ok(updated)
}

/// Status history of an order, most recent first.
///
/// # Errors
/// Returns `NotFound` if the order does not exist.
pub async fn get_order_status_history(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_status_history::Model>> {
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;

    OrderStatusHistory::find()
        .filter(order_status_history::Column::OrderId.eq(order_id))
        .order_by_desc(order_status_history::Column::CreatedAt)
        .order_by_desc(order_status_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an order with its lines and history.
///
/// The ORDER transactions stay in the ledger and the stock they took is not
/// returned.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;

    OrderLine::delete_many()
        .filter(order_line::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    OrderStatusHistory::delete_many()
        .filter(order_status_history::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    order.clone().delete(&txn).await?;

    txn.commit().await?;

    info!(order_id, order_number = %order.order_number, "Order deleted");
    Ok(order)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{capacity::add_item_to_location, ledger::get_transactions_by_type};
    use crate::entities::Transaction;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    async fn assert_nothing_written(db: &DatabaseConnection) -> Result<()> {
        assert_eq!(Order::find().count(db).await?, 0);
        assert_eq!(OrderLine::find().count(db).await?, 0);
        assert_eq!(OrderStatusHistory::find().count(db).await?, 0);
        assert!(get_transactions_by_type(db, TransactionType::Order).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_input_validation() -> Result<()> {
        // Rejected before a connection is used
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_order(&db, &[], None, 1).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { field, .. } if field == "lines"));

        let lines = [
            OrderLineRequest {
                item_id: 1,
                quantity: 2,
            },
            OrderLineRequest {
                item_id: 2,
                quantity: 0,
            },
        ];
        let result = create_order(&db, &lines, None, 1).await;
        assert!(
            matches!(result.unwrap_err(), Error::Validation { field, .. } if field == "quantity")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_create_empty_order_writes_nothing() -> Result<()> {
        let (db, fixture) = setup_with_stock(10).await?;

        let result = create_order(&db, &[], None, fixture.user.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        assert_nothing_written(&db).await
    }

    #[tokio::test]
    async fn test_create_order_two_lines() -> Result<()> {
        let (db, fixture) = setup_with_stock(0).await?;
        let bolts = create_stocked_item(&db, "QR-BOLT", 10, fixture.location.id, fixture.user.id)
            .await?;
        let other_location = create_test_location(&db, "B-01").await?;
        let nuts =
            create_stocked_item(&db, "QR-NUT", 30, other_location.id, fixture.user.id).await?;
        assert_eq!(bolts.current_quantity, 20);
        assert_eq!(nuts.current_quantity, 60);

        let details = create_order(
            &db,
            &[
                OrderLineRequest {
                    item_id: bolts.id,
                    quantity: 3,
                },
                OrderLineRequest {
                    item_id: nuts.id,
                    quantity: 5,
                },
            ],
            Some("Assembly kit".to_string()),
            fixture.user.id,
        )
        .await?;

        assert_eq!(details.order.status, Status::Pending);
        assert!(details.order.order_number.starts_with("ORD-"));
        assert_eq!(details.order.description.as_deref(), Some("Assembly kit"));
        assert_eq!(details.total_lines(), 2);
        assert_eq!(details.total_quantity(), 8);

        let order_transactions = get_transactions_by_type(&db, TransactionType::Order).await?;
        assert_eq!(order_transactions.len(), 2);
        for line in &details.lines {
            let transaction_id = line.transaction_id.unwrap();
            let posted = order_transactions
                .iter()
                .find(|posted| posted.id == transaction_id)
                .unwrap();
            assert_eq!(posted.item_id, line.item_id);
            assert_eq!(posted.quantity, line.quantity);
        }
        let nut_transaction = order_transactions
            .iter()
            .find(|posted| posted.item_id == nuts.id)
            .unwrap();
        assert_eq!(nut_transaction.location_id, other_location.id);

        assert_eq!(current_quantity(&db, bolts.id).await?, 17);
        assert_eq!(current_quantity(&db, nuts.id).await?, 55);

        let history = get_order_status_history(&db, details.order.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, Status::Pending);
        assert_eq!(history[0].new_status, Status::Pending);
        assert_eq!(history[0].reason, "created");
        assert_eq!(history[0].user_id, fixture.user.id);

        let reloaded = get_order(&db, details.order.id).await?.unwrap();
        assert_eq!(reloaded.order.order_number, details.order.order_number);
        assert_eq!(reloaded.lines, details.lines);
        let by_number = get_order_by_number(&db, &details.order.order_number)
            .await?
            .unwrap();
        assert_eq!(by_number.order.id, details.order.id);
        assert!(get_order_by_number(&db, "ORD-MISSING").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_is_all_or_nothing() -> Result<()> {
        let (db, fixture) = setup_with_stock(0).await?;
        let plenty =
            create_stocked_item(&db, "QR-PLENTY", 50, fixture.location.id, fixture.user.id)
                .await?;
        let scarce =
            create_stocked_item(&db, "QR-SCARCE", 1, fixture.location.id, fixture.user.id).await?;

        let result = create_order(
            &db,
            &[
                OrderLineRequest {
                    item_id: plenty.id,
                    quantity: 10,
                },
                OrderLineRequest {
                    item_id: scarce.id,
                    quantity: 5,
                },
            ],
            None,
            fixture.user.id,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientQuantity {
                available: 2,
                requested: 5,
                ..
            }
        ));

        assert_eq!(current_quantity(&db, plenty.id).await?, 100);
        assert_nothing_written(&db).await
    }

    #[tokio::test]
    async fn test_create_order_requires_known_located_items() -> Result<()> {
        let (db, fixture) = setup_with_stock(10).await?;
        let located = create_stocked_item(&db, "QR-LOC", 5, fixture.location.id, fixture.user.id)
            .await?;

        let result = create_order(
            &db,
            &[
                OrderLineRequest {
                    item_id: located.id,
                    quantity: 1,
                },
                OrderLineRequest {
                    item_id: 999,
                    quantity: 1,
                },
            ],
            None,
            fixture.user.id,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        // The fixture item exists but is not stored anywhere
        let result = create_order(
            &db,
            &[
                OrderLineRequest {
                    item_id: located.id,
                    quantity: 1,
                },
                OrderLineRequest {
                    item_id: fixture.item.id,
                    quantity: 1,
                },
            ],
            None,
            fixture.user.id,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { field, .. } if field == "lines"));

        let result = create_order(
            &db,
            &[OrderLineRequest {
                item_id: located.id,
                quantity: 1,
            }],
            None,
            999,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { field, .. } if field == "user"));

        assert_eq!(current_quantity(&db, located.id).await?, 10);
        assert_nothing_written(&db).await
    }

    #[tokio::test]
    async fn test_create_order_uses_lowest_location_id() -> Result<()> {
        let (db, fixture) = setup_with_stock(10).await?;
        let second = create_test_location(&db, "Z-99").await?;
        add_item_to_location(&db, second.id, fixture.item.id, fixture.user.id).await?;
        add_item_to_location(&db, fixture.location.id, fixture.item.id, fixture.user.id).await?;

        let details = create_order(
            &db,
            &[OrderLineRequest {
                item_id: fixture.item.id,
                quantity: 4,
            }],
            None,
            fixture.user.id,
        )
        .await?;

        let posted = Transaction::find_by_id(details.lines[0].transaction_id.unwrap())
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(posted.location_id, fixture.location.id.min(second.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status_records_history() -> Result<()> {
        let (db, fixture) = setup_with_stock(0).await?;
        let stocked =
            create_stocked_item(&db, "QR-ST", 5, fixture.location.id, fixture.user.id).await?;
        let details = create_order(
            &db,
            &[OrderLineRequest {
                item_id: stocked.id,
                quantity: 2,
            }],
            None,
            fixture.user.id,
        )
        .await?;
        let manager = create_test_user(&db, "manager").await?;

        let updated = update_order_status(
            &db,
            details.order.id,
            "COMPLETED",
            Some("fulfilled"),
            manager.id,
        )
        .await?;
        assert_eq!(updated.status, Status::Completed);

        let history = get_order_status_history(&db, details.order.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].old_status, Status::Pending);
        assert_eq!(history[0].new_status, Status::Completed);
        assert_eq!(history[0].reason, "fulfilled");
        assert_eq!(history[0].user_id, manager.id);
        assert_eq!(history[1].reason, "created");

        // Any status may follow any other
        update_order_status(&db, details.order.id, "pending", None, manager.id).await?;
        let history = get_order_status_history(&db, details.order.id).await?;
        assert_eq!(history[0].reason, "Status changed from COMPLETED to PENDING");

        // Status changes never move stock
        assert_eq!(current_quantity(&db, stocked.id).await?, 8);
        assert_eq!(get_orders_for_user(&db, fixture.user.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status_errors() -> Result<()> {
        let (db, fixture) = setup_with_stock(0).await?;
        let stocked =
            create_stocked_item(&db, "QR-ST", 5, fixture.location.id, fixture.user.id).await?;
        let details = create_order(
            &db,
            &[OrderLineRequest {
                item_id: stocked.id,
                quantity: 1,
            }],
            None,
            fixture.user.id,
        )
        .await?;

        let result = update_order_status(&db, 999, "COMPLETED", None, fixture.user.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        let result =
            update_order_status(&db, details.order.id, "SHIPPED", None, fixture.user.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let order = get_order(&db, details.order.id).await?.unwrap().order;
        assert_eq!(order.status, Status::Pending);
        assert_eq!(get_order_status_history(&db, order.id).await?.len(), 1);

        let result = get_order_status_history(&db, 999).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_keeps_stock_effects() -> Result<()> {
        let (db, fixture) = setup_with_stock(0).await?;
        let stocked =
            create_stocked_item(&db, "QR-ST", 10, fixture.location.id, fixture.user.id).await?;
        let details = create_order(
            &db,
            &[OrderLineRequest {
                item_id: stocked.id,
                quantity: 6,
            }],
            None,
            fixture.user.id,
        )
        .await?;
        update_order_status(&db, details.order.id, "CANCELLED", None, fixture.user.id).await?;

        let deleted = delete_order(&db, details.order.id).await?;
        assert_eq!(deleted.id, details.order.id);

        assert!(get_order(&db, details.order.id).await?.is_none());
        assert_eq!(OrderLine::find().count(&db).await?, 0);
        assert_eq!(OrderStatusHistory::find().count(&db).await?, 0);

        assert_eq!(current_quantity(&db, stocked.id).await?, 14);
        assert_eq!(
            get_transactions_by_type(&db, TransactionType::Order).await?.len(),
            1
        );

        let result = delete_order(&db, details.order.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
