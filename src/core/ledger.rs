//! Transaction ledger - the only path by which an item's stock changes.
//!
//! Every stock movement is written as an immutable `transactions` row together with the
//! matching change to `items.current_quantity`, inside one database transaction. RECEIPT
//! and RETURN add stock; ORDER, `ISSUE_TO_PRODUCTION` and `ISSUE_TO_SALES` remove it, and
//! a removal larger than the stock on hand is refused before anything is written.
//!
//! The stock write is a single guarded statement
//! (`current_quantity = current_quantity + delta WHERE current_quantity >= quantity`), so
//! two debits racing on the same item cannot both pass on a stale read.

use crate::{
    entities::{Item, Location, Status, Transaction, TransactionType, User, item, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Input for [`create_transaction`].
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Kind of movement
    pub transaction_type: TransactionType,
    /// Item whose stock moves
    pub item_id: i64,
    /// Location the movement is posted against
    pub location_id: i64,
    /// Units to move; must be positive
    pub quantity: i64,
    /// Acting user
    pub user_id: i64,
    /// Free-text description
    pub description: String,
}

impl NewTransaction {
    fn validate(&self) -> Result<()> {
        if self.quantity <= 0 {
            return Err(Error::validation(
                "quantity",
                format!("must be a positive integer, got {}", self.quantity),
            ));
        }
        Ok(())
    }
}

/// Stock left after applying a movement, floored at zero.
#[must_use]
pub const fn resulting_quantity(
    current: i64,
    transaction_type: TransactionType,
    quantity: i64,
) -> i64 {
    let next = current.saturating_add(transaction_type.signed_delta(quantity));
    if next < 0 { 0 } else { next }
}

/// Records a stock movement and adjusts the item's quantity atomically.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is not positive (checked before the store is touched)
/// - The item, location or user does not exist
/// - A debit exceeds the item's stock (`InsufficientQuantity`); nothing is written
/// - A credit would overflow the item's stock (`Validation`)
/// - The database operation fails
#[instrument(skip(db))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new_transaction: NewTransaction,
) -> Result<transaction::Model> {
    new_transaction.validate()?;

    let txn = db.begin().await?;
    let posted = post_transaction(&txn, &new_transaction).await?;
    txn.commit().await?;

    Ok(posted)
}

/// Ledger write on an existing connection or transaction.
///
/// Callers composing several movements into one unit of work (order creation, location
/// association) pass their open transaction here and commit once at the end.
pub(crate) async fn post_transaction<C>(
    conn: &C,
    new_transaction: &NewTransaction,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    new_transaction.validate()?;
    let NewTransaction {
        transaction_type,
        item_id,
        location_id,
        quantity,
        user_id,
        ..
    } = *new_transaction;

    // Fresh read inside the unit of work, never a caller's copy
    let item = Item::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::validation("item", format!("item {item_id} is not persisted")))?;

    Location::find_by_id(location_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            Error::validation("location", format!("location {location_id} is not persisted"))
        })?;

    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::validation("user", format!("user {user_id} is not persisted")))?;

    if transaction_type.is_debit() && item.current_quantity < quantity {
        warn!(
            item_id,
            available = item.current_quantity,
            requested = quantity,
            "Rejected {:?} debit",
            transaction_type
        );
        return Err(Error::InsufficientQuantity {
            item_id,
            available: item.current_quantity,
            requested: quantity,
        });
    }

    if item
        .current_quantity
        .checked_add(transaction_type.signed_delta(quantity))
        .is_none()
    {
        warn!(
            item_id,
            current = item.current_quantity,
            quantity,
            "Rejected {:?} credit, stock would overflow",
            transaction_type
        );
        return Err(stock_overflow(item_id, item.current_quantity, quantity));
    }

    write_stock_delta(conn, item_id, transaction_type, quantity).await?;

    let posted = transaction::ActiveModel {
        transaction_type: Set(transaction_type),
        item_id: Set(item_id),
        location_id: Set(location_id),
        quantity: Set(quantity),
        user_id: Set(user_id),
        status: Set(Some(Status::Completed)),
        description: Set(new_transaction.description.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!(
        transaction_id = posted.id,
        item_id,
        location_id,
        quantity,
        new_quantity = resulting_quantity(item.current_quantity, transaction_type, quantity),
        "Posted {:?} transaction",
        transaction_type
    );
    Ok(posted)
}

fn stock_overflow(item_id: i64, current: i64, quantity: i64) -> Error {
    Error::validation(
        "quantity",
        format!("adding {quantity} to item {item_id} holding {current} overflows its stock"),
    )
}

/// Runs the guarded update and reports a rejected write against a fresh read of the item.
async fn write_stock_delta<C>(
    conn: &C,
    item_id: i64,
    transaction_type: TransactionType,
    quantity: i64,
) -> Result<()>
where
    C: ConnectionTrait,
{
    if apply_stock_delta(conn, item_id, transaction_type, quantity).await? {
        return Ok(());
    }

    // Stock moved between the caller's read and the guarded write
    let available = Item::find_by_id(item_id)
        .one(conn)
        .await?
        .map_or(0, |fresh| fresh.current_quantity);

    if transaction_type.is_debit() {
        warn!(item_id, available, requested = quantity, "Debit lost race on stock");
        Err(Error::InsufficientQuantity {
            item_id,
            available,
            requested: quantity,
        })
    } else {
        warn!(item_id, available, quantity, "Credit lost race on stock, would overflow");
        Err(stock_overflow(item_id, available, quantity))
    }
}

/// Applies the signed movement to the item in one guarded `UPDATE`.
///
/// Debits only match while `current_quantity >= quantity`, credits only while the sum
/// fits in an `i64`. Returns `false` when the guard rejected the write and nothing
/// changed.
async fn apply_stock_delta<C>(
    conn: &C,
    item_id: i64,
    transaction_type: TransactionType,
    quantity: i64,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut update = Item::update_many()
        .col_expr(
            item::Column::CurrentQuantity,
            Expr::col(item::Column::CurrentQuantity).add(transaction_type.signed_delta(quantity)),
        )
        .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(item::Column::Id.eq(item_id));

    update = if transaction_type.is_debit() {
        update.filter(item::Column::CurrentQuantity.gte(quantity))
    } else {
        update.filter(item::Column::CurrentQuantity.lte(i64::MAX - quantity))
    };

    let result = update.exec(conn).await?;
    Ok(result.rows_affected == 1)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All transactions for an item, newest first.
pub async fn get_transactions_for_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<Vec<transaction::Model>> {
    find_newest_first(
        db,
        &TransactionFilter {
            item_id: Some(item_id),
            ..Default::default()
        },
    )
    .await
}

/// All transactions posted by a user, newest first.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<transaction::Model>> {
    find_newest_first(
        db,
        &TransactionFilter {
            user_id: Some(user_id),
            ..Default::default()
        },
    )
    .await
}

/// All transactions of one type, newest first.
pub async fn get_transactions_by_type(
    db: &DatabaseConnection,
    transaction_type: TransactionType,
) -> Result<Vec<transaction::Model>> {
    find_newest_first(
        db,
        &TransactionFilter {
            transaction_type: Some(transaction_type),
            ..Default::default()
        },
    )
    .await
}

/// Transactions recorded between `from` and `to` (both inclusive), newest first.
pub async fn get_transactions_in_range(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<transaction::Model>> {
    if from > to {
        return Err(Error::validation("from", "must not be after 'to'"));
    }

    find_newest_first(
        db,
        &TransactionFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        },
    )
    .await
}

/// Optional criteria for [`list_transactions`]; unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only this item
    pub item_id: Option<i64>,
    /// Only this location
    pub location_id: Option<i64>,
    /// Only this acting user
    pub user_id: Option<i64>,
    /// Only this kind of movement
    pub transaction_type: Option<TransactionType>,
    /// Recorded at or after
    pub from: Option<DateTime<Utc>>,
    /// Recorded at or before
    pub to: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.item_id.map(|id| transaction::Column::ItemId.eq(id)))
            .add_option(self.location_id.map(|id| transaction::Column::LocationId.eq(id)))
            .add_option(self.user_id.map(|id| transaction::Column::UserId.eq(id)))
            .add_option(
                self.transaction_type
                    .map(|kind| transaction::Column::TransactionType.eq(kind)),
            )
            .add_option(self.from.map(|from| transaction::Column::CreatedAt.gte(from)))
            .add_option(self.to.map(|to| transaction::Column::CreatedAt.lte(to)))
    }
}

/// One page of ledger rows.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    /// Rows on this page, newest first
    pub transactions: Vec<transaction::Model>,
    /// Zero-based page index
    pub page: u64,
    /// Requested page size
    pub page_size: u64,
    /// Rows matching the filter across all pages
    pub total_items: u64,
    /// Number of pages at this page size
    pub total_pages: u64,
}

/// Paginated listing of the ledger, newest first. `page` is zero-based.
pub async fn list_transactions(
    db: &DatabaseConnection,
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
) -> Result<TransactionPage> {
    if page_size == 0 {
        return Err(Error::validation("page_size", "must be at least 1"));
    }

    let paginator = Transaction::find()
        .filter(filter.condition())
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .paginate(db, page_size);

    let totals = paginator.num_items_and_pages().await?;
    let transactions = paginator.fetch_page(page).await?;

    Ok(TransactionPage {
        transactions,
        page,
        page_size,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

async fn find_newest_first(
    db: &DatabaseConnection,
    filter: &TransactionFilter,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(filter.condition())
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes only the status of a ledger row; quantities are not touched.
///
/// # Errors
/// Returns `NotFound` if the transaction does not exist and `Validation` if
/// `new_status` is not a recognized status.
#[instrument(skip(db))]
pub async fn update_transaction_status(
    db: &DatabaseConnection,
    transaction_id: i64,
    new_status: &str,
) -> Result<transaction::Model> {
    let existing = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("transaction", transaction_id))?;
    let status: Status = new_status.parse()?;

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.status = Set(Some(status));
    let updated = active_model.update(db).await?;

    info!(transaction_id, %status, "Transaction status updated");
    Ok(updated)
}

/// Signed sum of every ledger row for an item: receipts and returns minus all debits.
pub async fn net_quantity_for_item(db: &DatabaseConnection, item_id: i64) -> Result<i64> {
    let rows = Transaction::find()
        .filter(transaction::Column::ItemId.eq(item_id))
        .all(db)
        .await?;

    Ok(rows
        .iter()
        .map(|row| row.transaction_type.signed_delta(row.quantity))
        .sum())
}
