//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod inventory_location;
pub mod item;
pub mod location;
pub mod location_threshold;
pub mod order;
pub mod order_line;
pub mod order_status_history;
pub mod status;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use inventory_location::{
    Column as InventoryLocationColumn, Entity as InventoryLocation,
    Model as InventoryLocationModel,
};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use location::{Column as LocationColumn, Entity as Location, Model as LocationModel};
pub use location_threshold::{
    Column as LocationThresholdColumn, Entity as LocationThreshold,
    Model as LocationThresholdModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_line::{Column as OrderLineColumn, Entity as OrderLine, Model as OrderLineModel};
pub use order_status_history::{
    Column as OrderStatusHistoryColumn, Entity as OrderStatusHistory,
    Model as OrderStatusHistoryModel,
};
pub use status::Status;
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
