//! Storage client seam.
//!
//! The access layer talks to the table only through [`Store`]. The DynamoDB
//! implementation is built once at startup and injected; tests use the
//! in-memory one.

use async_trait::async_trait;

use crate::attr::Item;
use crate::error::Result;
use crate::keys::TableKey;
use crate::query::KeyQuery;
use crate::transaction::{Condition, WriteOp};

pub mod dynamodb;
pub mod memory;

pub use dynamodb::DynamoStore;
pub use memory::InMemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Strongly consistent point read.
    async fn get(&self, key: &TableKey) -> Result<Option<Item>>;

    /// Single conditional put. A failed condition is
    /// `ConditionalWriteFailed { failed_ops: [0] }`.
    async fn put(&self, item: Item, condition: Condition) -> Result<()>;

    /// Apply every op or none. Failed conditions are reported by position.
    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Key-condition query in descending sort-key order.
    async fn query(&self, query: &KeyQuery) -> Result<Vec<Item>>;
}
