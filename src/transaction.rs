//! All-or-nothing conditional writes.
//!
//! A [`WriteBatch`] collects puts and counter increments, each guarded by a
//! row-existence condition, and hands them to the store as one unit. Either
//! every condition holds and every write lands, or nothing is written and
//! the caller gets `ConditionalWriteFailed` naming the rejected operations.

use crate::attr::Item;
use crate::error::{GraphError, Result};
use crate::keys::TableKey;
use crate::model::Entity;
use crate::store::Store;

/// Largest batch the table accepts in one transaction.
pub const MAX_BATCH_SIZE: usize = 100;

/// Row-existence precondition of a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `attribute_not_exists(PK)`
    NotExists,
    /// `attribute_exists(PK)`
    Exists,
}

impl Condition {
    pub fn expression(self) -> &'static str {
        match self {
            Condition::NotExists => "attribute_not_exists(PK)",
            Condition::Exists => "attribute_exists(PK)",
        }
    }

    /// Whether the condition holds given the current state of the row.
    pub fn holds(self, row_exists: bool) -> bool {
        match self {
            Condition::NotExists => !row_exists,
            Condition::Exists => row_exists,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put {
        item: Item,
        condition: Condition,
    },
    /// `SET counter = counter + by`, applied by the store without reading.
    Increment {
        key: TableKey,
        counter: &'static str,
        by: u64,
        condition: Condition,
    },
}

impl WriteOp {
    pub fn condition(&self) -> Condition {
        match self {
            WriteOp::Put { condition, .. } | WriteOp::Increment { condition, .. } => *condition,
        }
    }
}

#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `entity`, failing if its row already exists.
    pub fn put_new<E: Entity>(mut self, entity: &E) -> Self {
        self.ops.push(WriteOp::Put {
            item: entity.to_item(),
            condition: Condition::NotExists,
        });
        self
    }

    /// Add one to `counter` on `parent`, failing if the parent row is gone.
    pub fn increment<E: Entity>(mut self, parent: &E, counter: &'static str) -> Self {
        self.ops.push(WriteOp::Increment {
            key: parent.key(),
            counter,
            by: 1,
            condition: Condition::Exists,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run the batch. A lone put goes out as a plain conditional put,
    /// anything larger as a transaction.
    pub async fn execute(self, store: &dyn Store) -> Result<()> {
        if self.ops.len() > MAX_BATCH_SIZE {
            return Err(GraphError::Validation(format!(
                "write batch of {} exceeds {MAX_BATCH_SIZE} operations",
                self.ops.len()
            )));
        }

        let mut ops = self.ops;
        if ops.is_empty() {
            return Ok(());
        }
        if let [WriteOp::Put { item, condition }] = ops.as_mut_slice() {
            return store.put(std::mem::take(item), *condition).await;
        }
        store.transact_write(ops).await
    }
}
