//! In-memory table for tests and local runs.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::attr::{AttrValue, Item};
use crate::error::{GraphError, Result};
use crate::keys::{self, TableKey};
use crate::query::KeyQuery;
use crate::transaction::{Condition, WriteOp};

use super::Store;

/// A single table held in a `BTreeMap` keyed by (PK, SK).
///
/// Writes take the one write lock for their whole duration, so every
/// condition of a transaction is checked against the same snapshot the
/// writes are applied to. Data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Arc<RwLock<BTreeMap<TableKey, Item>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across every entity type.
    pub async fn item_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

/// New value of `counter` after adding `by`. A missing counter counts as zero;
/// a sum past `u64::MAX` is rejected.
fn incremented(row: Option<&Item>, counter: &str, by: u64) -> Result<AttrValue> {
    let current = match row.and_then(|row| row.get(counter)) {
        None => 0,
        Some(AttrValue::N(n)) => n.parse::<u64>().map_err(|e| {
            GraphError::Deserialization(format!("Invalid number {counter}={n}: {e}"))
        })?,
        Some(AttrValue::S(_)) => {
            return Err(GraphError::Deserialization(format!(
                "{counter} is not a number"
            )));
        }
    };
    current
        .checked_add(by)
        .map(AttrValue::number)
        .ok_or_else(|| GraphError::Validation(format!("{counter} would overflow at {current}")))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, key: &TableKey) -> Result<Option<Item>> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn put(&self, item: Item, condition: Condition) -> Result<()> {
        let key = TableKey::from_item(&item)?;
        let mut rows = self.rows.write().await;
        if !condition.holds(rows.contains_key(&key)) {
            return Err(GraphError::ConditionalWriteFailed {
                failed_ops: vec![0],
            });
        }
        rows.insert(key, item);
        Ok(())
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        let mut rows = self.rows.write().await;

        // Check every op before touching anything.
        let mut failed_ops = Vec::new();
        let mut seen = HashSet::new();
        let mut counters = Vec::with_capacity(ops.len());
        for (index, op) in ops.iter().enumerate() {
            let key = match op {
                WriteOp::Put { item, .. } => TableKey::from_item(item)?,
                WriteOp::Increment { key, .. } => key.clone(),
            };
            if !seen.insert(key.clone()) {
                return Err(GraphError::Validation(format!(
                    "transaction touches {key} more than once"
                )));
            }
            let row = rows.get(&key);
            if !op.condition().holds(row.is_some()) {
                failed_ops.push(index);
            }
            counters.push(match op {
                WriteOp::Increment { counter, by, .. } => Some(incremented(row, counter, *by)?),
                WriteOp::Put { .. } => None,
            });
        }
        if !failed_ops.is_empty() {
            return Err(GraphError::ConditionalWriteFailed { failed_ops });
        }

        for (op, value) in ops.into_iter().zip(counters) {
            match (op, value) {
                (WriteOp::Put { item, .. }, _) => {
                    rows.insert(TableKey::from_item(&item)?, item);
                }
                (WriteOp::Increment { key, counter, .. }, Some(value)) => {
                    let row = rows.entry(key.clone()).or_insert_with(|| key.to_item());
                    row.insert(counter.to_string(), value);
                }
                (WriteOp::Increment { .. }, None) => {}
            }
        }
        Ok(())
    }

    async fn query(&self, query: &KeyQuery) -> Result<Vec<Item>> {
        let rows = self.rows.read().await;
        let partition_attr = query.partition_attribute();
        let sort_attr = query.sort_attribute();

        let mut matched: Vec<(String, &Item)> = rows
            .values()
            .filter(|item| {
                item.get(partition_attr).and_then(AttrValue::as_s) == Some(query.partition.as_str())
            })
            .filter_map(|item| {
                let sort_key = item.get(sort_attr).and_then(AttrValue::as_s)?;
                match &query.sort {
                    Some(condition) if !condition.matches(sort_key) => None,
                    _ => Some((sort_key.to_string(), item)),
                }
            })
            .collect();

        matched.sort_by(|(a, a_item), (b, b_item)| {
            b.cmp(a).then_with(|| {
                let a_sk = a_item.get(keys::SK).and_then(AttrValue::as_s);
                let b_sk = b_item.get(keys::SK).and_then(AttrValue::as_s);
                b_sk.cmp(&a_sk)
            })
        });
        Ok(matched.into_iter().map(|(_, item)| item.clone()).collect())
    }
}
