//! Key-condition queries, newest first.
//!
//! Every listing is an equality on a partition key, against the base table
//! or an index, with an optional sort-key range. Results always come back in
//! descending sort-key order; with time-ordered ids that is most recent
//! first. No pagination: a query returns what one round-trip returns.

use crate::error::Result;
use crate::keys;
use crate::model::Entity;
use crate::store::Store;

/// Range restriction on the sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCondition {
    /// `begins_with(SK, :prefix)`
    BeginsWith(String),
    /// `SK BETWEEN :low AND :high`, both inclusive.
    Between(String, String),
}

impl SortCondition {
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            SortCondition::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
            SortCondition::Between(low, high) => {
                low.as_str() <= sort_key && sort_key <= high.as_str()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    /// `None` queries the base table.
    pub index: Option<String>,
    pub partition: String,
    pub sort: Option<SortCondition>,
}

impl KeyQuery {
    /// Equality on `PK`.
    pub fn table(partition: impl Into<String>) -> Self {
        Self {
            index: None,
            partition: partition.into(),
            sort: None,
        }
    }

    /// Equality on `GSI1PK` of the named index.
    pub fn index(index_name: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            index: Some(index_name.into()),
            partition: partition.into(),
            sort: None,
        }
    }

    pub fn sort_begins_with(mut self, prefix: impl Into<String>) -> Self {
        self.sort = Some(SortCondition::BeginsWith(prefix.into()));
        self
    }

    pub fn sort_between(mut self, low: impl Into<String>, high: impl Into<String>) -> Self {
        self.sort = Some(SortCondition::Between(low.into(), high.into()));
        self
    }

    pub fn partition_attribute(&self) -> &'static str {
        match self.index {
            Some(_) => keys::GSI1PK,
            None => keys::PK,
        }
    }

    pub fn sort_attribute(&self) -> &'static str {
        match self.index {
            Some(_) => keys::GSI1SK,
            None => keys::SK,
        }
    }

    /// The key condition expression with `:pk`, `:prefix`, `:low`, `:high`
    /// placeholders and `#pk`/`#sk` name aliases.
    pub fn key_condition_expression(&self) -> &'static str {
        match self.sort {
            None => "#pk = :pk",
            Some(SortCondition::BeginsWith(_)) => "#pk = :pk AND begins_with(#sk, :prefix)",
            Some(SortCondition::Between(..)) => "#pk = :pk AND #sk BETWEEN :low AND :high",
        }
    }
}

/// Run `query` and decode every row as `E`, preserving the store's order.
pub async fn fetch<E: Entity>(store: &dyn Store, query: &KeyQuery) -> Result<Vec<E>> {
    let items = store.query(query).await?;
    tracing::debug!(
        partition = %query.partition,
        index = ?query.index,
        count = items.len(),
        "Query returned"
    );
    items.iter().map(|item| E::from_item(Some(item))).collect()
}
