//! DynamoDB-backed [`Store`].

mod conversions;
mod error;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType, Put, ScalarAttributeType, TransactWriteItem, Update,
};

use crate::attr::Item;
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::keys::{self, TableKey};
use crate::query::{KeyQuery, SortCondition};
use crate::transaction::{Condition, WriteOp};

use self::conversions::{item_to_sdk, sdk_to_item};
use self::error::{
    map_connection_error, map_get_item_error, map_put_item_error, map_query_error,
    map_transact_write_error,
};
use super::Store;

/// One table, one client, shared by every request for the life of the process.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DynamoStore {
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            index_name: index_name.into(),
        }
    }

    /// Build the SDK client from the default credential chain, with the
    /// region and endpoint taken from `config`.
    pub async fn connect(config: &Config) -> Self {
        let shared_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared_config)
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        Self::new(client, &config.table_name, &config.index_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the table and its overloaded index if missing. Meant for
    /// DynamoDB Local; real tables are provisioned outside this crate.
    pub async fn create_table_if_missing(&self) -> Result<bool> {
        let tables = self
            .client
            .list_tables()
            .send()
            .await
            .map_err(map_connection_error)?;
        if tables.table_names().contains(&self.table_name) {
            return Ok(false);
        }

        let string_attr = |name: &str| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(map_connection_error)
        };
        let key = |name: &str, key_type: KeyType| {
            KeySchemaElement::builder()
                .attribute_name(name)
                .key_type(key_type)
                .build()
                .map_err(map_connection_error)
        };

        let gsi1 = GlobalSecondaryIndex::builder()
            .index_name(&self.index_name)
            .key_schema(key(keys::GSI1PK, KeyType::Hash)?)
            .key_schema(key(keys::GSI1SK, KeyType::Range)?)
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::All)
                    .build(),
            )
            .build()
            .map_err(map_connection_error)?;

        self.client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(string_attr(keys::PK)?)
            .attribute_definitions(string_attr(keys::SK)?)
            .attribute_definitions(string_attr(keys::GSI1PK)?)
            .attribute_definitions(string_attr(keys::GSI1SK)?)
            .key_schema(key(keys::PK, KeyType::Hash)?)
            .key_schema(key(keys::SK, KeyType::Range)?)
            .global_secondary_indexes(gsi1)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(map_connection_error)?;

        tracing::info!(table = %self.table_name, index = %self.index_name, "Table created");
        Ok(true)
    }

    fn transact_item(&self, op: WriteOp) -> Result<TransactWriteItem> {
        let built = match op {
            WriteOp::Put { item, condition } => {
                let put = Put::builder()
                    .table_name(&self.table_name)
                    .set_item(Some(item_to_sdk(item)))
                    .condition_expression(condition.expression())
                    .build()
                    .map_err(|e| GraphError::Validation(e.to_string()))?;
                TransactWriteItem::builder().put(put).build()
            }
            WriteOp::Increment {
                key,
                counter,
                by,
                condition,
            } => {
                let update = Update::builder()
                    .table_name(&self.table_name)
                    .set_key(Some(item_to_sdk(key.to_item())))
                    .condition_expression(condition.expression())
                    .update_expression("SET #counter = if_not_exists(#counter, :zero) + :inc")
                    .expression_attribute_names("#counter", counter)
                    .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
                    .expression_attribute_values(":inc", AttributeValue::N(by.to_string()))
                    .build()
                    .map_err(|e| GraphError::Validation(e.to_string()))?;
                TransactWriteItem::builder().update(update).build()
            }
        };
        Ok(built)
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn get(&self, key: &TableKey) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(item_to_sdk(key.to_item())))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_get_item_error)?;

        output.item.map(sdk_to_item).transpose()
    }

    async fn put(&self, item: Item, condition: Condition) -> Result<()> {
        let key = TableKey::from_item(&item)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_sdk(item)))
            .condition_expression(condition.expression())
            .send()
            .await
            .map_err(map_put_item_error)?;

        tracing::debug!(pk = %key.pk, sk = %key.sk, "Item put");
        Ok(())
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        let count = ops.len();
        let items = ops
            .into_iter()
            .map(|op| self.transact_item(op))
            .collect::<Result<Vec<_>>>()?;

        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
            .map_err(map_transact_write_error)?;

        tracing::debug!(operations = count, "Transaction committed");
        Ok(())
    }

    async fn query(&self, query: &KeyQuery) -> Result<Vec<Item>> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .set_index_name(query.index.clone())
            .key_condition_expression(query.key_condition_expression())
            .expression_attribute_names("#pk", query.partition_attribute())
            .expression_attribute_values(":pk", AttributeValue::S(query.partition.clone()))
            .scan_index_forward(false);

        match &query.sort {
            None => {}
            Some(SortCondition::BeginsWith(prefix)) => {
                request = request
                    .expression_attribute_names("#sk", query.sort_attribute())
                    .expression_attribute_values(":prefix", AttributeValue::S(prefix.clone()));
            }
            Some(SortCondition::Between(low, high)) => {
                request = request
                    .expression_attribute_names("#sk", query.sort_attribute())
                    .expression_attribute_values(":low", AttributeValue::S(low.clone()))
                    .expression_attribute_values(":high", AttributeValue::S(high.clone()));
            }
        }

        let resp = request.send().await.map_err(map_query_error)?;
        resp.items
            .unwrap_or_default()
            .into_iter()
            .map(sdk_to_item)
            .collect()
    }
}
