//! Conversions between table items and SDK attribute maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::attr::{AttrValue, Item};
use crate::error::{GraphError, Result};

pub type SdkItem = HashMap<String, AttributeValue>;

// Helper: Convert AttrValue to AttributeValue
pub fn attr_to_av(value: AttrValue) -> AttributeValue {
    match value {
        AttrValue::S(s) => AttributeValue::S(s),
        AttrValue::N(n) => AttributeValue::N(n),
    }
}

// Helper: Convert AttributeValue to AttrValue
pub fn av_to_attr(name: &str, av: AttributeValue) -> Result<AttrValue> {
    match av {
        AttributeValue::S(s) => Ok(AttrValue::S(s)),
        AttributeValue::N(n) => Ok(AttrValue::N(n)),
        other => Err(GraphError::Deserialization(format!(
            "Unsupported AttributeValue for {name}: {other:?}"
        ))),
    }
}

pub fn item_to_sdk(item: Item) -> SdkItem {
    item.into_iter().map(|(k, v)| (k, attr_to_av(v))).collect()
}

pub fn sdk_to_item(item: SdkItem) -> Result<Item> {
    item.into_iter()
        .map(|(k, v)| {
            let value = av_to_attr(&k, v)?;
            Ok((k, value))
        })
        .collect()
}
