use crate::attr::{AttrValue, Item, get_string};
use crate::error::{GraphError, Result};
use crate::keys::{self, IndexKey, TableKey};

/// Attribute naming the entity type of every row.
pub const ENTITY_TYPE: &str = "entityType";

/// Capability shared by every record stored in the table.
///
/// Implementors supply their key derivation and their own attributes; the
/// provided methods assemble and check the full item.
pub trait Entity: Sized + Send + Sync {
    /// Value of the `entityType` attribute.
    const ENTITY_TYPE: &'static str;

    fn pk(&self) -> String;

    fn sk(&self) -> String;

    /// `GSI1` key, for entities projected into the index.
    fn gsi1(&self) -> Option<IndexKey> {
        None
    }

    /// Write the non-key attributes.
    fn write_attributes(&self, item: &mut Item);

    /// Rebuild the entity from its non-key attributes.
    fn read_attributes(item: &Item) -> Result<Self>;

    fn key(&self) -> TableKey {
        TableKey::new(self.pk(), self.sk())
    }

    /// Full attribute set: keys, entity type and semantic fields.
    fn to_item(&self) -> Item {
        let mut item = self.key().to_item();
        if let Some(gsi1) = self.gsi1() {
            item.insert(keys::GSI1PK.to_string(), AttrValue::S(gsi1.pk));
            item.insert(keys::GSI1SK.to_string(), AttrValue::S(gsi1.sk));
        }
        item.insert(
            ENTITY_TYPE.to_string(),
            AttrValue::string(Self::ENTITY_TYPE),
        );
        self.write_attributes(&mut item);
        item
    }

    /// Decode a stored row. An absent or empty row is `MissingRecord`.
    fn from_item(item: Option<&Item>) -> Result<Self> {
        let item = match item {
            Some(item) if !item.is_empty() => item,
            _ => return Err(GraphError::MissingRecord(Self::ENTITY_TYPE)),
        };
        if item.contains_key(ENTITY_TYPE) {
            let stored = get_string(item, ENTITY_TYPE)?;
            if stored != Self::ENTITY_TYPE {
                return Err(GraphError::Deserialization(format!(
                    "expected {} item, found {stored}",
                    Self::ENTITY_TYPE
                )));
            }
        }
        Self::read_attributes(item)
    }
}
