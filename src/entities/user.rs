use serde_derive::{Deserialize, Serialize};

use crate::attr::{AttrValue, Item, get_number, get_string};
use crate::error::Result;
use crate::keys;
use crate::model::Entity;

pub const FOLLOWER_COUNT: &str = "followerCount";
pub const FOLLOWING_COUNT: &str = "followingCount";

/// A registered account. Identity is the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub follower_count: u64,
    pub following_count: u64,
}

impl User {
    /// A fresh user with zeroed counters.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_counts(username, 0, 0)
    }

    pub fn with_counts(
        username: impl Into<String>,
        follower_count: u64,
        following_count: u64,
    ) -> Self {
        Self {
            username: username.into(),
            follower_count,
            following_count,
        }
    }
}

impl Entity for User {
    const ENTITY_TYPE: &'static str = "User";

    fn pk(&self) -> String {
        keys::user_pk(&self.username)
    }

    fn sk(&self) -> String {
        keys::user_sk(&self.username)
    }

    fn write_attributes(&self, item: &mut Item) {
        item.insert("username".to_string(), AttrValue::string(&self.username));
        item.insert(
            FOLLOWER_COUNT.to_string(),
            AttrValue::number(self.follower_count),
        );
        item.insert(
            FOLLOWING_COUNT.to_string(),
            AttrValue::number(self.following_count),
        );
    }

    fn read_attributes(item: &Item) -> Result<Self> {
        Ok(Self {
            username: get_string(item, "username")?,
            follower_count: get_number(item, FOLLOWER_COUNT)?,
            following_count: get_number(item, FOLLOWING_COUNT)?,
        })
    }
}
