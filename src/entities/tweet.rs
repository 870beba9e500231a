use serde_derive::{Deserialize, Serialize};

use crate::attr::{AttrValue, Item, get_number, get_string};
use crate::error::Result;
use crate::id::IdGenerator;
use crate::keys;
use crate::model::Entity;

pub const LIKES_COUNT: &str = "likesCount";
pub const COMMENT_COUNT: &str = "commentCount";

/// A tweet. The counters are denormalized and only ever move through the
/// transaction that creates the matching like or comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub username: String,
    pub tweet_id: String,
    pub text: String,
    pub likes_count: u64,
    pub comment_count: u64,
}

impl Tweet {
    /// A new tweet with a freshly generated, time-ordered id.
    pub fn create(
        username: impl Into<String>,
        text: impl Into<String>,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self::new(username, text, ids.next_id())
    }

    /// A tweet with an explicit id and zeroed counters.
    pub fn new(
        username: impl Into<String>,
        text: impl Into<String>,
        tweet_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            tweet_id: tweet_id.into(),
            text: text.into(),
            likes_count: 0,
            comment_count: 0,
        }
    }

    /// Identity-only handle, enough to address the stored row.
    pub fn reference(username: impl Into<String>, tweet_id: impl Into<String>) -> Self {
        Self::new(username, "", tweet_id)
    }
}

impl Entity for Tweet {
    const ENTITY_TYPE: &'static str = "Tweet";

    fn pk(&self) -> String {
        keys::tweet_pk(&self.username)
    }

    fn sk(&self) -> String {
        keys::tweet_sk(&self.tweet_id)
    }

    fn write_attributes(&self, item: &mut Item) {
        item.insert("username".to_string(), AttrValue::string(&self.username));
        item.insert("tweetId".to_string(), AttrValue::string(&self.tweet_id));
        item.insert("text".to_string(), AttrValue::string(&self.text));
        item.insert(LIKES_COUNT.to_string(), AttrValue::number(self.likes_count));
        item.insert(
            COMMENT_COUNT.to_string(),
            AttrValue::number(self.comment_count),
        );
    }

    fn read_attributes(item: &Item) -> Result<Self> {
        Ok(Self {
            username: get_string(item, "username")?,
            tweet_id: get_string(item, "tweetId")?,
            text: get_string(item, "text")?,
            likes_count: get_number(item, LIKES_COUNT)?,
            comment_count: get_number(item, COMMENT_COUNT)?,
        })
    }
}
