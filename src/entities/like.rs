use serde_derive::{Deserialize, Serialize};

use crate::attr::{AttrValue, Item, get_string};
use crate::error::Result;
use crate::id::IdGenerator;
use crate::keys::{self, IndexKey};
use crate::model::Entity;

/// One user's like of one tweet.
///
/// The base-table key is per (tweet, user), which makes a second like by
/// the same user a key collision. `GSI1` orders the same rows by `like_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub liking_username: String,
    pub tweet_id: String,
    pub like_id: String,
}

impl Like {
    pub fn create(
        liking_username: impl Into<String>,
        tweet_id: impl Into<String>,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self::new(liking_username, tweet_id, ids.next_id())
    }

    pub fn new(
        liking_username: impl Into<String>,
        tweet_id: impl Into<String>,
        like_id: impl Into<String>,
    ) -> Self {
        Self {
            liking_username: liking_username.into(),
            tweet_id: tweet_id.into(),
            like_id: like_id.into(),
        }
    }
}

impl Entity for Like {
    const ENTITY_TYPE: &'static str = "Like";

    fn pk(&self) -> String {
        keys::like_pk(&self.tweet_id)
    }

    fn sk(&self) -> String {
        keys::like_sk(&self.liking_username)
    }

    fn gsi1(&self) -> Option<IndexKey> {
        Some(IndexKey::new(
            keys::like_gsi1_pk(&self.tweet_id),
            keys::like_gsi1_sk(&self.like_id),
        ))
    }

    fn write_attributes(&self, item: &mut Item) {
        item.insert(
            "likingUsername".to_string(),
            AttrValue::string(&self.liking_username),
        );
        item.insert("tweetId".to_string(), AttrValue::string(&self.tweet_id));
        item.insert("likeId".to_string(), AttrValue::string(&self.like_id));
    }

    fn read_attributes(item: &Item) -> Result<Self> {
        Ok(Self {
            liking_username: get_string(item, "likingUsername")?,
            tweet_id: get_string(item, "tweetId")?,
            like_id: get_string(item, "likeId")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_item_has_index_keys() {
        let item = Like::new("bob", "t1", "l1").to_item();

        assert_eq!(item["PK"].as_s().unwrap(), "UL#t1");
        assert_eq!(item["SK"].as_s().unwrap(), "LIKE#bob");
        assert_eq!(item["GSI1PK"].as_s().unwrap(), "UL#t1");
        assert_eq!(item["GSI1SK"].as_s().unwrap(), "LIKE#l1");
        assert_eq!(item["entityType"].as_s().unwrap(), "Like");
    }

    #[test]
    fn test_same_user_same_row() {
        let first = Like::new("bob", "t1", "l1");
        let second = Like::new("bob", "t1", "l2");
        assert_eq!(first.key(), second.key());
        assert_ne!(first.gsi1(), second.gsi1());
    }

    #[test]
    fn test_like_round_trip() {
        let like = Like::new("bob", "t1", "l1");
        let item = like.to_item();
        let parsed = Like::from_item(Some(&item)).unwrap();

        assert_eq!(parsed, like);
        assert_eq!(parsed.to_item(), item);
    }
}
