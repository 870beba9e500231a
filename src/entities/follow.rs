use serde_derive::{Deserialize, Serialize};

use crate::attr::{AttrValue, Item, get_string};
use crate::error::Result;
use crate::keys::{self, IndexKey};
use crate::model::Entity;

/// A follow edge: `following_username` follows `followed_username`.
///
/// The base table groups edges by the followed user (their followers);
/// `GSI1` groups the same rows by the follower (who they follow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub followed_username: String,
    pub following_username: String,
}

impl Follow {
    pub fn new(
        followed_username: impl Into<String>,
        following_username: impl Into<String>,
    ) -> Self {
        Self {
            followed_username: followed_username.into(),
            following_username: following_username.into(),
        }
    }
}

impl Entity for Follow {
    const ENTITY_TYPE: &'static str = "Follow";

    fn pk(&self) -> String {
        keys::follow_pk(&self.followed_username)
    }

    fn sk(&self) -> String {
        keys::follow_sk(&self.following_username)
    }

    fn gsi1(&self) -> Option<IndexKey> {
        Some(IndexKey::new(
            keys::follow_gsi1_pk(&self.following_username),
            keys::follow_gsi1_sk(&self.followed_username),
        ))
    }

    fn write_attributes(&self, item: &mut Item) {
        item.insert(
            "followedUsername".to_string(),
            AttrValue::string(&self.followed_username),
        );
        item.insert(
            "followingUsername".to_string(),
            AttrValue::string(&self.following_username),
        );
    }

    fn read_attributes(item: &Item) -> Result<Self> {
        Ok(Self {
            followed_username: get_string(item, "followedUsername")?,
            following_username: get_string(item, "followingUsername")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_keys_overload_index() {
        let item = Follow::new("alice", "bob").to_item();

        assert_eq!(item["PK"].as_s().unwrap(), "FOLLOW#alice");
        assert_eq!(item["SK"].as_s().unwrap(), "FOLLOWER#bob");
        assert_eq!(item["GSI1PK"].as_s().unwrap(), "FOLLOW#bob");
        assert_eq!(item["GSI1SK"].as_s().unwrap(), "FOLLOWED#alice");
    }

    #[test]
    fn test_follow_round_trip() {
        let follow = Follow::new("alice", "bob");
        let item = follow.to_item();
        let parsed = Follow::from_item(Some(&item)).unwrap();

        assert_eq!(parsed, follow);
        assert_eq!(parsed.to_item(), item);
    }
}
