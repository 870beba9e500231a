use serde_derive::{Deserialize, Serialize};

use crate::attr::{AttrValue, Item, get_string};
use crate::error::Result;
use crate::id::IdGenerator;
use crate::keys;
use crate::model::Entity;

/// A comment on a tweet. Comments of one tweet share a partition and sort
/// by their time-ordered id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub commenting_username: String,
    pub tweet_id: String,
    pub comment_id: String,
    pub content: String,
}

impl Comment {
    pub fn create(
        commenting_username: impl Into<String>,
        tweet_id: impl Into<String>,
        content: impl Into<String>,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self::new(commenting_username, tweet_id, content, ids.next_id())
    }

    pub fn new(
        commenting_username: impl Into<String>,
        tweet_id: impl Into<String>,
        content: impl Into<String>,
        comment_id: impl Into<String>,
    ) -> Self {
        Self {
            commenting_username: commenting_username.into(),
            tweet_id: tweet_id.into(),
            comment_id: comment_id.into(),
            content: content.into(),
        }
    }
}

impl Entity for Comment {
    const ENTITY_TYPE: &'static str = "Comment";

    fn pk(&self) -> String {
        keys::comment_pk(&self.tweet_id)
    }

    fn sk(&self) -> String {
        keys::comment_sk(&self.comment_id)
    }

    fn write_attributes(&self, item: &mut Item) {
        item.insert(
            "commentingUsername".to_string(),
            AttrValue::string(&self.commenting_username),
        );
        item.insert("tweetId".to_string(), AttrValue::string(&self.tweet_id));
        item.insert("commentId".to_string(), AttrValue::string(&self.comment_id));
        item.insert("content".to_string(), AttrValue::string(&self.content));
    }

    fn read_attributes(item: &Item) -> Result<Self> {
        Ok(Self {
            commenting_username: get_string(item, "commentingUsername")?,
            tweet_id: get_string(item, "tweetId")?,
            comment_id: get_string(item, "commentId")?,
            content: get_string(item, "content")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_round_trip() {
        let comment = Comment::new("carol", "t1", "nice one", "c1");
        let item = comment.to_item();

        assert_eq!(item["PK"].as_s().unwrap(), "UTC#t1");
        assert_eq!(item["SK"].as_s().unwrap(), "COMMENT#c1");

        let parsed = Comment::from_item(Some(&item)).unwrap();
        assert_eq!(parsed, comment);
        assert_eq!(parsed.to_item(), item);
    }

    #[test]
    fn test_missing_content_field() {
        let mut item = Comment::new("carol", "t1", "nice one", "c1").to_item();
        item.remove("content");
        assert!(Comment::from_item(Some(&item)).is_err());
    }
}
