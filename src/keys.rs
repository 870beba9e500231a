//! Key codec for the single-table layout.
//!
//! Pure functions mapping identity fields to `PK`/`SK` and `GSI1PK`/`GSI1SK`.
//! Every key is `{TAG}#{value}`; the tags are distinct so no two entity
//! types can produce the same (PK, SK) pair. Keys are never parsed back,
//! entities carry their identity in plain attributes.

use crate::attr::{AttrValue, Item, get_string};
use crate::error::Result;

// ============================================================================
// Attribute names
// ============================================================================

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1PK: &str = "GSI1PK";
pub const GSI1SK: &str = "GSI1SK";

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const USER_TWEET_PREFIX: &str = "UT#";
pub const TWEET_COMMENTS_PREFIX: &str = "UTC#";
pub const COMMENT_PREFIX: &str = "COMMENT#";
pub const TWEET_LIKES_PREFIX: &str = "UL#";
pub const LIKE_PREFIX: &str = "LIKE#";
pub const FOLLOW_PREFIX: &str = "FOLLOW#";
pub const FOLLOWER_PREFIX: &str = "FOLLOWER#";
pub const FOLLOWED_PREFIX: &str = "FOLLOWED#";

/// Primary key of a base-table row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub pk: String,
    pub sk: String,
}

impl TableKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Read the key attributes back out of a full item.
    pub fn from_item(item: &Item) -> Result<Self> {
        Ok(Self::new(get_string(item, PK)?, get_string(item, SK)?))
    }

    /// The key as a two-attribute item, as used by point reads and updates.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(PK.to_string(), AttrValue::string(&self.pk));
        item.insert(SK.to_string(), AttrValue::string(&self.sk));
        item
    }
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.pk, self.sk)
    }
}

/// Key of a row in the `GSI1` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub pk: String,
    pub sk: String,
}

impl IndexKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

// ============================================================================
// User keys
// ============================================================================

/// Pattern: `USER#<username>`
pub fn user_pk(username: &str) -> String {
    format!("{USER_PREFIX}{username}")
}

/// Pattern: `USER#<username>` (same as PK, one row per user)
pub fn user_sk(username: &str) -> String {
    format!("{USER_PREFIX}{username}")
}

// ============================================================================
// Tweet keys
// ============================================================================

/// Pattern: `UT#<username>`. All of a user's tweets share this partition.
pub fn tweet_pk(username: &str) -> String {
    format!("{USER_TWEET_PREFIX}{username}")
}

/// Pattern: `UT#<tweet_id>`
pub fn tweet_sk(tweet_id: &str) -> String {
    format!("{USER_TWEET_PREFIX}{tweet_id}")
}

// ============================================================================
// Comment keys
// ============================================================================

/// Pattern: `UTC#<tweet_id>`
pub fn comment_pk(tweet_id: &str) -> String {
    format!("{TWEET_COMMENTS_PREFIX}{tweet_id}")
}

/// Pattern: `COMMENT#<comment_id>`
pub fn comment_sk(comment_id: &str) -> String {
    format!("{COMMENT_PREFIX}{comment_id}")
}

// ============================================================================
// Like keys
// ============================================================================

/// Pattern: `UL#<tweet_id>`
pub fn like_pk(tweet_id: &str) -> String {
    format!("{TWEET_LIKES_PREFIX}{tweet_id}")
}

/// Pattern: `LIKE#<liking_username>`
///
/// Keyed by user so the base table admits one like per (tweet, user).
pub fn like_sk(liking_username: &str) -> String {
    format!("{LIKE_PREFIX}{liking_username}")
}

/// Pattern: `UL#<tweet_id>` (same partition as the base table)
pub fn like_gsi1_pk(tweet_id: &str) -> String {
    like_pk(tweet_id)
}

/// Pattern: `LIKE#<like_id>`
///
/// Re-sorts the same rows by the time-ordered like id.
pub fn like_gsi1_sk(like_id: &str) -> String {
    format!("{LIKE_PREFIX}{like_id}")
}

// ============================================================================
// Follow keys
// ============================================================================

/// Pattern: `FOLLOW#<followed>`. Partition of everyone following `followed`.
pub fn follow_pk(followed: &str) -> String {
    format!("{FOLLOW_PREFIX}{followed}")
}

/// Pattern: `FOLLOWER#<follower>`
pub fn follow_sk(follower: &str) -> String {
    format!("{FOLLOWER_PREFIX}{follower}")
}

/// Pattern: `FOLLOW#<follower>`. Index partition of everyone `follower` follows.
pub fn follow_gsi1_pk(follower: &str) -> String {
    format!("{FOLLOW_PREFIX}{follower}")
}

/// Pattern: `FOLLOWED#<followed>`
pub fn follow_gsi1_sk(followed: &str) -> String {
    format!("{FOLLOWED_PREFIX}{followed}")
}
