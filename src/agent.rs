use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::entities::{
    COMMENT_COUNT, Comment, FOLLOWER_COUNT, FOLLOWING_COUNT, Follow, LIKES_COUNT, Like, Tweet, User,
};
use crate::error::{GraphError, Result};
use crate::id::{IdGenerator, TimeOrderedIds};
use crate::keys::{self, TableKey};
use crate::model::Entity;
use crate::query::{KeyQuery, fetch};
use crate::store::Store;
use crate::transaction::WriteBatch;

/// One operation per use case over the shared table.
///
/// Holds no mutable state: clones share the store and the id generator, and
/// any number of operations may run concurrently.
#[derive(Clone)]
pub struct TweetGraph {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
    index_name: String,
    timeout: Duration,
}

impl TweetGraph {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            ids: Arc::new(TimeOrderedIds),
            index_name: config.index_name.clone(),
            timeout: config.operation_timeout,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// The same facade with a different per-operation deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Run `fut` under the deadline. Expiry drops the outstanding call.
    async fn within<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| GraphError::Timeout { operation })?
    }

    async fn read<E: Entity>(&self, operation: &'static str, key: TableKey) -> Result<E> {
        let item = self.within(operation, self.store.get(&key)).await?;
        match item {
            Some(item) => E::from_item(Some(&item)),
            None => Err(GraphError::NotFound {
                entity_type: E::ENTITY_TYPE,
                key: key.to_string(),
            }),
        }
    }

    async fn list<E: Entity>(&self, operation: &'static str, query: KeyQuery) -> Result<Vec<E>> {
        self.within(operation, fetch::<E>(self.store.as_ref(), &query))
            .await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(&self, username: &str) -> Result<User> {
        require("username", username)?;
        let user = User::new(username);

        let written = WriteBatch::new().put_new(&user).execute(self.store.as_ref());
        match self.within("create_user", written).await {
            Ok(()) => {
                tracing::debug!(%username, "User created");
                Ok(user)
            }
            Err(err) if err.failed_at(0) => Err(GraphError::AlreadyExists {
                entity_type: User::ENTITY_TYPE,
                key: username.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<User> {
        require("username", username)?;
        self.read("get_user", User::new(username).key()).await
    }

    // ------------------------------------------------------------------
    // Tweets
    // ------------------------------------------------------------------

    pub async fn create_tweet(&self, username: &str, text: &str) -> Result<Tweet> {
        require("username", username)?;
        let tweet = Tweet::create(username, text, self.ids.as_ref());

        let written = WriteBatch::new().put_new(&tweet).execute(self.store.as_ref());
        match self.within("create_tweet", written).await {
            Ok(()) => {
                tracing::debug!(%username, tweet_id = %tweet.tweet_id, "Tweet created");
                Ok(tweet)
            }
            Err(err) if err.failed_at(0) => Err(GraphError::AlreadyExists {
                entity_type: Tweet::ENTITY_TYPE,
                key: tweet.tweet_id,
            }),
            Err(err) => Err(err),
        }
    }

    pub async fn get_tweet(&self, username: &str, tweet_id: &str) -> Result<Tweet> {
        require("username", username)?;
        require("tweet id", tweet_id)?;
        self.read("get_tweet", Tweet::reference(username, tweet_id).key())
            .await
    }

    /// Every tweet of `username`, newest first. Takes the raw username.
    pub async fn get_tweets_for_user(&self, username: &str) -> Result<Vec<Tweet>> {
        require("username", username)?;
        let query = KeyQuery::table(keys::tweet_pk(username))
            .sort_begins_with(keys::USER_TWEET_PREFIX);
        self.list("get_tweets_for_user", query).await
    }

    // ------------------------------------------------------------------
    // Likes
    // ------------------------------------------------------------------

    /// Like `tweet` and bump its `likesCount` in one transaction.
    pub async fn like_tweet(&self, tweet: &Tweet, liking_username: &str) -> Result<Like> {
        require("username", liking_username)?;
        require("tweet id", &tweet.tweet_id)?;
        let like = Like::create(liking_username, &tweet.tweet_id, self.ids.as_ref());

        let written = WriteBatch::new()
            .put_new(&like)
            .increment(tweet, LIKES_COUNT)
            .execute(self.store.as_ref());
        match self.within("like_tweet", written).await {
            Ok(()) => {
                tracing::debug!(tweet_id = %tweet.tweet_id, %liking_username, "Tweet liked");
                Ok(like)
            }
            Err(err) if err.failed_at(1) => {
                tracing::warn!(tweet_id = %tweet.tweet_id, "Like rejected, tweet missing");
                Err(GraphError::TweetNotFound {
                    tweet_id: tweet.tweet_id.clone(),
                })
            }
            Err(err) if err.failed_at(0) => {
                tracing::warn!(
                    tweet_id = %tweet.tweet_id,
                    %liking_username,
                    "Like rejected, already liked"
                );
                Err(GraphError::AlreadyLiked {
                    tweet_id: tweet.tweet_id.clone(),
                    username: liking_username.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Likes of a tweet, most recent first.
    pub async fn list_likes_for_tweet(&self, tweet_id: &str) -> Result<Vec<Like>> {
        require("tweet id", tweet_id)?;
        let query = KeyQuery::index(&self.index_name, keys::like_gsi1_pk(tweet_id));
        self.list("list_likes_for_tweet", query).await
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Comment on `tweet` and bump its `commentCount` in one transaction.
    pub async fn comment_tweet(
        &self,
        tweet: &Tweet,
        commenting_username: &str,
        content: &str,
    ) -> Result<Comment> {
        require("username", commenting_username)?;
        require("tweet id", &tweet.tweet_id)?;
        let comment = Comment::create(
            commenting_username,
            &tweet.tweet_id,
            content,
            self.ids.as_ref(),
        );

        let written = WriteBatch::new()
            .put_new(&comment)
            .increment(tweet, COMMENT_COUNT)
            .execute(self.store.as_ref());
        match self.within("comment_tweet", written).await {
            Ok(()) => {
                tracing::debug!(
                    tweet_id = %tweet.tweet_id,
                    comment_id = %comment.comment_id,
                    "Comment created"
                );
                Ok(comment)
            }
            Err(err) if err.failed_at(1) => {
                tracing::warn!(tweet_id = %tweet.tweet_id, "Comment rejected, tweet missing");
                Err(GraphError::TweetNotFound {
                    tweet_id: tweet.tweet_id.clone(),
                })
            }
            Err(err) if err.failed_at(0) => Err(GraphError::AlreadyExists {
                entity_type: Comment::ENTITY_TYPE,
                key: comment.comment_id,
            }),
            Err(err) => Err(err),
        }
    }

    /// Comments of a tweet, most recent first.
    pub async fn list_comments_for_tweet(&self, tweet_id: &str) -> Result<Vec<Comment>> {
        require("tweet id", tweet_id)?;
        let query =
            KeyQuery::table(keys::comment_pk(tweet_id)).sort_begins_with(keys::COMMENT_PREFIX);
        self.list("list_comments_for_tweet", query).await
    }

    // ------------------------------------------------------------------
    // Follows
    // ------------------------------------------------------------------

    /// Record that `follower` follows `followed`, bumping both users'
    /// counters in the same transaction.
    pub async fn follow_user(&self, followed: &str, follower: &str) -> Result<Follow> {
        require("username", followed)?;
        require("username", follower)?;
        if followed == follower {
            return Err(GraphError::Validation(format!(
                "{follower} cannot follow themselves"
            )));
        }
        let follow = Follow::new(followed, follower);

        let written = WriteBatch::new()
            .put_new(&follow)
            .increment(&User::new(followed), FOLLOWER_COUNT)
            .increment(&User::new(follower), FOLLOWING_COUNT)
            .execute(self.store.as_ref());
        match self.within("follow_user", written).await {
            Ok(()) => {
                tracing::debug!(%followed, %follower, "Follow created");
                Ok(follow)
            }
            Err(err) if err.failed_at(1) => Err(GraphError::NotFound {
                entity_type: User::ENTITY_TYPE,
                key: followed.to_string(),
            }),
            Err(err) if err.failed_at(2) => Err(GraphError::NotFound {
                entity_type: User::ENTITY_TYPE,
                key: follower.to_string(),
            }),
            Err(err) if err.failed_at(0) => {
                tracing::warn!(%followed, %follower, "Follow rejected, already following");
                Err(GraphError::AlreadyFollowing {
                    follower: follower.to_string(),
                    followed: followed.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Everyone following `username`.
    pub async fn list_followers(&self, username: &str) -> Result<Vec<Follow>> {
        require("username", username)?;
        let query =
            KeyQuery::table(keys::follow_pk(username)).sort_begins_with(keys::FOLLOWER_PREFIX);
        self.list("list_followers", query).await
    }

    /// Everyone `username` follows.
    pub async fn list_following(&self, username: &str) -> Result<Vec<Follow>> {
        require("username", username)?;
        let query = KeyQuery::index(&self.index_name, keys::follow_gsi1_pk(username))
            .sort_begins_with(keys::FOLLOWED_PREFIX);
        self.list("list_following", query).await
    }
}

/// Key attributes may not be empty strings.
fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GraphError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
