use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tweetgraph::attr::Item;
use tweetgraph::keys::TableKey;
use tweetgraph::query::KeyQuery;
use tweetgraph::transaction::{Condition, WriteOp};
use tweetgraph::{
    Config, Entity, Follow, GraphError, InMemoryStore, Result, SequentialIds, Store, Tweet,
    TweetGraph, User,
};

fn setup() -> (TweetGraph, InMemoryStore) {
    let store = InMemoryStore::new();
    let graph = TweetGraph::new(Arc::new(store.clone()), &Config::new("Twitter"))
        .with_id_generator(Arc::new(SequentialIds::new()));
    (graph, store)
}

#[tokio::test]
async fn create_user_twice_conflicts() {
    let (graph, store) = setup();

    let user = graph.create_user("alice").await.unwrap();
    assert_eq!(user, User::with_counts("alice", 0, 0));

    let err = graph.create_user("alice").await.unwrap_err();
    assert_eq!(
        err,
        GraphError::AlreadyExists {
            entity_type: "User",
            key: "alice".to_string(),
        }
    );
    assert_eq!(err.status_code(), 409);
    assert_eq!(store.item_count().await, 1);
    assert_eq!(graph.get_user("alice").await.unwrap(), user);
}

#[tokio::test]
async fn like_increments_counter() {
    let (graph, _) = setup();

    let tweet = graph.create_tweet("alice", "hello").await.unwrap();
    assert_eq!(tweet.likes_count, 0);
    assert_eq!(tweet.comment_count, 0);

    let like = graph.like_tweet(&tweet, "bob").await.unwrap();
    assert_eq!(like.tweet_id, tweet.tweet_id);
    assert_eq!(like.liking_username, "bob");

    let stored = graph.get_tweet("alice", &tweet.tweet_id).await.unwrap();
    assert_eq!(stored.likes_count, 1);
    assert_eq!(stored.comment_count, 0);
    assert_eq!(stored.text, "hello");
}

#[tokio::test]
async fn second_like_by_same_user_is_rejected() {
    let (graph, _) = setup();
    let tweet = graph.create_tweet("alice", "hello").await.unwrap();

    graph.like_tweet(&tweet, "bob").await.unwrap();
    let err = graph.like_tweet(&tweet, "bob").await.unwrap_err();

    assert_eq!(
        err,
        GraphError::AlreadyLiked {
            tweet_id: tweet.tweet_id.clone(),
            username: "bob".to_string(),
        }
    );
    assert_eq!(graph.list_likes_for_tweet(&tweet.tweet_id).await.unwrap().len(), 1);
    let stored = graph.get_tweet("alice", &tweet.tweet_id).await.unwrap();
    assert_eq!(stored.likes_count, 1);
}

#[tokio::test]
async fn like_on_missing_tweet_writes_nothing() {
    let (graph, store) = setup();
    let ghost = Tweet::reference("alice", "never-created");

    let err = graph.like_tweet(&ghost, "bob").await.unwrap_err();

    assert_eq!(
        err,
        GraphError::TweetNotFound {
            tweet_id: "never-created".to_string()
        }
    );
    assert_eq!(err.status_code(), 404);
    assert!(graph.list_likes_for_tweet("never-created").await.unwrap().is_empty());
    assert_eq!(store.item_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_converge() {
    const LIKERS: usize = 64;
    let (graph, _) = setup();
    let tweet = graph.create_tweet("alice", "popular").await.unwrap();

    let mut handles = Vec::with_capacity(LIKERS);
    for i in 0..LIKERS {
        let graph = graph.clone();
        let tweet = tweet.clone();
        handles.push(tokio::spawn(async move {
            graph.like_tweet(&tweet, &format!("user{i}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = graph.get_tweet("alice", &tweet.tweet_id).await.unwrap();
    assert_eq!(stored.likes_count, LIKERS as u64);
    assert_eq!(
        graph.list_likes_for_tweet(&tweet.tweet_id).await.unwrap().len(),
        LIKERS
    );
}

#[tokio::test]
async fn likes_listed_most_recent_first() {
    let (graph, _) = setup();
    let tweet = graph.create_tweet("alice", "hello").await.unwrap();

    // Usernames sort opposite to like time, so the base-table order would be wrong.
    for user in ["amy", "bob", "cat", "dan"] {
        graph.like_tweet(&tweet, user).await.unwrap();
    }

    let likes = graph.list_likes_for_tweet(&tweet.tweet_id).await.unwrap();
    let users: Vec<&str> = likes.iter().map(|l| l.liking_username.as_str()).collect();
    assert_eq!(users, vec!["dan", "cat", "bob", "amy"]);
    assert!(likes.windows(2).all(|w| w[0].like_id > w[1].like_id));
}

#[tokio::test]
async fn comments_listed_most_recent_first() {
    let (graph, _) = setup();
    let tweet = graph.create_tweet("alice", "hello").await.unwrap();

    for (i, user) in ["bob", "carol", "bob"].into_iter().enumerate() {
        graph
            .comment_tweet(&tweet, user, &format!("comment {i}"))
            .await
            .unwrap();
    }

    let comments = graph.list_comments_for_tweet(&tweet.tweet_id).await.unwrap();
    let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["comment 2", "comment 1", "comment 0"]);
    assert!(comments.windows(2).all(|w| w[0].comment_id > w[1].comment_id));

    let stored = graph.get_tweet("alice", &tweet.tweet_id).await.unwrap();
    assert_eq!(stored.comment_count, 3);
    assert_eq!(stored.likes_count, 0);
}

#[tokio::test]
async fn tweets_for_user_takes_raw_username() {
    let (graph, _) = setup();
    let tweet = graph.create_tweet("alice", "hello").await.unwrap();
    graph.like_tweet(&tweet, "bob").await.unwrap();

    let tweets = graph.get_tweets_for_user("alice").await.unwrap();
    assert_eq!(tweets.len(), 1);
    assert_eq!(tweets[0].likes_count, 1);

    // A pre-tagged value is just another username.
    assert!(graph.get_tweets_for_user("UT#alice").await.unwrap().is_empty());
    assert!(graph.get_tweets_for_user("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn get_missing_tweet_is_not_found() {
    let (graph, _) = setup();
    let err = graph.get_tweet("alice", "missing").await.unwrap_err();
    assert!(matches!(
        err,
        GraphError::NotFound {
            entity_type: "Tweet",
            ..
        }
    ));
}

#[tokio::test]
async fn stored_rows_round_trip() {
    let (graph, store) = setup();
    let tweet = graph.create_tweet("alice", "hello").await.unwrap();
    graph.like_tweet(&tweet, "bob").await.unwrap();

    let stored = graph.get_tweet("alice", &tweet.tweet_id).await.unwrap();
    let raw = store.get(&stored.key()).await.unwrap().unwrap();
    assert_eq!(stored.to_item(), raw);
    assert_eq!(Tweet::from_item(Some(&raw)).unwrap().to_item(), raw);
}

#[tokio::test]
async fn follow_moves_both_counters() {
    let (graph, _) = setup();
    graph.create_user("alice").await.unwrap();
    graph.create_user("bob").await.unwrap();
    graph.create_user("carol").await.unwrap();

    graph.follow_user("alice", "bob").await.unwrap();
    graph.follow_user("alice", "carol").await.unwrap();
    graph.follow_user("carol", "bob").await.unwrap();

    let alice = graph.get_user("alice").await.unwrap();
    let bob = graph.get_user("bob").await.unwrap();
    assert_eq!(alice, User::with_counts("alice", 2, 0));
    assert_eq!(bob, User::with_counts("bob", 0, 2));

    let followers = graph.list_followers("alice").await.unwrap();
    assert_eq!(
        followers,
        vec![Follow::new("alice", "carol"), Follow::new("alice", "bob")]
    );

    let following = graph.list_following("bob").await.unwrap();
    assert_eq!(
        following,
        vec![Follow::new("carol", "bob"), Follow::new("alice", "bob")]
    );
}

#[tokio::test]
async fn follow_twice_or_unknown_user() {
    let (graph, store) = setup();
    graph.create_user("alice").await.unwrap();
    graph.create_user("bob").await.unwrap();
    graph.follow_user("alice", "bob").await.unwrap();

    assert_eq!(
        graph.follow_user("alice", "bob").await.unwrap_err(),
        GraphError::AlreadyFollowing {
            follower: "bob".to_string(),
            followed: "alice".to_string(),
        }
    );
    assert_eq!(
        graph.follow_user("ghost", "bob").await.unwrap_err(),
        GraphError::NotFound {
            entity_type: "User",
            key: "ghost".to_string(),
        }
    );
    assert_eq!(
        graph.follow_user("alice", "ghost").await.unwrap_err(),
        GraphError::NotFound {
            entity_type: "User",
            key: "ghost".to_string(),
        }
    );

    assert_eq!(graph.get_user("alice").await.unwrap().follower_count, 1);
    assert_eq!(graph.get_user("bob").await.unwrap().following_count, 1);
    assert_eq!(store.item_count().await, 3);
}

/// Delays every call before handing it to an in-memory table.
struct SlowStore {
    inner: InMemoryStore,
    delay: Duration,
}

#[async_trait]
impl Store for SlowStore {
    async fn get(&self, key: &TableKey) -> Result<Option<Item>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn put(&self, item: Item, condition: Condition) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(item, condition).await
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.transact_write(ops).await
    }

    async fn query(&self, query: &KeyQuery) -> Result<Vec<Item>> {
        tokio::time::sleep(self.delay).await;
        self.inner.query(query).await
    }
}

#[tokio::test]
async fn deadline_aborts_storage_call() {
    let inner = InMemoryStore::new();
    let store = SlowStore {
        inner: inner.clone(),
        delay: Duration::from_millis(300),
    };
    let config = Config::new("Twitter").with_timeout(Duration::from_millis(20));
    let graph = TweetGraph::new(Arc::new(store), &config);

    let err = graph.create_user("alice").await.unwrap_err();
    assert_eq!(
        err,
        GraphError::Timeout {
            operation: "create_user"
        }
    );
    assert_eq!(inner.item_count().await, 0);

    let patient = graph.with_timeout(Duration::from_secs(5));
    patient.create_user("alice").await.unwrap();
    assert!(matches!(
        graph.list_likes_for_tweet("t1").await,
        Err(GraphError::Timeout {
            operation: "list_likes_for_tweet"
        })
    ));
}
