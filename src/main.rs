use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetgraph::{Config, DynamoStore, GraphError, Tweet, TweetGraph};

/// Drive the social-graph table from the command line.
///
/// Settings come from the environment (`TABLE_NAME`, `GSI1_INDEX_NAME`,
/// `AWS_REGION`, `DYNAMODB_ENDPOINT_URL`, `OPERATION_TIMEOUT_MS`); flags
/// override them.
#[derive(Parser, Debug)]
#[command(name = "tweetgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Table holding every entity
    #[arg(long)]
    table_name: Option<String>,

    /// Overloaded secondary index
    #[arg(long)]
    index_name: Option<String>,

    #[arg(long)]
    region: Option<String>,

    /// e.g. http://localhost:8000 for DynamoDB Local
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Per-operation deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the table and GSI1 if they do not exist (DynamoDB Local)
    CreateTable,
    CreateUser { username: String },
    GetUser { username: String },
    CreateTweet { username: String, text: String },
    GetTweet { username: String, tweet_id: String },
    ListTweets { username: String },
    Like {
        username: String,
        tweet_id: String,
        liking_username: String,
    },
    ListLikes { tweet_id: String },
    Comment {
        username: String,
        tweet_id: String,
        commenting_username: String,
        content: String,
    },
    ListComments { tweet_id: String },
    /// `follower` starts following `username`
    Follow { username: String, follower: String },
    ListFollowers { username: String },
    ListFollowing { username: String },
}

impl Cli {
    /// Apply the flags that were given on top of `base`.
    fn config(&self, base: Config) -> Config {
        let mut config = base;
        if let Some(table_name) = &self.table_name {
            config.table_name = table_name.clone();
        }
        if let Some(index_name) = &self.index_name {
            config.index_name = index_name.clone();
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config = config.with_endpoint(endpoint_url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        config
    }
}

/// Wrap a result as `{ "<name>": <value> }`.
fn envelope<T: Serialize>(name: &str, value: &T) -> serde_json::Result<serde_json::Value> {
    let mut body = serde_json::Map::new();
    body.insert(name.to_string(), serde_json::to_value(value)?);
    Ok(serde_json::Value::Object(body))
}

async fn run(
    graph: &TweetGraph,
    store: &DynamoStore,
    command: Command,
) -> anyhow::Result<serde_json::Value> {
    let body = match command {
        Command::CreateTable => {
            let created = store.create_table_if_missing().await?;
            json!({ "table": store.table_name(), "created": created })
        }
        Command::CreateUser { username } => envelope("user", &graph.create_user(&username).await?)?,
        Command::GetUser { username } => envelope("user", &graph.get_user(&username).await?)?,
        Command::CreateTweet { username, text } => {
            envelope("tweet", &graph.create_tweet(&username, &text).await?)?
        }
        Command::GetTweet { username, tweet_id } => {
            envelope("tweet", &graph.get_tweet(&username, &tweet_id).await?)?
        }
        Command::ListTweets { username } => {
            envelope("tweets", &graph.get_tweets_for_user(&username).await?)?
        }
        Command::Like {
            username,
            tweet_id,
            liking_username,
        } => {
            let tweet = Tweet::reference(username, tweet_id);
            envelope("like", &graph.like_tweet(&tweet, &liking_username).await?)?
        }
        Command::ListLikes { tweet_id } => {
            envelope("likes", &graph.list_likes_for_tweet(&tweet_id).await?)?
        }
        Command::Comment {
            username,
            tweet_id,
            commenting_username,
            content,
        } => {
            let tweet = Tweet::reference(username, tweet_id);
            let comment = graph
                .comment_tweet(&tweet, &commenting_username, &content)
                .await?;
            envelope("comment", &comment)?
        }
        Command::ListComments { tweet_id } => {
            envelope("comments", &graph.list_comments_for_tweet(&tweet_id).await?)?
        }
        Command::Follow { username, follower } => {
            envelope("follow", &graph.follow_user(&username, &follower).await?)?
        }
        Command::ListFollowers { username } => {
            envelope("followers", &graph.list_followers(&username).await?)?
        }
        Command::ListFollowing { username } => {
            envelope("following", &graph.list_following(&username).await?)?
        }
    };
    Ok(body)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tweetgraph=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config(Config::from_env());
    let store = DynamoStore::connect(&config).await;
    let graph = TweetGraph::new(Arc::new(store.clone()), &config);

    match run(&graph, &store, cli.command).await {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let status = err
                .downcast_ref::<GraphError>()
                .map(GraphError::status_code)
                .unwrap_or(500);
            tracing::error!(status, error = %err, "Command failed");
            eprintln!("{}", json!({ "status": status, "message": err.to_string() }));
            ExitCode::FAILURE
        }
    }
}
