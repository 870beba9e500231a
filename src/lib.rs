//! Single-table DynamoDB access layer for a small social graph.
//!
//! Users, tweets, likes, comments and follow edges share one table keyed by
//! `PK`/`SK` plus one overloaded index, `GSI1`. Denormalized counters are only
//! moved by the transaction that writes the matching child row.

pub mod agent;
pub mod attr;
pub mod config;
pub mod entities;
pub mod error;
pub mod id;
pub mod keys;
pub mod model;
pub mod query;
pub mod store;
pub mod transaction;

pub use agent::TweetGraph;
pub use config::Config;
pub use entities::{Comment, Follow, Like, Tweet, User};
pub use error::{GraphError, Result};
pub use id::{IdGenerator, SequentialIds, TimeOrderedIds};
pub use model::Entity;
pub use store::{DynamoStore, InMemoryStore, Store};
