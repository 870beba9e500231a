use thiserror::Error;

/// Errors surfaced by the access layer.
///
/// Every storage failure is returned verbatim; nothing here retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{entity_type} not found: {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },
    #[error("{entity_type} already exists: {key}")]
    AlreadyExists {
        entity_type: &'static str,
        key: String,
    },
    #[error("{username} already liked tweet {tweet_id}")]
    AlreadyLiked { tweet_id: String, username: String },
    #[error("{follower} already follows {followed}")]
    AlreadyFollowing { follower: String, followed: String },
    #[error("Tweet not found: {tweet_id}")]
    TweetNotFound { tweet_id: String },
    /// `failed_ops` holds the positions of the batch operations whose
    /// condition did not hold. Empty when the store gave no reasons.
    #[error("Conditional write failed (operations {failed_ops:?})")]
    ConditionalWriteFailed { failed_ops: Vec<usize> },
    #[error("No {0} record to decode")]
    MissingRecord(&'static str),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
}

impl GraphError {
    /// HTTP status an outer request shim should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            GraphError::NotFound { .. } | GraphError::TweetNotFound { .. } => 404,
            GraphError::AlreadyExists { .. }
            | GraphError::AlreadyLiked { .. }
            | GraphError::AlreadyFollowing { .. }
            | GraphError::ConditionalWriteFailed { .. } => 409,
            GraphError::Validation(_) => 400,
            GraphError::MissingRecord(_)
            | GraphError::Deserialization(_)
            | GraphError::StorageUnavailable(_)
            | GraphError::Timeout { .. } => 500,
        }
    }

    /// True when the batch operation at `index` was rejected by its condition.
    pub fn failed_at(&self, index: usize) -> bool {
        matches!(
            self,
            GraphError::ConditionalWriteFailed { failed_ops } if failed_ops.contains(&index)
        )
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
