//! The record types sharing the table.

mod comment;
mod follow;
mod like;
mod tweet;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use like::Like;
pub use tweet::{COMMENT_COUNT, LIKES_COUNT, Tweet};
pub use user::{FOLLOWER_COUNT, FOLLOWING_COUNT, User};
