//! Wire message types for the `level2` feed channel

pub mod level2;
pub mod subscribe;

pub use level2::{BookSnapshot, BookUpdate, Change, FeedMessage};
pub use subscribe::{LEVEL2_CHANNEL, SubscribeRequest};
