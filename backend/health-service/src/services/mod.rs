pub mod broadcast;

pub use broadcast::{EventPublisher, FeedEvent, FeedHub};
