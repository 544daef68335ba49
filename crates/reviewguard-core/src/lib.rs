pub mod review;
pub mod sentiment;

pub use review::{PageCursor, Product, Review, ReviewText};
pub use sentiment::Sentiment;
