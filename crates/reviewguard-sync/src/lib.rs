//! Sync layer: pulls the paginated review feed since the last checkpoint and
//! pushes quarantine price updates to the seller API.

pub mod engine;
pub mod feed;
pub mod quarantine;

pub use engine::{Sweep, sync_since};
pub use feed::{FeedClient, FeedError, FeedPage, ReviewFeed, cookie_header_from_file};
pub use quarantine::{
    MAX_BATCH, OfferUpdater, PriceUpdate, PricingClient, PricingError, QuarantineOutcome,
    RejectedOffer, UpdateReport, submit_quarantine,
};
