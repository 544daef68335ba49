//! Sweep engine: walks the newest-first feed back to the checkpoint.
//!
//! The candidate next checkpoint is the timestamp of the first new record
//! seen during the sweep (the newest, since records arrive newest-first),
//! captured once and never re-updated. The caller persists it only after the
//! whole downstream pipeline for the sweep's records has completed; that
//! ordering is what makes an interrupted run safe to re-run.

use chrono::{DateTime, Utc};
use reviewguard_core::{PageCursor, Review};
use tracing::{info, warn};

use crate::feed::{FeedError, ReviewFeed};

/// Result of one "fetch everything since checkpoint" walk.
#[derive(Debug)]
pub struct Sweep {
    /// New records, in fetch order (newest first).
    pub reviews: Vec<Review>,
    /// Equals the input checkpoint when no new records were found or when
    /// the sweep failed partway; never moves backwards.
    pub next_checkpoint: DateTime<Utc>,
    /// Set when a page fetch failed mid-sweep. Records collected before the
    /// failure are still in `reviews`, but the checkpoint must not advance:
    /// the gap back to `next_checkpoint` has not been covered.
    pub failure: Option<FeedError>,
}

/// Pull every record strictly newer than `checkpoint`.
///
/// Stops at the first record at or before the checkpoint, or when the server
/// reports no further pages. Each sweep starts from a fresh cursor; nothing
/// carries over from a previous sweep.
pub async fn sync_since<F: ReviewFeed>(feed: &F, checkpoint: DateTime<Utc>) -> Sweep {
    let mut reviews = Vec::new();
    let mut candidate: Option<DateTime<Utc>> = None;
    let mut cursor: Option<PageCursor> = None;

    loop {
        let page = match feed.fetch_page(cursor.as_ref()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    error = %e,
                    collected = reviews.len(),
                    "page fetch failed mid-sweep, keeping previous checkpoint"
                );
                return Sweep {
                    reviews,
                    next_checkpoint: checkpoint,
                    failure: Some(e),
                };
            }
        };

        let mut reached_processed = false;
        for review in page.reviews {
            let Some(published_at) = review.published_at_utc() else {
                warn!(
                    id = %review.id,
                    published_at = %review.published_at,
                    "unparsable publish timestamp, skipping record"
                );
                continue;
            };
            if published_at <= checkpoint {
                reached_processed = true;
                break;
            }
            if candidate.is_none() {
                candidate = Some(published_at);
            }
            reviews.push(review);
        }

        if reached_processed || !page.has_next {
            break;
        }
        cursor = page.cursor;
        if cursor.is_none() {
            // Server said more pages but echoed no cursor; nothing to ask for.
            warn!("feed reported has_next without a cursor, ending sweep");
            break;
        }
    }

    let next_checkpoint = candidate.unwrap_or(checkpoint);
    info!(
        fetched = reviews.len(),
        %checkpoint,
        %next_checkpoint,
        "sweep complete"
    );
    Sweep {
        reviews,
        next_checkpoint,
        failure: None,
    }
}
