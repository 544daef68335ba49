//! Paginated review-feed reader for the seller portal.
//!
//! One call fetches one page. The reader keeps no state across calls; the
//! pagination cursor lives entirely in the call parameters, so the same
//! client can serve independent sweeps without cross-contamination.

use std::fs;
use std::path::{Path, PathBuf};

use reviewguard_core::{PageCursor, Review};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("failed to load session cookies from {path}: {reason}")]
    Cookies { path: PathBuf, reason: String },
}

/// One page of the reverse-chronological feed.
#[derive(Debug)]
pub struct FeedPage {
    /// Newest-first, per server contract.
    pub reviews: Vec<Review>,
    pub has_next: bool,
    /// Cursor for the next page; meaningful only when `has_next` is set.
    pub cursor: Option<PageCursor>,
}

/// Review feed collaborator as seen by the sync engine.
pub trait ReviewFeed {
    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<FeedPage, FeedError>;
}

#[derive(Serialize)]
struct Sort<'a> {
    sort_by: &'a str,
    sort_direction: &'a str,
}

#[derive(Serialize)]
struct Filter<'a> {
    interaction_status: [&'a str; 1],
}

#[derive(Serialize)]
struct ListRequest<'a> {
    pagination_last_timestamp: Option<&'a str>,
    pagination_last_uuid: Option<&'a str>,
    with_counters: bool,
    sort: Sort<'a>,
    company_type: &'a str,
    filter: Filter<'a>,
    company_id: &'a str,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Vec<Review>,
    #[serde(rename = "hasNext", default)]
    has_next: bool,
    #[serde(default)]
    pagination_last_timestamp: String,
    #[serde(default)]
    pagination_last_uuid: String,
}

/// HTTP reader for the seller portal's review listing endpoint.
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
    company_id: String,
    cookie_header: String,
}

impl FeedClient {
    /// `base_url` like `https://seller.example.com` (no trailing slash).
    pub fn new(base_url: &str, company_id: String, cookie_header: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/api/v3/review/list", base_url.trim_end_matches('/')),
            company_id,
            cookie_header,
        }
    }
}

impl ReviewFeed for FeedClient {
    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<FeedPage, FeedError> {
        let request = ListRequest {
            pagination_last_timestamp: cursor.map(|c| c.last_timestamp.as_str()),
            pagination_last_uuid: cursor.map(|c| c.last_uuid.as_str()),
            with_counters: false,
            sort: Sort {
                sort_by: "PUBLISHED_AT",
                sort_direction: "DESC",
            },
            company_type: "seller",
            filter: Filter {
                interaction_status: ["NOT_VIEWED"],
            },
            company_id: &self.company_id,
        };

        let resp = self
            .http
            .post(&self.url)
            .header("Cookie", &self.cookie_header)
            .header("x-o3-app-name", "seller-ui")
            .header("x-o3-company-id", &self.company_id)
            .header("x-o3-page-type", "review")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let list: ListResponse = resp.json().await?;
        debug!(
            count = list.result.len(),
            has_next = list.has_next,
            last_timestamp = %list.pagination_last_timestamp,
            "fetched feed page"
        );

        let cursor = list.has_next.then(|| PageCursor {
            last_timestamp: list.pagination_last_timestamp,
            last_uuid: list.pagination_last_uuid,
        });
        Ok(FeedPage {
            reviews: list.result,
            has_next: list.has_next,
            cursor,
        })
    }
}

#[derive(Deserialize)]
struct SessionCookie {
    name: String,
    value: String,
}

/// Assemble a `Cookie` header value from a JSON file of `[{name, value}]`
/// session cookies (provisioned out of band).
pub fn cookie_header_from_file(path: &Path) -> Result<String, FeedError> {
    let raw = fs::read_to_string(path).map_err(|e| FeedError::Cookies {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let cookies: Vec<SessionCookie> =
        serde_json::from_str(&raw).map_err(|e| FeedError::Cookies {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; "))
}
