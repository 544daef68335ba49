//! Quarantine submission: deduplicated offer ids go downstream as bounded
//! price-update batches.
//!
//! A failed batch is reported and skipped; the remaining batches are still
//! attempted, so one bad downstream call cannot sink the whole set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Documented downstream limit per bulk-update call.
pub const MAX_BATCH: usize = 1000;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("price update request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("pricing endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// One `(offer, new value)` pair for the bulk-update endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    pub offer_id: String,
    pub price: String,
}

/// An offer the downstream endpoint refused to update.
#[derive(Debug, Clone)]
pub struct RejectedOffer {
    pub offer_id: String,
    pub reason: String,
}

/// Per-batch result as reported by the downstream collaborator.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<String>,
    pub rejected: Vec<RejectedOffer>,
}

/// Downstream bulk-update collaborator.
pub trait OfferUpdater {
    async fn update_prices(&self, items: &[PriceUpdate]) -> Result<UpdateReport, PricingError>;
}

/// Outcome of submitting one run's quarantine set.
#[derive(Debug, Default)]
pub struct QuarantineOutcome {
    /// Unique offers handed to the updater across all batches.
    pub submitted: usize,
    pub updated: Vec<String>,
    pub rejected: Vec<RejectedOffer>,
    pub failed_batches: usize,
}

/// Submit a deduplicated quarantine set in batches of at most [`MAX_BATCH`].
pub async fn submit_quarantine<U: OfferUpdater>(
    updater: &U,
    offer_ids: BTreeSet<String>,
    price: &str,
) -> QuarantineOutcome {
    let items: Vec<PriceUpdate> = offer_ids
        .into_iter()
        .map(|offer_id| PriceUpdate {
            offer_id,
            price: price.to_string(),
        })
        .collect();

    let mut outcome = QuarantineOutcome {
        submitted: items.len(),
        ..QuarantineOutcome::default()
    };

    for batch in items.chunks(MAX_BATCH) {
        match updater.update_prices(batch).await {
            Ok(report) => {
                info!(
                    batch = batch.len(),
                    updated = report.updated.len(),
                    rejected = report.rejected.len(),
                    "quarantine batch submitted"
                );
                outcome.updated.extend(report.updated);
                outcome.rejected.extend(report.rejected);
            }
            Err(e) => {
                warn!(error = %e, batch = batch.len(), "quarantine batch failed, continuing");
                outcome.failed_batches += 1;
            }
        }
    }

    outcome
}

#[derive(Serialize)]
struct PriceImportRequest<'a> {
    prices: &'a [PriceUpdate],
}

#[derive(Deserialize)]
struct PriceImportResponse {
    #[serde(default)]
    result: Vec<PriceImportEntry>,
}

#[derive(Deserialize)]
struct PriceImportEntry {
    offer_id: String,
    #[serde(default)]
    updated: bool,
    #[serde(default)]
    errors: Vec<EntryError>,
}

#[derive(Deserialize)]
struct EntryError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// HTTP client for the seller API's bulk price-import endpoint.
pub struct PricingClient {
    http: reqwest::Client,
    url: String,
    client_id: String,
    api_key: String,
}

impl PricingClient {
    /// `base_url` like `https://api-seller.example.com` (no trailing slash).
    pub fn new(base_url: &str, client_id: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!(
                "{}/v1/product/import/prices",
                base_url.trim_end_matches('/')
            ),
            client_id,
            api_key,
        }
    }
}

impl OfferUpdater for PricingClient {
    async fn update_prices(&self, items: &[PriceUpdate]) -> Result<UpdateReport, PricingError> {
        let resp = self
            .http
            .post(&self.url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(&PriceImportRequest { prices: items })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PricingError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PriceImportResponse = resp.json().await?;
        let mut report = UpdateReport::default();
        for entry in parsed.result {
            if entry.updated {
                report.updated.push(entry.offer_id);
            } else {
                let reason = entry
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                report.rejected.push(RejectedOffer {
                    offer_id: entry.offer_id,
                    reason,
                });
            }
        }
        Ok(report)
    }
}
