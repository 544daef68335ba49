//! Review records as returned by the seller-portal listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text portion of a review. Any of the three fields may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewText {
    #[serde(default)]
    pub positive: String,
    #[serde(default)]
    pub negative: String,
    #[serde(default)]
    pub comment: String,
}

/// Offer the review was left against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub offer_id: String,
    #[serde(rename = "company_info.id", default)]
    pub company_id: String,
    #[serde(rename = "company_info.name", default)]
    pub company_name: String,
    #[serde(rename = "brand_info.id", default)]
    pub brand_id: String,
    #[serde(rename = "brand_info.name", default)]
    pub brand_name: String,
}

/// A single customer review pulled from the feed.
///
/// Immutable once fetched; owned by the sync engine for the duration of one
/// sweep and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub sku: String,
    pub text: ReviewText,
    /// RFC 3339 timestamp string as sent by the server.
    pub published_at: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub author_name: String,
    pub product: Product,
    #[serde(default)]
    pub uuid: String,
}

impl Review {
    /// Concatenated review text in the order the classifier prompt expects:
    /// negative, positive, comment.
    pub fn full_text(&self) -> String {
        [
            self.text.negative.as_str(),
            self.text.positive.as_str(),
            self.text.comment.as_str(),
        ]
        .join(" ")
    }

    /// Parse `published_at` into a UTC instant. `None` if the server sent a
    /// malformed timestamp.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Opaque pagination cursor echoed by the listing endpoint.
///
/// Valid only for the immediately following page request; a new sweep always
/// starts from a `None` cursor, never from where the previous sweep stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub last_timestamp: String,
    pub last_uuid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_joins_negative_positive_comment() {
        let review = Review {
            id: "1".into(),
            sku: "sku-1".into(),
            text: ReviewText {
                positive: "fast delivery".into(),
                negative: "broken on arrival".into(),
                comment: "would not buy again".into(),
            },
            published_at: "2024-01-10T03:00:00Z".into(),
            rating: 1,
            author_name: "a".into(),
            product: Product::default(),
            uuid: String::new(),
        };
        assert_eq!(
            review.full_text(),
            "broken on arrival fast delivery would not buy again"
        );
    }

    #[test]
    fn published_at_parses_nanosecond_precision() {
        let review = Review {
            id: "1".into(),
            sku: String::new(),
            text: ReviewText::default(),
            published_at: "2024-01-10T03:00:00.123456789Z".into(),
            rating: 5,
            author_name: String::new(),
            product: Product::default(),
            uuid: String::new(),
        };
        let ts = review.published_at_utc().unwrap();
        assert_eq!(ts.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn published_at_malformed_is_none() {
        let review = Review {
            id: "1".into(),
            sku: String::new(),
            text: ReviewText::default(),
            published_at: "yesterday".into(),
            rating: 5,
            author_name: String::new(),
            product: Product::default(),
            uuid: String::new(),
        };
        assert!(review.published_at_utc().is_none());
    }

    #[test]
    fn review_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "r-9",
            "text": {"negative": "bad"},
            "published_at": "2024-01-10T03:00:00Z",
            "product": {"offer_id": "offer-9"}
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.id, "r-9");
        assert_eq!(review.text.negative, "bad");
        assert!(review.text.positive.is_empty());
        assert_eq!(review.product.offer_id, "offer-9");
        assert_eq!(review.rating, 0);
    }

    #[test]
    fn product_reads_flattened_company_keys() {
        let json = r#"{
            "offer_id": "offer-1",
            "title": "Kettle",
            "company_info.id": "77",
            "company_info.name": "Acme",
            "brand_info.id": "5",
            "brand_info.name": "Brandco"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.company_id, "77");
        assert_eq!(product.brand_name, "Brandco");
    }
}
