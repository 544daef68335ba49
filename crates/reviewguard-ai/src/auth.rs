//! Bearer-credential cache for the classification channel.
//!
//! Tokens are issued lazily on first use and re-issued once the cached token
//! is within a safety margin of its expiry. A failed re-issue leaves the
//! previously cached token in place so a later call can retry without extra
//! state. Tokens live in memory only.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("token expiry out of range: {0} ms")]
    InvalidExpiry(i64),
}

/// A bearer token plus the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// External token-issuance collaborator.
pub trait TokenIssuer {
    async fn issue(&self) -> Result<IssuedToken, AuthError>;
}

/// OAuth-style issuer: form-encoded POST with a fixed scope, Basic-auth
/// material, and a fresh per-request correlation id.
pub struct OauthIssuer {
    http: reqwest::Client,
    url: String,
    auth_data: String,
    scope: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Milliseconds since epoch.
    expires_at: i64,
}

impl OauthIssuer {
    pub fn new(url: String, auth_data: String, scope: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            auth_data,
            scope,
        }
    }
}

impl TokenIssuer for OauthIssuer {
    async fn issue(&self) -> Result<IssuedToken, AuthError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        debug!(url = %self.url, rq_uid = %correlation_id, "requesting access token");

        let resp = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Basic {}", self.auth_data))
            .header("RqUID", correlation_id)
            .header("Accept", "application/json")
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = resp.json().await?;
        let expires_at = DateTime::from_timestamp_millis(token.expires_at)
            .ok_or(AuthError::InvalidExpiry(token.expires_at))?;

        info!(expires_at = %expires_at, "access token issued");
        Ok(IssuedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// In-memory credential cache shared by all classification calls in a run.
pub struct CredentialCache<I> {
    issuer: I,
    margin: Duration,
    cached: Option<IssuedToken>,
}

impl<I: TokenIssuer> CredentialCache<I> {
    pub fn new(issuer: I) -> Self {
        Self {
            issuer,
            margin: Duration::seconds(EXPIRY_MARGIN_SECS),
            cached: None,
        }
    }

    /// Return a token valid for at least the safety margin, issuing a new one
    /// if needed.
    pub async fn authorize(&mut self) -> Result<String, AuthError> {
        self.authorize_at(Utc::now()).await
    }

    /// Clock-injected variant of [`authorize`](Self::authorize).
    pub async fn authorize_at(&mut self, now: DateTime<Utc>) -> Result<String, AuthError> {
        if let Some(cached) = &self.cached {
            if cached.expires_at - now > self.margin {
                return Ok(cached.access_token.clone());
            }
        }

        // Issue failure leaves `cached` untouched for a later retry.
        let token = self.issuer.issue().await?;
        let access = token.access_token.clone();
        self.cached = Some(token);
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    struct FakeIssuer {
        calls: Cell<u32>,
        expires_at: DateTime<Utc>,
        fail: bool,
    }

    impl FakeIssuer {
        fn expiring_at(expires_at: DateTime<Utc>) -> Self {
            Self {
                calls: Cell::new(0),
                expires_at,
                fail: false,
            }
        }
    }

    impl TokenIssuer for FakeIssuer {
        async fn issue(&self) -> Result<IssuedToken, AuthError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AuthError::Upstream {
                    status: 503,
                    body: "issuer down".into(),
                });
            }
            Ok(IssuedToken {
                access_token: format!("token-{}", self.calls.get()),
                expires_at: self.expires_at,
            })
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn second_call_within_margin_reuses_token() {
        let issuer = FakeIssuer::expiring_at(at(1, 0));
        let mut cache = CredentialCache::new(issuer);

        let first = cache.authorize_at(at(0, 0)).await.unwrap();
        let second = cache.authorize_at(at(0, 30)).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        assert_eq!(cache.issuer.calls.get(), 1);
    }

    #[tokio::test]
    async fn call_within_safety_margin_of_expiry_reissues_once() {
        let issuer = FakeIssuer::expiring_at(at(1, 0));
        let mut cache = CredentialCache::new(issuer);

        cache.authorize_at(at(0, 0)).await.unwrap();
        // 30s before expiry is inside the 60s margin.
        let refreshed = cache.authorize_at(at(0, 59)).await.unwrap();

        assert_eq!(refreshed, "token-2");
        assert_eq!(cache.issuer.calls.get(), 2);
    }

    #[tokio::test]
    async fn expired_token_triggers_exactly_one_reissue() {
        let issuer = FakeIssuer::expiring_at(at(1, 0));
        let mut cache = CredentialCache::new(issuer);

        cache.authorize_at(at(0, 0)).await.unwrap();
        let after_expiry = cache.authorize_at(at(2, 0)).await.unwrap();

        assert_eq!(after_expiry, "token-2");
        assert_eq!(cache.issuer.calls.get(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_preserves_cached_token() {
        let issuer = FakeIssuer::expiring_at(at(1, 0));
        let mut cache = CredentialCache::new(issuer);
        cache.authorize_at(at(0, 0)).await.unwrap();

        cache.issuer.fail = true;
        assert!(cache.authorize_at(at(2, 0)).await.is_err());

        // The stale token is still there; once the issuer recovers, a plain
        // retry succeeds with no extra bookkeeping.
        cache.issuer.fail = false;
        let recovered = cache.authorize_at(at(2, 0)).await.unwrap();
        assert_eq!(recovered, "token-3");
    }

    #[tokio::test]
    async fn first_call_failure_surfaces_error() {
        let mut issuer = FakeIssuer::expiring_at(at(1, 0));
        issuer.fail = true;
        let mut cache = CredentialCache::new(issuer);

        let err = cache.authorize_at(at(0, 0)).await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream { status: 503, .. }));
    }
}
