//! Run configuration. Every credential and endpoint is supplied externally,
//! via flags or environment variables.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "reviewguard",
    version,
    about = "Sweep new marketplace reviews, classify their sentiment, and quarantine offers with negative feedback"
)]
pub struct Config {
    /// Seller-portal base URL for the review feed.
    #[arg(long, env = "FEED_BASE_URL", default_value = "https://seller.ozon.ru")]
    pub feed_base_url: String,

    /// JSON file of session cookies: [{"name": ..., "value": ...}].
    #[arg(long, env = "COOKIES_PATH")]
    pub cookies_path: PathBuf,

    /// Company id the feed is scoped to.
    #[arg(long, env = "COMPANY_ID")]
    pub company_id: String,

    /// Seller API base URL for price updates.
    #[arg(
        long,
        env = "PRICING_BASE_URL",
        default_value = "https://api-seller.ozon.ru"
    )]
    pub pricing_base_url: String,

    /// Seller API client id.
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    /// Seller API key.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Token-issuance endpoint for the classification channel.
    #[arg(
        long,
        env = "OAUTH_URL",
        default_value = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth"
    )]
    pub oauth_url: String,

    /// Pre-encoded Basic-auth material for token issuance.
    #[arg(long, env = "OAUTH_AUTH_DATA", hide_env_values = true)]
    pub oauth_auth_data: String,

    /// OAuth scope sent with every token request.
    #[arg(long, env = "OAUTH_SCOPE", default_value = "GIGACHAT_API_PERS")]
    pub oauth_scope: String,

    /// Chat-completion endpoint used for sentiment classification.
    #[arg(
        long,
        env = "CHAT_URL",
        default_value = "https://gigachat.devices.sberbank.ru/api/v1/chat/completions"
    )]
    pub chat_url: String,

    /// Model name sent with every classification request.
    #[arg(long, env = "CHAT_MODEL", default_value = "GigaChat")]
    pub chat_model: String,

    /// System prompt carrying the classification taxonomy.
    #[arg(long, env = "CHAT_PROMPT")]
    pub chat_prompt: String,

    /// The one answer label that marks a review as negative.
    #[arg(long, env = "NEGATIVE_LABEL", default_value = "отрицательный")]
    pub negative_label: String,

    /// Where the sweep checkpoint is persisted.
    #[arg(long, env = "CHECKPOINT_PATH", default_value = "checkpoint.txt")]
    pub checkpoint_path: PathBuf,

    /// Price applied to every quarantined offer.
    #[arg(long, env = "QUARANTINE_PRICE")]
    pub quarantine_price: String,

    /// How far back a first run (no checkpoint yet) should look.
    #[arg(long, env = "LOOKBACK_HOURS", default_value_t = 72)]
    pub lookback_hours: u32,
}
