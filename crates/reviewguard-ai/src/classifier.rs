//! Sentiment classification gateway.
//!
//! Wraps one chat-completion call per review: a fixed system prompt carrying
//! the classification taxonomy and a user message with the concatenated
//! review text. The raw answer label is matched by string equality against
//! the configured negative label; everything else maps to `Positive`.

use reviewguard_core::Sentiment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::{AuthError, CredentialCache, TokenIssuer};

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Credential refresh failed; fatal for the run, unlike the other
    /// variants which are per-item.
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classification service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("classification service returned no candidate answers")]
    EmptyAnswer,
}

impl ClassifyError {
    /// Whether this error must abort the whole run rather than skip the item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Deserialize)]
struct AnswerMessage {
    content: String,
}

/// Gateway in front of the chat-completion service.
pub struct SentimentClassifier<I> {
    http: reqwest::Client,
    url: String,
    model: String,
    prompt: String,
    negative_label: String,
    credentials: CredentialCache<I>,
}

impl<I: TokenIssuer> SentimentClassifier<I> {
    pub fn new(
        url: String,
        model: String,
        prompt: String,
        negative_label: String,
        credentials: CredentialCache<I>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            model,
            prompt,
            negative_label,
            credentials,
        }
    }

    /// Classify one review text.
    ///
    /// Transport and empty-answer failures are per-item; the caller skips the
    /// item and keeps sweeping. An [`AuthError`] bubbled through
    /// [`ClassifyError::Auth`] is fatal instead.
    pub async fn classify(&mut self, text: &str) -> Result<Sentiment, ClassifyError> {
        let token = self.credentials.authorize().await?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifyError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        let answer = parsed.choices.first().ok_or(ClassifyError::EmptyAnswer)?;
        let label = answer.message.content.as_str();

        debug!(label, "classifier answered");
        Ok(Sentiment::from_label(label, &self.negative_label))
    }
}
