//! AI channel: bearer-credential lifecycle and the sentiment classification
//! gateway in front of the chat-completion service.

pub mod auth;
pub mod classifier;

pub use auth::{AuthError, CredentialCache, IssuedToken, OauthIssuer, TokenIssuer};
pub use classifier::{ClassifyError, SentimentClassifier};
