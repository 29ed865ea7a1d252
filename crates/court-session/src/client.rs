//! Seam between the session and the hosted generative-language service
use async_trait::async_trait;
use court_core::VerdictError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A prompt plus the JSON schema the reply must follow
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub response_schema: Value,
}

/// Error types for generative clients
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Server error: HTTP {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response envelope: {0}")]
    Envelope(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

impl From<ClientError> for VerdictError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Http(_) | ClientError::Server { .. } | ClientError::Envelope(_) => {
                VerdictError::Network(e.to_string())
            }
            ClientError::EmptyResponse | ClientError::Blocked(_) => {
                VerdictError::MalformedResponse(e.to_string())
            }
        }
    }
}

/// Returns the raw reply text for a request
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ClientError>;
}

#[async_trait]
impl<T: GenerativeClient + ?Sized> GenerativeClient for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ClientError> {
        (**self).generate(request).await
    }
}
