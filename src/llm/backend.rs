use async_trait::async_trait;
use thiserror::Error;

/// One self-contained request to the inference backend.
///
/// Every request carries its full instruction text; the backend keeps no
/// memory between calls, so retries must re-send everything.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System text: instruction, inlined dependency documents, shape contract.
    pub system: String,
    /// User message (the ticker symbol).
    pub user: String,
    /// Context-window budget override in tokens; backend default when None.
    pub num_ctx: Option<u32>,
    /// Response-length budget override in tokens; backend default when None.
    pub num_predict: Option<u32>,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            num_ctx: None,
            num_predict: None,
        }
    }
}

/// Failure of the inference backend itself, as opposed to a well-formed but
/// schema-invalid response.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Network(String),

    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("backend response had no message content")]
    EmptyResponse,

    #[error("backend call timed out after {0}s")]
    Timeout(u64),
}

/// The inference backend boundary.
///
/// Anything that can turn a request into raw response text is acceptable; the
/// pipeline never looks past this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}
