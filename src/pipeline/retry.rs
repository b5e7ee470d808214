use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::llm::{Backend, BackendError, GenerationRequest, build_retry_prompt};
use crate::pipeline::Document;
use crate::schema::{Shape, validate_document};

/// Configuration for the validation-failure retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Corrective attempts allowed after the initial one.
    pub max_retries: u32,
    /// Per-attempt timeout in seconds; a timeout consumes one retry slot.
    /// None disables the bound.
    pub attempt_timeout_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // A local model can need several corrective passes before the schema
        // is matched exactly.
        Self {
            max_retries: 15,
            attempt_timeout_secs: Some(300),
        }
    }
}

/// A section exhausted every allowed attempt without producing a valid document.
///
/// Fatal to the enclosing tree walk: no partial report is ever emitted.
#[derive(Debug, Error)]
#[error(
    "section `{section}` (shape {shape}) failed schema validation after {attempts} attempts: {last_error}"
)]
pub struct GenerationFailure {
    pub section: String,
    pub shape: String,
    /// Total backend calls made (initial attempt plus retries).
    pub attempts: u32,
    pub last_error: String,
}

/// Drive the bounded retry loop for one request against one Shape.
///
/// Attempt 0 sends the request as built. Every later attempt re-sends the
/// full original system text plus the latest error and a conform instruction;
/// the backend keeps no state between calls. Backend failures and timeouts
/// consume retry slots exactly like validation failures.
pub async fn generate_with_retry(
    backend: &dyn Backend,
    request: &GenerationRequest,
    section: &str,
    shape: &Shape,
    config: &RetryConfig,
) -> Result<Document, GenerationFailure> {
    let mut last_error = String::new();

    for attempt in 0..=config.max_retries {
        let attempt_request = if attempt == 0 {
            request.clone()
        } else {
            debug!(section, attempt, "re-requesting with validation feedback");
            retry_request(request, &last_error)
        };

        match issue(backend, &attempt_request, config).await {
            Ok(raw) => match parse_and_validate(shape, &raw) {
                Ok(value) => {
                    return Ok(Document {
                        section: section.to_string(),
                        shape: shape.name.clone(),
                        value,
                    });
                }
                Err(errors) => {
                    last_error = errors.join("; ");
                    warn!(section, attempt, error = %last_error, "schema validation failed");
                }
            },
            Err(e) => {
                last_error = e.to_string();
                warn!(section, attempt, error = %last_error, "backend call failed");
            }
        }
    }

    Err(GenerationFailure {
        section: section.to_string(),
        shape: shape.name.clone(),
        attempts: config.max_retries + 1,
        last_error,
    })
}

/// The original request plus error feedback, with the context budget widened
/// to cover the extra text.
fn retry_request(request: &GenerationRequest, last_error: &str) -> GenerationRequest {
    GenerationRequest {
        system: build_retry_prompt(&request.system, last_error),
        num_ctx: request.num_ctx.map(|c| c + (last_error.len() / 4) as u32 + 128),
        ..request.clone()
    }
}

async fn issue(
    backend: &dyn Backend,
    request: &GenerationRequest,
    config: &RetryConfig,
) -> Result<String, BackendError> {
    match config.attempt_timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), backend.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(secs)),
        },
        None => backend.generate(request).await,
    }
}

/// Parse the raw response into JSON and validate it against the Shape.
fn parse_and_validate(shape: &Shape, raw: &str) -> Result<serde_json::Value, Vec<String>> {
    let payload = extract_json_payload(raw);
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| vec![format!("response is not valid JSON: {e}")])?;

    let validation = validate_document(shape, &value);
    if validation.is_valid {
        Ok(value)
    } else {
        Err(validation.errors)
    }
}

/// Trim reasoning blocks and code fences the model may wrap around its JSON.
fn extract_json_payload(raw: &str) -> &str {
    let mut text = raw;
    if let Some(end) = text.find("</think>") {
        text = &text[end + "</think>".len()..];
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start <= end => &text[start..=end],
        _ => text.trim(),
    }
}
