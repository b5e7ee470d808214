use std::time::Instant;

use tracing::info;

use crate::llm::{Backend, GenerationRequest, build_section_prompt};
use crate::pipeline::{Document, GenerationFailure, RetryConfig, generate_with_retry};
use crate::schema::{Shape, format_instructions};

/// Configuration shared by every section generation in one run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub retry: RetryConfig,
    /// Base context-window budget in tokens; raised per request as needed.
    pub base_num_ctx: u32,
    /// Base response-length budget in tokens; raised per request as needed.
    pub base_num_predict: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            base_num_ctx: 8192,
            base_num_predict: 2000,
        }
    }
}

/// Inputs for one section generation.
#[derive(Debug)]
pub struct SectionRequest<'a> {
    /// Dotted section path, unique within a run.
    pub section: &'a str,
    pub shape: &'a Shape,
    /// Analyst role wording, e.g. "trading technical analyst expert".
    pub role: &'a str,
    /// Report label, e.g. "technical analysis".
    pub label: &'a str,
    pub ticker: &'a str,
    pub timeframe: Option<&'a str>,
    /// (label, serialized document) for every dependency, in plan order.
    /// Empty for leaf sections.
    pub dependencies: &'a [(String, String)],
}

/// Produce one validated Document for one section.
///
/// Builds the constrained request (instruction, dependency documents, shape
/// contract), sizes the token budgets from the built text, and hands the
/// request to the retry loop. Emits one latency measurement for the full
/// attempt sequence.
pub async fn generate_section(
    backend: &dyn Backend,
    request: &SectionRequest<'_>,
    config: &GeneratorConfig,
) -> Result<Document, GenerationFailure> {
    let started = Instant::now();

    let contract = format_instructions(request.shape);
    let system = build_section_prompt(
        request.role,
        request.label,
        request.ticker,
        request.timeframe,
        request.dependencies,
        &contract,
    );
    let (num_ctx, num_predict) = size_budgets(system.len(), contract.len(), config);

    let generation = GenerationRequest {
        system,
        user: request.ticker.to_string(),
        num_ctx: Some(num_ctx),
        num_predict: Some(num_predict),
    };

    let result = generate_with_retry(
        backend,
        &generation,
        request.section,
        request.shape,
        &config.retry,
    )
    .await;

    let seconds = (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;
    info!(
        section = request.section,
        seconds,
        accepted = result.is_ok(),
        "section generation finished"
    );

    result
}

/// Size token budgets from the built request instead of a fixed per-shape
/// factor: composite sections embed their children's text, so their budgets
/// must grow with it. Roughly four characters per token for the prompt; the
/// contract length approximates the response skeleton.
fn size_budgets(prompt_chars: usize, contract_chars: usize, config: &GeneratorConfig) -> (u32, u32) {
    let prompt_tokens = (prompt_chars / 4) as u32;
    let num_predict = config.base_num_predict.max((contract_chars / 3) as u32);
    let num_ctx = config.base_num_ctx.max(prompt_tokens + num_predict + 512);
    (num_ctx, num_predict)
}
