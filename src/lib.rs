pub mod domains;
pub mod io;
pub mod llm;
pub mod pipeline;
pub mod schema;

pub use domains::{esg_plan, technical_plan};
pub use io::{HumanReport, ReportEnvelope};
pub use llm::{Backend, BackendError, GenerationRequest, OllamaClient, OllamaConfig};
pub use pipeline::{
    AnalysisPlan, Document, GenerationFailure, GeneratorConfig, RetryConfig, SectionPlan,
    TreeComposer,
};
pub use schema::{
    DocumentValidation, EnumSpec, FieldKind, FieldSpec, Shape, format_instructions,
    validate_document,
};
