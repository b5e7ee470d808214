use tracing::info;

use crate::llm::Backend;
use crate::pipeline::{
    Document, GenerationFailure, GeneratorConfig, SectionRequest, generate_section,
};
use crate::schema::Shape;

/// One named unit of generation work in the dependency tree.
///
/// Built once at plan-definition time by the domain registries and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct SectionPlan {
    /// Unique dotted path, e.g. "short_timeframe_data.indicators.rsi".
    pub name: String,
    /// Local label used when inlining this section into its parent's request.
    pub label: String,
    pub shape: Shape,
    /// Timeframe wording passed through to the prompt, when the section has one.
    pub timeframe: Option<String>,
    /// Children evaluated, in declared order, before this section is requested.
    pub children: Vec<SectionPlan>,
}

impl SectionPlan {
    pub fn leaf(
        name: impl Into<String>,
        label: impl Into<String>,
        shape: Shape,
        timeframe: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            shape,
            timeframe,
            children: Vec::new(),
        }
    }

    pub fn composite(
        name: impl Into<String>,
        label: impl Into<String>,
        shape: Shape,
        timeframe: Option<String>,
        children: Vec<SectionPlan>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            shape,
            timeframe,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of sections in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SectionPlan::node_count).sum::<usize>()
    }
}

/// A full domain walk: analyst wording plus the root section plan.
#[derive(Debug, Clone)]
pub struct AnalysisPlan {
    /// Analyst role wording, e.g. "trading technical analyst expert".
    pub role: String,
    /// Report label, e.g. "technical analysis".
    pub label: String,
    /// Ticker symbol the report is about.
    pub ticker: String,
    pub root: SectionPlan,
}

/// Evaluates an AnalysisPlan bottom-up into one root Document.
///
/// Evaluation is strictly sequential: every composite request embeds the full
/// text of all of its children, so no section can start before its children
/// finish, and there is nothing to run concurrently.
pub struct TreeComposer<'a> {
    backend: &'a dyn Backend,
    config: GeneratorConfig,
}

impl<'a> TreeComposer<'a> {
    pub fn new(backend: &'a dyn Backend, config: GeneratorConfig) -> Self {
        Self { backend, config }
    }

    /// Walk the plan post-order and return the root Document.
    ///
    /// Children are fully generated, validated and serialized before their
    /// parent's request is built; the first failure aborts the whole walk and
    /// no ancestor of the failing section is ever requested.
    pub async fn evaluate(&self, plan: &AnalysisPlan) -> Result<Document, GenerationFailure> {
        info!(
            ticker = %plan.ticker,
            sections = plan.root.node_count(),
            "starting {} walk",
            plan.label
        );
        self.evaluate_node(plan, &plan.root).await
    }

    async fn evaluate_node(
        &self,
        plan: &AnalysisPlan,
        node: &SectionPlan,
    ) -> Result<Document, GenerationFailure> {
        let mut dependencies: Vec<(String, String)> = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let document = Box::pin(self.evaluate_node(plan, child)).await?;
            dependencies.push((child.label.clone(), document.serialized()));
        }

        info!(section = %node.name, children = dependencies.len(), "generating section");
        let request = SectionRequest {
            section: &node.name,
            shape: &node.shape,
            role: &plan.role,
            label: &plan.label,
            ticker: &plan.ticker,
            timeframe: node.timeframe.as_deref(),
            dependencies: &dependencies,
        };
        generate_section(self.backend, &request, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RetryConfig;
    use crate::pipeline::testing::{ScriptedBackend, minimal_document, plan_shapes};
    use crate::schema::{FieldKind, FieldSpec, validate_document};

    fn leaf_shape(name: &str, field: &str) -> Shape {
        Shape::new(name, format!("{name} evaluation."))
            .with_field(FieldSpec::new(field, FieldKind::Str, "Evaluation text."))
    }

    /// root <- { alpha, beta }
    fn small_plan() -> AnalysisPlan {
        let root_shape = Shape::new("RootReport", "Synthesis over alpha and beta.")
            .with_field(FieldSpec::new("conclusion", FieldKind::Str, "Conclusion."));

        AnalysisPlan {
            role: "trading technical analyst expert".to_string(),
            label: "technical analysis".to_string(),
            ticker: "AAPL".to_string(),
            root: SectionPlan::composite(
                "root",
                "root",
                root_shape,
                None,
                vec![
                    SectionPlan::leaf("root.alpha", "alpha", leaf_shape("Alpha", "alpha_trend"), None),
                    SectionPlan::leaf("root.beta", "beta", leaf_shape("Beta", "beta_trend"), None),
                ],
            ),
        }
    }

    fn quick_config() -> GeneratorConfig {
        GeneratorConfig {
            retry: RetryConfig {
                max_retries: 2,
                attempt_timeout_secs: None,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_children_before_parent_and_docs_inlined() {
        let plan = small_plan();
        let backend = ScriptedBackend::new(plan_shapes(&plan.root));
        let composer = TreeComposer::new(&backend, quick_config());

        let document = composer.evaluate(&plan).await.unwrap();
        assert_eq!(document.section, "root");
        assert!(validate_document(&plan.root.shape, &document.value).is_valid);

        // One call per section, children in declared order, parent last.
        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].system.contains("Shape `Alpha`"));
        assert!(calls[1].system.contains("Shape `Beta`"));
        assert!(calls[2].system.contains("Shape `RootReport`"));

        // The parent request embeds the serialized child documents.
        let alpha_json = minimal_document(&plan.root.children[0].shape).to_string();
        let beta_json = minimal_document(&plan.root.children[1].shape).to_string();
        assert!(calls[2].system.contains(&alpha_json));
        assert!(calls[2].system.contains(&beta_json));
    }

    #[tokio::test]
    async fn test_exhausted_leaf_aborts_before_any_ancestor() {
        let plan = small_plan();
        let backend = ScriptedBackend::new(plan_shapes(&plan.root)).always_invalid("Alpha");
        let composer = TreeComposer::new(&backend, quick_config());

        let err = composer.evaluate(&plan).await.unwrap_err();
        assert_eq!(err.section, "root.alpha");
        assert_eq!(err.shape, "Alpha");
        assert_eq!(err.attempts, 3);

        // All calls went to the failing leaf; neither the sibling nor the
        // parent was ever requested.
        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.call_count_for("Beta"), 0);
        assert_eq!(backend.call_count_for("RootReport"), 0);
    }

    #[tokio::test]
    async fn test_flaky_leaf_retries_then_walk_completes() {
        let plan = small_plan();
        let backend = ScriptedBackend::new(plan_shapes(&plan.root)).with_script(
            "Alpha",
            vec!["garbage".to_string(), r#"{"wrong": 1}"#.to_string()],
        );
        let composer = TreeComposer::new(&backend, quick_config());

        let document = composer.evaluate(&plan).await.unwrap();
        assert!(validate_document(&plan.root.shape, &document.value).is_valid);

        // Two failed attempts for alpha on top of one call per section.
        assert_eq!(backend.call_count(), plan.root.node_count() + 2);
        assert_eq!(backend.call_count_for("Alpha"), 3);
    }

    #[tokio::test]
    async fn test_full_technical_walk_makes_one_call_per_section() {
        let plan = crate::domains::technical_plan("AAPL", "5 minutes", "1 hour");
        let backend = ScriptedBackend::new(plan_shapes(&plan.root));
        let composer = TreeComposer::new(&backend, quick_config());

        let document = composer.evaluate(&plan).await.unwrap();
        assert_eq!(backend.call_count(), plan.root.node_count());
        assert_eq!(document.shape, "TickerTechnicalAnalysis");
        assert!(validate_document(&plan.root.shape, &document.value).is_valid);

        // The root request is the last one and embeds both timeframe documents.
        let calls = backend.calls();
        let root_call = calls.last().unwrap();
        assert!(root_call.system.contains("Shape `TickerTechnicalAnalysis`"));
        assert!(root_call.system.contains("short_timeframe_data section"));
        assert!(root_call.system.contains("long_timeframe_data section"));
    }

    #[tokio::test]
    async fn test_full_esg_walk_makes_one_call_per_section() {
        let plan = crate::domains::esg_plan("AAPL");
        let backend = ScriptedBackend::new(plan_shapes(&plan.root));
        let composer = TreeComposer::new(&backend, quick_config());

        let document = composer.evaluate(&plan).await.unwrap();
        assert_eq!(backend.call_count(), plan.root.node_count());
        assert_eq!(document.shape, "TickerEsgAnalysis");
        assert!(validate_document(&plan.root.shape, &document.value).is_valid);
    }

    #[tokio::test]
    async fn test_exhausted_esg_leaf_never_reaches_the_root() {
        let plan = crate::domains::esg_plan("AAPL");
        let backend =
            ScriptedBackend::new(plan_shapes(&plan.root)).always_invalid("Year2RawValues");
        let composer = TreeComposer::new(&backend, quick_config());

        let err = composer.evaluate(&plan).await.unwrap_err();
        assert_eq!(err.section, "carbon_emissions.year_2");
        assert_eq!(backend.call_count_for("CarbonEmissions"), 0);
        assert_eq!(backend.call_count_for("TickerEsgAnalysis"), 0);
    }
}
