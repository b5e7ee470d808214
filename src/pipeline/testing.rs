//! Scripted backend and document helpers shared by the pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::llm::{Backend, BackendError, GenerationRequest};
use crate::pipeline::SectionPlan;
use crate::schema::{FieldKind, Shape};

/// Build the smallest document that validates against a Shape: required
/// fields only, first enum value, nested shapes recursed.
pub(crate) fn minimal_document(shape: &Shape) -> Value {
    let mut map = Map::new();
    for field in &shape.fields {
        if !field.required {
            continue;
        }
        let value = match &field.kind {
            FieldKind::Str => json!("sample"),
            FieldKind::Int => json!(1),
            FieldKind::Float => json!(1.5),
            FieldKind::DateTime => json!("2026-01-01T00:00:00Z"),
            FieldKind::Json => json!({}),
            FieldKind::Enum(spec) => json!(spec.values[0]),
            FieldKind::Nested(inner) => minimal_document(inner),
        };
        map.insert(field.name.clone(), value);
    }
    Value::Object(map)
}

/// Collect every distinct Shape reachable from a plan, keyed by name.
pub(crate) fn plan_shapes(node: &SectionPlan) -> Vec<Shape> {
    let mut by_name: HashMap<String, Shape> = HashMap::new();
    collect(node, &mut by_name);
    by_name.into_values().collect()
}

fn collect(node: &SectionPlan, out: &mut HashMap<String, Shape>) {
    out.entry(node.shape.name.clone())
        .or_insert_with(|| node.shape.clone());
    for child in &node.children {
        collect(child, out);
    }
}

enum Script {
    /// Scripted responses consumed in order; falls back to a minimal valid
    /// document once exhausted.
    Responses(Vec<String>),
    /// Never produces anything that validates.
    AlwaysInvalid,
}

/// Backend stub that routes on the target shape named in the request's
/// contract header and records every request it receives.
pub(crate) struct ScriptedBackend {
    shapes: HashMap<String, Shape>,
    scripts: Mutex<HashMap<String, (Script, usize)>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    /// A backend that answers every request with a minimal valid document.
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes: shapes.into_iter().map(|s| (s.name.clone(), s)).collect(),
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(self, shape_name: &str, responses: Vec<String>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(shape_name.to_string(), (Script::Responses(responses), 0));
        self
    }

    pub fn always_invalid(self, shape_name: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(shape_name.to_string(), (Script::AlwaysInvalid, 0));
        self
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of requests whose contract header targeted the given shape.
    pub fn call_count_for(&self, shape_name: &str) -> usize {
        let marker = format!("Shape `{shape_name}`");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.system.contains(&marker))
            .count()
    }

    fn target_shape(&self, system: &str) -> String {
        let start = system
            .find("Shape `")
            .expect("request has no shape contract header")
            + "Shape `".len();
        let rest = &system[start..];
        let end = rest.find('`').expect("unterminated shape name");
        rest[..end].to_string()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(request.clone());

        let name = self.target_shape(&request.system);
        let shape = self
            .shapes
            .get(&name)
            .unwrap_or_else(|| panic!("no shape registered for `{name}`"));

        let mut scripts = self.scripts.lock().unwrap();
        if let Some((script, served)) = scripts.get_mut(&name) {
            match script {
                Script::AlwaysInvalid => return Ok(r#"{"unexpected": true}"#.to_string()),
                Script::Responses(responses) => {
                    if *served < responses.len() {
                        let response = responses[*served].clone();
                        *served += 1;
                        return Ok(response);
                    }
                }
            }
        }

        Ok(minimal_document(shape).to_string())
    }
}
