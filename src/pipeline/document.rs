use serde_json::Value;

/// A validated instance of a Shape, produced for one section on one run.
#[derive(Debug, Clone)]
pub struct Document {
    /// Dotted section path that produced this document.
    pub section: String,
    /// Name of the Shape the value was validated against.
    pub shape: String,
    pub value: Value,
}

impl Document {
    /// Canonical JSON text of the document, as inlined into parent requests.
    pub fn serialized(&self) -> String {
        serde_json::to_string(&self.value).unwrap_or_else(|_| "{}".to_string())
    }
}
