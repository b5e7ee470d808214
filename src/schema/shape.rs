/// A closed set of allowed string values for an enumerated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSpec {
    /// Name of the category set, shown in the shape contract.
    pub name: &'static str,
    /// Allowed values, exactly as the backend must emit them.
    pub values: &'static [&'static str],
}

impl EnumSpec {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }
}

/// Declared type of a single shape field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Str,
    Int,
    Float,
    /// Timestamp carried as an RFC 3339 string.
    DateTime,
    /// Free-form JSON object; member values are unconstrained.
    Json,
    /// String restricted to a fixed category set.
    Enum(EnumSpec),
    /// Nested document validated against its own shape.
    Nested(Shape),
}

impl FieldKind {
    /// Short type label used in the shape contract and in validation errors.
    pub fn label(&self) -> String {
        match self {
            FieldKind::Str => "string".to_string(),
            FieldKind::Int => "integer".to_string(),
            FieldKind::Float => "number".to_string(),
            FieldKind::DateTime => "timestamp string".to_string(),
            FieldKind::Json => "object".to_string(),
            FieldKind::Enum(spec) => format!("enum {}", spec.name),
            FieldKind::Nested(shape) => format!("object {}", shape.name),
        }
    }
}

/// One typed field of a Shape.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// JSON key the backend must emit.
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// One-line description embedded in the shape contract.
    pub doc: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            doc: doc.into(),
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            doc: doc.into(),
        }
    }
}

/// A named structured record type with typed, possibly nested fields.
///
/// Shapes form a DAG through `FieldKind::Nested`; the domain registries build
/// them leaf-first so no cycle can be expressed.
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    /// One-line description of what a document of this shape holds.
    pub doc: String,
    /// Fields in declaration order (order matters for prompt construction).
    pub fields: Vec<FieldSpec>,
}

impl Shape {
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
