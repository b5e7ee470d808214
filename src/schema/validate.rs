use serde_json::Value;

use crate::schema::{FieldKind, Shape};

/// Outcome of validating a candidate document against a Shape.
#[derive(Debug, Clone)]
pub struct DocumentValidation {
    /// Whether the document satisfies the shape
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
}

impl DocumentValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Validate a parsed JSON value against a Shape.
///
/// Checks presence of every required field, scalar types, enum membership and
/// nested shapes. Optional fields may be absent or null; when present they are
/// validated like required ones.
pub fn validate_document(shape: &Shape, value: &Value) -> DocumentValidation {
    let mut errors = Vec::new();
    check_object(shape, value, "", &mut errors);

    if errors.is_empty() {
        DocumentValidation::valid()
    } else {
        DocumentValidation::invalid(errors)
    }
}

fn check_object(shape: &Shape, value: &Value, path: &str, errors: &mut Vec<String>) {
    let Some(map) = value.as_object() else {
        errors.push(format!(
            "{}: expected a JSON object matching shape {}",
            display_path(path),
            shape.name
        ));
        return;
    };

    for field in &shape.fields {
        let field_path = join_path(path, &field.name);
        match map.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(format!(
                        "missing required field `{}` ({})",
                        field_path,
                        field.kind.label()
                    ));
                }
            }
            Some(v) => check_value(&field.kind, v, &field_path, errors),
        }
    }
}

fn check_value(kind: &FieldKind, value: &Value, path: &str, errors: &mut Vec<String>) {
    match kind {
        FieldKind::Str => {
            if !value.is_string() {
                errors.push(format!("field `{}` must be a string", path));
            }
        }
        FieldKind::Int => {
            if !value.is_i64() && !value.is_u64() {
                errors.push(format!("field `{}` must be an integer", path));
            }
        }
        FieldKind::Float => {
            if !value.is_number() {
                errors.push(format!("field `{}` must be a number", path));
            }
        }
        FieldKind::DateTime => match value.as_str() {
            Some(s) if parse_timestamp(s) => {}
            Some(s) => errors.push(format!(
                "field `{}` is not a valid timestamp: `{}`",
                path, s
            )),
            None => errors.push(format!("field `{}` must be a timestamp string", path)),
        },
        FieldKind::Json => {
            if !value.is_object() {
                errors.push(format!("field `{}` must be a JSON object", path));
            }
        }
        FieldKind::Enum(spec) => match value.as_str() {
            Some(s) if spec.contains(s) => {}
            Some(s) => errors.push(format!(
                "field `{}` value `{}` is not one of {}: {}",
                path,
                s,
                spec.name,
                spec.values.join(", ")
            )),
            None => errors.push(format!(
                "field `{}` must be a string from {}",
                path, spec.name
            )),
        },
        FieldKind::Nested(shape) => check_object(shape, value, path, errors),
    }
}

/// Accept RFC 3339 or a naive ISO 8601 datetime (local models rarely emit offsets).
fn parse_timestamp(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "document" } else { path }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{EnumSpec, FieldSpec};

    const ACTIONS: EnumSpec = EnumSpec {
        name: "TradingActions",
        values: &["BUY", "HOLD", "SELL"],
    };

    fn sample_shape() -> Shape {
        Shape::new("Sample", "Sample shape.")
            .with_field(FieldSpec::new("evaluation", FieldKind::Str, "Evaluation text."))
            .with_field(FieldSpec::new("touches", FieldKind::Int, "Touch count."))
            .with_field(FieldSpec::new("action", FieldKind::Enum(ACTIONS), "Action."))
            .with_field(FieldSpec::optional(
                "raw_tool_data",
                FieldKind::Nested(
                    Shape::new("Raw", "Raw values.")
                        .with_field(FieldSpec::new("value", FieldKind::Float, "Raw value.")),
                ),
                "Raw tool data.",
            ))
    }

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "evaluation": "looks bullish",
            "touches": 3,
            "action": "BUY",
            "raw_tool_data": {"value": 42.5}
        });
        let result = validate_document(&sample_shape(), &doc);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_optional_field_may_be_absent_or_null() {
        let doc = json!({"evaluation": "flat", "touches": 0, "action": "HOLD"});
        assert!(validate_document(&sample_shape(), &doc).is_valid);

        let doc = json!({
            "evaluation": "flat",
            "touches": 0,
            "action": "HOLD",
            "raw_tool_data": null
        });
        assert!(validate_document(&sample_shape(), &doc).is_valid);
    }

    #[test]
    fn test_missing_required_field() {
        let doc = json!({"touches": 1, "action": "SELL"});
        let result = validate_document(&sample_shape(), &doc);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("evaluation"));
    }

    #[test]
    fn test_wrong_type() {
        let doc = json!({"evaluation": "ok", "touches": "three", "action": "BUY"});
        let result = validate_document(&sample_shape(), &doc);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("touches"));
        assert!(result.errors[0].contains("integer"));
    }

    #[test]
    fn test_enum_membership() {
        let doc = json!({"evaluation": "ok", "touches": 1, "action": "SHORT"});
        let result = validate_document(&sample_shape(), &doc);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("TradingActions"));
    }

    #[test]
    fn test_nested_error_carries_path() {
        let doc = json!({
            "evaluation": "ok",
            "touches": 1,
            "action": "BUY",
            "raw_tool_data": {"value": "not a number"}
        });
        let result = validate_document(&sample_shape(), &doc);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("raw_tool_data.value"));
    }

    #[test]
    fn test_non_object_document() {
        let result = validate_document(&sample_shape(), &json!([1, 2, 3]));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("Sample"));
    }

    #[test]
    fn test_datetime_formats() {
        let shape = Shape::new("Stamped", "")
            .with_field(FieldSpec::new("at", FieldKind::DateTime, "Report time."));

        for ok in [
            "2026-08-07T09:30:00Z",
            "2026-08-07T09:30:00+02:00",
            "2026-08-07T09:30:00",
            "2026-08-07 09:30:00.250",
        ] {
            let result = validate_document(&shape, &json!({ "at": ok }));
            assert!(result.is_valid, "expected `{}` to validate", ok);
        }

        let result = validate_document(&shape, &json!({"at": "last tuesday"}));
        assert!(!result.is_valid);
    }
}
