use crate::schema::{FieldKind, Shape};

/// Render the textual contract for a Shape.
///
/// The contract is embedded verbatim into every request for that shape so the
/// backend can self-check its own output: one line per field with its JSON
/// key, declared type, required/optional status and description; nested
/// shapes are expanded inline with indentation.
pub fn format_instructions(shape: &Shape) -> String {
    let mut out = String::new();
    out.push_str(&format!("Shape `{}`: {}\n", shape.name, shape.doc));
    out.push_str("Respond with a single JSON object holding exactly these keys:\n");
    render_fields(shape, 0, &mut out);
    out
}

fn render_fields(shape: &Shape, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for field in &shape.fields {
        let status = if field.required { "required" } else { "optional" };
        out.push_str(&format!(
            "{}- \"{}\" ({}, {}): {}\n",
            indent,
            field.name,
            type_label(&field.kind),
            status,
            field.doc
        ));
        if let FieldKind::Nested(inner) = &field.kind {
            render_fields(inner, depth + 1, out);
        }
    }
}

fn type_label(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Enum(spec) => format!("one of: {}", spec.values.join(" | ")),
        other => other.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSpec, FieldSpec};

    const LEVELS: EnumSpec = EnumSpec {
        name: "RiskLevels",
        values: &["LOW", "MEDIUM", "HIGH"],
    };

    #[test]
    fn test_lists_fields_with_status() {
        let shape = Shape::new("ExposureRisk", "Exposure risk data.")
            .with_field(FieldSpec::new(
                "exposure_evaluation",
                FieldKind::Str,
                "Exposure evaluation.",
            ))
            .with_field(FieldSpec::optional(
                "raw_tool_data",
                FieldKind::Json,
                "Raw tool data.",
            ));

        let text = format_instructions(&shape);
        assert!(text.starts_with("Shape `ExposureRisk`"));
        assert!(text.contains("\"exposure_evaluation\" (string, required)"));
        assert!(text.contains("\"raw_tool_data\" (object, optional)"));
    }

    #[test]
    fn test_enum_values_are_spelled_out() {
        let shape = Shape::new("Synthesis", "Synthesis.").with_field(FieldSpec::new(
            "risk",
            FieldKind::Enum(LEVELS),
            "Risk level.",
        ));

        let text = format_instructions(&shape);
        assert!(text.contains("one of: LOW | MEDIUM | HIGH"));
    }

    #[test]
    fn test_nested_shapes_are_indented_without_header() {
        let inner = Shape::new("Raw", "Raw values.").with_field(FieldSpec::new(
            "value",
            FieldKind::Float,
            "Raw value.",
        ));
        let shape = Shape::new("Outer", "Outer shape.").with_field(FieldSpec::new(
            "raw",
            FieldKind::Nested(inner),
            "Nested raw values.",
        ));

        let text = format_instructions(&shape);
        assert!(text.contains("\"raw\" (object Raw, required)"));
        assert!(text.contains("  - \"value\" (number, required)"));
        // Only the target shape gets a contract header.
        assert_eq!(text.matches("Shape `").count(), 1);
    }
}
