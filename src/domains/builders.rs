//! Shape builders for the recurring evaluation families.
//!
//! The field aliases are generated from a name prefix, so near-identical
//! shape variants (one per indicator, per support/resistance side, per
//! trailing fiscal year) come from one declarative factory each.

use crate::schema::{EnumSpec, FieldKind, FieldSpec, Shape};

pub const TRADING_ACTIONS: EnumSpec = EnumSpec {
    name: "TradingActions",
    values: &["BUY", "OUTPERFORM", "HOLD", "UNDERPERFORM", "SELL"],
};

pub const TREND_CATEGORIES: EnumSpec = EnumSpec {
    name: "TrendCategories",
    values: &[
        "STRONG_BULLISH",
        "BULLISH",
        "CONSOLIDATION",
        "BEARISH",
        "STRONG_BEARISH",
    ],
};

pub const SUPPORT_RESISTANCE_INTERACTION_STATUS: EnumSpec = EnumSpec {
    name: "SupportResistanceInteractionStatus",
    values: &[
        "PRICE_ABOVE_SUPPORT",
        "TESTING_SUPPORT",
        "BREAKING_BELOW_SUPPORT",
        "PRICE_BELOW_RESISTANCE",
        "TESTING_RESISTANCE",
        "BREAKING_ABOVE_RESISTANCE",
        "CONSOLIDATING_NEAR_SUPPORT_RESISTANCE",
    ],
};

pub const SUPPORT_RESISTANCE_INTERACTION_IMPLICATION: EnumSpec = EnumSpec {
    name: "SupportResistanceInteractionImplication",
    values: &[
        "POTENTIAL_BUY_ZONE",
        "STOP_LOSS_ZONE",
        "POTENTIAL_SELL_ZONE",
        "TAKE_PROFIT_ZONE",
        "CONFIRMATION_SIGNAL",
    ],
};

/// Trend-evaluation shape for one indicator family (rsi, macd, prices, ...).
///
/// Generates `{prefix}_trend`, `{prefix}_trading_action` and the
/// primary/secondary/minor trend pairs, plus the optional raw tool data when
/// the family has a source tool.
pub fn evaluation_shape(prefix: &str, shape_name: &str, raw_tool: Option<Shape>) -> Shape {
    let upper = prefix.to_uppercase();
    let mut shape = Shape::new(shape_name, format!("{upper} evaluation."))
        .with_field(FieldSpec::new(
            format!("{prefix}_trend"),
            FieldKind::Str,
            format!("{upper} trend on the graph."),
        ))
        .with_field(FieldSpec::new(
            format!("{prefix}_trading_action"),
            FieldKind::Enum(TRADING_ACTIONS),
            format!("Action to take based on {upper}."),
        ));

    for rank in ["primary", "secondary", "minor"] {
        shape = shape
            .with_field(FieldSpec::new(
                format!("{rank}_{prefix}_trend"),
                FieldKind::Enum(TREND_CATEGORIES),
                format!("Category of the {rank} {upper} trend."),
            ))
            .with_field(FieldSpec::new(
                format!("{rank}_{prefix}_trend_number_of_touches"),
                FieldKind::Int,
                format!("Number of times the prices touch the {rank} {upper} trend."),
            ));
    }

    if let Some(raw) = raw_tool {
        shape = shape.with_field(FieldSpec::optional(
            "raw_tool_data",
            FieldKind::Nested(raw),
            format!("Raw data specific to the {upper} tool."),
        ));
    }

    shape
}

/// Support or resistance evaluation shape; `kind` is "support" or "resistance".
pub fn support_resistance_shape(kind: &str, raw_tool: Shape) -> Shape {
    let upper = kind.to_uppercase();
    Shape::new(
        format!("{}Evaluation", capitalize(kind)),
        format!("{upper} levels evaluation."),
    )
    .with_field(FieldSpec::new(
        format!("{kind}s_evaluation"),
        FieldKind::Str,
        format!("Global evaluation of the {upper}s."),
    ))
    .with_field(FieldSpec::new(
        format!("{kind}_interaction_status"),
        FieldKind::Enum(SUPPORT_RESISTANCE_INTERACTION_STATUS),
        format!("Category of the {upper} status."),
    ))
    .with_field(FieldSpec::new(
        format!("{kind}_interaction_implication"),
        FieldKind::Enum(SUPPORT_RESISTANCE_INTERACTION_IMPLICATION),
        format!("Category of the {upper} implication."),
    ))
    .with_field(FieldSpec::new(
        format!("close_{kind}_level"),
        FieldKind::Str,
        format!("Evaluation and/or value of the closest {upper} in relation to the price."),
    ))
    .with_field(FieldSpec::new(
        format!("middle_{kind}_level"),
        FieldKind::Str,
        format!("Evaluation and/or value of the middle {upper} in relation to the price."),
    ))
    .with_field(FieldSpec::new(
        format!("far_{kind}_level"),
        FieldKind::Str,
        format!("Evaluation and/or value of the farthest {upper} in relation to the price."),
    ))
    .with_field(FieldSpec::optional(
        "raw_tool_data",
        FieldKind::Nested(raw_tool),
        format!("Raw data specific to the {upper} tool."),
    ))
}

/// Raw close/middle/far level values for one support or resistance side.
pub fn support_resistance_raw_shape(kind: &str) -> Shape {
    let upper = kind.to_uppercase();
    Shape::new(
        format!("{}RawToolData", capitalize(kind)),
        format!("{upper} raw values provided by the prices graphical analysis."),
    )
    .with_field(FieldSpec::new(
        format!("close_{kind}_value"),
        FieldKind::Float,
        format!("Raw value of the closest {upper} in relation to the price."),
    ))
    .with_field(FieldSpec::new(
        format!("middle_{kind}_value"),
        FieldKind::Float,
        format!("Raw value of the middle {upper} in relation to the price."),
    ))
    .with_field(FieldSpec::new(
        format!("far_{kind}_value"),
        FieldKind::Float,
        format!("Raw value of the farthest {upper} in relation to the price."),
    ))
}

/// Carbon-emissions raw values for one trailing year.
pub fn carbon_year_raw_shape(year: u32) -> Shape {
    Shape::new(
        format!("Year{year}RawValues"),
        format!("Carbon emissions raw values of {year} year(s) ago."),
    )
    .with_field(FieldSpec::new(
        format!("total_year_{year}_value"),
        FieldKind::Float,
        "Total carbon emissions in tonnes of CO2.",
    ))
    .with_field(FieldSpec::new(
        format!("scope_1_year_{year}_value"),
        FieldKind::Float,
        "Greenhouse gases emitted directly by the company, in tonnes of CO2.",
    ))
    .with_field(FieldSpec::new(
        format!("scope_2_year_{year}_value"),
        FieldKind::Float,
        "Indirect emissions linked to energy, in tonnes of CO2.",
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_shape_generates_prefixed_aliases() {
        let shape = evaluation_shape("rsi", "RsiEvaluation", None);
        assert_eq!(shape.name, "RsiEvaluation");
        assert!(shape.field("rsi_trend").is_some());
        assert!(shape.field("rsi_trading_action").is_some());
        assert!(shape.field("primary_rsi_trend").is_some());
        assert!(shape.field("minor_rsi_trend_number_of_touches").is_some());
        assert!(shape.field("raw_tool_data").is_none());
    }

    #[test]
    fn test_evaluation_shape_attaches_optional_raw_tool() {
        let raw = Shape::new("RsiRawValue", "RSI raw value.").with_field(FieldSpec::new(
            "rsi_value",
            FieldKind::Float,
            "RSI raw value.",
        ));
        let shape = evaluation_shape("rsi", "RsiEvaluation", Some(raw));
        let field = shape.field("raw_tool_data").unwrap();
        assert!(!field.required);
        assert!(matches!(&field.kind, FieldKind::Nested(s) if s.name == "RsiRawValue"));
    }

    #[test]
    fn test_support_resistance_aliases() {
        let shape = support_resistance_shape("support", support_resistance_raw_shape("support"));
        assert_eq!(shape.name, "SupportEvaluation");
        assert!(shape.field("supports_evaluation").is_some());
        assert!(shape.field("support_interaction_status").is_some());
        assert!(shape.field("close_support_level").is_some());

        let shape =
            support_resistance_shape("resistance", support_resistance_raw_shape("resistance"));
        assert_eq!(shape.name, "ResistanceEvaluation");
        assert!(shape.field("resistances_evaluation").is_some());
        assert!(shape.field("far_resistance_level").is_some());
    }

    #[test]
    fn test_carbon_year_aliases() {
        let shape = carbon_year_raw_shape(2);
        assert_eq!(shape.name, "Year2RawValues");
        assert!(shape.field("total_year_2_value").is_some());
        assert!(shape.field("scope_1_year_2_value").is_some());
        assert!(shape.field("scope_2_year_2_value").is_some());
    }
}
