//! Technical-analysis domain: shape DAG and section plan.
//!
//! Per timeframe, the rsi/macd/bollinger_bands leaves feed the indicators
//! composite; support, resistance, prices, indicators and volumes feed the
//! timeframe composite; the two timeframes feed the root synthesis.

use crate::domains::builders::{
    SUPPORT_RESISTANCE_INTERACTION_IMPLICATION, SUPPORT_RESISTANCE_INTERACTION_STATUS,
    TRADING_ACTIONS, evaluation_shape, support_resistance_raw_shape, support_resistance_shape,
};
use crate::pipeline::{AnalysisPlan, SectionPlan};
use crate::schema::{FieldKind, FieldSpec, Shape};

fn rsi_raw() -> Shape {
    Shape::new("RsiRawValue", "RSI raw value provided by the RSI tool.").with_field(
        FieldSpec::new(
            "rsi_value",
            FieldKind::Float,
            "RSI raw value provided by the RSI tool.",
        ),
    )
}

fn macd_raw() -> Shape {
    Shape::new("MacdRawValues", "MACD raw values provided by the MACD tool.")
        .with_field(FieldSpec::new(
            "short_moving_average_value",
            FieldKind::Float,
            "Short moving average raw value provided by the MACD tool.",
        ))
        .with_field(FieldSpec::new(
            "long_moving_average_value",
            FieldKind::Float,
            "Long moving average raw value provided by the MACD tool.",
        ))
        .with_field(FieldSpec::new(
            "signal_value",
            FieldKind::Float,
            "Signal raw value provided by the MACD tool.",
        ))
}

fn bollinger_raw() -> Shape {
    Shape::new(
        "BollingerBandsRawValues",
        "Bollinger Bands raw values provided by the Bollinger Bands tool.",
    )
    .with_field(FieldSpec::new(
        "bollinger_bands_moving_average_value",
        FieldKind::Float,
        "Moving average raw value provided by the Bollinger Bands tool.",
    ))
    .with_field(FieldSpec::new(
        "bollinger_bands_above_standard_deviation_value",
        FieldKind::Float,
        "Upper standard deviation provided by the Bollinger Bands tool.",
    ))
    .with_field(FieldSpec::new(
        "bollinger_bands_below_standard_deviation_value",
        FieldKind::Float,
        "Lower standard deviation provided by the Bollinger Bands tool.",
    ))
}

fn prices_raw() -> Shape {
    Shape::new("PricesRawValue", "PRICES raw value provided by the chart.").with_field(
        FieldSpec::new(
            "prices_value",
            FieldKind::Float,
            "PRICES raw value provided by the chart.",
        ),
    )
}

fn volumes_raw() -> Shape {
    Shape::new("VolumesRawValue", "VOLUMES raw value provided by the chart.").with_field(
        FieldSpec::new(
            "volumes_value",
            FieldKind::Float,
            "VOLUMES raw value provided by the chart.",
        ),
    )
}

fn rsi_shape() -> Shape {
    evaluation_shape("rsi", "RsiEvaluation", Some(rsi_raw()))
}

fn macd_shape() -> Shape {
    evaluation_shape("macd", "MacdEvaluation", Some(macd_raw()))
}

fn bollinger_shape() -> Shape {
    evaluation_shape(
        "bollinger_bands",
        "BollingerBandsEvaluation",
        Some(bollinger_raw()),
    )
}

fn prices_shape() -> Shape {
    evaluation_shape("prices", "PricesEvaluation", Some(prices_raw()))
        .with_field(FieldSpec::new(
            "prices_trend_evaluation",
            FieldKind::Str,
            "PRICES trend on the graph.",
        ))
        .with_field(FieldSpec::new(
            "chart_pattern",
            FieldKind::Str,
            "Description of the chart pattern, if any.",
        ))
        .with_field(FieldSpec::new(
            "potential_chart_pattern",
            FieldKind::Str,
            "Description of potential coming chart patterns to focus on, if any.",
        ))
        .with_field(FieldSpec::new(
            "candlestick_pattern",
            FieldKind::Str,
            "Description of the candlestick pattern, if any.",
        ))
        .with_field(FieldSpec::new(
            "potential_candlestick_pattern",
            FieldKind::Str,
            "Description of potential coming candlestick patterns to focus on, if any.",
        ))
}

fn volumes_shape() -> Shape {
    evaluation_shape("volumes", "VolumesEvaluation", Some(volumes_raw())).with_field(
        FieldSpec::new(
            "volumes_trend_evaluation",
            FieldKind::Str,
            "VOLUMES trend on the graph.",
        ),
    )
}

fn indicators_shape() -> Shape {
    Shape::new("Indicators", "Various prices related indicators.")
        .with_field(FieldSpec::optional(
            "rsi_evaluation",
            FieldKind::Nested(rsi_shape()),
            "RSI evaluation.",
        ))
        .with_field(FieldSpec::optional(
            "macd_evaluation",
            FieldKind::Nested(macd_shape()),
            "MACD evaluation.",
        ))
        .with_field(FieldSpec::optional(
            "bollinger_bands_evaluation",
            FieldKind::Nested(bollinger_shape()),
            "Bollinger Bands evaluation.",
        ))
}

fn synthesis_shape() -> Shape {
    Shape::new("Synthesis", "Synthesis and conclusion about the related data.")
        .with_field(FieldSpec::new(
            "conclusion",
            FieldKind::Str,
            "Conclusion about the market at this time.",
        ))
        .with_field(FieldSpec::optional(
            "synthese_remarkable_values",
            FieldKind::Json,
            "Remarkable values to keep in mind, as a dictionary.",
        ))
        .with_field(FieldSpec::new(
            "synthese_trading_action",
            FieldKind::Enum(TRADING_ACTIONS),
            "Action to take.",
        ))
        .with_field(FieldSpec::new(
            "synthese_support_resistance_comment",
            FieldKind::Str,
            "Comments about supports and/or resistances.",
        ))
        .with_field(FieldSpec::new(
            "synthese_support_resistance_interaction_status",
            FieldKind::Enum(SUPPORT_RESISTANCE_INTERACTION_STATUS),
            "Category of the support status.",
        ))
        .with_field(FieldSpec::new(
            "synthese_support_resistance_interaction_implication",
            FieldKind::Enum(SUPPORT_RESISTANCE_INTERACTION_IMPLICATION),
            "Category of the support implication.",
        ))
}

fn timeframe_shape(name: &str, synthesis_field: &str, default_minutes: u32) -> Shape {
    Shape::new(name, "Various evaluations related to one timeframe.")
        .with_field(FieldSpec::new(
            "data_timeframe",
            FieldKind::Int,
            format!(
                "Value in minutes of the graph timeframe used as reference for the next values (typically {default_minutes})."
            ),
        ))
        .with_field(FieldSpec::new(
            "supports_evaluation",
            FieldKind::Nested(support_resistance_shape(
                "support",
                support_resistance_raw_shape("support"),
            )),
            "The evaluation of the prices supports for the current timeframe.",
        ))
        .with_field(FieldSpec::new(
            "resistances_evaluation",
            FieldKind::Nested(support_resistance_shape(
                "resistance",
                support_resistance_raw_shape("resistance"),
            )),
            "The evaluation of the prices resistances for the current timeframe.",
        ))
        .with_field(FieldSpec::new(
            "prices_evaluation",
            FieldKind::Nested(prices_shape()),
            "The evaluation of the prices for the current timeframe.",
        ))
        .with_field(FieldSpec::new(
            "indicators",
            FieldKind::Nested(indicators_shape()),
            "The evaluation of the indicators for the current timeframe.",
        ))
        .with_field(FieldSpec::new(
            "volumes_evaluation",
            FieldKind::Nested(volumes_shape()),
            "The evaluation of the prices volumes for the current timeframe.",
        ))
        .with_field(FieldSpec::new(
            synthesis_field,
            FieldKind::Nested(synthesis_shape()),
            "Timeframe data synthesis and conclusions.",
        ))
}

fn ticker_shape() -> Shape {
    Shape::new(
        "TickerTechnicalAnalysis",
        "Ticker technical analysis and synthesis based on both shorter and longer timeframe analyses.",
    )
    .with_field(FieldSpec::new(
        "name_of_the_company",
        FieldKind::Str,
        "Name of the company.",
    ))
    .with_field(FieldSpec::new(
        "isin_of_the_company",
        FieldKind::Str,
        "ISIN code of the company.",
    ))
    .with_field(FieldSpec::new(
        "time_of_the_report",
        FieldKind::DateTime,
        "Datetime of the current report.",
    ))
    .with_field(FieldSpec::new(
        "short_timeframe_data",
        FieldKind::Nested(timeframe_shape(
            "ShortTimeframeData",
            "short_timeframe_data_synthesis",
            5,
        )),
        "Short timeframe data and synthesis.",
    ))
    .with_field(FieldSpec::new(
        "long_timeframe_data",
        FieldKind::Nested(timeframe_shape(
            "LongTimeframeData",
            "long_timeframe_data_synthesis",
            60,
        )),
        "Long timeframe data and synthesis.",
    ))
    .with_field(FieldSpec::new(
        "synthesis",
        FieldKind::Nested(synthesis_shape()),
        "Synthesis and conclusions made on both shorter and longer timeframe data.",
    ))
}

/// Section plan for one timeframe: five section leaves (one of them the
/// indicators composite over its three leaves) feeding the timeframe node.
fn timeframe_plan(name: &str, timeframe: &str, shape: Shape) -> SectionPlan {
    let tf = Some(timeframe.to_string());

    let indicators = SectionPlan::composite(
        format!("{name}.indicators"),
        "indicators",
        indicators_shape(),
        tf.clone(),
        vec![
            SectionPlan::leaf(
                format!("{name}.indicators.rsi"),
                "rsi",
                rsi_shape(),
                tf.clone(),
            ),
            SectionPlan::leaf(
                format!("{name}.indicators.macd"),
                "macd",
                macd_shape(),
                tf.clone(),
            ),
            SectionPlan::leaf(
                format!("{name}.indicators.bollinger_bands"),
                "bollinger_bands",
                bollinger_shape(),
                tf.clone(),
            ),
        ],
    );

    SectionPlan::composite(
        name,
        name,
        shape,
        tf.clone(),
        vec![
            SectionPlan::leaf(
                format!("{name}.support"),
                "support",
                support_resistance_shape("support", support_resistance_raw_shape("support")),
                tf.clone(),
            ),
            SectionPlan::leaf(
                format!("{name}.resistance"),
                "resistance",
                support_resistance_shape("resistance", support_resistance_raw_shape("resistance")),
                tf.clone(),
            ),
            SectionPlan::leaf(format!("{name}.prices"), "prices", prices_shape(), tf.clone()),
            indicators,
            SectionPlan::leaf(format!("{name}.volumes"), "volumes", volumes_shape(), tf),
        ],
    )
}

/// Full technical-analysis plan for one ticker.
pub fn technical_plan(ticker: &str, short_timeframe: &str, long_timeframe: &str) -> AnalysisPlan {
    AnalysisPlan {
        role: "trading technical analyst expert".to_string(),
        label: "technical analysis".to_string(),
        ticker: ticker.to_string(),
        root: SectionPlan::composite(
            "ticker_technical_analysis",
            "ticker_technical_analysis",
            ticker_shape(),
            None,
            vec![
                timeframe_plan(
                    "short_timeframe_data",
                    short_timeframe,
                    timeframe_shape("ShortTimeframeData", "short_timeframe_data_synthesis", 5),
                ),
                timeframe_plan(
                    "long_timeframe_data",
                    long_timeframe,
                    timeframe_shape("LongTimeframeData", "long_timeframe_data_synthesis", 60),
                ),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::minimal_document;
    use crate::schema::validate_document;

    #[test]
    fn test_plan_has_one_node_per_section() {
        let plan = technical_plan("AAPL", "5 minutes", "1 hour");
        // Per timeframe: 4 leaves + 3 indicator leaves + indicators + the
        // timeframe node = 9; two timeframes plus the root = 19.
        assert_eq!(plan.root.node_count(), 19);
        assert!(!plan.root.is_leaf());
        assert_eq!(plan.root.children.len(), 2);
    }

    #[test]
    fn test_timeframes_reach_their_subtrees() {
        let plan = technical_plan("AAPL", "5 minutes", "1 hour");
        let short = &plan.root.children[0];
        let long = &plan.root.children[1];
        assert_eq!(short.timeframe.as_deref(), Some("5 minutes"));
        assert_eq!(long.timeframe.as_deref(), Some("1 hour"));
        assert_eq!(
            short.children[3].children[0].name,
            "short_timeframe_data.indicators.rsi"
        );
        assert_eq!(
            long.children[3].children[0].timeframe.as_deref(),
            Some("1 hour")
        );
    }

    #[test]
    fn test_root_shape_nests_both_timeframes() {
        let shape = ticker_shape();
        assert!(shape.field("short_timeframe_data").is_some());
        assert!(shape.field("long_timeframe_data").is_some());
        assert!(shape.field("time_of_the_report").is_some());

        let doc = minimal_document(&shape);
        assert!(validate_document(&shape, &doc).is_valid);
    }

    #[test]
    fn test_prices_shape_extends_the_generic_evaluation() {
        let shape = prices_shape();
        assert!(shape.field("prices_trend").is_some());
        assert!(shape.field("prices_trend_evaluation").is_some());
        assert!(shape.field("chart_pattern").is_some());
        assert!(shape.field("potential_candlestick_pattern").is_some());
        // Volumes gets the trend evaluation but not the pattern fields.
        let volumes = volumes_shape();
        assert!(volumes.field("volumes_trend_evaluation").is_some());
        assert!(volumes.field("chart_pattern").is_none());
    }
}
