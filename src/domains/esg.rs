//! ESG domain: shape DAG and section plan.
//!
//! The three trailing-year carbon raw-value leaves feed the carbon_emissions
//! composite; sustainability risk, exposure risk, management score, carbon
//! emissions and activities involvements feed the root synthesis.

use crate::domains::builders::{TRADING_ACTIONS, carbon_year_raw_shape};
use crate::pipeline::{AnalysisPlan, SectionPlan};
use crate::schema::{EnumSpec, FieldKind, FieldSpec, Shape};

/// The higher the rating, the greater the risk.
pub const ESG_RISK_LEVEL: EnumSpec = EnumSpec {
    name: "ESGRiskLevel",
    values: &["NEGLIGIBLE", "WEAK", "MEDIUM", "HIGH", "SERIOUS"],
};

pub const EXPOSURE_RISK_LEVEL: EnumSpec = EnumSpec {
    name: "ExposureRiskLevel",
    values: &["LOW", "MEDIUM", "HIGH"],
};

/// The higher the rating, the better the risk is managed by the company.
pub const ESG_MANAGEMENT_SCORE: EnumSpec = EnumSpec {
    name: "ESGManagementScore",
    values: &["LOW", "MEDIUM", "HIGH"],
};

pub const CARBON_EMISSIONS_LEVEL: EnumSpec = EnumSpec {
    name: "CarbonEmissionsLevel",
    values: &["NEGLIGIBLE", "WEAK", "MEDIUM", "HIGH", "SERIOUS"],
};

pub const RISKS_LEVEL: EnumSpec = EnumSpec {
    name: "RisksLevel",
    values: &[
        "NEGLIGIBLE",
        "WEAK",
        "MEDIUM WEAK",
        "MEDIUM",
        "MEDIUM HIGH",
        "HIGH",
        "SERIOUS",
    ],
};

fn sustainability_risk_raw() -> Shape {
    Shape::new(
        "SustainabilityRiskRawValue",
        "Sustainability risk raw values provided by the tool.",
    )
    .with_field(FieldSpec::new(
        "global_notation_value",
        FieldKind::Float,
        "ESG risk global notation in percentage.",
    ))
    .with_field(FieldSpec::new(
        "environmental_issues_value",
        FieldKind::Float,
        "Environmental part of ESG risk in percentage.",
    ))
    .with_field(FieldSpec::new(
        "societal_issues_value",
        FieldKind::Float,
        "Societal part of ESG risk in percentage.",
    ))
    .with_field(FieldSpec::new(
        "governance_issues_value",
        FieldKind::Float,
        "Governance part of ESG risk in percentage.",
    ))
}

fn sustainability_risk_shape() -> Shape {
    Shape::new(
        "SustainabilityRisk",
        "Sustainability risk according to environmental, societal and governance evaluations.",
    )
    .with_field(FieldSpec::new(
        "esg_risk_evaluation",
        FieldKind::Str,
        "ESG risk evaluation according to environmental, societal and governance evaluations.",
    ))
    .with_field(FieldSpec::new(
        "esg_risk_level",
        FieldKind::Enum(ESG_RISK_LEVEL),
        "Level of the ESG risk.",
    ))
    .with_field(FieldSpec::new(
        "environmental_issues_evaluation",
        FieldKind::Str,
        "Evaluation of the environmental part of ESG risk.",
    ))
    .with_field(FieldSpec::new(
        "societal_issues_evaluation",
        FieldKind::Str,
        "Evaluation of the societal part of ESG risk.",
    ))
    .with_field(FieldSpec::new(
        "governance_issues_evaluation",
        FieldKind::Str,
        "Evaluation of the governance part of ESG risk.",
    ))
    .with_field(FieldSpec::optional(
        "raw_tool_data",
        FieldKind::Nested(sustainability_risk_raw()),
        "Raw data specific to the ESG sustainability tool.",
    ))
}

fn exposure_risk_shape() -> Shape {
    Shape::new("ExposureRisk", "ESG exposure risk data.")
        .with_field(FieldSpec::new(
            "esg_exposure_risk_evaluation",
            FieldKind::Str,
            "ESG exposure risk evaluation.",
        ))
        .with_field(FieldSpec::new(
            "esg_exposure_risk_level",
            FieldKind::Enum(EXPOSURE_RISK_LEVEL),
            "Level of the ESG exposure risk.",
        ))
        .with_field(FieldSpec::optional(
            "raw_tool_data",
            FieldKind::Nested(
                Shape::new(
                    "ExposureRiskRawValue",
                    "Exposure risk raw value provided by the tool.",
                )
                .with_field(FieldSpec::new(
                    "exposure_risk_value",
                    FieldKind::Float,
                    "ESG risk exposure of the company in percentage.",
                )),
            ),
            "Raw data specific to the ESG exposure risk tool.",
        ))
}

fn management_score_shape() -> Shape {
    Shape::new("ManagementScore", "ESG management score data.")
        .with_field(FieldSpec::new(
            "esg_management_score_evaluation",
            FieldKind::Str,
            "ESG management score evaluation.",
        ))
        .with_field(FieldSpec::new(
            "esg_management_score_level",
            FieldKind::Enum(ESG_MANAGEMENT_SCORE),
            "Level of the ESG management.",
        ))
        .with_field(FieldSpec::optional(
            "raw_tool_data",
            FieldKind::Nested(
                Shape::new(
                    "ManagementScoreRawValue",
                    "Management score raw value provided by the tool.",
                )
                .with_field(FieldSpec::new(
                    "management_score_value",
                    FieldKind::Float,
                    "ESG risk manageable by the company.",
                )),
            ),
            "Raw data specific to the ESG management score tool.",
        ))
}

fn carbon_emissions_raw() -> Shape {
    Shape::new(
        "CarbonEmissionsRawValue",
        "Carbon emissions raw values provided by the tool.",
    )
    .with_field(FieldSpec::new(
        "carbon_risk_value",
        FieldKind::Float,
        "The carbon risk that could impact the financial performance of the company.",
    ))
    .with_field(FieldSpec::optional(
        "year_1_value",
        FieldKind::Nested(carbon_year_raw_shape(1)),
        "Carbon emissions values of 1 year ago.",
    ))
    .with_field(FieldSpec::optional(
        "year_2_value",
        FieldKind::Nested(carbon_year_raw_shape(2)),
        "Carbon emissions values of 2 years ago.",
    ))
    .with_field(FieldSpec::optional(
        "year_3_value",
        FieldKind::Nested(carbon_year_raw_shape(3)),
        "Carbon emissions values of 3 years ago.",
    ))
}

fn carbon_emissions_shape() -> Shape {
    Shape::new("CarbonEmissions", "Carbon emissions data.")
        .with_field(FieldSpec::new(
            "carbon_emissions_evaluation",
            FieldKind::Str,
            "Evaluation of the carbon emissions according to the years 1, 2 and 3 emission values.",
        ))
        .with_field(FieldSpec::new(
            "carbon_emissions_risk_level",
            FieldKind::Enum(CARBON_EMISSIONS_LEVEL),
            "Level of the carbon emission risk.",
        ))
        .with_field(FieldSpec::optional(
            "raw_tool_data",
            FieldKind::Nested(carbon_emissions_raw()),
            "Raw data specific to the carbon emissions tool.",
        ))
}

fn activities_involvements_shape() -> Shape {
    Shape::new(
        "ActivitiesInvolvements",
        "Involvements in activities with a positive or negative impact.",
    )
    .with_field(FieldSpec::new(
        "positive_involvements_evaluation",
        FieldKind::Str,
        "Evaluation of involvements in activities with a positive impact.",
    ))
    .with_field(FieldSpec::new(
        "negative_involvements_evaluation",
        FieldKind::Str,
        "Evaluation of involvements in activities with a negative impact.",
    ))
    .with_field(FieldSpec::new(
        "controversies_risk_evaluation",
        FieldKind::Str,
        "Evaluation of involvements in controversies.",
    ))
    .with_field(FieldSpec::optional(
        "raw_tool_data",
        FieldKind::Nested(
            Shape::new(
                "ActivitiesInvolvementsRawValue",
                "Activities involvements raw values provided by the tool.",
            )
            .with_field(FieldSpec::new(
                "positive_involvements_value",
                FieldKind::Int,
                "Involvements in activities with a positive impact, out of 12.",
            ))
            .with_field(FieldSpec::new(
                "negative_involvements_value",
                FieldKind::Int,
                "Involvements in activities with a negative impact, out of 23.",
            ))
            .with_field(FieldSpec::new(
                "controversies_risk_value",
                FieldKind::Int,
                "Risk linked to controversies, out of 5.",
            )),
        ),
        "Raw data specific to the activities involvements tool.",
    ))
}

fn synthesis_shape() -> Shape {
    Shape::new("EsgSynthesis", "Synthesis and conclusion about the related data.")
        .with_field(FieldSpec::new(
            "conclusion",
            FieldKind::Str,
            "Conclusion about the impact of the previous values on the market.",
        ))
        .with_field(FieldSpec::new(
            "synthesis_trading_action",
            FieldKind::Enum(TRADING_ACTIONS),
            "Action to take.",
        ))
        .with_field(FieldSpec::new(
            "synthesis_risk",
            FieldKind::Enum(RISKS_LEVEL),
            "Risk level according to the conclusion.",
        ))
}

fn ticker_shape() -> Shape {
    Shape::new(
        "TickerEsgAnalysis",
        "Ticker ESG analysis based on ESG risk, exposure and management, carbon emissions and activities involvements.",
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
        "sustainability_risk",
        FieldKind::Nested(sustainability_risk_shape()),
        "Sustainability risk data.",
    ))
    .with_field(FieldSpec::new(
        "exposure_risk",
        FieldKind::Nested(exposure_risk_shape()),
        "Exposure risk data.",
    ))
    .with_field(FieldSpec::new(
        "management_score",
        FieldKind::Nested(management_score_shape()),
        "Management score data.",
    ))
    .with_field(FieldSpec::new(
        "carbon_emissions",
        FieldKind::Nested(carbon_emissions_shape()),
        "Carbon emissions data.",
    ))
    .with_field(FieldSpec::new(
        "activities_involvements",
        FieldKind::Nested(activities_involvements_shape()),
        "Activities involvements data.",
    ))
    .with_field(FieldSpec::new(
        "synthesis",
        FieldKind::Nested(synthesis_shape()),
        "Synthesis and conclusions made on every ESG related data.",
    ))
}

/// Full ESG-analysis plan for one ticker.
pub fn esg_plan(ticker: &str) -> AnalysisPlan {
    let carbon = SectionPlan::composite(
        "carbon_emissions",
        "carbon_emissions",
        carbon_emissions_shape(),
        None,
        vec![
            SectionPlan::leaf(
                "carbon_emissions.year_1",
                "year 1 carbon emissions raw values",
                carbon_year_raw_shape(1),
                None,
            ),
            SectionPlan::leaf(
                "carbon_emissions.year_2",
                "year 2 carbon emissions raw values",
                carbon_year_raw_shape(2),
                None,
            ),
            SectionPlan::leaf(
                "carbon_emissions.year_3",
                "year 3 carbon emissions raw values",
                carbon_year_raw_shape(3),
                None,
            ),
        ],
    );

    AnalysisPlan {
        role: "trading ESG analyst expert".to_string(),
        label: "ESG analysis".to_string(),
        ticker: ticker.to_string(),
        root: SectionPlan::composite(
            "ticker_esg_analysis",
            "ticker_esg_analysis",
            ticker_shape(),
            None,
            vec![
                SectionPlan::leaf(
                    "sustainability_risk",
                    "sustainability_risk",
                    sustainability_risk_shape(),
                    None,
                ),
                SectionPlan::leaf("exposure_risk", "exposure_risk", exposure_risk_shape(), None),
                SectionPlan::leaf(
                    "management_score",
                    "management_score",
                    management_score_shape(),
                    None,
                ),
                carbon,
                SectionPlan::leaf(
                    "activities_involvements",
                    "activities_involvements",
                    activities_involvements_shape(),
                    None,
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
        let plan = esg_plan("AAPL");
        // Four section leaves + three carbon year leaves + the carbon
        // composite + the root = 9.
        assert_eq!(plan.root.node_count(), 9);
        assert_eq!(plan.root.children.len(), 5);
        assert_eq!(plan.root.children[3].children.len(), 3);
    }

    #[test]
    fn test_carbon_composite_groups_the_year_leaves() {
        let plan = esg_plan("AAPL");
        let carbon = &plan.root.children[3];
        assert_eq!(carbon.name, "carbon_emissions");
        assert_eq!(carbon.children[0].shape.name, "Year1RawValues");
        assert_eq!(carbon.children[2].shape.name, "Year3RawValues");
    }

    #[test]
    fn test_root_shape_validates_a_minimal_document() {
        let shape = ticker_shape();
        let doc = minimal_document(&shape);
        assert!(validate_document(&shape, &doc).is_valid);
    }

    #[test]
    fn test_risks_level_values_allow_spaces() {
        assert!(RISKS_LEVEL.contains("MEDIUM WEAK"));
        assert!(RISKS_LEVEL.contains("MEDIUM HIGH"));
        assert!(!RISKS_LEVEL.contains("MEDIUM_HIGH"));
    }
}
