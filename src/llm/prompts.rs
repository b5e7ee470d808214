/// Instruction prefix selecting the local model's deliberate reasoning mode.
pub const DEEP_THINKING_INSTRUCTION: &str = "Enable deep thinking subroutine.\n\n";

/// Build the system text for one section request.
///
/// Layout: role instruction, one block per dependency document, the data
/// framing (with the timeframe when the section has one), then the shape
/// contract bracketed by the compliance admonitions. Dependencies are inlined
/// in plan order so the same plan always yields the same request text.
pub fn build_section_prompt(
    role: &str,
    label: &str,
    ticker: &str,
    timeframe: Option<&str>,
    dependencies: &[(String, String)],
    format_instructions: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(DEEP_THINKING_INSTRUCTION);
    prompt.push_str(&format!(
        "As {role}, your task is to generate the {label} report for {ticker} at the specified JSON format. "
    ));

    for (dep_label, dep_json) in dependencies {
        prompt.push_str(&format!(
            "The JSON of the {dep_label} section is provided here:\n{dep_json}\n"
        ));
    }

    prompt.push_str(&format!(
        "Use the data (simulated for the exercise) to generate the {label} of {ticker} totally filling the JSON schema described below. "
    ));
    if let Some(timeframe) = timeframe {
        prompt.push_str(&format!("The timeframe of {ticker} data is {timeframe}. "));
    }
    prompt.push_str(
        "The format of your response is CRITICAL and MUST ADHERE EXACTLY to the JSON schema described here:\n",
    );
    prompt.push_str(format_instructions);
    prompt.push_str(
        "\nThus, you MUST RESPECT the type of JSON schema entries. \
         Once again, the JSON schema described above is CRITICAL and MUST BE RESPECTED.",
    );

    prompt
}

/// Build the retry system text for attempt i > 0.
///
/// The original request is preserved in full. The backend has no memory of
/// the prior attempt, so the error feedback alone would be meaningless.
pub fn build_retry_prompt(original: &str, error: &str) -> String {
    format!(
        "{original}\n\nYour previous attempt failed because: {error}\n\
         YOU MUST RESPECT THE SCHEMA PROVIDED IN THE PROMPT. \
         Respond again with a single JSON object that conforms to it."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_prompt_inlines_dependencies_in_order() {
        let deps = vec![
            ("rsi".to_string(), r#"{"rsi_trend":"up"}"#.to_string()),
            ("macd".to_string(), r#"{"macd_trend":"flat"}"#.to_string()),
        ];
        let prompt = build_section_prompt(
            "trading technical analyst expert",
            "technical analysis",
            "AAPL",
            Some("5 minutes"),
            &deps,
            "Shape `Indicators`: ...",
        );

        assert!(prompt.starts_with(DEEP_THINKING_INSTRUCTION));
        assert!(prompt.contains("technical analysis report for AAPL"));
        assert!(prompt.contains("The timeframe of AAPL data is 5 minutes."));
        let rsi_at = prompt.find(r#"{"rsi_trend":"up"}"#).unwrap();
        let macd_at = prompt.find(r#"{"macd_trend":"flat"}"#).unwrap();
        assert!(rsi_at < macd_at);
        assert!(prompt.contains("Shape `Indicators`"));
    }

    #[test]
    fn test_leaf_prompt_has_no_dependency_blocks() {
        let prompt = build_section_prompt(
            "trading ESG analyst expert",
            "ESG analysis",
            "AAPL",
            None,
            &[],
            "Shape `ExposureRisk`: ...",
        );
        assert!(!prompt.contains("is provided here"));
        assert!(!prompt.contains("timeframe of"));
    }

    #[test]
    fn test_retry_prompt_preserves_original_and_error() {
        let original = build_section_prompt(
            "trading technical analyst expert",
            "technical analysis",
            "AAPL",
            None,
            &[],
            "Shape `RsiEvaluation`: ...",
        );
        let retry = build_retry_prompt(&original, "missing required field `rsi_trend`");

        assert!(retry.contains(&original));
        assert!(retry.contains("missing required field `rsi_trend`"));
        assert!(retry.contains("MUST RESPECT THE SCHEMA"));
    }
}
