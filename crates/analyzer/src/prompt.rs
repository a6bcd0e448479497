use analytics::MetricsReport;
use core_types::{RawMetricsInput, SectionKind};
use serde_json::json;

pub const SYSTEM_INSTRUCTION: &str = "You are a trading coach reviewing a backtest. \
Answer with a single JSON object inside a ```json fenced block and nothing else.";

/// Builds the user prompt: the computed metrics plus the sections expected back.
pub fn build(input: &RawMetricsInput, report: &MetricsReport) -> Result<String, serde_json::Error> {
    let sections: Vec<&str> = SectionKind::ALL.iter().map(|s| s.key()).collect();
    let payload = json!({
        "sampleSize": input.sample_size(),
        "hasTrades": !input.trades.is_empty(),
        "hasReturns": !input.returns.is_empty(),
        "metrics": serde_json::to_value(report)?,
        "summary": serde_json::to_value(&input.summary)?,
    });

    Ok(format!(
        "Review this backtest and return the sections {}.\n\n{}",
        sections.join(", "),
        serde_json::to_string_pretty(&payload)?
    ))
}
