//! # Extractor
//!
//! Recovers a JSON payload from the free-form text a generative model returns.
//!
//! Model output is usually either a fenced ` ```json ` block or a bare object
//! wrapped in prose. Failing to find either is an expected outcome, so
//! [`extract`] never errors: it reports `success: false` and hands the raw
//! text back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const FENCE: &str = "```";

/// Which top-level JSON shape the caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedShape {
    #[default]
    Object,
    Array,
}

impl ExpectedShape {
    fn delimiters(&self) -> (char, char) {
        match self {
            ExpectedShape::Object => ('{', '}'),
            ExpectedShape::Array => ('[', ']'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub parsed: Option<Value>,
    pub raw_text: String,
}

impl ExtractionResult {
    fn found(parsed: Value, raw_text: &str) -> Self {
        Self { success: true, parsed: Some(parsed), raw_text: raw_text.to_string() }
    }

    fn not_found(raw_text: &str) -> Self {
        Self { success: false, parsed: None, raw_text: raw_text.to_string() }
    }

    /// Decodes the payload into a concrete type, `None` on any mismatch.
    pub fn parse_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.parsed.clone().and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Extracts a JSON object from `text`.
pub fn extract(text: &str) -> ExtractionResult {
    extract_expecting(text, ExpectedShape::Object)
}

/// Extracts a JSON value of the given shape from `text`.
///
/// 1. A fenced block tagged `json` wins outright: its contents are parsed and
///    the outcome is final.
/// 2. Otherwise the span from the first opening delimiter to the last closing
///    one is parsed.
/// 3. Anything else is a miss.
pub fn extract_expecting(text: &str, shape: ExpectedShape) -> ExtractionResult {
    if let Some(block) = fenced_json_block(text) {
        return match serde_json::from_str::<Value>(block) {
            Ok(value) => ExtractionResult::found(value, text),
            Err(e) => {
                tracing::debug!(error = %e, "Fenced JSON block did not parse.");
                ExtractionResult::not_found(text)
            }
        };
    }

    match greedy_span(text, shape) {
        Some(span) => match serde_json::from_str::<Value>(span) {
            Ok(value) => ExtractionResult::found(value, text),
            Err(e) => {
                tracing::debug!(error = %e, "Bare JSON span did not parse.");
                ExtractionResult::not_found(text)
            }
        },
        None => ExtractionResult::not_found(text),
    }
}

/// Contents of the first fence whose language tag is `json` (any case).
fn fenced_json_block(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let line_end = after_open.find('\n').unwrap_or(after_open.len());
        let tag = after_open[..line_end].trim();
        let body_start = (line_end + 1).min(after_open.len());
        let body = &after_open[body_start..];
        let close = body.find(FENCE)?;

        if tag.eq_ignore_ascii_case("json") {
            return Some(body[..close].trim());
        }
        rest = &body[close + FENCE.len()..];
    }
    None
}

fn greedy_span(text: &str, shape: ExpectedShape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
