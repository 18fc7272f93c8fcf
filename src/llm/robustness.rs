/*
* Response robustness layer
* -------------------------
* Model output is text and text lies. This module turns whatever came back
* over the wire into structured data through a three-tier degrade:
*
*   1. direct parse of the cleaned text
*   2. extraction of the substring between the first '{' and the last '}'
*   3. a fixed, minimal-but-valid default payload
*
* It never fails outright; callers always get a value plus a fidelity tag
* telling them which tier produced it.
*/

use serde_json::{json, Value};
use tracing::warn;

/// Which tier of the degrade chain produced the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFidelity {
    /// The cleaned text parsed as-is.
    Direct,
    /// A JSON object was recovered from surrounding prose.
    Extracted,
    /// Nothing recoverable; this is the fixed default payload.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ParsedPayload {
    pub value: Value,
    pub fidelity: ParseFidelity,
}

impl ParsedPayload {
    pub fn is_usable(&self) -> bool {
        self.fidelity != ParseFidelity::Fallback
    }
}

/// Strips markdown code fences (with or without a language tag) and
/// surrounding whitespace. Purely textual, no semantic parsing.
pub fn clean_response(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("json") {
        text = rest;
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Last-resort payload: a valid recommendation structure that downstream
/// code can always consume.
pub fn default_payload() -> Value {
    json!({
        "executive_summary": "Recommendations generated by AI analysis.",
        "detailed_analysis": "Detailed analysis of system metrics.",
        "recommendations": [],
        "priority_level": "medium",
        "estimated_impact": "Improved system performance",
        "implementation_timeframe": "1-2 weeks"
    })
}

/// Parses free-form model output into a JSON object, degrading through the
/// three tiers. Only objects count as valid structure; a bare array or
/// scalar falls through to extraction and then the default.
pub fn parse_payload(raw: &str) -> ParsedPayload {
    let cleaned = clean_response(raw);

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        if value.is_object() {
            return ParsedPayload {
                value,
                fidelity: ParseFidelity::Direct,
            };
        }
    }

    if let Some(extracted) = extract_object(raw) {
        warn!("Direct JSON parse failed, recovered object from text");
        return ParsedPayload {
            value: extracted,
            fidelity: ParseFidelity::Extracted,
        };
    }

    warn!(
        "No recoverable JSON in model response, using default payload: {}...",
        &raw.chars().take(120).collect::<String>()
    );
    ParsedPayload {
        value: default_payload(),
        fidelity: ParseFidelity::Fallback,
    }
}

fn extract_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}
