//! Recovers a structured record from free-form completion-service text.
//!
//! The model is asked for a single JSON object but the envelope varies: a
//! fenced ```json block, a bare object buried in prose, or nothing usable
//! at all. Extraction tries a fixed strategy order and a null parse is a
//! normal outcome, not an error - callers keep the raw text as fallback.

use log::debug;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

/// Extraction result. `parsed` is `None` when no strategy produced a
/// well-formed record; `raw` always preserves the original response text.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub parsed: Option<T>,
    pub raw: String,
}

impl<T> Extracted<T> {
    pub fn failed(raw: &str) -> Self {
        Extracted {
            parsed: None,
            raw: raw.to_string(),
        }
    }
}

/// Extracts one structured record of type `T` from raw model output.
///
/// Strategy order:
/// 1. interior of the first fenced ```json block;
/// 2. otherwise the first `{` .. last `}` span;
/// 3. decode the chosen span; on failure, normalize once (strip control
///    characters, collapse whitespace, drop trailing commas) and retry
///    exactly once;
/// 4. otherwise `parsed: None` with the raw text intact.
///
/// The same algorithm serves evaluation, assessment, and follow-up
/// responses; only `T` differs, and the caller validates the shape.
pub fn extract<T: DeserializeOwned>(raw: &str) -> Extracted<T> {
    let candidate = match fenced_json_block(raw).or_else(|| brace_span(raw)) {
        Some(span) => span,
        None => {
            debug!("No structured span located in {} chars of output", raw.len());
            return Extracted::failed(raw);
        }
    };

    Extracted {
        parsed: decode(candidate),
        raw: raw.to_string(),
    }
}

/// Interior of the first fenced block explicitly tagged as JSON.
fn fenced_json_block(text: &str) -> Option<&str> {
    let open = ["```json", "```JSON"]
        .iter()
        .filter_map(|tag| text.find(tag))
        .min()?;
    let body_start = open + "```json".len();
    let close = text[body_start..].find("```")?;
    Some(text[body_start..body_start + close].trim())
}

/// Greedy object match: first `{` through the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(text[start..=end].trim())
}

fn decode<T: DeserializeOwned>(span: &str) -> Option<T> {
    let span = span.trim();
    // Structural precheck: do not spend a decode attempt on spans that
    // cannot possibly be an object.
    if !(span.starts_with('{') && span.ends_with('}')) {
        return None;
    }

    match serde_json::from_str(span) {
        Ok(value) => Some(value),
        Err(first_err) => {
            let cleaned = normalize(span);
            match serde_json::from_str(&cleaned) {
                Ok(value) => {
                    debug!("Decoded after normalization (first error: {})", first_err);
                    Some(value)
                }
                Err(second_err) => {
                    debug!(
                        "Decode failed twice: {} / after normalization: {}",
                        first_err, second_err
                    );
                    None
                }
            }
        }
    }
}

/// One-shot cleanup for almost-JSON: control characters stripped, newlines
/// and whitespace runs collapsed, trailing commas before `}`/`]` removed.
fn normalize(span: &str) -> String {
    static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

    let without_controls: String = span
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let collapsed = WHITESPACE_RUN
        .get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
        .replace_all(&without_controls, " ");

    TRAILING_COMMA
        .get_or_init(|| Regex::new(r",\s*([}\]])").expect("trailing comma regex"))
        .replace_all(&collapsed, "$1")
        .into_owned()
}
