//! Topic validation and shape checks for model output.

use clarity_core::JsonObject;
use serde_json::Value;

/// Shortest accepted topic, counted after trimming.
pub const MIN_TOPIC_CHARS: usize = 3;

/// Keys every analysis document must carry.
const REQUIRED_KEYS: [&str; 3] = ["topic", "analysis", "summary"];

/// Rejected topics. The display text is returned to callers as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicError {
    #[error("Topic cannot be empty")]
    Empty,
    #[error("Topic must have at least {min} characters")]
    TooShort { min: usize },
    #[error("Topic cannot exceed {max} characters")]
    TooLong { max: usize },
}

/// Model output that cannot be used as an analysis.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Error processing model response")]
    Parse(#[source] serde_json::Error),
    #[error("Invalid response structure")]
    Shape { reason: String },
}

/// Check a topic against the length limits.
///
/// Lengths are counted in characters. The minimum applies to the trimmed
/// topic, the maximum to the topic as sent.
pub fn validate_topic(topic: &str, max_length: usize) -> Result<(), TopicError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(TopicError::Empty);
    }
    if trimmed.chars().count() < MIN_TOPIC_CHARS {
        return Err(TopicError::TooShort {
            min: MIN_TOPIC_CHARS,
        });
    }
    if topic.chars().count() > max_length {
        return Err(TopicError::TooLong { max: max_length });
    }
    Ok(())
}

/// Parse model output into an analysis document and check its shape.
pub fn parse_analysis(content: &str) -> Result<JsonObject, ResponseError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(content)).map_err(ResponseError::Parse)?;
    let Value::Object(document) = value else {
        return Err(ResponseError::Shape {
            reason: "response is not a JSON object".to_string(),
        });
    };

    validate_analysis_structure(&document)?;
    Ok(document)
}

/// Require `topic`, `analysis` and `summary`, with non-empty `analysis.pros`
/// and `analysis.cons` lists.
pub fn validate_analysis_structure(document: &JsonObject) -> Result<(), ResponseError> {
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !document.contains_key(**key)) {
        return Err(ResponseError::Shape {
            reason: format!("missing key '{}'", missing),
        });
    }

    for side in ["pros", "cons"] {
        match document["analysis"].get(side) {
            Some(Value::Array(points)) if !points.is_empty() => {}
            Some(Value::Array(_)) => {
                return Err(ResponseError::Shape {
                    reason: format!("analysis.{} is empty", side),
                });
            }
            _ => {
                return Err(ResponseError::Shape {
                    reason: format!("analysis.{} is not a list", side),
                });
            }
        }
    }

    Ok(())
}

/// Strip a single surrounding markdown code fence, if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
