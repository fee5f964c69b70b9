//! Completion wire messages: `[correlationId, success, valueOrError]`.
//!
//! Exactly three elements. Element 0 is the correlation id - canonically a
//! string; a non-negative JSON integer is accepted and canonicalized to its
//! decimal string form. Element 1 is the success flag. Element 2 carries
//! the result value on success or an error description on failure.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::{DispatchError, DispatchResult};
use serde_json::Value;

/// One decoded completion message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionMessage {
    pub correlation_id: CorrelationId,
    pub success: bool,
    /// Result value (success) or error description (failure)
    pub payload: Value,
}

/// Decode a completion message, failing fast on any shape deviation.
pub fn decode_completion(raw_json: &str) -> DispatchResult<CompletionMessage> {
    let payload: Value = serde_json::from_str(raw_json).map_err(|e| {
        DispatchError::malformed_payload(format!("completion message is not valid JSON: {}", e))
    })?;

    let elements = match payload {
        Value::Array(elements) => elements,
        other => {
            return Err(DispatchError::malformed_payload(format!(
                "completion message must be a JSON array, got {}",
                type_name(&other)
            )))
        }
    };

    let [id_value, success_value, payload]: [Value; 3] = match elements.try_into() {
        Ok(elements) => elements,
        Err(elements) => {
            return Err(DispatchError::malformed_payload(format!(
                "completion message must have exactly 3 elements, got {}",
                elements.len()
            )))
        }
    };

    let correlation_id = match id_value {
        Value::String(s) => CorrelationId::from(s),
        Value::Number(n) => match n.as_u64() {
            Some(v) => CorrelationId::from_integer(v),
            None => {
                return Err(DispatchError::malformed_payload(format!(
                    "completion correlation id must be a string or non-negative integer, got {}",
                    n
                )))
            }
        },
        other => {
            return Err(DispatchError::malformed_payload(format!(
                "completion correlation id must be a string or integer, got {}",
                type_name(&other)
            )))
        }
    };

    let success = match success_value {
        Value::Bool(v) => v,
        other => {
            return Err(DispatchError::malformed_payload(format!(
                "completion success flag must be a boolean, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(CompletionMessage {
        correlation_id,
        success,
        payload,
    })
}

/// Encode a success completion.
pub fn encode_success(correlation_id: &CorrelationId, value: Option<Value>) -> String {
    let payload = Value::Array(vec![
        Value::String(correlation_id.as_str().to_string()),
        Value::Bool(true),
        value.unwrap_or(Value::Null),
    ]);
    payload.to_string()
}

/// Encode a failure completion carrying the error description.
pub fn encode_failure(correlation_id: &CorrelationId, error: &DispatchError) -> String {
    let description =
        serde_json::to_value(error).unwrap_or_else(|_| Value::String(error.message.clone()));
    let payload = Value::Array(vec![
        Value::String(correlation_id.as_str().to_string()),
        Value::Bool(false),
        description,
    ]);
    payload.to_string()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
