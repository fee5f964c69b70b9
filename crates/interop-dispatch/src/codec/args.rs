//! Positional argument decoding against a target's parameter types.

use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::invocation::{Argument, ArgumentList, ObjectHandleId, ParamType, OBJECT_REF_KEY};
use serde_json::{Map, Value};

/// Decode a JSON argument payload against the target's parameter types.
///
/// Positions are load-bearing: element *i* decodes against parameter *i*.
/// With zero declared parameters this returns an empty list without reading
/// the payload at all - permissive callers ship argument strings that are
/// not well-formed empty arrays, and those must still dispatch.
pub fn decode_arguments(
    operation: &str,
    raw_json: &str,
    params: &[ParamType],
) -> DispatchResult<ArgumentList> {
    decode_arguments_bounded(operation, raw_json, params, usize::MAX)
}

/// As [`decode_arguments`], rejecting payloads larger than `max_bytes`.
pub fn decode_arguments_bounded(
    operation: &str,
    raw_json: &str,
    params: &[ParamType],
    max_bytes: usize,
) -> DispatchResult<ArgumentList> {
    if params.is_empty() {
        return Ok(Vec::new());
    }

    if raw_json.len() > max_bytes {
        return Err(DispatchError::malformed_payload(format!(
            "argument payload for '{}' is {} bytes, limit is {}",
            operation,
            raw_json.len(),
            max_bytes
        )));
    }

    let payload: Value = serde_json::from_str(raw_json).map_err(|e| {
        DispatchError::malformed_payload(format!(
            "argument payload for '{}' is not valid JSON: {}",
            operation, e
        ))
    })?;

    let elements = match payload {
        Value::Array(elements) => elements,
        other => {
            return Err(DispatchError::malformed_payload(format!(
                "argument payload for '{}' must be a JSON array, got {}",
                operation,
                json_type_name(&other)
            )))
        }
    };

    if elements.len() < params.len() {
        return Err(DispatchError::arity_mismatch(
            operation,
            params.len(),
            elements.len(),
        ));
    }
    if elements.len() > params.len() {
        return Err(DispatchError::trailing_arguments(
            operation,
            params.len(),
            elements.len(),
        ));
    }

    elements
        .into_iter()
        .zip(params.iter())
        .enumerate()
        .map(|(position, (element, param))| decode_element(operation, position, element, *param))
        .collect()
}

fn decode_element(
    operation: &str,
    position: usize,
    element: Value,
    param: ParamType,
) -> DispatchResult<Argument> {
    // Catch an object-reference literal aimed at an ordinary parameter
    // before generic decoding would silently pass the raw id through.
    if param != ParamType::Handle {
        if let Value::Object(map) = &element {
            if map.contains_key(OBJECT_REF_KEY) {
                return Err(DispatchError::invalid_handle_usage(
                    operation,
                    position,
                    ParamType::Handle.name(),
                ));
            }
        }
    }

    match param {
        ParamType::Bool => match element {
            Value::Bool(v) => Ok(Argument::Bool(v)),
            other => Err(type_mismatch(operation, position, param, &other)),
        },
        ParamType::Integer => match element.as_i64() {
            Some(v) => Ok(Argument::Integer(v)),
            None => Err(type_mismatch(operation, position, param, &element)),
        },
        ParamType::Float => match element.as_f64() {
            Some(v) => Ok(Argument::Float(v)),
            None => Err(type_mismatch(operation, position, param, &element)),
        },
        ParamType::Text => match element {
            Value::String(v) => Ok(Argument::Text(v)),
            other => Err(type_mismatch(operation, position, param, &other)),
        },
        ParamType::Json => Ok(Argument::Json(element)),
        ParamType::Handle => match &element {
            Value::Object(map) => decode_object_ref(operation, position, map),
            other => Err(type_mismatch(operation, position, param, other)),
        },
    }
}

fn decode_object_ref(
    operation: &str,
    position: usize,
    map: &Map<String, Value>,
) -> DispatchResult<Argument> {
    let id = map
        .get(OBJECT_REF_KEY)
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            DispatchError::malformed_payload(format!(
                "operation '{}' argument {} must be an object reference \
                 {{\"{}\": <id>}}",
                operation, position, OBJECT_REF_KEY
            ))
        })?;
    Ok(Argument::Handle(ObjectHandleId(id)))
}

fn type_mismatch(
    operation: &str,
    position: usize,
    expected: ParamType,
    got: &Value,
) -> DispatchError {
    DispatchError::malformed_payload(format!(
        "operation '{}' argument {} expects {} but got {}",
        operation,
        position,
        expected.name(),
        json_type_name(got)
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
