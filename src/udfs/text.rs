use serde_json::Value;

use crate::core::error::UdfError;

/// True for `null` and for strings that are empty once trimmed.
///
/// Every other JSON type is considered present, whatever its content:
/// `false`, `0`, `[]` and `{}` are not blank.
pub fn is_null_or_empty(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(text_value) => text_value.trim().is_empty(),
    _ => false,
  }
}

pub fn is_not_null_nor_empty(value: &Value) -> bool {
  !is_null_or_empty(value)
}

/// Trims surrounding whitespace and lowercases the rest.
pub fn trim_and_lower_case(text_value: &str) -> String {
  text_value.trim().to_lowercase()
}

/// [`trim_and_lower_case`] over a dynamically typed cell.
///
/// Only strings are accepted; filter blanks out with [`is_not_null_nor_empty`] first.
pub fn trim_and_lower_case_value(value: &Value) -> Result<Value, UdfError> {
  match value {
    Value::String(text_value) => Ok(Value::String(trim_and_lower_case(text_value))),
    other => Err(UdfError::TypeMismatch {
      udf: "trim_and_lower_case",
      expected: "string",
      found: value_kind(other),
    }),
  }
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
