use thiserror::Error;

/// Errors raised by a single UDF call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UdfError {
  #[error("{udf}: expected {expected} value, found {found}")]
  TypeMismatch {
    udf: &'static str,
    expected: &'static str,
    found: &'static str,
  },
}

/// Errors raised while building a pipeline from configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Invalid pipeline spec: {0}")]
  InvalidSpec(String),

  #[error("Unknown {kind} UDF: {name}")]
  UnknownUdf { kind: &'static str, name: String },
}
