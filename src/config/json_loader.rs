use std::path::Path;

use serde_json::{Map, Value};

use crate::core::error::ConfigError;
use crate::core::pipeline::{Pipeline, PipelineStep, StepKind};
use crate::core::registry::UdfRegistry;

/// Builds per-value pipelines from JSON.
///
/// ```json
/// {
///   "pipeline": "clean_names",
///   "shortCircuitOnException": true,
///   "steps": [
///     {"$filter": "is_not_null_nor_empty"},
///     {"name": "normalize", "$map": "trim_and_lower_case"}
///   ]
/// }
/// ```
pub struct PipelineJsonLoader;

impl PipelineJsonLoader {
  pub fn new() -> Self {
    Self
  }

  pub fn load_str(&self, json_text: &str, registry: &UdfRegistry<Value>) -> Result<Pipeline<Value>, ConfigError> {
    let spec: Value = serde_json::from_str(json_text)?;
    self.build_from_spec(&spec, registry)
  }

  pub fn load_file(
    &self,
    file_path: impl AsRef<Path>,
    registry: &UdfRegistry<Value>,
  ) -> Result<Pipeline<Value>, ConfigError> {
    let text_value = std::fs::read_to_string(file_path)?;
    self.load_str(&text_value, registry)
  }

  pub fn build_from_spec(&self, spec: &Value, registry: &UdfRegistry<Value>) -> Result<Pipeline<Value>, ConfigError> {
    let spec_object = spec
      .as_object()
      .ok_or_else(|| ConfigError::InvalidSpec("pipeline spec must be a JSON object".to_string()))?;

    let pipeline_name = optional_str(spec_object, "pipeline")?.unwrap_or("pipeline").to_string();

    let short_circuit_on_exception = parse_short_circuit_on_exception(spec_object)?;
    let mut pipeline = Pipeline::new(pipeline_name, short_circuit_on_exception);

    let section_name = if spec_object.contains_key("actions") {
      "actions"
    } else {
      "steps"
    };
    let nodes: &[Value] = match spec_object.get(section_name) {
      Some(Value::Array(nodes)) => nodes.as_slice(),
      Some(_) => return Err(ConfigError::InvalidSpec(format!("'{section_name}' must be an array"))),
      None => &[],
    };

    for node in nodes {
      pipeline.add_step(parse_step(node, registry)?);
    }
    Ok(pipeline)
  }
}

impl Default for PipelineJsonLoader {
  fn default() -> Self {
    Self::new()
  }
}

fn parse_short_circuit_on_exception(spec_object: &Map<String, Value>) -> Result<bool, ConfigError> {
  for flag_name in ["shortCircuitOnException", "shortCircuit"] {
    match spec_object.get(flag_name) {
      Some(Value::Bool(flag_value)) => return Ok(*flag_value),
      Some(_) => return Err(ConfigError::InvalidSpec(format!("{flag_name} must be a boolean"))),
      None => {}
    }
  }
  Ok(true)
}

fn parse_step(node: &Value, registry: &UdfRegistry<Value>) -> Result<PipelineStep<Value>, ConfigError> {
  let node_object = node
    .as_object()
    .ok_or_else(|| ConfigError::InvalidSpec("each step must be a JSON object".to_string()))?;

  let display_name = match optional_str(node_object, "name")? {
    Some(name_value) => name_value,
    None => optional_str(node_object, "label")?.unwrap_or(""),
  }
  .to_string();

  let filter_ref = optional_str(node_object, "$filter")?;
  let map_ref = optional_str(node_object, "$map")?;

  let kind = match (filter_ref, map_ref) {
    (Some(filter_name), None) => StepKind::Filter(registry.get_predicate(filter_name)?),
    (None, Some(map_name)) => StepKind::Transform(registry.get_transform(map_name)?),
    (Some(_), Some(_)) => {
      return Err(ConfigError::InvalidSpec(
        "a step cannot declare both '$filter' and '$map'".to_string(),
      ))
    }
    (None, None) => {
      return Err(ConfigError::InvalidSpec(
        "unsupported step: expected '$filter' or '$map'".to_string(),
      ))
    }
  };

  Ok(PipelineStep {
    name: display_name,
    kind,
  })
}

/// A present but non-string field is an error rather than a silent default.
fn optional_str<'spec>(object: &'spec Map<String, Value>, key: &str) -> Result<Option<&'spec str>, ConfigError> {
  match object.get(key) {
    Some(Value::String(text_value)) => Ok(Some(text_value.as_str())),
    Some(_) => Err(ConfigError::InvalidSpec(format!("{key} must be a string"))),
    None => Ok(None),
  }
}
