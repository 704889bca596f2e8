use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use pipeline_udfs::{is_not_null_nor_empty, trim_and_lower_case_value, Pipeline};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let mut pipeline = Pipeline::new("demo01_filter_then_normalize", true);
  pipeline.add_filter_named("present", is_not_null_nor_empty);
  pipeline.add_transform_named("normalize", |value: Value| trim_and_lower_case_value(&value));

  for value in [json!("  Hello World  "), json!("   "), Value::Null, json!(7)] {
    let result = pipeline.execute(value.clone());
    println!("input={value} output={:?} filtered={}", result.value, result.filtered);
    println!("metrics={}", result.metrics());
  }
}
