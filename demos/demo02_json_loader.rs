use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use pipeline_udfs::{register_builtin_udfs, PipelineJsonLoader, UdfRegistry};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let mut registry: UdfRegistry<Value> = UdfRegistry::new();
  register_builtin_udfs(&mut registry);

  let json_text = r#"
{
  "pipeline": "demo02_json_loader",
  "shortCircuitOnException": true,
  "steps": [
    {"$filter": "is_not_null_nor_empty"},
    {"name": "normalize", "$map": "trim_and_lower_case"}
  ]
}
"#;

  let loader = PipelineJsonLoader::new();
  let pipeline = loader.load_str(json_text, &registry).expect("loader failed");
  for value in [json!("  Hello JSON  "), json!(""), json!(false)] {
    println!("{value} -> {:?}", pipeline.run(value.clone()));
  }
}
