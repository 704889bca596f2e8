use serde_json::Value;

use crate::core::registry::UdfRegistry;

pub mod text;

pub fn register_builtin_udfs(registry: &mut UdfRegistry<Value>) {
  registry.register_predicate("is_null_or_empty", text::is_null_or_empty);
  registry.register_predicate("is_not_null_nor_empty", text::is_not_null_nor_empty);
  registry.register_transform("trim_and_lower_case", |value: Value| text::trim_and_lower_case_value(&value));
}
