pub mod config;
pub mod core;
pub mod udfs;

pub use crate::config::json_loader::PipelineJsonLoader;
pub use crate::core::error::{ConfigError, UdfError};
pub use crate::core::pipeline::{Pipeline, PipelineError, PipelineResult, PipelineStep, StepKind, StepTiming};
pub use crate::core::registry::UdfRegistry;
pub use crate::udfs::register_builtin_udfs;
pub use crate::udfs::text::{is_not_null_nor_empty, is_null_or_empty, trim_and_lower_case, trim_and_lower_case_value};
