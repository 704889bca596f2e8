use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::error::UdfError;

pub type Predicate<ContextType> = Arc<dyn Fn(&ContextType) -> bool + Send + Sync + 'static>;
pub type Transform<ContextType> =
  Arc<dyn Fn(ContextType) -> Result<ContextType, UdfError> + Send + Sync + 'static>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineError {
  pub pipeline: String,
  pub index: usize,
  pub step_name: String,
  pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepTiming {
  pub index: usize,
  pub step_name: String,
  pub elapsed_nanos: u128,
  pub success: bool,
}

#[derive(Clone)]
pub enum StepKind<ContextType> {
  Filter(Predicate<ContextType>),
  Transform(Transform<ContextType>),
}

#[derive(Clone)]
pub struct PipelineStep<ContextType> {
  pub name: String,
  pub kind: StepKind<ContextType>,
}

pub fn format_step_name(index: usize, name: &str) -> String {
  if name.is_empty() {
    return format!("s{index}");
  }
  format!("s{index}:{name}")
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  match payload.downcast::<String>() {
    Ok(message) => *message,
    Err(payload) => payload
      .downcast_ref::<&str>()
      .map(|message| message.to_string())
      .unwrap_or_else(|| "panic".to_string()),
  }
}

/// Outcome of running one value through a [`Pipeline`].
///
/// `value` is `None` only when a filter rejected the input or panicked. A failed
/// transform leaves the value it was given in place.
#[derive(Clone, Debug)]
pub struct PipelineResult<ContextType> {
  pub pipeline: String,
  pub value: Option<ContextType>,
  pub filtered: bool,
  pub short_circuited: bool,
  pub errors: Vec<PipelineError>,
  pub timings: Vec<StepTiming>,
  pub total_nanos: u128,
}

impl<ContextType> PipelineResult<ContextType> {
  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  pub fn metrics(&self) -> Value {
    let mut metrics_map: BTreeMap<String, Value> = BTreeMap::new();

    metrics_map.insert("pipeline".to_string(), Value::String(self.pipeline.clone()));
    metrics_map.insert("filtered".to_string(), Value::Bool(self.filtered));
    metrics_map.insert("shortCircuited".to_string(), Value::Bool(self.short_circuited));
    metrics_map.insert("errorCount".to_string(), Value::from(self.errors.len()));
    metrics_map.insert("errors".to_string(), serde_json::to_value(&self.errors).unwrap_or_default());
    metrics_map.insert("pipelineLatencyMs".to_string(), nanos_to_millis(self.total_nanos));

    let mut step_latency_ms: BTreeMap<String, Value> = BTreeMap::new();
    for timing in &self.timings {
      step_latency_ms.insert(timing.step_name.clone(), nanos_to_millis(timing.elapsed_nanos));
    }
    metrics_map.insert("stepLatencyMs".to_string(), serde_json::to_value(step_latency_ms).unwrap_or_default());

    serde_json::to_value(metrics_map).unwrap_or_default()
  }
}

fn nanos_to_millis(elapsed_nanos: u128) -> Value {
  let elapsed_ms = (elapsed_nanos as f64) / 1_000_000.0;
  serde_json::Number::from_f64(elapsed_ms)
    .map(Value::Number)
    .unwrap_or_else(|| Value::from(0))
}

struct RunControl {
  pipeline_name: String,
  errors: Vec<PipelineError>,
  timings: Vec<StepTiming>,
}

impl RunControl {
  fn new(pipeline_name: &str) -> Self {
    Self {
      pipeline_name: pipeline_name.to_string(),
      errors: Vec::new(),
      timings: Vec::new(),
    }
  }

  fn record_error(&mut self, index: usize, step_name: &str, message: String) {
    warn!(pipeline = %self.pipeline_name, step = %step_name, error = %message, "pipeline step failed");
    self.errors.push(PipelineError {
      pipeline: self.pipeline_name.clone(),
      index,
      step_name: step_name.to_string(),
      message,
    });
  }

  fn record_timing(&mut self, index: usize, step_name: String, elapsed_nanos: u128, success: bool) {
    self.timings.push(StepTiming {
      index,
      step_name,
      elapsed_nanos,
      success,
    });
  }
}

/// An ordered chain of filters and transforms applied to one value at a time.
pub struct Pipeline<ContextType> {
  pub name: String,
  pub short_circuit_on_exception: bool,
  steps: Vec<PipelineStep<ContextType>>,
}

impl<ContextType> Pipeline<ContextType>
where
  ContextType: 'static,
{
  pub fn new(name: impl Into<String>, short_circuit_on_exception: bool) -> Self {
    Self {
      name: name.into(),
      short_circuit_on_exception,
      steps: Vec::new(),
    }
  }

  pub fn add_step(&mut self, step: PipelineStep<ContextType>) -> &mut Self {
    self.steps.push(step);
    self
  }

  pub fn add_filter<PredicateFn>(&mut self, predicate: PredicateFn) -> &mut Self
  where
    PredicateFn: Fn(&ContextType) -> bool + Send + Sync + 'static,
  {
    self.add_filter_named("", predicate)
  }

  pub fn add_filter_named<PredicateFn>(&mut self, name: impl Into<String>, predicate: PredicateFn) -> &mut Self
  where
    PredicateFn: Fn(&ContextType) -> bool + Send + Sync + 'static,
  {
    self.add_step(PipelineStep {
      name: name.into(),
      kind: StepKind::Filter(Arc::new(predicate)),
    })
  }

  pub fn add_transform<TransformFn>(&mut self, transform: TransformFn) -> &mut Self
  where
    TransformFn: Fn(ContextType) -> Result<ContextType, UdfError> + Send + Sync + 'static,
  {
    self.add_transform_named("", transform)
  }

  pub fn add_transform_named<TransformFn>(&mut self, name: impl Into<String>, transform: TransformFn) -> &mut Self
  where
    TransformFn: Fn(ContextType) -> Result<ContextType, UdfError> + Send + Sync + 'static,
  {
    self.add_step(PipelineStep {
      name: name.into(),
      kind: StepKind::Transform(Arc::new(transform)),
    })
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn step_names(&self) -> Vec<String> {
    self
      .steps
      .iter()
      .enumerate()
      .map(|(step_index, step)| format_step_name(step_index, &step.name))
      .collect()
  }
}

impl<ContextType> Pipeline<ContextType>
where
  ContextType: Clone + 'static,
{
  pub fn run(&self, input_value: ContextType) -> Option<ContextType> {
    self.execute(input_value).value
  }

  pub fn execute(&self, input_value: ContextType) -> PipelineResult<ContextType> {
    let run_start_instant = Instant::now();
    let mut control = RunControl::new(&self.name);
    let mut ctx = input_value;
    let mut filtered = false;
    let mut short_circuited = false;

    for (step_index, step) in self.steps.iter().enumerate() {
      let step_name = format_step_name(step_index, &step.name);
      let step_start_instant = Instant::now();
      let mut step_succeeded = true;

      match &step.kind {
        StepKind::Filter(predicate) => {
          // A panicking predicate is recorded as an error and rejects the value.
          match std::panic::catch_unwind(AssertUnwindSafe(|| (predicate)(&ctx))) {
            Ok(true) => {}
            Ok(false) => {
              debug!(pipeline = %self.name, step = %step_name, "value filtered out");
              filtered = true;
            }
            Err(payload) => {
              step_succeeded = false;
              control.record_error(step_index, &step_name, panic_message(payload));
              filtered = true;
            }
          }
        }
        StepKind::Transform(transform) => {
          let ctx_before_step = ctx.clone();
          let call_result = std::panic::catch_unwind(AssertUnwindSafe(|| (transform)(ctx)));
          ctx = match call_result {
            Ok(Ok(output_ctx)) => output_ctx,
            Ok(Err(error)) => {
              step_succeeded = false;
              control.record_error(step_index, &step_name, error.to_string());
              ctx_before_step
            }
            Err(payload) => {
              step_succeeded = false;
              control.record_error(step_index, &step_name, panic_message(payload));
              ctx_before_step
            }
          };
        }
      }

      let step_elapsed_nanos = step_start_instant.elapsed().as_nanos();
      control.record_timing(step_index, step_name, step_elapsed_nanos, step_succeeded);

      if !step_succeeded && self.short_circuit_on_exception {
        short_circuited = true;
      }
      if filtered || short_circuited {
        break;
      }
    }

    PipelineResult {
      pipeline: self.name.clone(),
      value: if filtered { None } else { Some(ctx) },
      filtered,
      short_circuited,
      errors: control.errors,
      timings: control.timings,
      total_nanos: run_start_instant.elapsed().as_nanos(),
    }
  }
}
