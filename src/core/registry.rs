use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{ConfigError, UdfError};
use crate::core::pipeline::{Predicate, Transform};

pub struct UdfRegistry<ContextType> {
  predicates: HashMap<String, Predicate<ContextType>>,
  transforms: HashMap<String, Transform<ContextType>>,
}

impl<ContextType> UdfRegistry<ContextType> {
  pub fn new() -> Self {
    Self {
      predicates: HashMap::new(),
      transforms: HashMap::new(),
    }
  }

  pub fn register_predicate<PredicateFn>(&mut self, name: impl Into<String>, predicate: PredicateFn)
  where
    PredicateFn: Fn(&ContextType) -> bool + Send + Sync + 'static,
  {
    self.predicates.insert(name.into(), Arc::new(predicate));
  }

  pub fn register_transform<TransformFn>(&mut self, name: impl Into<String>, transform: TransformFn)
  where
    TransformFn: Fn(ContextType) -> Result<ContextType, UdfError> + Send + Sync + 'static,
  {
    self.transforms.insert(name.into(), Arc::new(transform));
  }

  pub fn has_predicate(&self, name: &str) -> bool {
    self.predicates.contains_key(name)
  }

  pub fn has_transform(&self, name: &str) -> bool {
    self.transforms.contains_key(name)
  }

  pub fn get_predicate(&self, name: &str) -> Result<Predicate<ContextType>, ConfigError> {
    match self.predicates.get(name) {
      Some(predicate) => Ok(predicate.clone()),
      None => Err(ConfigError::UnknownUdf {
        kind: "predicate",
        name: name.to_string(),
      }),
    }
  }

  pub fn get_transform(&self, name: &str) -> Result<Transform<ContextType>, ConfigError> {
    match self.transforms.get(name) {
      Some(transform) => Ok(transform.clone()),
      None => Err(ConfigError::UnknownUdf {
        kind: "transform",
        name: name.to_string(),
      }),
    }
  }

  /// Every registered name, predicates and transforms alike, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut registered_names: Vec<String> = self
      .predicates
      .keys()
      .chain(self.transforms.keys())
      .cloned()
      .collect();
    registered_names.sort();
    registered_names.dedup();
    registered_names
  }
}

impl<ContextType> Default for UdfRegistry<ContextType> {
  fn default() -> Self {
    Self::new()
  }
}
