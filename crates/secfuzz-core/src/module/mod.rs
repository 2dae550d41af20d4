//! Modules: named units of test logic, their parameters and lazy output.
//!
//! A [`Module`] pairs a qualified name and a [`ParameterStore`] with an opaque
//! [`ModuleRunner`]. Running yields an [`OutputStream`]: a finite, pull-based
//! sequence that can be consumed exactly once.

pub mod context;
pub mod loader;
pub mod parameter;
pub mod script;

use std::fmt;

use crate::error::ModuleExecutionError;

pub use context::ModuleContext;
pub use loader::{ManifestLoader, ModuleLoader};
pub use parameter::{Parameter, ParameterKind, ParameterStore};

/// One output item. Content is defined by the module.
pub type Item = serde_json::Value;

/// Lazy module output. Ends after the last item or after the first error.
pub type OutputStream = Box<dyn Iterator<Item = Result<Item, ModuleExecutionError>>>;

/// Run logic of a module.
pub trait ModuleRunner: Send + Sync {
    fn run(&self, module: &str, params: &ParameterStore) -> Result<OutputStream, ModuleExecutionError>;
}

impl<F> ModuleRunner for F
where
    F: Fn(&str, &ParameterStore) -> Result<OutputStream, ModuleExecutionError> + Send + Sync,
{
    fn run(&self, module: &str, params: &ParameterStore) -> Result<OutputStream, ModuleExecutionError> {
        self(module, params)
    }
}

pub struct Module {
    qualified_name: String,
    description: String,
    tags: Vec<String>,
    params: ParameterStore,
    runner: Box<dyn ModuleRunner>,
}

impl Module {
    pub fn new(qualified_name: impl Into<String>, runner: impl ModuleRunner + 'static) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            description: String::new(),
            tags: Vec::new(),
            params: ParameterStore::new(),
            runner: Box::new(runner),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, params: ParameterStore) -> Self {
        self.params = params;
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    /// Start the module with its current parameter values.
    pub fn run(&self) -> Result<OutputStream, ModuleExecutionError> {
        self.runner.run(&self.qualified_name, &self.params)
    }

    /// Case-insensitive substring match over name, description and tags.
    pub fn matches(&self, pattern: &str) -> bool {
        let needle = pattern.to_lowercase();
        self.qualified_name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("qualified_name", &self.qualified_name)
            .field("description", &self.description)
            .field("tags", &self.tags)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
