// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-evaluator state: the accepted configuration, lifecycle tracker, and
//! (if `cache_dir` was supplied) a package resolver scoped to this evaluator.

use crate::lifecycle::{EvaluatorLifecycle, EvaluatorState};
use esp_core::{CreateEvaluatorRequest, Project};
use esp_resolver::PackageResolver;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The accepted, request-id-stripped configuration an evaluator was created
/// with, plus its lifecycle state and an optional package resolver.
pub struct EvaluatorContext {
    allowed_modules: Vec<String>,
    allowed_resources: Vec<String>,
    env: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
    timeout: Option<Duration>,
    output_format: Option<String>,
    project: Option<Project>,
    resolver: Option<Arc<dyn PackageResolver>>,
    lifecycle: Mutex<EvaluatorLifecycle>,
}

impl EvaluatorContext {
    /// Build a context from an accepted `CreateEvaluatorRequest`, entering
    /// [`EvaluatorState::Ready`] immediately (validation, including cycle
    /// detection, already happened before this is called).
    #[must_use]
    pub fn new(request: &CreateEvaluatorRequest, resolver: Option<Arc<dyn PackageResolver>>) -> Self {
        let mut lifecycle = EvaluatorLifecycle::new();
        lifecycle
            .transition(EvaluatorState::Ready)
            .expect("Uninitialized -> Ready is always legal");
        Self {
            allowed_modules: request.allowed_modules.clone().unwrap_or_default(),
            allowed_resources: request.allowed_resources.clone().unwrap_or_default(),
            env: request.env.clone().unwrap_or_default(),
            properties: request.properties.clone().unwrap_or_default(),
            timeout: request.timeout_seconds,
            output_format: request.output_format.clone(),
            project: request.project.clone(),
            resolver,
            lifecycle: Mutex::new(lifecycle),
        }
    }

    /// Regex source strings allowed for module imports.
    #[must_use]
    pub fn allowed_modules(&self) -> &[String] {
        &self.allowed_modules
    }

    /// Regex source strings allowed for resource reads.
    #[must_use]
    pub fn allowed_resources(&self) -> &[String] {
        &self.allowed_resources
    }

    /// Environment variables visible to `read("env:...")`.
    #[must_use]
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// External properties visible to `read("prop:...")`.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Per-evaluation timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Configured default output format, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<&str> {
        self.output_format.as_deref()
    }

    /// Project descriptor, if this evaluator is project-scoped.
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Package resolver scoped to this evaluator, if one was built.
    #[must_use]
    pub fn resolver(&self) -> Option<&Arc<dyn PackageResolver>> {
        self.resolver.as_ref()
    }

    /// Move the evaluator into `state`, recording the transition.
    pub async fn transition(
        &self,
        state: EvaluatorState,
    ) -> Result<(), crate::lifecycle::LifecycleError> {
        self.lifecycle.lock().await.transition(state)
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> EvaluatorState {
        self.lifecycle.lock().await.state()
    }
}
