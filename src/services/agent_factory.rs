//! Idempotent agent creation on top of the registry.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, HookSpec, RetryConfig, ToolSpec};
use crate::domain::ports::AgentRegistry;

use super::retry::{with_backoff, with_deadline};

/// Rough task difficulty, used to pick a model when the caller does not
/// name one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    fn default_model(self) -> &'static str {
        match self {
            Complexity::Low => "gpt-4o-mini",
            Complexity::Medium => "gpt-4o",
            Complexity::High => "o3",
        }
    }
}

/// Request to create (or fetch) an agent.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: String,
    pub instructions: String,
    pub tools: Vec<ToolSpec>,
    pub hooks: Vec<HookSpec>,
    /// Free-form task description, recorded for diagnostics only.
    pub task: Option<String>,
    pub complexity: Complexity,
    /// Explicit model override; wins over `complexity`.
    pub model: Option<String>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            hooks: Vec::new(),
            task: None,
            complexity: Complexity::default(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<HookSpec>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    fn build(&self) -> AgentDefinition {
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| self.complexity.default_model().to_string());
        AgentDefinition::new(&self.name, &self.instructions, model)
            .with_tools(self.tools.clone())
            .with_hooks(self.hooks.clone())
    }
}

/// Get-or-create facade over an [`AgentRegistry`].
///
/// The registry itself stays reject-on-duplicate; idempotency lives here.
/// Registration that loses a race and sees `AgentExists` falls back to a
/// `get` and returns whatever won, so concurrent callers converge on one
/// definition.
pub struct AgentFactory {
    registry: Arc<dyn AgentRegistry>,
    retry: RetryConfig,
    operation_timeout: Duration,
}

impl AgentFactory {
    pub fn new(registry: Arc<dyn AgentRegistry>, retry: RetryConfig, operation_timeout: Duration) -> Self {
        Self { registry, retry, operation_timeout }
    }

    pub async fn get_or_create(&self, spec: AgentSpec) -> StorageResult<AgentDefinition> {
        let existing = with_backoff(&self.retry, || {
            with_deadline(self.operation_timeout, self.registry.get_optional(&spec.name))
        })
        .await?;
        if let Some(agent) = existing {
            tracing::debug!(agent = %spec.name, "agent already registered");
            return Ok(agent);
        }

        let agent = spec.build();
        let registered = with_backoff(&self.retry, || {
            with_deadline(self.operation_timeout, self.registry.register(&agent))
        })
        .await;

        match registered {
            Ok(()) => {
                tracing::info!(agent = %agent.name, task = spec.task.as_deref(), "created agent");
                Ok(agent)
            }
            // Lost the race; the winner's definition is authoritative.
            Err(StorageError::AgentExists(_)) => {
                with_backoff(&self.retry, || {
                    with_deadline(self.operation_timeout, self.registry.get(&spec.name))
                })
                .await
            }
            Err(err) => Err(err),
        }
    }
}
