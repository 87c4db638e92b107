//! Agent definition model.
//!
//! An `AgentDefinition` is the authoritative record for a named agent:
//! system prompt, tool descriptors, backing model, and lifecycle hooks.
//! The registry owns the stored copy; callers receive clones and mutate
//! only through explicit re-registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted agent name length.
const MAX_NAME_LEN: usize = 255;

/// Descriptor for a tool an agent may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's invocation contract.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::Value::Null,
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Lifecycle events a hook can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    AfterToolCall,
    AfterStep,
    BeforePlan,
}

/// A named lifecycle callback registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookSpec {
    pub name: String,
    pub event: HookEvent,
}

impl HookSpec {
    pub fn new(name: impl Into<String>, event: HookEvent) -> Self {
        Self { name: name.into(), event }
    }
}

/// Immutable-after-creation agent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique handle within one registry instance.
    pub name: String,
    /// System prompt text.
    pub instructions: String,
    /// Ordered tool descriptors.
    pub tools: Vec<ToolSpec>,
    /// Identifier of the backing language model.
    pub model: String,
    /// Ordered lifecycle hooks, may be empty.
    pub hooks: Vec<HookSpec>,
    pub created_at: DateTime<Utc>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            model: model.into(),
            hooks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_hook(mut self, hook: HookSpec) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<HookSpec>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Validate the definition before registration.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("agent name cannot be empty".to_string());
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(format!("agent name exceeds {} bytes", MAX_NAME_LEN));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(format!("agent name '{}' contains whitespace", self.name));
        }
        if self.instructions.trim().is_empty() {
            return Err("agent instructions cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("agent model cannot be empty".to_string());
        }
        Ok(())
    }
}
