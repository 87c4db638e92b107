//! Conversation handoff routing.
//!
//! Drives the `HandoffContext` state machine. Targets are always resolved
//! through the registry at transition time, and a per-conversation cap
//! keeps two agents that keep redirecting to each other from looping
//! forever.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, HandoffContext, HandoffState};
use crate::domain::ports::AgentRegistry;

use super::retry::with_deadline;

/// Result of resolving a pending handoff.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffOutcome {
    /// Control transferred; the new owner's definition is attached.
    Completed(AgentDefinition),
    /// Target could not be resolved; control stayed with the original agent.
    Aborted { target: String, reason: String },
}

pub struct HandoffRouter {
    registry: Arc<dyn AgentRegistry>,
    max_handoffs: u32,
    operation_timeout: Duration,
}

impl HandoffRouter {
    pub fn new(registry: Arc<dyn AgentRegistry>, max_handoffs: u32, operation_timeout: Duration) -> Self {
        Self { registry, max_handoffs, operation_timeout }
    }

    /// Request a transfer of control to `target`.
    ///
    /// Moves the conversation to `PendingHandoff`. Exceeding the handoff
    /// cap terminates the conversation instead.
    pub fn request_handoff(&self, ctx: &mut HandoffContext, target: &str) -> StorageResult<()> {
        let from = match &ctx.state {
            HandoffState::Active { agent } => agent.clone(),
            HandoffState::PendingHandoff { .. } => {
                return Err(StorageError::Validation(
                    "a handoff is already pending for this conversation".to_string(),
                ))
            }
            HandoffState::Terminated => {
                return Err(StorageError::Validation(
                    "conversation is terminated".to_string(),
                ))
            }
        };

        if target == from {
            return Err(StorageError::Validation(format!(
                "agent {from:?} cannot hand off to itself"
            )));
        }

        if ctx.handoffs_taken >= self.max_handoffs {
            ctx.state = HandoffState::Terminated;
            tracing::warn!(
                conversation = %ctx.conversation_id,
                limit = self.max_handoffs,
                "handoff cap exceeded, terminating conversation"
            );
            return Err(StorageError::HandoffLoopExceeded { limit: self.max_handoffs });
        }

        ctx.state = HandoffState::PendingHandoff { from, to: target.to_string() };
        Ok(())
    }

    /// Resolve the pending target through the registry and complete (or
    /// abort) the transfer.
    ///
    /// An unresolvable target reverts the conversation to the originating
    /// agent; the failure is surfaced in the returned outcome rather than
    /// as an error, since the conversation remains usable.
    pub async fn resolve(&self, ctx: &mut HandoffContext) -> StorageResult<HandoffOutcome> {
        let (from, to) = match &ctx.state {
            HandoffState::PendingHandoff { from, to } => (from.clone(), to.clone()),
            _ => {
                return Err(StorageError::Validation(
                    "no handoff pending for this conversation".to_string(),
                ))
            }
        };

        match with_deadline(self.operation_timeout, self.registry.get(&to)).await {
            Ok(agent) => {
                ctx.state = HandoffState::Active { agent: to.clone() };
                ctx.handoffs_taken += 1;
                ctx.add_available_agent(to.clone());
                tracing::info!(
                    conversation = %ctx.conversation_id,
                    from = %from,
                    to = %to,
                    handoffs = ctx.handoffs_taken,
                    "handoff completed"
                );
                Ok(HandoffOutcome::Completed(agent))
            }
            Err(StorageError::AgentNotFound(_)) => {
                ctx.state = HandoffState::Active { agent: from.clone() };
                tracing::warn!(
                    conversation = %ctx.conversation_id,
                    from = %from,
                    to = %to,
                    "handoff target not registered, control stays with origin"
                );
                Ok(HandoffOutcome::Aborted {
                    target: to,
                    reason: "target agent is not registered".to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// End the conversation explicitly.
    pub fn terminate(&self, ctx: &mut HandoffContext) {
        ctx.state = HandoffState::Terminated;
    }

    /// Inspect a tool result and widen the set of reachable handoff targets.
    ///
    /// A `spawn_agent` result naming a registered agent makes that agent an
    /// available target for subsequent handoffs. Returns whether a target
    /// was added.
    pub async fn observe_tool_result(
        &self,
        ctx: &mut HandoffContext,
        tool_name: &str,
        result: &serde_json::Value,
    ) -> StorageResult<bool> {
        if tool_name != "spawn_agent" {
            return Ok(false);
        }

        let Some(name) = spawned_agent_name(result) else {
            return Ok(false);
        };

        let registered =
            with_deadline(self.operation_timeout, self.registry.exists(name)).await?;
        if registered {
            ctx.add_available_agent(name);
            tracing::debug!(
                conversation = %ctx.conversation_id,
                agent = %name,
                "spawned agent added as handoff target"
            );
        }
        Ok(registered)
    }
}

fn spawned_agent_name(result: &serde_json::Value) -> Option<&str> {
    match result {
        serde_json::Value::String(name) => Some(name.as_str()),
        serde_json::Value::Object(map) => map.get("name").and_then(|v| v.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRegistry;
    use crate::domain::models::DuplicatePolicy;
    use serde_json::json;

    async fn router_with_agents(names: &[&str], cap: u32) -> HandoffRouter {
        let registry = Arc::new(InMemoryRegistry::new(DuplicatePolicy::Reject));
        for name in names {
            let agent = AgentDefinition::new(*name, "You are a test agent.", "gpt-4o");
            registry.register(&agent).await.unwrap();
        }
        HandoffRouter::new(registry, cap, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_full_handoff_cycle() {
        let router = router_with_agents(&["triage", "billing"], 5).await;
        let mut ctx = HandoffContext::new("conv-1", "triage");

        router.request_handoff(&mut ctx, "billing").unwrap();
        assert!(matches!(ctx.state, HandoffState::PendingHandoff { .. }));

        let outcome = router.resolve(&mut ctx).await.unwrap();
        assert!(matches!(outcome, HandoffOutcome::Completed(ref a) if a.name == "billing"));
        assert_eq!(ctx.current_agent(), Some("billing"));
        assert_eq!(ctx.handoffs_taken, 1);
    }

    #[tokio::test]
    async fn test_missing_target_aborts_to_origin() {
        let router = router_with_agents(&["triage"], 5).await;
        let mut ctx = HandoffContext::new("conv-1", "triage");

        router.request_handoff(&mut ctx, "ghost").unwrap();
        let outcome = router.resolve(&mut ctx).await.unwrap();

        assert!(matches!(outcome, HandoffOutcome::Aborted { ref target, .. } if target == "ghost"));
        assert_eq!(ctx.current_agent(), Some("triage"));
        assert_eq!(ctx.handoffs_taken, 0);
        assert!(!ctx.is_terminated());
    }

    #[tokio::test]
    async fn test_self_handoff_rejected() {
        let router = router_with_agents(&["triage"], 5).await;
        let mut ctx = HandoffContext::new("conv-1", "triage");
        let err = router.request_handoff(&mut ctx, "triage").unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(ctx.current_agent(), Some("triage"));
    }

    #[tokio::test]
    async fn test_loop_cap_terminates() {
        let router = router_with_agents(&["a", "b"], 2).await;
        let mut ctx = HandoffContext::new("conv-1", "a");

        for target in ["b", "a"] {
            router.request_handoff(&mut ctx, target).unwrap();
            router.resolve(&mut ctx).await.unwrap();
        }
        assert_eq!(ctx.handoffs_taken, 2);

        let err = router.request_handoff(&mut ctx, "b").unwrap_err();
        assert!(matches!(err, StorageError::HandoffLoopExceeded { limit: 2 }));
        assert!(ctx.is_terminated());

        // Terminated conversations accept no further transitions
        let err = router.request_handoff(&mut ctx, "b").unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resolve_without_pending_is_error() {
        let router = router_with_agents(&["triage"], 5).await;
        let mut ctx = HandoffContext::new("conv-1", "triage");
        assert!(matches!(
            router.resolve(&mut ctx).await.unwrap_err(),
            StorageError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_spawned_agent_becomes_available_target() {
        let router = router_with_agents(&["triage", "research"], 5).await;
        let mut ctx = HandoffContext::new("conv-1", "triage");
        assert!(!ctx.available_agents.contains("research"));

        let added = router
            .observe_tool_result(&mut ctx, "spawn_agent", &json!({"name": "research"}))
            .await
            .unwrap();
        assert!(added);
        assert!(ctx.available_agents.contains("research"));

        // Unregistered spawns and unrelated tools are ignored
        assert!(!router
            .observe_tool_result(&mut ctx, "spawn_agent", &json!("ghost"))
            .await
            .unwrap());
        assert!(!router
            .observe_tool_result(&mut ctx, "web_search", &json!({"name": "research"}))
            .await
            .unwrap());
    }
}
