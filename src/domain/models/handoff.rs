//! Handoff context and conversation state machine models.
//!
//! A `HandoffContext` refers to agents only by name; every reference is
//! resolved through the registry at transition time, so the registry stays
//! the single owner of agent definitions and a deregistered agent cannot be
//! reached through a stale pointer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One role/content pair in a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Conversation control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HandoffState {
    /// A single agent owns the conversation.
    Active { agent: String },
    /// A transfer has been requested but the target is not yet resolved.
    PendingHandoff { from: String, to: String },
    /// The conversation has ended.
    Terminated,
}

/// Transient per-conversation routing state.
///
/// Single-writer: callers must serialize access per conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffContext {
    pub conversation_id: String,
    pub history: Vec<Message>,
    /// Names resolvable through the registry at decision time.
    pub available_agents: BTreeSet<String>,
    /// Number of completed handoffs in this conversation.
    pub handoffs_taken: u32,
    pub state: HandoffState,
}

impl HandoffContext {
    pub fn new(conversation_id: impl Into<String>, initial_agent: impl Into<String>) -> Self {
        let agent = initial_agent.into();
        let mut available = BTreeSet::new();
        available.insert(agent.clone());
        Self {
            conversation_id: conversation_id.into(),
            history: Vec::new(),
            available_agents: available,
            handoffs_taken: 0,
            state: HandoffState::Active { agent },
        }
    }

    /// Lookup key of the agent currently holding the conversation, if any.
    pub fn current_agent(&self) -> Option<&str> {
        match &self.state {
            HandoffState::Active { agent } => Some(agent),
            HandoffState::PendingHandoff { from, .. } => Some(from),
            HandoffState::Terminated => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state == HandoffState::Terminated
    }

    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn add_available_agent(&mut self, name: impl Into<String>) {
        self.available_agents.insert(name.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_active() {
        let ctx = HandoffContext::new("conv-1", "triage");
        assert_eq!(ctx.current_agent(), Some("triage"));
        assert!(!ctx.is_terminated());
        assert!(ctx.available_agents.contains("triage"));
        assert_eq!(ctx.handoffs_taken, 0);
    }

    #[test]
    fn test_current_agent_during_pending() {
        let mut ctx = HandoffContext::new("conv-1", "triage");
        ctx.state = HandoffState::PendingHandoff {
            from: "triage".to_string(),
            to: "billing".to_string(),
        };
        assert_eq!(ctx.current_agent(), Some("triage"));
    }

    #[test]
    fn test_terminated_has_no_agent() {
        let mut ctx = HandoffContext::new("conv-1", "triage");
        ctx.state = HandoffState::Terminated;
        assert_eq!(ctx.current_agent(), None);
        assert!(ctx.is_terminated());
    }

    #[test]
    fn test_history_ordering() {
        let mut ctx = HandoffContext::new("conv-1", "triage");
        ctx.push_message(Message::user("hello"));
        ctx.push_message(Message::assistant("hi"));
        assert_eq!(ctx.history.len(), 2);
        assert_eq!(ctx.history[0].role, MessageRole::User);
        assert_eq!(ctx.history[1].role, MessageRole::Assistant);
    }
}
