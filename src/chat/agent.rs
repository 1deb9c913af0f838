//! Chat Agents
//!
//! One [`Agent`] per roster slot: a role, a unique name, and opaque role
//! instructions. An agent produces its next message from the full history
//! through the shared chat provider; other agents' turns are presented as
//! named user turns so each agent only claims its own words.

use tracing::debug;

use crate::ai::{ChatMessage, SharedProvider};
use crate::types::{AgentRole, Message, MessageRole, Result};

impl AgentRole {
    /// Default roster name for this role.
    pub fn default_name(&self) -> &'static str {
        match self {
            AgentRole::WeatherReporter => "WeatherAgent",
            AgentRole::ResearchLead => "SnowResearchLead",
            AgentRole::ResearchAssistant => "ResearchAssistant",
            AgentRole::VerdictReporter => "Blizzard",
        }
    }
}

/// A role-playing participant in the prediction discussion.
#[derive(Debug, Clone)]
pub struct Agent {
    pub role: AgentRole,
    pub name: String,
    instructions: String,
}

impl Agent {
    pub fn new(role: AgentRole, instructions: impl Into<String>) -> Self {
        Self {
            role,
            name: role.default_name().to_string(),
            instructions: instructions.into(),
        }
    }

    /// Produce this agent's next message given the full history.
    pub async fn produce_next_message(
        &self,
        provider: &SharedProvider,
        history: &[Message],
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(&self.instructions));

        for message in history {
            match message.role {
                MessageRole::User => messages.push(ChatMessage::user(&message.content)),
                MessageRole::Assistant if message.name == self.name => {
                    messages.push(ChatMessage::assistant(&message.content));
                }
                MessageRole::Assistant => {
                    // Another agent's turn, attributed by name
                    messages.push(ChatMessage::user(format!(
                        "{}: {}",
                        message.name, message.content
                    )));
                }
            }
        }

        debug!(agent = %self.name, turns = history.len(), "Invoking agent");
        provider.chat(&messages).await
    }
}
