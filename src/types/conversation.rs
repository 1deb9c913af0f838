//! Conversation Domain Types
//!
//! Append-only message history for one prediction run, plus the immutable
//! `PredictionResult` emitted at the end. Policies only ever see the history
//! as a read-only slice; appends are validated against the roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{BlizzardError, Result};

/// Author of the seed message. Not an agent; always a valid author.
pub const SEED_AUTHOR: &str = "user";

/// Role an agent plays in the discussion.
///
/// Closed set: the roster is a fixed ordered collection resolved at run
/// start, never polymorphic at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Reports the weather, speaks first and exactly once before the others
    WeatherReporter,
    /// Primary decision maker
    ResearchLead,
    /// Reviews and validates the lead's analysis
    ResearchAssistant,
    /// Delivers the final verdict with the verdict marker
    VerdictReporter,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::WeatherReporter => write!(f, "weather_reporter"),
            AgentRole::ResearchLead => write!(f, "research_lead"),
            AgentRole::ResearchAssistant => write!(f, "research_assistant"),
            AgentRole::VerdictReporter => write!(f, "verdict_reporter"),
        }
    }
}

/// Chat role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The seed prompt
    User,
    /// Any agent-produced message
    Assistant,
}

/// One turn in the conversation. Never edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Agent name, or [`SEED_AUTHOR`] for the seed message
    pub name: String,
    pub role: MessageRole,
    pub content: String,
    /// Position in the history, starting at 0 for the seed
    pub sequence_index: usize,
}

impl Message {
    /// Build the seed message (sequence index 0).
    pub fn seed(content: impl Into<String>) -> Self {
        Self {
            name: SEED_AUTHOR.to_string(),
            role: MessageRole::User,
            content: content.into(),
            sequence_index: 0,
        }
    }
}

/// Append-only conversation history with roster enforcement.
///
/// Lifecycle: created with a seed message, grows by one message per round,
/// terminates when a policy fires or the iteration ceiling is reached.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Names of the agents allowed to author messages
    roster: Vec<String>,
    complete: bool,
    iteration_count: usize,
}

impl Conversation {
    /// Create a conversation seeded with exactly one user message.
    pub fn seeded(seed_content: impl Into<String>, roster: Vec<String>) -> Self {
        Self {
            messages: vec![Message::seed(seed_content)],
            roster,
            complete: false,
            iteration_count: 0,
        }
    }

    /// Append one agent-produced message.
    ///
    /// Fails if the author is not a roster member or the conversation is
    /// already complete; the sequence index is assigned here, not by callers.
    pub fn append(&mut self, author: &str, content: impl Into<String>) -> Result<&Message> {
        if self.complete {
            return Err(BlizzardError::Conversation(format!(
                "cannot append message from '{}': conversation is complete",
                author
            )));
        }
        if !self.roster.iter().any(|name| name == author) {
            return Err(BlizzardError::Conversation(format!(
                "author '{}' is not in the agent roster",
                author
            )));
        }

        self.messages.push(Message {
            name: author.to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            sequence_index: self.messages.len(),
        });
        self.iteration_count += 1;

        Ok(self.messages.last().unwrap_or_else(|| unreachable!()))
    }

    /// Read-only view of the full history, seed included.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent agent-produced message, if any.
    pub fn last_agent_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Messages produced so far (excludes the seed).
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mark the conversation terminated. Idempotent.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Consume the conversation, yielding the message sequence.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Immutable result of one prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub timestamp: DateTime<Utc>,
    /// Full ordered message sequence, seed included
    pub conversation: Vec<Message>,
    /// Content of the verdict reporter's marker-bearing message, if one
    /// was produced. A missing verdict is reported, not a failure.
    pub decision: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        vec![
            "WeatherAgent".to_string(),
            "SnowResearchLead".to_string(),
            "ResearchAssistant".to_string(),
            "Blizzard".to_string(),
        ]
    }

    #[test]
    fn test_seeded_conversation() {
        let conv = Conversation::seeded("weather briefing", roster());
        assert_eq!(conv.history().len(), 1);
        assert_eq!(conv.history()[0].role, MessageRole::User);
        assert_eq!(conv.history()[0].name, SEED_AUTHOR);
        assert_eq!(conv.iteration_count(), 0);
        assert!(!conv.is_complete());
    }

    #[test]
    fn test_append_increments_iterations_and_sequence() {
        let mut conv = Conversation::seeded("seed", roster());

        conv.append("WeatherAgent", "report").unwrap();
        conv.append("SnowResearchLead", "analysis").unwrap();

        assert_eq!(conv.iteration_count(), 2);
        let history = conv.history();
        assert_eq!(history[1].sequence_index, 1);
        assert_eq!(history[2].sequence_index, 2);
        assert_eq!(history[2].name, "SnowResearchLead");
    }

    #[test]
    fn test_append_rejects_unknown_author() {
        let mut conv = Conversation::seeded("seed", roster());
        let err = conv.append("Imposter", "hello").unwrap_err();
        assert!(matches!(err, BlizzardError::Conversation(_)));
        assert_eq!(conv.iteration_count(), 0);
    }

    #[test]
    fn test_append_rejects_after_complete() {
        let mut conv = Conversation::seeded("seed", roster());
        conv.mark_complete();
        assert!(conv.append("WeatherAgent", "late").is_err());
    }

    #[test]
    fn test_last_agent_message_skips_seed() {
        let mut conv = Conversation::seeded("seed", roster());
        assert!(conv.last_agent_message().is_none());

        conv.append("WeatherAgent", "report").unwrap();
        assert_eq!(conv.last_agent_message().unwrap().name, "WeatherAgent");
    }

    #[test]
    fn test_prediction_result_round_trip() {
        let mut conv = Conversation::seeded("seed", roster());
        conv.append("WeatherAgent", "report").unwrap();
        conv.append("Blizzard", "SNOW DAY VERDICT: YES (90%)").unwrap();

        let result = PredictionResult {
            timestamp: Utc::now(),
            conversation: conv.into_messages(),
            decision: Some("SNOW DAY VERDICT: YES (90%)".to_string()),
        };

        let json = serde_json::to_string_pretty(&result).unwrap();
        let back: PredictionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.conversation, back.conversation);
        assert_eq!(result.decision, back.decision);
    }
}
