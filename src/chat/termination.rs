//! Termination Policy
//!
//! Decides whether the discussion has reached a stable verdict. Consulted
//! after every appended message, independent of who just spoke. The
//! iteration ceiling lives in the controller, not here.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::agent::Agent;
use super::prompts;
use crate::ai::{ChatMessage, SharedProvider};
use crate::constants::chat as chat_constants;
use crate::types::{AgentRole, Conversation, Result};

/// Judges whether the discussion is over, given a read-only history view.
#[async_trait]
pub trait TerminationPolicy: Send + Sync {
    async fn should_terminate(
        &self,
        conversation: &Conversation,
        roster: &[Agent],
    ) -> Result<bool>;
}

// =============================================================================
// Rule-Based Termination
// =============================================================================

/// Terminates once the verdict reporter has spoken a marker-bearing message.
pub struct RuleBasedTermination;

#[async_trait]
impl TerminationPolicy for RuleBasedTermination {
    async fn should_terminate(
        &self,
        conversation: &Conversation,
        roster: &[Agent],
    ) -> Result<bool> {
        let Some(verdict_agent) = roster.iter().find(|a| a.role == AgentRole::VerdictReporter)
        else {
            return Ok(false);
        };

        let done = conversation.history().iter().any(|m| {
            m.name == verdict_agent.name && m.content.contains(chat_constants::VERDICT_MARKER)
        });
        Ok(done)
    }
}

// =============================================================================
// Delegated Termination
// =============================================================================

/// Asks the chat provider whether the discussion has concluded. Only an
/// affirmative `TERMINATE` stops the run; anything else, including
/// unparseable output, keeps it going.
pub struct DelegatedTermination {
    provider: SharedProvider,
}

impl DelegatedTermination {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TerminationPolicy for DelegatedTermination {
    async fn should_terminate(
        &self,
        conversation: &Conversation,
        _roster: &[Agent],
    ) -> Result<bool> {
        let prompt = prompts::termination_prompt(conversation.history());
        let reply = self.provider.chat(&[ChatMessage::user(prompt)]).await?;

        Ok(parse_termination(&reply))
    }
}

/// Tolerant parser for the delegate's reply. Matched against the affirmative
/// token after trimming; malformed output is a continue, not a failure.
fn parse_termination(raw: &str) -> bool {
    let upper = raw.trim().to_uppercase();
    if upper == chat_constants::TERMINATE_TOKEN {
        return true;
    }
    if upper != "CONTINUE" {
        warn!(reply = %raw.trim(), "Unrecognized termination reply, continuing");
    } else {
        debug!("Termination delegate voted to continue");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::prompts as instruction_text;

    fn roster() -> Vec<Agent> {
        vec![
            Agent::new(
                AgentRole::WeatherReporter,
                instruction_text::WEATHER_REPORTER_INSTRUCTIONS,
            ),
            Agent::new(
                AgentRole::VerdictReporter,
                instruction_text::VERDICT_REPORTER_INSTRUCTIONS,
            ),
        ]
    }

    fn seeded() -> Conversation {
        Conversation::seeded(
            "briefing",
            roster().iter().map(|a| a.name.clone()).collect(),
        )
    }

    #[tokio::test]
    async fn test_no_termination_before_verdict() {
        let mut conv = seeded();
        conv.append("WeatherAgent", "heavy snow").unwrap();

        let done = RuleBasedTermination
            .should_terminate(&conv, &roster())
            .await
            .unwrap();
        assert!(!done);
    }

    #[tokio::test]
    async fn test_marker_from_verdict_agent_terminates() {
        let mut conv = seeded();
        conv.append("WeatherAgent", "heavy snow").unwrap();
        conv.append("Blizzard", "SNOW DAY VERDICT: SNOW DAY! Confidence: 92%")
            .unwrap();

        let done = RuleBasedTermination
            .should_terminate(&conv, &roster())
            .await
            .unwrap();
        assert!(done);
    }

    #[tokio::test]
    async fn test_marker_from_other_agent_ignored() {
        let mut conv = seeded();
        conv.append("WeatherAgent", "the SNOW DAY VERDICT will come later")
            .unwrap();

        let done = RuleBasedTermination
            .should_terminate(&conv, &roster())
            .await
            .unwrap();
        assert!(!done);
    }

    #[test]
    fn test_parse_termination() {
        assert!(parse_termination("TERMINATE"));
        assert!(parse_termination("  terminate \n"));
        assert!(!parse_termination("CONTINUE"));
        assert!(!parse_termination("probably done?"));
        assert!(!parse_termination(""));
    }
}
