//! Turn Selection Policy
//!
//! Decides which agent speaks next, or signals that no further speaker can
//! be determined. Two strategies: a deterministic rule pipeline and a
//! delegated strategy that asks the chat provider to name the next speaker.
//! Both guarantee the weather reporter speaks first and exactly once before
//! any decision-making agent.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::agent::Agent;
use super::prompts;
use crate::ai::{ChatMessage, SharedProvider};
use crate::constants::chat as chat_constants;
use crate::types::{AgentRole, BlizzardError, Conversation, Result};

/// Picks the next speaker from the roster, given a read-only history view.
#[async_trait]
pub trait TurnSelectionPolicy: Send + Sync {
    /// Returns the name of the next speaker, or `None` when the policy has
    /// no further speaker to offer.
    async fn next_speaker(
        &self,
        conversation: &Conversation,
        roster: &[Agent],
    ) -> Result<Option<String>>;
}

fn find_by_role<'a>(roster: &'a [Agent], role: AgentRole) -> Option<&'a Agent> {
    roster.iter().find(|a| a.role == role)
}

/// Whole-word match for the agreement token: "I agree" concurs,
/// "I disagree" does not.
fn signals_agreement(content: &str) -> bool {
    content
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(chat_constants::AGREEMENT_TOKEN))
}

/// The weather reporter opens every run, before any delegate is consulted.
fn opening_speaker(conversation: &Conversation, roster: &[Agent]) -> Option<String> {
    if conversation.last_agent_message().is_none() {
        find_by_role(roster, AgentRole::WeatherReporter).map(|a| a.name.clone())
    } else {
        None
    }
}

// =============================================================================
// Rule-Based Selection
// =============================================================================

/// Deterministic pipeline: weather reporter, then lead and assistant
/// alternate until the assistant concurs, then the verdict reporter closes.
pub struct RuleBasedSelection;

#[async_trait]
impl TurnSelectionPolicy for RuleBasedSelection {
    async fn next_speaker(
        &self,
        conversation: &Conversation,
        roster: &[Agent],
    ) -> Result<Option<String>> {
        if let Some(opener) = opening_speaker(conversation, roster) {
            return Ok(Some(opener));
        }

        // Unwrap is safe per the opening check above
        let last = conversation
            .last_agent_message()
            .unwrap_or_else(|| unreachable!());
        let last_role = roster
            .iter()
            .find(|a| a.name == last.name)
            .map(|a| a.role);

        let next = match last_role {
            Some(AgentRole::WeatherReporter) => Some(AgentRole::ResearchLead),
            Some(AgentRole::ResearchLead) => Some(AgentRole::ResearchAssistant),
            Some(AgentRole::ResearchAssistant) => {
                if signals_agreement(&last.content) {
                    Some(AgentRole::VerdictReporter)
                } else {
                    Some(AgentRole::ResearchLead)
                }
            }
            // The verdict has been delivered; nothing left to say
            Some(AgentRole::VerdictReporter) => None,
            None => None,
        };

        Ok(next
            .and_then(|role| find_by_role(roster, role))
            .map(|a| a.name.clone()))
    }
}

// =============================================================================
// Delegated Selection
// =============================================================================

/// Asks the chat provider to name the next speaker. The raw reply is an
/// untyped signal: it is matched case-insensitively against roster names,
/// and anything unusable falls back to the most recent speaker so they get
/// a chance to conclude.
pub struct DelegatedSelection {
    provider: SharedProvider,
}

impl DelegatedSelection {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TurnSelectionPolicy for DelegatedSelection {
    async fn next_speaker(
        &self,
        conversation: &Conversation,
        roster: &[Agent],
    ) -> Result<Option<String>> {
        if let Some(opener) = opening_speaker(conversation, roster) {
            return Ok(Some(opener));
        }

        let roster_names: Vec<String> = roster.iter().map(|a| a.name.clone()).collect();
        let prompt = prompts::selection_prompt(&roster_names, conversation.history());
        let reply = self.provider.chat(&[ChatMessage::user(prompt)]).await?;

        parse_selection(&reply, &roster_names, conversation)
    }
}

/// Tolerant parser for the delegate's reply.
///
/// `TERMINATE` and `NONE` are a yield: the floor goes back to the last
/// speaker, or the loop ends when nobody has spoken. Empty or unrecognized
/// output also falls back to the last speaker, but with nobody to fall back
/// on it surfaces as [`BlizzardError::MalformedPolicyOutput`].
fn parse_selection(
    raw: &str,
    roster_names: &[String],
    conversation: &Conversation,
) -> Result<Option<String>> {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    if upper == chat_constants::TERMINATE_TOKEN || upper == "NONE" {
        debug!(reply = %trimmed, "Selection delegate yielded, re-picking last speaker");
        return Ok(last_speaker(conversation));
    }

    if let Some(name) = roster_names.iter().find(|name| name.to_uppercase() == upper) {
        return Ok(Some(name.clone()));
    }

    warn!(
        reply = %trimmed,
        "Selection delegate reply unusable, re-picking last speaker"
    );
    match last_speaker(conversation) {
        Some(name) => Ok(Some(name)),
        None => Err(BlizzardError::MalformedPolicyOutput {
            strategy: "selection".to_string(),
            raw: trimmed.to_string(),
        }),
    }
}

fn last_speaker(conversation: &Conversation) -> Option<String> {
    conversation.last_agent_message().map(|m| m.name.clone())
}
