//! Conversation Controller
//!
//! Drives the prediction discussion: seed the conversation, ask the
//! selection policy who speaks, invoke that agent with the full history,
//! append, then consult the termination policy and the iteration ceiling.
//! Rounds are strictly sequential; exactly one agent invocation is
//! outstanding at any time.

use chrono::Utc;
use tracing::{info, warn};

use super::agent::Agent;
use super::selection::TurnSelectionPolicy;
use super::termination::TerminationPolicy;
use crate::ai::SharedProvider;
use crate::constants::chat as chat_constants;
use crate::types::{AgentRole, Conversation, Message, PredictionResult, Result};

pub struct ConversationController {
    provider: SharedProvider,
    roster: Vec<Agent>,
    selection: Box<dyn TurnSelectionPolicy>,
    termination: Box<dyn TerminationPolicy>,
    max_iterations: usize,
}

impl ConversationController {
    pub fn new(
        provider: SharedProvider,
        roster: Vec<Agent>,
        selection: Box<dyn TurnSelectionPolicy>,
        termination: Box<dyn TerminationPolicy>,
        max_iterations: usize,
    ) -> Self {
        Self {
            provider,
            roster,
            selection,
            termination,
            max_iterations,
        }
    }

    /// Run one prediction discussion to completion.
    ///
    /// The result is emitted even when the iteration ceiling fires with no
    /// explicit verdict; only provider failures abort the run.
    pub async fn run(&self, seed_prompt: String) -> Result<PredictionResult> {
        let roster_names: Vec<String> = self.roster.iter().map(|a| a.name.clone()).collect();
        let mut conversation = Conversation::seeded(seed_prompt, roster_names);

        info!(
            agents = self.roster.len(),
            max_iterations = self.max_iterations,
            "Starting prediction discussion"
        );

        while !conversation.is_complete() {
            let speaker = match self
                .selection
                .next_speaker(&conversation, &self.roster)
                .await
            {
                Ok(Some(speaker)) => speaker,
                Ok(None) => {
                    info!("No further speaker, ending discussion");
                    conversation.mark_complete();
                    break;
                }
                // Unusable delegate output with no fallback ends the
                // discussion; the transcript so far is still a valid result.
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Selection policy gave up, ending discussion");
                    conversation.mark_complete();
                    break;
                }
                Err(e) => return Err(e),
            };

            let agent = self
                .roster
                .iter()
                .find(|a| a.name == speaker)
                .ok_or_else(|| {
                    crate::types::BlizzardError::Conversation(format!(
                        "selection policy chose '{}', which is not in the roster",
                        speaker
                    ))
                })?;

            let content = agent
                .produce_next_message(&self.provider, conversation.history())
                .await?;
            let message = conversation.append(&agent.name, content)?;
            info!(
                turn = message.sequence_index,
                agent = %agent.name,
                chars = message.content.len(),
                "Turn produced"
            );

            if self
                .termination
                .should_terminate(&conversation, &self.roster)
                .await?
            {
                info!("Termination policy fired");
                conversation.mark_complete();
            } else if conversation.iteration_count() >= self.max_iterations {
                warn!(
                    iterations = conversation.iteration_count(),
                    "Iteration ceiling reached, forcing termination"
                );
                conversation.mark_complete();
            }
        }

        let messages = conversation.into_messages();
        let decision = extract_decision(&messages, &self.roster);
        if decision.is_none() {
            warn!("Discussion ended without an explicit verdict");
        }

        Ok(PredictionResult {
            timestamp: Utc::now(),
            conversation: messages,
            decision,
        })
    }
}

/// The decision is the latest marker-bearing message authored by the
/// verdict reporter; position in the transcript does not matter.
fn extract_decision(messages: &[Message], roster: &[Agent]) -> Option<String> {
    let verdict_agent = roster.iter().find(|a| a.role == AgentRole::VerdictReporter)?;
    messages
        .iter()
        .rev()
        .find(|m| {
            m.name == verdict_agent.name && m.content.contains(chat_constants::VERDICT_MARKER)
        })
        .map(|m| m.content.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatMessage, ChatProvider};
    use crate::chat::prompts;
    use crate::chat::selection::RuleBasedSelection;
    use crate::chat::termination::RuleBasedTermination;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted provider: replies are keyed off the system instructions so
    /// each roster role gets its own line.
    struct ScriptedProvider {
        calls: AtomicU32,
        assistant_agrees_after: u32,
    }

    impl ScriptedProvider {
        fn new(assistant_agrees_after: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                assistant_agrees_after,
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst);
            let system = &messages[0].content;

            let reply = if system.starts_with("You are WeatherAgent") {
                "Heavy snow from 9 PM, wind chill -5F, visibility under a mile."
            } else if system.starts_with("You are SnowResearchLead") {
                "Snowfall and wind chill criteria are both met. Recommend closure."
            } else if system.starts_with("You are ResearchAssistant") {
                if calls >= self.assistant_agrees_after {
                    "The numbers check out. I AGREE with the recommendation."
                } else {
                    "Have bus routes on unplowed roads been considered?"
                }
            } else {
                "SNOW DAY VERDICT: SNOW DAY! Confidence: 93%. Bundle up!"
            };
            Ok(reply.to_string())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "none"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn roster() -> Vec<Agent> {
        vec![
            Agent::new(
                AgentRole::WeatherReporter,
                prompts::WEATHER_REPORTER_INSTRUCTIONS,
            ),
            Agent::new(AgentRole::ResearchLead, prompts::RESEARCH_LEAD_INSTRUCTIONS),
            Agent::new(
                AgentRole::ResearchAssistant,
                prompts::RESEARCH_ASSISTANT_INSTRUCTIONS,
            ),
            Agent::new(
                AgentRole::VerdictReporter,
                prompts::VERDICT_REPORTER_INSTRUCTIONS,
            ),
        ]
    }

    fn controller(provider: ScriptedProvider, max_iterations: usize) -> ConversationController {
        ConversationController::new(
            Arc::new(provider),
            roster(),
            Box::new(RuleBasedSelection),
            Box::new(RuleBasedTermination),
            max_iterations,
        )
    }

    #[tokio::test]
    async fn test_run_reaches_verdict() {
        let controller = controller(ScriptedProvider::new(0), 20);
        let result = controller.run("briefing".to_string()).await.unwrap();

        // weather, lead, assistant (agrees), verdict
        assert_eq!(result.conversation.len(), 5);
        assert_eq!(result.conversation[1].name, "WeatherAgent");
        let decision = result.decision.expect("verdict expected");
        assert!(decision.contains("SNOW DAY VERDICT"));
    }

    #[tokio::test]
    async fn test_weather_reporter_always_first() {
        let controller = controller(ScriptedProvider::new(0), 20);
        let result = controller.run("briefing".to_string()).await.unwrap();

        let first_agent = result
            .conversation
            .iter()
            .find(|m| m.name != crate::types::SEED_AUTHOR)
            .unwrap();
        assert_eq!(first_agent.name, "WeatherAgent");
    }

    #[tokio::test]
    async fn test_iteration_ceiling_forces_termination() {
        // Assistant never agrees, so lead/assistant alternate forever
        let controller = controller(ScriptedProvider::new(u32::MAX), 6);
        let result = controller.run("briefing".to_string()).await.unwrap();

        // seed + exactly max_iterations produced messages
        assert_eq!(result.conversation.len(), 7);
        assert!(result.decision.is_none());
    }

    #[tokio::test]
    async fn test_debate_loops_until_agreement() {
        // Assistant pushes back once before agreeing. Call order: weather(0),
        // lead(1), assistant(2, objects), lead(3), assistant(4, agrees),
        // verdict(5).
        let controller = controller(ScriptedProvider::new(3), 20);
        let result = controller.run("briefing".to_string()).await.unwrap();

        let speakers: Vec<&str> = result
            .conversation
            .iter()
            .skip(1)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            speakers,
            vec![
                "WeatherAgent",
                "SnowResearchLead",
                "ResearchAssistant",
                "SnowResearchLead",
                "ResearchAssistant",
                "Blizzard"
            ]
        );
        assert!(result.decision.is_some());
    }

    struct FailingSelection {
        error: fn() -> crate::types::BlizzardError,
    }

    #[async_trait]
    impl crate::chat::selection::TurnSelectionPolicy for FailingSelection {
        async fn next_speaker(
            &self,
            _conversation: &crate::types::Conversation,
            _roster: &[Agent],
        ) -> Result<Option<String>> {
            Err((self.error)())
        }
    }

    #[tokio::test]
    async fn test_recoverable_selection_failure_ends_discussion() {
        let controller = ConversationController::new(
            Arc::new(ScriptedProvider::new(0)),
            roster(),
            Box::new(FailingSelection {
                error: || crate::types::BlizzardError::MalformedPolicyOutput {
                    strategy: "selection".to_string(),
                    raw: "???".to_string(),
                },
            }),
            Box::new(RuleBasedTermination),
            20,
        );

        let result = controller.run("briefing".to_string()).await.unwrap();
        assert_eq!(result.conversation.len(), 1);
        assert!(result.decision.is_none());
    }

    #[tokio::test]
    async fn test_unrecoverable_selection_failure_aborts() {
        let controller = ConversationController::new(
            Arc::new(ScriptedProvider::new(0)),
            roster(),
            Box::new(FailingSelection {
                error: || crate::types::BlizzardError::Conversation("broken".to_string()),
            }),
            Box::new(RuleBasedTermination),
            20,
        );

        assert!(controller.run("briefing".to_string()).await.is_err());
    }

    #[test]
    fn test_extract_decision_uses_latest_marker_message() {
        let roster = roster();
        let messages = vec![
            Message::seed("briefing"),
            Message {
                name: "Blizzard".to_string(),
                role: crate::types::MessageRole::Assistant,
                content: "SNOW DAY VERDICT: NO SNOW DAY (60%)".to_string(),
                sequence_index: 1,
            },
            Message {
                name: "Blizzard".to_string(),
                role: crate::types::MessageRole::Assistant,
                content: "SNOW DAY VERDICT: SNOW DAY (90%)".to_string(),
                sequence_index: 2,
            },
        ];

        let decision = extract_decision(&messages, &roster).unwrap();
        assert!(decision.contains("SNOW DAY (90%)"));
    }

    #[test]
    fn test_extract_decision_ignores_other_authors() {
        let roster = roster();
        let messages = vec![Message {
            name: "WeatherAgent".to_string(),
            role: crate::types::MessageRole::Assistant,
            content: "SNOW DAY VERDICT coming soon".to_string(),
            sequence_index: 1,
        }];

        assert!(extract_decision(&messages, &roster).is_none());
    }
}
