//! Agent Group Chat
//!
//! The turn-based discussion that produces a prediction: roster
//! construction, turn selection, termination judgment, and the controller
//! loop that ties them together.

pub mod agent;
pub mod briefing;
pub mod controller;
pub mod prompts;
pub mod selection;
pub mod termination;

pub use agent::Agent;
pub use briefing::build_seed_prompt;
pub use controller::ConversationController;
pub use selection::{DelegatedSelection, RuleBasedSelection, TurnSelectionPolicy};
pub use termination::{DelegatedTermination, RuleBasedTermination, TerminationPolicy};

use crate::config::DistrictProfile;
use crate::types::AgentRole;

/// Build the fixed four-agent roster for one run.
///
/// Decision-making agents carry the district's closure criteria and settings
/// in their instructions; the weather reporter stays policy-blind.
pub fn build_roster(profile: &DistrictProfile) -> Vec<Agent> {
    let district_context = format!(
        "\n\nDISTRICT CLOSURE CRITERIA:\n{}\n\n{}",
        profile.criteria, profile.settings_summary
    );

    vec![
        Agent::new(
            AgentRole::WeatherReporter,
            prompts::WEATHER_REPORTER_INSTRUCTIONS,
        ),
        Agent::new(
            AgentRole::ResearchLead,
            format!("{}{}", prompts::RESEARCH_LEAD_INSTRUCTIONS, district_context),
        ),
        Agent::new(
            AgentRole::ResearchAssistant,
            format!(
                "{}{}",
                prompts::RESEARCH_ASSISTANT_INSTRUCTIONS, district_context
            ),
        ),
        Agent::new(
            AgentRole::VerdictReporter,
            format!(
                "{}{}",
                prompts::VERDICT_REPORTER_INSTRUCTIONS, district_context
            ),
        ),
    ]
}
